//! Generic request/response shapes.

use imgtool_models::{Capability, CapabilityParams, ImageFile, QueryParams};

use crate::objects::ObjectUrl;

/// One capability call: files for the multipart body plus named parameters
/// for the query string. Files map positionally onto
/// [`Capability::file_fields`].
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub capability: Capability,
    pub files: Vec<ImageFile>,
    pub params: QueryParams,
}

impl UploadRequest {
    pub fn new(capability: Capability, file: ImageFile) -> Self {
        Self {
            capability,
            files: vec![file],
            params: QueryParams::new(),
        }
    }

    /// Build from typed parameters.
    pub fn from_params<P: CapabilityParams>(params: &P, file: ImageFile) -> Self {
        Self {
            capability: params.capability(),
            files: vec![file],
            params: params.query_params(),
        }
    }

    /// Two-file comparison request.
    pub fn comparison(first: ImageFile, second: ImageFile) -> Self {
        Self {
            capability: Capability::CompareImages,
            files: vec![first, second],
            params: QueryParams::new(),
        }
    }

    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }
}

/// Outcome of a successful capability call.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingResult {
    /// Binary reply, parked in the client's object store
    Binary(ObjectUrl),
    /// JSON reply, unchanged
    Structured(serde_json::Value),
}

impl ProcessingResult {
    pub fn as_object_url(&self) -> Option<&ObjectUrl> {
        match self {
            ProcessingResult::Binary(url) => Some(url),
            ProcessingResult::Structured(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ProcessingResult::Binary(_) => None,
            ProcessingResult::Structured(value) => Some(value),
        }
    }
}

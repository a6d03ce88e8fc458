//! Backend capability catalog.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How a capability replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Raw image bytes with a content type
    Binary,
    /// A JSON document
    Json,
}

/// One backend image-processing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Draw detected object boxes on the image
    DetectObjects,
    /// Overlay segmentation masks on the image
    SegmentObjects,
    /// Resize to the requested dimensions
    ResizeImage,
    /// Apply a named filter
    ApplyFilter,
    /// OCR text extraction
    ExtractText,
    /// Re-encode at a lower quality
    CompressImage,
    /// Similarity score between two images
    CompareImages,
    /// Per-label object counts
    CountObjects,
    /// Draw detected human poses
    DetectPoses,
}

impl Capability {
    pub const ALL: &'static [Capability] = &[
        Capability::DetectObjects,
        Capability::SegmentObjects,
        Capability::ResizeImage,
        Capability::ApplyFilter,
        Capability::ExtractText,
        Capability::CompressImage,
        Capability::CompareImages,
        Capability::CountObjects,
        Capability::DetectPoses,
    ];

    /// Request path on the processing backend.
    pub fn path(&self) -> &'static str {
        match self {
            Capability::DetectObjects => "/detect_objects",
            Capability::SegmentObjects => "/segment_objects",
            Capability::ResizeImage => "/resize_image",
            Capability::ApplyFilter => "/apply_filter",
            Capability::ExtractText => "/extract_text",
            Capability::CompressImage => "/compress_image",
            Capability::CompareImages => "/compare_images",
            Capability::CountObjects => "/count_objects",
            Capability::DetectPoses => "/detect_open_poses",
        }
    }

    pub fn response_kind(&self) -> ResponseKind {
        match self {
            Capability::ExtractText | Capability::CompareImages | Capability::CountObjects => {
                ResponseKind::Json
            }
            _ => ResponseKind::Binary,
        }
    }

    /// Multipart field names, in positional order.
    pub fn file_fields(&self) -> &'static [&'static str] {
        match self {
            Capability::CompareImages => &["file1", "file2"],
            _ => &["file"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::DetectObjects => "detect_objects",
            Capability::SegmentObjects => "segment_objects",
            Capability::ResizeImage => "resize_image",
            Capability::ApplyFilter => "apply_filter",
            Capability::ExtractText => "extract_text",
            Capability::CompressImage => "compress_image",
            Capability::CompareImages => "compare_images",
            Capability::CountObjects => "count_objects",
            Capability::DetectPoses => "detect_poses",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Capability {
    type Err = CapabilityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| CapabilityParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown capability: {0}")]
pub struct CapabilityParseError(String);

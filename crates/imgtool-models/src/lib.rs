//! Shared data models for the Image Toolbox client.
//!
//! This crate provides Serde-serializable types for:
//! - The catalog of backend capabilities and their paths
//! - Typed capability parameters and their query-string encoding
//! - Image file payloads
//! - Structured (JSON) capability results

pub mod capability;
pub mod file;
pub mod params;
pub mod results;

// Re-export common types
pub use capability::{Capability, CapabilityParseError, ResponseKind};
pub use file::{is_accepted_image, ImageFile, ACCEPTED_EXTENSIONS};
pub use params::{
    CapabilityParams, CompressParams, CountObjectsParams, DetectObjectsParams, DetectionModel,
    FilterParams, ImageFilter, ParamParseError, ParamValue, PoseParams, QueryParams,
    ResizeParams, ResizePreset, SegmentObjectsParams, SegmentationModel,
};
pub use results::{ExtractedText, ObjectCounts, SimilarityScore};

//! Capability parameters and their query-string encoding.
//!
//! Every capability takes its modifiers as named query-string pairs. The
//! typed parameter structs here know which keys their capability expects;
//! values are forwarded as given, without range checks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::capability::Capability;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_QUALITY: u8 = 80;

// =============================================================================
// Named Parameters
// =============================================================================

/// A primitive query-string value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(v) => f.write_str(v),
            ParamValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<u8> for ParamValue {
    fn from(v: u8) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// Ordered key/value pairs appended to the request URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams(Vec<(String, ParamValue)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Parameters bound to a single capability.
pub trait CapabilityParams {
    fn capability(&self) -> Capability;

    fn query_params(&self) -> QueryParams;
}

// =============================================================================
// Model and Filter Catalogs
// =============================================================================

#[derive(Debug, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParamParseError {
    kind: &'static str,
    value: String,
}

/// Object detection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetectionModel {
    /// YOLOv8 medium, anchor-free detection
    #[default]
    Yolov8,
    /// YOLOv10 medium, NMS-free training
    Yolov10,
    /// YOLO11, lighter and faster
    Yolo11,
}

impl DetectionModel {
    pub const ALL: &'static [DetectionModel] = &[
        DetectionModel::Yolov8,
        DetectionModel::Yolov10,
        DetectionModel::Yolo11,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionModel::Yolov8 => "yolov8",
            DetectionModel::Yolov10 => "yolov10",
            DetectionModel::Yolo11 => "yolo11",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DetectionModel::Yolov8 => "YOLOv8 Medium - Anchor-free Detection",
            DetectionModel::Yolov10 => "YOLOv10 Medium - Higher accuracy, NMS-free Training",
            DetectionModel::Yolo11 => "YOLO11 Fast and more lightweight - Enhanced Efficiency",
        }
    }
}

impl fmt::Display for DetectionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectionModel {
    type Err = ParamParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yolov8" => Ok(DetectionModel::Yolov8),
            "yolov10" => Ok(DetectionModel::Yolov10),
            "yolo11" => Ok(DetectionModel::Yolo11),
            _ => Err(ParamParseError {
                kind: "detection model",
                value: s.to_string(),
            }),
        }
    }
}

/// Segmentation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum SegmentationModel {
    #[default]
    #[serde(rename = "yolov8_seg")]
    Yolov8Seg,
    #[serde(rename = "yolo11_seg")]
    Yolo11Seg,
}

impl SegmentationModel {
    pub const ALL: &'static [SegmentationModel] =
        &[SegmentationModel::Yolov8Seg, SegmentationModel::Yolo11Seg];

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentationModel::Yolov8Seg => "yolov8_seg",
            SegmentationModel::Yolo11Seg => "yolo11_seg",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SegmentationModel::Yolov8Seg => "Segment Anything with Yolov8",
            SegmentationModel::Yolo11Seg => "Segment Anything with Yolo11",
        }
    }
}

impl fmt::Display for SegmentationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentationModel {
    type Err = ParamParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yolov8_seg" => Ok(SegmentationModel::Yolov8Seg),
            "yolo11_seg" => Ok(SegmentationModel::Yolo11Seg),
            _ => Err(ParamParseError {
                kind: "segmentation model",
                value: s.to_string(),
            }),
        }
    }
}

/// Named image filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImageFilter {
    Grayscale,
    Sepia,
    Blur,
    Sharpen,
    EdgeEnhance,
    Emboss,
}

impl ImageFilter {
    pub const ALL: &'static [ImageFilter] = &[
        ImageFilter::Grayscale,
        ImageFilter::Sepia,
        ImageFilter::Blur,
        ImageFilter::Sharpen,
        ImageFilter::EdgeEnhance,
        ImageFilter::Emboss,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFilter::Grayscale => "grayscale",
            ImageFilter::Sepia => "sepia",
            ImageFilter::Blur => "blur",
            ImageFilter::Sharpen => "sharpen",
            ImageFilter::EdgeEnhance => "edge_enhance",
            ImageFilter::Emboss => "emboss",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageFilter::Grayscale => "Grayscale",
            ImageFilter::Sepia => "Sepia",
            ImageFilter::Blur => "Blur",
            ImageFilter::Sharpen => "Sharpen",
            ImageFilter::EdgeEnhance => "Edge Enhance",
            ImageFilter::Emboss => "Emboss",
        }
    }
}

impl fmt::Display for ImageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageFilter {
    type Err = ParamParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ImageFilter::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| ParamParseError {
                kind: "filter",
                value: s.to_string(),
            })
    }
}

/// Common output sizes offered for resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResizePreset {
    Hd,
    FullHd,
    #[serde(rename = "4k")]
    Uhd4k,
}

impl ResizePreset {
    pub const ALL: &'static [ResizePreset] =
        &[ResizePreset::Hd, ResizePreset::FullHd, ResizePreset::Uhd4k];

    /// (width, height) in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ResizePreset::Hd => (1280, 720),
            ResizePreset::FullHd => (1920, 1080),
            ResizePreset::Uhd4k => (3840, 2160),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResizePreset::Hd => "HD (1280x720)",
            ResizePreset::FullHd => "Full HD (1920x1080)",
            ResizePreset::Uhd4k => "4K (3840x2160)",
        }
    }
}

impl FromStr for ResizePreset {
    type Err = ParamParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hd" | "720p" => Ok(ResizePreset::Hd),
            "full_hd" | "fullhd" | "1080p" => Ok(ResizePreset::FullHd),
            "4k" | "2160p" => Ok(ResizePreset::Uhd4k),
            _ => Err(ParamParseError {
                kind: "resize preset",
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Per-Capability Parameters
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectObjectsParams {
    pub model: DetectionModel,
    pub confidence_threshold: f64,
}

impl Default for DetectObjectsParams {
    fn default() -> Self {
        Self {
            model: DetectionModel::default(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl CapabilityParams for DetectObjectsParams {
    fn capability(&self) -> Capability {
        Capability::DetectObjects
    }

    fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .with("model", self.model.as_str())
            .with("confidence_threshold", self.confidence_threshold)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentObjectsParams {
    pub model: SegmentationModel,
}

impl CapabilityParams for SegmentObjectsParams {
    fn capability(&self) -> Capability {
        Capability::SegmentObjects
    }

    fn query_params(&self) -> QueryParams {
        QueryParams::new().with("model", self.model.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    /// Ask the backend to keep the source aspect ratio
    pub aspect_ratio_locked: bool,
}

impl ResizeParams {
    pub fn from_preset(preset: ResizePreset, aspect_ratio_locked: bool) -> Self {
        let (width, height) = preset.dimensions();
        Self {
            width,
            height,
            aspect_ratio_locked,
        }
    }
}

impl Default for ResizeParams {
    fn default() -> Self {
        Self::from_preset(ResizePreset::Hd, true)
    }
}

impl CapabilityParams for ResizeParams {
    fn capability(&self) -> Capability {
        Capability::ResizeImage
    }

    fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .with("width", self.width)
            .with("height", self.height)
            .with("isAspectRatioLocked", self.aspect_ratio_locked)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FilterParams {
    pub filter: ImageFilter,
}

impl CapabilityParams for FilterParams {
    fn capability(&self) -> Capability {
        Capability::ApplyFilter
    }

    fn query_params(&self) -> QueryParams {
        QueryParams::new().with("filter", self.filter.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompressParams {
    /// Output quality, percent
    pub quality: u8,
}

impl Default for CompressParams {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

impl CapabilityParams for CompressParams {
    fn capability(&self) -> Capability {
        Capability::CompressImage
    }

    fn query_params(&self) -> QueryParams {
        QueryParams::new().with("quality", self.quality)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CountObjectsParams {
    pub model: DetectionModel,
}

impl CapabilityParams for CountObjectsParams {
    fn capability(&self) -> Capability {
        Capability::CountObjects
    }

    fn query_params(&self) -> QueryParams {
        QueryParams::new().with("model", self.model.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PoseParams {
    pub show_skeleton: bool,
    pub show_joint_confidence: bool,
    pub confidence_threshold: f64,
}

impl Default for PoseParams {
    fn default() -> Self {
        Self {
            show_skeleton: true,
            show_joint_confidence: true,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl CapabilityParams for PoseParams {
    fn capability(&self) -> Capability {
        Capability::DetectPoses
    }

    fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .with("showSkeleton", self.show_skeleton)
            .with("showJointConfidence", self.show_joint_confidence)
            .with("confidence_threshold", self.confidence_threshold)
    }
}

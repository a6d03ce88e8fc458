//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use imgtool_client::Environment;
use imgtool_models::{DetectionModel, ImageFilter, ResizePreset, SegmentationModel};

#[derive(Parser, Debug)]
#[command(name = "image-toolbox", version)]
#[command(about = "Send images to the Image Toolbox processing backend")]
pub struct Cli {
    /// Backend base URL, overriding the environment default
    #[arg(long, global = true, env = "IMAGE_TOOLBOX_BASE_URL")]
    pub base_url: Option<String>,

    /// Environment whose default backend to use (development, production)
    #[arg(long = "env", global = true, value_parser = parse_environment)]
    pub environment: Option<Environment>,

    #[command(subcommand)]
    pub command: Command,
}

/// Input image and where to write the processed result.
#[derive(Args, Debug, Clone)]
pub struct ImageIo {
    /// Input image (png, jpg, jpeg, gif, webp)
    pub input: PathBuf,

    /// Output file for the processed image
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect objects and draw them on the image
    Detect {
        #[command(flatten)]
        io: ImageIo,
        #[arg(long, default_value = "yolov8")]
        model: DetectionModel,
        #[arg(long, default_value_t = 0.5)]
        confidence: f64,
    },

    /// Overlay segmentation masks on the image
    Segment {
        #[command(flatten)]
        io: ImageIo,
        #[arg(long, default_value = "yolov8_seg")]
        model: SegmentationModel,
    },

    /// Resize the image
    Resize {
        #[command(flatten)]
        io: ImageIo,
        #[arg(long, conflicts_with = "preset")]
        width: Option<u32>,
        #[arg(long, conflicts_with = "preset")]
        height: Option<u32>,
        /// hd, full_hd or 4k
        #[arg(long)]
        preset: Option<ResizePreset>,
        /// Let the backend stretch to the exact dimensions
        #[arg(long)]
        no_aspect_lock: bool,
    },

    /// Apply a named filter
    Filter {
        #[command(flatten)]
        io: ImageIo,
        /// grayscale, sepia, blur, sharpen, edge_enhance or emboss
        #[arg(long)]
        filter: ImageFilter,
    },

    /// Extract text from the image
    ExtractText {
        input: PathBuf,
        /// Also write the text to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compress the image
    Compress {
        #[command(flatten)]
        io: ImageIo,
        /// Output quality, percent
        #[arg(long, default_value_t = 80)]
        quality: u8,
    },

    /// Compare two images
    Compare { first: PathBuf, second: PathBuf },

    /// Count objects per label
    Count {
        input: PathBuf,
        #[arg(long, default_value = "yolov8")]
        model: DetectionModel,
    },

    /// Detect human poses and draw them on the image
    Poses {
        #[command(flatten)]
        io: ImageIo,
        #[arg(long)]
        no_skeleton: bool,
        #[arg(long)]
        no_joint_confidence: bool,
        #[arg(long, default_value_t = 0.5)]
        confidence: f64,
    },

    /// Detect and count objects in one go
    Analyze {
        #[command(flatten)]
        io: ImageIo,
        #[arg(long, default_value = "yolov8")]
        model: DetectionModel,
        #[arg(long, default_value_t = 0.5)]
        confidence: f64,
    },
}

fn parse_environment(s: &str) -> Result<Environment, String> {
    s.parse()
}

//! Command execution.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use imgtool_client::{ClientConfig, ObjectUrl, ProcessingClient};
use imgtool_models::{
    is_accepted_image, CompressParams, CountObjectsParams, DetectObjectsParams, FilterParams,
    ImageFile, ObjectCounts, PoseParams, ResizeParams, ResizePreset, SegmentObjectsParams,
    ACCEPTED_EXTENSIONS,
};
use tracing::info;

use crate::cli::{Cli, Command};

pub async fn run(cli: Cli) -> Result<()> {
    let config = client_config(&cli);
    info!(
        "Using {} backend at {}",
        config.environment, config.base_url
    );

    let client = ProcessingClient::new(config)?;

    match cli.command {
        Command::Detect {
            io,
            model,
            confidence,
        } => {
            let file = load_image(&io.input).await?;
            let params = DetectObjectsParams {
                model,
                confidence_threshold: confidence,
            };
            let url = client.detect_objects(file, &params).await?;
            let output = io.output.unwrap_or_else(|| "detected-objects.jpg".into());
            save_object(&client, &url, &output).await?;
        }

        Command::Segment { io, model } => {
            let file = load_image(&io.input).await?;
            let url = client
                .segment_objects(file, &SegmentObjectsParams { model })
                .await?;
            let output = io.output.unwrap_or_else(|| "segmented-objects.png".into());
            save_object(&client, &url, &output).await?;
        }

        Command::Resize {
            io,
            width,
            height,
            preset,
            no_aspect_lock,
        } => {
            let params = resize_params(width, height, preset, !no_aspect_lock);
            let file = load_image(&io.input).await?;
            let url = client.resize_image(file, &params).await?;
            let output = io.output.unwrap_or_else(|| {
                format!("resized-image-{}x{}.jpg", params.width, params.height).into()
            });
            save_object(&client, &url, &output).await?;
        }

        Command::Filter { io, filter } => {
            let file = load_image(&io.input).await?;
            let url = client.apply_filter(file, &FilterParams { filter }).await?;
            let output = io
                .output
                .unwrap_or_else(|| format!("filtered-image-{}.jpg", filter).into());
            save_object(&client, &url, &output).await?;
        }

        Command::ExtractText { input, output } => {
            let file = load_image(&input).await?;
            let extracted = client.extract_text(file).await?;
            println!("{}", extracted.text);

            if let Some(path) = output {
                tokio::fs::write(&path, &extracted.text)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("Saved text to {}", path.display());
            }
        }

        Command::Compress { io, quality } => {
            let file = load_image(&io.input).await?;
            let url = client
                .compress_image(file, &CompressParams { quality })
                .await?;
            let output = io.output.unwrap_or_else(|| "compressed-image.jpg".into());
            save_object(&client, &url, &output).await?;
        }

        Command::Compare { first, second } => {
            let first = load_image(&first).await?;
            let second = load_image(&second).await?;
            let score = client.compare_images(first, second).await?;
            println!("The images are {:.2}% similar", score.as_percent());
        }

        Command::Count { input, model } => {
            let file = load_image(&input).await?;
            let counts = client
                .count_objects(file, &CountObjectsParams { model })
                .await?;
            print_counts(&counts);
        }

        Command::Poses {
            io,
            no_skeleton,
            no_joint_confidence,
            confidence,
        } => {
            let file = load_image(&io.input).await?;
            let params = PoseParams {
                show_skeleton: !no_skeleton,
                show_joint_confidence: !no_joint_confidence,
                confidence_threshold: confidence,
            };
            let url = client.detect_poses(file, &params).await?;
            let output = io.output.unwrap_or_else(|| "pose-detection.jpg".into());
            save_object(&client, &url, &output).await?;
        }

        Command::Analyze {
            io,
            model,
            confidence,
        } => {
            let file = load_image(&io.input).await?;
            let detect = DetectObjectsParams {
                model,
                confidence_threshold: confidence,
            };
            let count = CountObjectsParams { model };

            let (detected, counted) = tokio::join!(
                client.detect_objects(file.clone(), &detect),
                client.count_objects(file, &count),
            );

            let counts = match counted {
                Ok(counts) => counts,
                Err(e) => {
                    if let Ok(url) = &detected {
                        client.release(url);
                    }
                    return Err(e.into());
                }
            };
            let url = detected?;

            let output = io.output.unwrap_or_else(|| "detected-objects.jpg".into());
            save_object(&client, &url, &output).await?;
            print_counts(&counts);
        }
    }

    Ok(())
}

fn client_config(cli: &Cli) -> ClientConfig {
    apply_overrides(ClientConfig::from_env(), cli)
}

/// Layer command-line flags over the environment-derived config.
fn apply_overrides(mut config: ClientConfig, cli: &Cli) -> ClientConfig {
    if let Some(environment) = cli.environment {
        config = config.with_environment(environment);
    }

    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.clone());
    }

    config
}

fn resize_params(
    width: Option<u32>,
    height: Option<u32>,
    preset: Option<ResizePreset>,
    aspect_ratio_locked: bool,
) -> ResizeParams {
    match preset {
        Some(preset) => ResizeParams::from_preset(preset, aspect_ratio_locked),
        None => {
            let defaults = ResizeParams::default();
            ResizeParams {
                width: width.unwrap_or(defaults.width),
                height: height.unwrap_or(defaults.height),
                aspect_ratio_locked,
            }
        }
    }
}

/// Read an input image, refusing file types the backend does not accept.
async fn load_image(path: &Path) -> Result<ImageFile> {
    if !is_accepted_image(path) {
        bail!(
            "unsupported file type: {} (expected one of: {})",
            path.display(),
            ACCEPTED_EXTENSIONS.join(", ")
        );
    }

    ImageFile::from_path(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

/// Write a binary result to disk and release its object URL.
async fn save_object(client: &ProcessingClient, url: &ObjectUrl, output: &Path) -> Result<PathBuf> {
    let result = match client.objects().get(url) {
        Some(blob) => tokio::fs::write(output, &blob.bytes)
            .await
            .with_context(|| format!("failed to write {}", output.display()))
            .map(|_| output.to_path_buf()),
        None => Err(anyhow!("object URL {} was already released", url)),
    };

    client.release(url);

    if let Ok(path) = &result {
        info!("Saved result to {}", path.display());
    }
    result
}

fn print_counts(counts: &ObjectCounts) {
    if counts.is_empty() {
        println!("No objects detected");
        return;
    }

    for (label, count) in counts.iter() {
        println!("{}: {}", label, count);
    }
    println!("Total: {}", counts.total());
}

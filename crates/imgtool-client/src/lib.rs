//! Client for the Image Toolbox processing backend.
//!
//! This crate provides:
//! - `ProcessingClient`, one method per backend capability
//! - Environment-selected configuration
//! - A three-way error taxonomy (server, network, request)
//! - An explicit object-URL store for binary results
//! - Request metrics via the `metrics` facade

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod objects;
pub mod types;

#[cfg(test)]
mod client_tests;

pub use client::ProcessingClient;
pub use config::{ClientConfig, Environment};
pub use error::{ClientError, ClientResult};
pub use objects::{Blob, ObjectStore, ObjectUrl};
pub use types::{ProcessingResult, UploadRequest};

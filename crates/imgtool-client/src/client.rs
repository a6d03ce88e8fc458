//! Processing backend HTTP client.

use std::future::Future;
use std::time::Instant;

use imgtool_models::{
    Capability, CapabilityParams, CompressParams, CountObjectsParams, DetectObjectsParams,
    ExtractedText, FilterParams, ImageFile, ObjectCounts, PoseParams, QueryParams, ResizeParams,
    ResponseKind, SegmentObjectsParams, SimilarityScore,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info_span, warn, Instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::metrics::record_request;
use crate::objects::{Blob, ObjectStore, ObjectUrl};
use crate::types::{ProcessingResult, UploadRequest};

const OCTET_STREAM: &str = "application/octet-stream";

/// Client for the image processing backend.
///
/// Each call is one stateless POST. Binary replies are parked in the
/// client's [`ObjectStore`] and must be released with
/// [`ProcessingClient::release`] once the caller is done with them.
#[derive(Debug, Clone)]
pub struct ProcessingClient {
    http: Client,
    config: ClientConfig,
    objects: ObjectStore,
}

impl ProcessingClient {
    /// Create a new processing client.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("imgtool-client/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::request(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            objects: ObjectStore::new(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Use an existing object store instead of a private one.
    pub fn with_object_store(mut self, objects: ObjectStore) -> Self {
        self.objects = objects;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    /// Release a binary result. Returns `false` if it was already released.
    pub fn release(&self, url: &ObjectUrl) -> bool {
        self.objects.revoke(url)
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Draw detected objects on the image.
    pub async fn detect_objects(
        &self,
        file: ImageFile,
        params: &DetectObjectsParams,
    ) -> ClientResult<ObjectUrl> {
        self.run_binary(params, file).await
    }

    /// Overlay segmentation masks on the image.
    pub async fn segment_objects(
        &self,
        file: ImageFile,
        params: &SegmentObjectsParams,
    ) -> ClientResult<ObjectUrl> {
        self.run_binary(params, file).await
    }

    pub async fn resize_image(
        &self,
        file: ImageFile,
        params: &ResizeParams,
    ) -> ClientResult<ObjectUrl> {
        self.run_binary(params, file).await
    }

    pub async fn apply_filter(
        &self,
        file: ImageFile,
        params: &FilterParams,
    ) -> ClientResult<ObjectUrl> {
        self.run_binary(params, file).await
    }

    /// OCR the image.
    pub async fn extract_text(&self, file: ImageFile) -> ClientResult<ExtractedText> {
        self.post_json(Capability::ExtractText, vec![file], QueryParams::new())
            .await
    }

    pub async fn compress_image(
        &self,
        file: ImageFile,
        params: &CompressParams,
    ) -> ClientResult<ObjectUrl> {
        self.run_binary(params, file).await
    }

    /// Compare two images. Files are sent positionally as `file1` and
    /// `file2`; the score is not assumed to be symmetric.
    pub async fn compare_images(
        &self,
        first: ImageFile,
        second: ImageFile,
    ) -> ClientResult<SimilarityScore> {
        self.post_json(
            Capability::CompareImages,
            vec![first, second],
            QueryParams::new(),
        )
        .await
    }

    /// Count detected objects per label.
    pub async fn count_objects(
        &self,
        file: ImageFile,
        params: &CountObjectsParams,
    ) -> ClientResult<ObjectCounts> {
        self.post_json(params.capability(), vec![file], params.query_params())
            .await
    }

    /// Draw detected human poses on the image.
    pub async fn detect_poses(
        &self,
        file: ImageFile,
        params: &PoseParams,
    ) -> ClientResult<ObjectUrl> {
        self.run_binary(params, file).await
    }

    /// Run any capability from an untyped request.
    pub async fn submit(&self, request: UploadRequest) -> ClientResult<ProcessingResult> {
        let UploadRequest {
            capability,
            files,
            params,
        } = request;

        match capability.response_kind() {
            ResponseKind::Binary => self
                .post_binary(capability, files, params)
                .await
                .map(ProcessingResult::Binary),
            ResponseKind::Json => self
                .post_json(capability, files, params)
                .await
                .map(ProcessingResult::Structured),
        }
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn run_binary<P: CapabilityParams>(
        &self,
        params: &P,
        file: ImageFile,
    ) -> ClientResult<ObjectUrl> {
        self.post_binary(params.capability(), vec![file], params.query_params())
            .await
    }

    async fn post_binary(
        &self,
        capability: Capability,
        files: Vec<ImageFile>,
        params: QueryParams,
    ) -> ClientResult<ObjectUrl> {
        self.observe(capability, async move {
            let response = self.send(capability, files, &params).await?;

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(OCTET_STREAM)
                .to_string();

            let bytes = response.bytes().await.map_err(ClientError::from_transport)?;
            Ok(self.objects.create(Blob::new(bytes, content_type)))
        })
        .await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        capability: Capability,
        files: Vec<ImageFile>,
        params: QueryParams,
    ) -> ClientResult<T> {
        self.observe(capability, async move {
            let response = self.send(capability, files, &params).await?;
            let status = response.status();
            let body = response.bytes().await.map_err(ClientError::from_transport)?;

            serde_json::from_slice(&body).map_err(|e| ClientError::Server {
                status: status.as_u16(),
                message: format!("malformed response: {}", e),
            })
        })
        .await
    }

    /// Issue the POST and turn non-success statuses into server errors.
    async fn send(
        &self,
        capability: Capability,
        files: Vec<ImageFile>,
        params: &QueryParams,
    ) -> ClientResult<Response> {
        let url = self.endpoint(capability, params)?;
        let form = build_form(capability, files)?;

        debug!("Sending {} request to {}", capability, url);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_response(status, &body));
        }

        Ok(response)
    }

    fn endpoint(&self, capability: Capability, params: &QueryParams) -> ClientResult<Url> {
        let raw = format!("{}{}", self.config.base_url, capability.path());
        let mut url = Url::parse(&raw)
            .map_err(|e| ClientError::request(format!("invalid URL {}: {}", raw, e)))?;

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params.iter() {
                pairs.append_pair(key, &value.to_string());
            }
        }

        Ok(url)
    }

    /// Wrap a request with a tracing span and metrics.
    async fn observe<T, F>(&self, capability: Capability, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let span = info_span!("processing_request", capability = %capability);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => {
                warn!(capability = %capability, error = %e, "Processing request failed");
                e.kind()
            }
        };
        record_request(capability.as_str(), outcome, latency_ms);

        result
    }
}

/// Build the multipart body, mapping files onto the capability's fields.
fn build_form(capability: Capability, files: Vec<ImageFile>) -> ClientResult<Form> {
    let fields = capability.file_fields();
    if files.len() != fields.len() {
        return Err(ClientError::request(format!(
            "{} expects {} file(s), got {}",
            capability,
            fields.len(),
            files.len()
        )));
    }

    let mut form = Form::new();
    for (field, file) in fields.iter().zip(files) {
        let ImageFile {
            file_name,
            content_type,
            bytes,
        } = file;

        let length = bytes.len() as u64;
        let part = Part::stream_with_length(bytes, length)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|e| {
                ClientError::request(format!("invalid content type '{}': {}", content_type, e))
            })?;

        form = form.part(*field, part);
    }

    Ok(form)
}

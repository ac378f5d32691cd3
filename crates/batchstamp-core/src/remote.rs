//! Remote export: hand the whole batch to the processing endpoint.
//!
//! The request is a single multipart POST carrying every file as a
//! repeated part under one field name. The response body, on success, is
//! already the archive the user downloads. Transport lives behind
//! [`ProcessingEndpoint`] so the pipeline runs without a browser.

use crate::gate::ExportGate;
use crate::types::{BatchConfig, BatchError, SelectedFile};

/// One multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    /// Endpoint URL the request is POSTed to.
    pub url: String,
    /// Multipart field name repeated for every part.
    pub field: String,
    /// The files, in collection order.
    pub parts: Vec<SelectedFile>,
}

/// Status and body returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl EndpointResponse {
    /// Returns `true` for a 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// The archive returned by a successful run, ready to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteArchive {
    /// Download file name.
    pub file_name: String,
    /// Zip bytes exactly as the server sent them.
    pub bytes: Vec<u8>,
}

/// Something that can carry a [`RemoteRequest`] to the server.
#[allow(async_fn_in_trait)]
pub trait ProcessingEndpoint {
    /// Send `request` and wait for the complete response.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::RemoteProcessingFailure`] if the request
    /// could not be sent or the body could not be read. A non-2xx status
    /// is *not* an error at this layer.
    async fn process(&self, request: &RemoteRequest) -> Result<EndpointResponse, BatchError>;
}

/// Build the upload for `files` according to `config`.
#[must_use]
pub fn build_request(files: &[SelectedFile], config: &BatchConfig) -> RemoteRequest {
    RemoteRequest {
        url: config.remote_endpoint.clone(),
        field: config.remote_field.clone(),
        parts: files.to_vec(),
    }
}

/// Upload `files` and return the processed archive.
///
/// # Errors
///
/// Returns [`BatchError::NothingToExport`] for an empty batch without
/// contacting the endpoint, or [`BatchError::RemoteProcessingFailure`]
/// for transport errors and non-2xx responses.
#[allow(clippy::future_not_send)]
pub async fn run<E: ProcessingEndpoint>(
    endpoint: &E,
    files: &[SelectedFile],
    config: &BatchConfig,
) -> Result<RemoteArchive, BatchError> {
    if files.is_empty() {
        return Err(BatchError::NothingToExport);
    }
    let request = build_request(files, config);
    tracing::info!(count = files.len(), url = %request.url, "remote export started");

    let response = endpoint
        .process(&request)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "remote export request failed"))?;
    if !response.is_success() {
        tracing::warn!(status = response.status, "remote export rejected");
        return Err(BatchError::RemoteProcessingFailure(format!(
            "server responded with status {}",
            response.status
        )));
    }

    tracing::info!(bytes = response.body.len(), "remote export finished");
    Ok(RemoteArchive {
        file_name: config.remote_archive_name.clone(),
        bytes: response.body,
    })
}

/// [`run`] while holding `gate`.
///
/// # Errors
///
/// Returns [`BatchError::Busy`] if a run is already in progress, or any
/// error from [`run`]. The gate is released either way.
#[allow(clippy::future_not_send)]
pub async fn run_guarded<E: ProcessingEndpoint>(
    gate: &ExportGate,
    endpoint: &E,
    files: &[SelectedFile],
    config: &BatchConfig,
) -> Result<RemoteArchive, BatchError> {
    let _guard = gate.try_acquire()?;
    run(endpoint, files, config).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::{Cell, RefCell};

    use futures::executor::block_on;

    use super::*;

    /// Answers every request with a fixed response and records what it saw.
    struct MockEndpoint {
        reply: Result<EndpointResponse, BatchError>,
        calls: Cell<usize>,
        seen: RefCell<Option<RemoteRequest>>,
        gate_busy_during_call: RefCell<Option<ExportGate>>,
        busy_observed: Cell<bool>,
    }

    impl MockEndpoint {
        fn replying(status: u16, body: &[u8]) -> Self {
            Self::with_reply(Ok(EndpointResponse {
                status,
                body: body.to_vec(),
            }))
        }

        fn with_reply(reply: Result<EndpointResponse, BatchError>) -> Self {
            Self {
                reply,
                calls: Cell::new(0),
                seen: RefCell::new(None),
                gate_busy_during_call: RefCell::new(None),
                busy_observed: Cell::new(false),
            }
        }
    }

    impl ProcessingEndpoint for MockEndpoint {
        async fn process(&self, request: &RemoteRequest) -> Result<EndpointResponse, BatchError> {
            self.calls.set(self.calls.get() + 1);
            *self.seen.borrow_mut() = Some(request.clone());
            if let Some(gate) = self.gate_busy_during_call.borrow().as_ref() {
                self.busy_observed.set(gate.is_busy());
            }
            self.reply.clone()
        }
    }

    fn files() -> Vec<SelectedFile> {
        vec![
            SelectedFile::new("a.jpg", "image/jpeg", 1, vec![1, 2]),
            SelectedFile::new("b.png", "image/png", 2, vec![3]),
        ]
    }

    #[test]
    fn request_carries_every_file_under_one_field() {
        let endpoint = MockEndpoint::replying(200, b"PK");
        let config = BatchConfig::default();
        block_on(run(&endpoint, &files(), &config)).unwrap();

        let seen = endpoint.seen.borrow().clone().unwrap();
        assert_eq!(seen.url, "/process_blur_resize");
        assert_eq!(seen.field, "images");
        let names: Vec<_> = seen.parts.iter().map(SelectedFile::name).collect();
        assert_eq!(names, ["a.jpg", "b.png"]);
    }

    #[test]
    fn success_returns_body_as_archive() {
        let endpoint = MockEndpoint::replying(200, b"PK\x03\x04zip");
        let archive = block_on(run(&endpoint, &files(), &BatchConfig::default())).unwrap();
        assert_eq!(archive.file_name, "imagens_borradas_redimensionadas.zip");
        assert_eq!(archive.bytes, b"PK\x03\x04zip");
    }

    #[test]
    fn server_error_is_remote_failure() {
        let endpoint = MockEndpoint::replying(500, b"boom");
        let err = block_on(run(&endpoint, &files(), &BatchConfig::default())).unwrap_err();
        assert_eq!(
            err,
            BatchError::RemoteProcessingFailure("server responded with status 500".to_owned())
        );
    }

    #[test]
    fn transport_error_passes_through() {
        let endpoint = MockEndpoint::with_reply(Err(BatchError::RemoteProcessingFailure(
            "network down".to_owned(),
        )));
        let err = block_on(run(&endpoint, &files(), &BatchConfig::default())).unwrap_err();
        assert!(matches!(err, BatchError::RemoteProcessingFailure(ref m) if m == "network down"));
    }

    #[test]
    fn empty_batch_never_calls_endpoint() {
        let endpoint = MockEndpoint::replying(200, b"");
        let err = block_on(run(&endpoint, &[], &BatchConfig::default())).unwrap_err();
        assert_eq!(err, BatchError::NothingToExport);
        assert_eq!(endpoint.calls.get(), 0);
    }

    #[test]
    fn gate_is_held_during_call_and_released_after_failure() {
        let gate = ExportGate::new();
        let endpoint = MockEndpoint::replying(500, b"");
        *endpoint.gate_busy_during_call.borrow_mut() = Some(gate.clone());

        let result = block_on(run_guarded(
            &gate,
            &endpoint,
            &files(),
            &BatchConfig::default(),
        ));
        assert!(result.is_err());
        assert!(endpoint.busy_observed.get());
        assert!(!gate.is_busy());
    }

    #[test]
    fn busy_gate_refuses_without_calling_endpoint() {
        let gate = ExportGate::new();
        let _held = gate.try_acquire().unwrap();
        let endpoint = MockEndpoint::replying(200, b"");
        let err = block_on(run_guarded(
            &gate,
            &endpoint,
            &files(),
            &BatchConfig::default(),
        ))
        .unwrap_err();
        assert_eq!(err, BatchError::Busy);
        assert_eq!(endpoint.calls.get(), 0);
    }
}

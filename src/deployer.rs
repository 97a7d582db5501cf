use std::path::Path;

use serde::Serialize;

use crate::config::UploadMode;
use crate::discovery::FileSet;
use crate::payload::{read_upload, BatchPayload, FileUpload};
use crate::response::{is_batch_accepted, is_file_accepted, UpdateResponse};
use crate::transport::{Transport, UPDATE_PATH};

/// Something that happened during a deploy run, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// A request is about to go out. `path` is set in per-file mode.
    Sending { path: Option<String>, files: usize },
    /// Per-file upload accepted.
    Uploaded { path: String, status: u16 },
    ReadFailed { path: String, error: String },
    EncodeFailed { path: Option<String>, error: String },
    /// Server answered with a status outside the accepted set.
    Rejected {
        path: Option<String>,
        status: u16,
        body: String,
    },
    /// No response received (DNS, connect, TLS, timeout).
    TransportFailed { path: Option<String>, error: String },
    /// Batch received by the server.
    BatchAccepted { status: u16, files: usize },
    /// Files the server reported as applied.
    Updated { paths: Vec<String> },
    /// A file the server reported it could not apply.
    ServerFailed { path: String, error: String },
    Rebuilding,
    DevMode,
    /// Batch mode with nothing readable; no request was made.
    NothingToSend,
}

impl DeployEvent {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ReadFailed { .. }
                | Self::EncodeFailed { .. }
                | Self::Rejected { .. }
                | Self::TransportFailed { .. }
                | Self::ServerFailed { .. }
                | Self::NothingToSend
        )
    }
}

/// Everything a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    pub events: Vec<DeployEvent>,
}

impl DeployReport {
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_failure()).count()
    }

    /// Number of HTTP requests attempted.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, DeployEvent::Sending { .. }))
            .count()
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failure_count() == 0
    }

    /// Process exit code: 0 without failures, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.succeeded())
    }
}

/// Uploads a discovered file set through a [`Transport`].
pub struct Deployer<T> {
    transport: T,
    mode: UploadMode,
}

impl<T: Transport> Deployer<T> {
    pub fn new(transport: T, mode: UploadMode) -> Self {
        Self { transport, mode }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Read and upload every file in `files` (relative to `root`).
    ///
    /// `observe` sees each event as soon as it happens; the same events are
    /// collected into the returned report. Read and network failures are
    /// recorded, never returned as errors.
    pub fn deploy(
        &self,
        root: &Path,
        files: &FileSet,
        mut observe: impl FnMut(&DeployEvent),
    ) -> DeployReport {
        let mut report = DeployReport::default();
        let mut emit = |event: DeployEvent| {
            observe(&event);
            report.events.push(event);
        };

        for name in files.non_utf8() {
            emit(DeployEvent::ReadFailed {
                path: name.clone(),
                error: "file path is not valid UTF-8".to_string(),
            });
        }

        match self.mode {
            UploadMode::PerFile => self.deploy_per_file(root, files, &mut emit),
            UploadMode::Batch => self.deploy_batch(root, files, &mut emit),
        }

        report
    }

    fn deploy_per_file(&self, root: &Path, files: &FileSet, emit: &mut dyn FnMut(DeployEvent)) {
        for path in files.iter() {
            let upload = match read_upload(root, path) {
                Ok(u) => u,
                Err(e) => {
                    tracing::debug!("{e}");
                    emit(DeployEvent::ReadFailed {
                        path: path.to_string(),
                        error: e.source.to_string(),
                    });
                    continue;
                }
            };
            self.send_file(&upload, emit);
        }
    }

    fn send_file(&self, upload: &FileUpload, emit: &mut dyn FnMut(DeployEvent)) {
        let path = upload.file_path.clone();
        let body = match encode(upload) {
            Ok(b) => b,
            Err(error) => {
                emit(DeployEvent::EncodeFailed {
                    path: Some(path),
                    error,
                });
                return;
            }
        };

        emit(DeployEvent::Sending {
            path: Some(path.clone()),
            files: 1,
        });

        match self.transport.post_json(UPDATE_PATH, &body) {
            Ok(reply) if is_file_accepted(reply.status) => emit(DeployEvent::Uploaded {
                path,
                status: reply.status,
            }),
            Ok(reply) => {
                tracing::debug!("{path} rejected with HTTP {}", reply.status);
                emit(DeployEvent::Rejected {
                    path: Some(path),
                    status: reply.status,
                    body: reply.body,
                });
            }
            Err(e) => {
                tracing::debug!("{e}");
                emit(DeployEvent::TransportFailed {
                    path: Some(path),
                    error: e.to_string(),
                });
            }
        }
    }

    fn deploy_batch(&self, root: &Path, files: &FileSet, emit: &mut dyn FnMut(DeployEvent)) {
        let mut uploads = Vec::with_capacity(files.len());
        for path in files.iter() {
            match read_upload(root, path) {
                Ok(u) => uploads.push(u),
                Err(e) => {
                    tracing::debug!("{e}");
                    emit(DeployEvent::ReadFailed {
                        path: path.to_string(),
                        error: e.source.to_string(),
                    });
                }
            }
        }

        if uploads.is_empty() {
            emit(DeployEvent::NothingToSend);
            return;
        }

        let count = uploads.len();
        let body = match encode(&BatchPayload { files: uploads }) {
            Ok(b) => b,
            Err(error) => {
                emit(DeployEvent::EncodeFailed { path: None, error });
                return;
            }
        };

        emit(DeployEvent::Sending {
            path: None,
            files: count,
        });

        let reply = match self.transport.post_json(UPDATE_PATH, &body) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("{e}");
                emit(DeployEvent::TransportFailed {
                    path: None,
                    error: e.to_string(),
                });
                return;
            }
        };

        if !is_batch_accepted(reply.status) {
            tracing::debug!("batch rejected with HTTP {}", reply.status);
            emit(DeployEvent::Rejected {
                path: None,
                status: reply.status,
                body: reply.body,
            });
            return;
        }

        emit(DeployEvent::BatchAccepted {
            status: reply.status,
            files: count,
        });

        let result = match UpdateResponse::parse(&reply.body) {
            UpdateResponse::Structured(r) => r,
            UpdateResponse::Unstructured(text) => {
                tracing::debug!("unstructured response: {text}");
                return;
            }
        };

        if !result.updated_files.is_empty() {
            emit(DeployEvent::Updated {
                paths: result.updated_files,
            });
        }
        for failed in result.failed_files {
            emit(DeployEvent::ServerFailed {
                path: failed.file_path,
                error: failed.error,
            });
        }
        if result.rebuilding {
            emit(DeployEvent::Rebuilding);
        }
        if result.dev_mode {
            emit(DeployEvent::DevMode);
        }
    }
}

fn encode<P: Serialize>(payload: &P) -> Result<String, String> {
    serde_json::to_string(payload).map_err(|e| format!("failed to encode payload: {e}"))
}

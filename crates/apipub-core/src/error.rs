//! Error types for control-plane calls and lifecycle reconciliation.

use std::fmt;
use std::path::PathBuf;

/// Errors returned by a [`ControlPlane`](crate::ControlPlane) backend.
#[derive(Debug, thiserror::Error)]
pub enum ControlPlaneError {
    /// The addressed API or stage does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of the missing resource (`api`, `stage`).
        kind: String,
        /// Identifier that was looked up.
        id: String,
    },

    /// The control plane rejected an API definition (errors or warnings).
    #[error("Definition rejected: {message}")]
    Validation {
        /// Message reported by the control plane.
        message: String,
    },

    /// Any other failure talking to the control plane.
    #[error("{operation} failed: {message}")]
    Remote {
        /// Name of the control-plane operation.
        operation: String,
        /// Description of the failure.
        message: String,
    },
}

impl ControlPlaneError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new `Remote` error.
    #[must_use]
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the control plane rejected a definition.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Remote { .. } => ErrorCategory::Remote,
        }
    }
}

/// Errors returned by an [`ObjectStore`](crate::ObjectStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Upload of an object failed.
    #[error("Upload of {bucket}/{key} failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },

    /// Download of an object failed.
    #[error("Download of {bucket}/{key} failed: {message}")]
    Download {
        bucket: String,
        key: String,
        message: String,
    },
}

impl StoreError {
    /// Creates a new `Upload` error.
    #[must_use]
    pub fn upload(
        bucket: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Upload {
            bucket: bucket.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Download` error.
    #[must_use]
    pub fn download(
        bucket: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Download {
            bucket: bucket.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Errors that abort a lifecycle operation.
///
/// Every variant is fatal; the orchestrator reports the message verbatim and
/// owns any retry. "Already in the desired state" conditions never surface
/// here.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The API definition template could not be read.
    #[error("Failed to read API template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The control plane rejected the rendered definition.
    #[error("{operation} rejected the definition for {target}: {message}")]
    Validation {
        operation: &'static str,
        target: String,
        message: String,
    },

    /// A control-plane call failed.
    #[error("{operation} failed for {target}: {source}")]
    Remote {
        operation: &'static str,
        target: String,
        #[source]
        source: ControlPlaneError,
    },

    /// Normalizing, staging or uploading the documentation failed.
    #[error("Failed to publish API documentation to bucket {bucket}: {message}")]
    Publish { bucket: String, message: String },
}

impl ReconcileError {
    /// Wraps a control-plane failure with the operation and target it hit.
    ///
    /// Validation failures keep their own variant so they propagate verbatim.
    pub fn remote(
        operation: &'static str,
        target: impl Into<String>,
        source: ControlPlaneError,
    ) -> Self {
        match source {
            ControlPlaneError::Validation { message } => Self::Validation {
                operation,
                target: target.into(),
                message,
            },
            other => Self::Remote {
                operation,
                target: target.into(),
                source: other,
            },
        }
    }

    /// Creates a new `Publish` error.
    #[must_use]
    pub fn publish(bucket: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Publish {
            bucket: bucket.into(),
            message: message.to_string(),
        }
    }

    /// Returns `true` if the control plane rejected the definition.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Template { .. } => ErrorCategory::Internal,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Remote { source, .. } => source.category(),
            Self::Publish { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of errors for logging and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Remote resource absent.
    NotFound,
    /// Definition rejected by the control plane.
    Validation,
    /// Control plane or object store unreachable or failing.
    Remote,
    /// Local failure (template file, scratch file, normalization).
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Validation => write!(f, "validation"),
            Self::Remote => write!(f, "remote"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ControlPlaneError::not_found("stage", "abc123/demo-stage");
        assert_eq!(err.to_string(), "stage not found: abc123/demo-stage");

        let err = ControlPlaneError::remote("GetApis", "HTTP 503: unavailable");
        assert_eq!(err.to_string(), "GetApis failed: HTTP 503: unavailable");

        let err = StoreError::upload("docs", "swagger.json", "access denied");
        assert_eq!(
            err.to_string(),
            "Upload of docs/swagger.json failed: access denied"
        );
    }

    #[test]
    fn test_validation_propagates_verbatim() {
        let err = ReconcileError::remote(
            "ReimportApi",
            "abc123",
            ControlPlaneError::validation("Unsupported integration type"),
        );
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "ReimportApi rejected the definition for abc123: Unsupported integration type"
        );
    }

    #[test]
    fn test_remote_wraps_context() {
        let err = ReconcileError::remote(
            "DeleteStage",
            "abc123/demo-stage",
            ControlPlaneError::remote("DeleteStage", "HTTP 500: boom"),
        );
        assert!(!err.is_validation());
        assert!(err.to_string().starts_with("DeleteStage failed for abc123/demo-stage"));
        assert!(err.to_string().contains("HTTP 500: boom"));
        assert_eq!(err.category(), ErrorCategory::Remote);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            ControlPlaneError::not_found("api", "x").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            ControlPlaneError::validation("bad").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            ReconcileError::publish("docs", "yaml error").category(),
            ErrorCategory::Internal
        );
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
    }
}

//! Publishing of the rendered API definition as documentation.

use std::path::PathBuf;

use crate::{DynObjectStore, ReconcileResult};
use crate::error::ReconcileError;

/// Object key of the published definition.
pub const DOCUMENTATION_KEY: &str = "swagger.json";

/// Content type of the published definition.
pub const DOCUMENTATION_CONTENT_TYPE: &str = "application/json";

/// Converts rendered YAML definitions to JSON and uploads them.
///
/// The upload overwrites the previous artifact, so a retry after a partial
/// failure needs no cleanup.
#[derive(Clone)]
pub struct DocumentationPublisher {
    store: DynObjectStore,
    scratch_dir: PathBuf,
}

impl DocumentationPublisher {
    pub fn new(store: DynObjectStore, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Normalizes a YAML (or JSON) definition into a JSON document.
    pub fn normalize(rendered: &str) -> Result<String, serde_yaml::Error> {
        let document: serde_json::Value = serde_yaml::from_str(rendered)?;
        Ok(document.to_string())
    }

    /// Normalizes `rendered`, stages it in the scratch directory and uploads
    /// it to `bucket` under [`DOCUMENTATION_KEY`].
    ///
    /// Every call stages into its own file, so concurrent publishes sharing a
    /// scratch directory never see each other's documents. The staged file is
    /// removed once the upload finishes.
    pub async fn publish(&self, bucket: &str, rendered: &str) -> ReconcileResult<()> {
        let json = Self::normalize(rendered)
            .map_err(|e| ReconcileError::publish(bucket, format!("normalization failed: {e}")))?;

        let staged = tempfile::Builder::new()
            .prefix("swagger-")
            .suffix(".json")
            .tempfile_in(&self.scratch_dir)
            .map_err(|e| {
                ReconcileError::publish(
                    bucket,
                    format!("staging in {} failed: {e}", self.scratch_dir.display()),
                )
            })?;
        let path = staged.path();

        tokio::fs::write(path, json.as_bytes()).await.map_err(|e| {
            ReconcileError::publish(bucket, format!("writing {} failed: {e}", path.display()))
        })?;

        let body = tokio::fs::read(path).await.map_err(|e| {
            ReconcileError::publish(bucket, format!("reading {} failed: {e}", path.display()))
        })?;

        self.store
            .put_object(bucket, DOCUMENTATION_KEY, body, DOCUMENTATION_CONTENT_TYPE)
            .await
            .map_err(|e| {
                tracing::error!(bucket = %bucket, error = %e, "Documentation upload failed");
                ReconcileError::publish(bucket, e)
            })?;

        tracing::info!(
            bucket = %bucket,
            key = DOCUMENTATION_KEY,
            backend = self.store.backend_name(),
            "API documentation published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_yaml_to_json() {
        let yaml = "openapi: 3.0.1\ninfo:\n  title: demo\n  version: '1.0'\npaths:\n  /ping:\n    get: {}\n";
        let json = DocumentationPublisher::normalize(yaml).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["openapi"], "3.0.1");
        assert_eq!(value["info"]["title"], "demo");
        assert_eq!(value["info"]["version"], "1.0");
        assert!(value["paths"]["/ping"]["get"].is_object());
    }

    #[tokio::test]
    async fn test_publish_fails_without_scratch_dir() {
        struct NeverCalled;

        #[async_trait::async_trait]
        impl crate::ObjectStore for NeverCalled {
            async fn put_object(
                &self,
                _bucket: &str,
                _key: &str,
                _body: Vec<u8>,
                _content_type: &str,
            ) -> Result<(), crate::StoreError> {
                panic!("upload must not be attempted");
            }

            async fn get_object(
                &self,
                _bucket: &str,
                _key: &str,
            ) -> Result<Option<Vec<u8>>, crate::StoreError> {
                Ok(None)
            }

            fn backend_name(&self) -> &'static str {
                "never"
            }
        }

        let publisher =
            DocumentationPublisher::new(std::sync::Arc::new(NeverCalled), "/nonexistent/scratch");
        let err = publisher
            .publish("docs", "info:\n  title: demo\n")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("docs"));
        assert!(err.to_string().contains("/nonexistent/scratch"));
    }

    #[test]
    fn test_normalize_rejects_malformed_yaml() {
        assert!(DocumentationPublisher::normalize("info: [unterminated").is_err());
    }
}

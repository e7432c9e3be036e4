//! Seams to the remote systems the reconciler drives.

use async_trait::async_trait;

use crate::error::{ControlPlaneError, StoreError};
use crate::types::{ApiPage, RemoteApi, Stage, StageLookup, StageSpec};

/// The control plane that owns API definitions and their stages.
///
/// Implementations must be thread-safe (`Send + Sync`). None of the methods
/// retry; retry policy belongs to the orchestrator.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Lists one page of APIs visible to the caller.
    ///
    /// Pass the `next_token` of the previous page to continue; `None` starts
    /// from the beginning. Order is defined by the control plane.
    async fn list_apis(&self, next_token: Option<&str>) -> Result<ApiPage, ControlPlaneError>;

    /// Creates a new API from a definition document.
    ///
    /// # Errors
    ///
    /// Returns `ControlPlaneError::Validation` if the definition has errors,
    /// or warnings while `fail_on_warnings` is set.
    async fn import_api(
        &self,
        definition: &str,
        fail_on_warnings: bool,
    ) -> Result<RemoteApi, ControlPlaneError>;

    /// Replaces the definition of an existing API in place.
    ///
    /// # Errors
    ///
    /// Returns `ControlPlaneError::NotFound` if `api_id` does not exist and
    /// `ControlPlaneError::Validation` as for [`ControlPlane::import_api`].
    async fn reimport_api(
        &self,
        api_id: &str,
        definition: &str,
        fail_on_warnings: bool,
    ) -> Result<RemoteApi, ControlPlaneError>;

    /// Deletes an API together with all of its stages.
    ///
    /// # Errors
    ///
    /// Returns `ControlPlaneError::NotFound` if `api_id` does not exist.
    async fn delete_api(&self, api_id: &str) -> Result<(), ControlPlaneError>;

    /// Fetches a stage. A missing stage (or missing API) is
    /// [`StageLookup::Absent`], not an error.
    async fn get_stage(
        &self,
        api_id: &str,
        stage_name: &str,
    ) -> Result<StageLookup, ControlPlaneError>;

    /// Creates a stage on an API.
    async fn create_stage(&self, api_id: &str, spec: &StageSpec)
    -> Result<Stage, ControlPlaneError>;

    /// Deletes a stage.
    ///
    /// # Errors
    ///
    /// Returns `ControlPlaneError::NotFound` if the stage does not exist.
    async fn delete_stage(&self, api_id: &str, stage_name: &str) -> Result<(), ControlPlaneError>;

    /// Returns the name of this backend for logging.
    fn backend_name(&self) -> &'static str;
}

/// Durable object storage used for published documentation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes an object, overwriting any existing object under the same key.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Reads an object. A missing object is `Ok(None)`.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Returns the name of this backend for logging.
    fn backend_name(&self) -> &'static str;
}

//! Lifecycle reconciliation.
//!
//! The reconciler holds no state between invocations. Every decision is made
//! by re-querying the control plane, so an invocation may be retried any
//! number of times, from any partially applied state, and converges on the
//! same remote state.
//!
//! Create and Update share one path; the branch is picked by whether an API
//! with the requested name already exists:
//!
//! 1. render the template
//! 2. look the API up by name
//! 3. import a new API, or reimport the existing one in place
//! 4. (existing API only) tear down the stage
//! 5. deploy the stage
//! 6. publish the documentation
//!
//! Delete looks the API up and removes it when present.

use std::path::PathBuf;

use crate::deployment::DeploymentManager;
use crate::error::ReconcileError;
use crate::locator::ResourceLocator;
use crate::publisher::DocumentationPublisher;
use crate::template::{Substitutions, TemplateSource, render};
use crate::types::{
    LifecycleRequest, LifecycleResult, RemoteApi, RequestType, ResourceProperties, ResultData,
};
use crate::{DynControlPlane, DynObjectStore, ReconcileResult};

/// Physical identifier reported for the provisioned API on every event.
pub const PHYSICAL_RESOURCE_ID: &str = "generated-api";

/// Value reported for every output after a Delete.
const DELETED: &str = "Deleted";

/// Imports and reimports always treat definition warnings as errors.
const FAIL_ON_WARNINGS: bool = true;

/// Static settings of a reconciler.
#[derive(Debug, Clone)]
pub struct ReconcilerSettings {
    /// Where the API definition template is read from.
    pub template: TemplateSource,
    /// Region embedded in integration invocation paths.
    pub region: String,
    /// Directory used to stage the documentation before upload.
    pub scratch_dir: PathBuf,
}

impl ReconcilerSettings {
    pub fn new(template_path: impl Into<PathBuf>, region: impl Into<String>) -> Self {
        Self {
            template: TemplateSource::new(template_path),
            region: region.into(),
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }
}

/// Drives the control plane to the state described by a lifecycle request.
#[derive(Clone)]
pub struct LifecycleReconciler {
    control_plane: DynControlPlane,
    locator: ResourceLocator,
    deployments: DeploymentManager,
    publisher: DocumentationPublisher,
    template: TemplateSource,
    region: String,
}

impl LifecycleReconciler {
    pub fn new(
        control_plane: DynControlPlane,
        object_store: DynObjectStore,
        settings: ReconcilerSettings,
    ) -> Self {
        Self {
            locator: ResourceLocator::new(control_plane.clone()),
            deployments: DeploymentManager::new(control_plane.clone()),
            publisher: DocumentationPublisher::new(object_store, settings.scratch_dir),
            control_plane,
            template: settings.template,
            region: settings.region,
        }
    }

    /// Handles one lifecycle event.
    pub async fn handle(
        &self,
        request: &LifecycleRequest,
    ) -> ReconcileResult<LifecycleResult> {
        let props = &request.resource_properties;
        tracing::info!(
            request_type = %request.request_type,
            request_id = ?request.request_id,
            api_name = %props.api_name,
            backend = self.control_plane.backend_name(),
            "Handling lifecycle request"
        );

        let result = match request.request_type {
            RequestType::Create | RequestType::Update => self.apply(props).await,
            RequestType::Delete => self.delete(&props.api_name).await,
        };

        match &result {
            Ok(output) => tracing::info!(
                request_type = %request.request_type,
                api_id = %output.data.api_id,
                "Lifecycle request completed"
            ),
            Err(e) => tracing::error!(
                request_type = %request.request_type,
                api_name = %props.api_name,
                category = %e.category(),
                error = %e,
                "Lifecycle request failed"
            ),
        }
        result
    }

    /// Creates the API or brings the existing one in line with `props`.
    pub async fn apply(
        &self,
        props: &ResourceProperties,
    ) -> ReconcileResult<LifecycleResult> {
        let definition = self.render_definition(props).await?;

        let api = match self.locator.find_by_name(&props.api_name).await? {
            None => {
                tracing::debug!(api_name = %props.api_name, "Creating API");
                let api = self
                    .control_plane
                    .import_api(&definition, FAIL_ON_WARNINGS)
                    .await
                    .map_err(|e| {
                        ReconcileError::remote("ImportApi", props.api_name.as_str(), e)
                    })?;
                tracing::info!(api_id = %api.api_id, api_name = %props.api_name, "API imported");

                self.deploy_stage(&api.api_id, props).await?;
                api
            }
            Some(api_id) => {
                tracing::debug!(api_id = %api_id, api_name = %props.api_name, "Updating API");
                let api = self
                    .control_plane
                    .reimport_api(&api_id, &definition, FAIL_ON_WARNINGS)
                    .await
                    .map_err(|e| ReconcileError::remote("ReimportApi", api_id.as_str(), e))?;
                tracing::info!(api_id = %api.api_id, "API reimported");

                self.deployments
                    .tear_down_stage(&api.api_id, &props.stage_name)
                    .await?;
                self.deploy_stage(&api.api_id, props).await?;
                api
            }
        };

        self.publisher
            .publish(&props.documentation_bucket_name, &definition)
            .await?;

        Ok(provisioned(&api, &props.stage_name))
    }

    /// Deletes the API named `api_name` if it exists.
    pub async fn delete(&self, api_name: &str) -> ReconcileResult<LifecycleResult> {
        match self.locator.find_by_name(api_name).await? {
            Some(api_id) => match self.control_plane.delete_api(&api_id).await {
                Ok(()) => tracing::info!(api_id = %api_id, api_name = %api_name, "API deleted"),
                Err(e) if e.is_not_found() => tracing::info!(
                    api_id = %api_id,
                    "API disappeared before deletion; nothing to delete"
                ),
                Err(e) => return Err(ReconcileError::remote("DeleteApi", api_id, e)),
            },
            None => tracing::info!(api_name = %api_name, "API not found; nothing to delete"),
        }

        Ok(deleted())
    }

    async fn render_definition(
        &self,
        props: &ResourceProperties,
    ) -> ReconcileResult<String> {
        let template = self.template.load().await?;
        let rendered = render(&template, &Substitutions::for_properties(props, &self.region));

        if !rendered.is_complete() {
            tracing::warn!(
                template = %self.template.path().display(),
                missing = ?rendered.missing,
                "Template placeholders without values were left as markers"
            );
        }
        Ok(rendered.text)
    }

    async fn deploy_stage(
        &self,
        api_id: &str,
        props: &ResourceProperties,
    ) -> ReconcileResult<()> {
        self.deployments
            .deploy(
                api_id,
                &props.stage_name,
                &props.access_log_destination,
                props.throttle_burst_limit,
                props.throttle_rate_limit,
            )
            .await
    }
}

fn provisioned(api: &RemoteApi, stage_name: &str) -> LifecycleResult {
    LifecycleResult {
        physical_resource_id: PHYSICAL_RESOURCE_ID.to_string(),
        data: ResultData {
            api_endpoint: api.api_endpoint.clone(),
            api_id: api.api_id.clone(),
            api_stage_name: stage_name.to_string(),
        },
    }
}

fn deleted() -> LifecycleResult {
    LifecycleResult {
        physical_resource_id: PHYSICAL_RESOURCE_ID.to_string(),
        data: ResultData {
            api_endpoint: DELETED.to_string(),
            api_id: DELETED.to_string(),
            api_stage_name: DELETED.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_result_uses_sentinels() {
        let result = deleted();
        assert_eq!(result.physical_resource_id, PHYSICAL_RESOURCE_ID);
        assert_eq!(result.data.api_endpoint, "Deleted");
        assert_eq!(result.data.api_id, "Deleted");
        assert_eq!(result.data.api_stage_name, "Deleted");
    }

    #[test]
    fn test_provisioned_result_echoes_stage() {
        let api = RemoteApi {
            api_id: "abc123".into(),
            name: "demo".into(),
            api_endpoint: "https://abc123.example.com".into(),
        };
        let result = provisioned(&api, "demo-stage");
        assert_eq!(result.data.api_id, "abc123");
        assert_eq!(result.data.api_endpoint, "https://abc123.example.com");
        assert_eq!(result.data.api_stage_name, "demo-stage");
    }
}

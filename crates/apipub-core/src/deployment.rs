//! Stage deployment for provisioned APIs.
//!
//! Stage settings are never patched in place. Changing them means deleting
//! the stage and creating it again, which leaves a window with no active
//! stage. That window is a valid state: re-running the same teardown is a
//! no-op and the following deploy restores the stage.

use crate::{DynControlPlane, ReconcileResult};
use crate::error::ReconcileError;
use crate::types::{AccessLogSettings, RouteSettings, StageLookup, StageSpec};

/// Access log line written for every request served by a stage.
pub const ACCESS_LOG_FORMAT: &str = "$context.identity.sourceIp - - [$context.requestTime] \"$context.httpMethod $context.routeKey $context.protocol\" $context.status $context.responseLength $context.requestId $context.integrationErrorMessage";

/// What [`DeploymentManager::tear_down_stage`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TearDownOutcome {
    /// The stage existed and was deleted.
    Deleted,
    /// There was no stage to delete.
    AlreadyAbsent,
}

/// Creates and removes deployment stages.
#[derive(Clone)]
pub struct DeploymentManager {
    control_plane: DynControlPlane,
}

impl DeploymentManager {
    pub fn new(control_plane: DynControlPlane) -> Self {
        Self { control_plane }
    }

    /// Builds the stage configuration applied by [`Self::deploy`].
    pub fn stage_spec(
        stage_name: &str,
        access_log_destination: &str,
        throttle_burst_limit: i64,
        throttle_rate_limit: i64,
    ) -> StageSpec {
        StageSpec {
            stage_name: stage_name.to_string(),
            auto_deploy: true,
            access_log_settings: AccessLogSettings {
                destination_arn: access_log_destination.to_string(),
                format: ACCESS_LOG_FORMAT.to_string(),
            },
            default_route_settings: RouteSettings {
                detailed_metrics_enabled: true,
                throttling_burst_limit: throttle_burst_limit,
                throttling_rate_limit: throttle_rate_limit,
            },
        }
    }

    /// Creates an auto-deploying stage with access logging and throttling.
    pub async fn deploy(
        &self,
        api_id: &str,
        stage_name: &str,
        access_log_destination: &str,
        throttle_burst_limit: i64,
        throttle_rate_limit: i64,
    ) -> ReconcileResult<()> {
        let spec = Self::stage_spec(
            stage_name,
            access_log_destination,
            throttle_burst_limit,
            throttle_rate_limit,
        );

        self.control_plane
            .create_stage(api_id, &spec)
            .await
            .map_err(|e| {
                ReconcileError::remote("CreateStage", stage_target(api_id, stage_name), e)
            })?;

        tracing::info!(
            api_id = %api_id,
            stage = %stage_name,
            burst = throttle_burst_limit,
            rate = throttle_rate_limit,
            "Stage deployed"
        );
        Ok(())
    }

    /// Deletes a stage if it exists.
    ///
    /// A missing stage is the desired end state and returns normally. Any
    /// other failure while fetching or deleting is fatal.
    pub async fn tear_down_stage(
        &self,
        api_id: &str,
        stage_name: &str,
    ) -> ReconcileResult<TearDownOutcome> {
        let target = stage_target(api_id, stage_name);

        let lookup = self
            .control_plane
            .get_stage(api_id, stage_name)
            .await
            .map_err(|e| ReconcileError::remote("GetStage", target.clone(), e))?;

        if let StageLookup::Absent = lookup {
            tracing::info!(
                api_id = %api_id,
                stage = %stage_name,
                "Stage not found during teardown; nothing to delete"
            );
            return Ok(TearDownOutcome::AlreadyAbsent);
        }

        match self.control_plane.delete_stage(api_id, stage_name).await {
            Ok(()) => {
                tracing::info!(api_id = %api_id, stage = %stage_name, "Stage deleted");
                Ok(TearDownOutcome::Deleted)
            }
            // Removed between the fetch and the delete.
            Err(e) if e.is_not_found() => {
                tracing::info!(
                    api_id = %api_id,
                    stage = %stage_name,
                    "Stage disappeared before deletion; nothing to delete"
                );
                Ok(TearDownOutcome::AlreadyAbsent)
            }
            Err(e) => Err(ReconcileError::remote("DeleteStage", target, e)),
        }
    }
}

fn stage_target(api_id: &str, stage_name: &str) -> String {
    format!("{api_id}/{stage_name}")
}

//! Data model shared by the reconciler, its seams and the service layer.

use serde::{Deserialize, Deserializer, Serialize};

/// An API resource as reported by the control plane.
///
/// `name` is chosen by the caller and is not unique on the control plane;
/// `api_id` and `api_endpoint` are assigned on import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteApi {
    pub api_id: String,
    pub name: String,
    #[serde(default)]
    pub api_endpoint: String,
}

/// One page of the control plane's API listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPage {
    #[serde(default)]
    pub items: Vec<RemoteApi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Where access log lines go and what they look like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogSettings {
    pub destination_arn: String,
    pub format: String,
}

/// Per-route defaults applied to every route of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSettings {
    pub detailed_metrics_enabled: bool,
    pub throttling_burst_limit: i64,
    pub throttling_rate_limit: i64,
}

/// Desired configuration of a deployment stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSpec {
    pub stage_name: String,
    pub auto_deploy: bool,
    pub access_log_settings: AccessLogSettings,
    pub default_route_settings: RouteSettings,
}

/// A deployment stage as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub stage_name: String,
    #[serde(default)]
    pub auto_deploy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_log_settings: Option<AccessLogSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_route_settings: Option<RouteSettings>,
}

impl From<&StageSpec> for Stage {
    fn from(spec: &StageSpec) -> Self {
        Self {
            stage_name: spec.stage_name.clone(),
            auto_deploy: spec.auto_deploy,
            access_log_settings: Some(spec.access_log_settings.clone()),
            default_route_settings: Some(spec.default_route_settings.clone()),
        }
    }
}

/// Outcome of fetching a stage.
///
/// Absence is an ordinary answer here, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageLookup {
    Found(Stage),
    Absent,
}

impl StageLookup {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Kind of lifecycle event sent by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "Create"),
            Self::Update => write!(f, "Update"),
            Self::Delete => write!(f, "Delete"),
        }
    }
}

/// Property bag attached to every lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceProperties {
    /// Destination for stage access logs.
    #[serde(rename = "ApiGatewayAccessLogsLogGroupArn")]
    pub access_log_destination: String,
    /// Function behind the `/ping` route.
    #[serde(rename = "ApiIntegrationPingLambda")]
    pub ping_integration_target: String,
    /// Function behind the `/greeting` route.
    #[serde(rename = "ApiIntegrationGreetingLambda")]
    pub greeting_integration_target: String,
    #[serde(rename = "ApiDocumentationBucketName")]
    pub documentation_bucket_name: String,
    #[serde(
        rename = "ApiDocumentationBucketUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub documentation_bucket_url: Option<String>,
    #[serde(rename = "ApiName")]
    pub api_name: String,
    #[serde(rename = "ApiStageName")]
    pub stage_name: String,
    #[serde(rename = "ThrottlingBurstLimit", deserialize_with = "deserialize_limit")]
    pub throttle_burst_limit: i64,
    #[serde(rename = "ThrottlingRateLimit", deserialize_with = "deserialize_limit")]
    pub throttle_rate_limit: i64,
}

/// The orchestrator stringifies every property, so limits arrive either as
/// numbers or as numeric strings.
fn deserialize_limit<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid limit {s:?}: {e}"))),
    }
}

/// A lifecycle event as delivered by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleRequest {
    pub request_type: RequestType,
    pub resource_properties: ResourceProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
}

/// Output bag consumed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultData {
    pub api_endpoint: String,
    pub api_id: String,
    pub api_stage_name: String,
}

/// Response returned to the orchestrator for every lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleResult {
    pub physical_resource_id: String,
    pub data: ResultData,
}

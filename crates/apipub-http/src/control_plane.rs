use std::time::Duration;

use apipub_core::{
    ApiPage, ControlPlane, ControlPlaneError, RemoteApi, Stage, StageLookup, StageSpec,
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::endpoint::Endpoint;
use crate::error::ClientError;

#[derive(Serialize)]
struct ImportBody<'a> {
    body: &'a str,
}

/// What a request is about, for error mapping.
struct Target<'a> {
    operation: &'static str,
    kind: &'static str,
    id: &'a str,
    /// 400 and 422 mean the definition was rejected.
    validates: bool,
}

/// Control plane reached over its HTTP/JSON API.
pub struct HttpControlPlane {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl HttpControlPlane {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: Endpoint::parse(endpoint)?,
        })
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let mut path = vec!["v2", "apis"];
        path.extend_from_slice(segments);
        self.http
            .request(method, self.endpoint.join(&path))
            .header("Accept", "application/json")
    }

    async fn send(
        &self,
        request: RequestBuilder,
        target: Target<'_>,
    ) -> Result<Response, ControlPlaneError> {
        let resp = request.send().await.map_err(|e| {
            ControlPlaneError::remote(target.operation, format!("Failed to connect: {e}"))
        })?;

        let status = resp.status();
        tracing::debug!(
            operation = target.operation,
            url = %resp.url(),
            status = status.as_u16(),
            "Control plane responded"
        );
        if status.is_success() {
            return Ok(resp);
        }

        let message = error_message(resp).await;
        Err(match status {
            StatusCode::NOT_FOUND => ControlPlaneError::not_found(target.kind, target.id),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY if target.validates => {
                ControlPlaneError::validation(message)
            }
            _ => ControlPlaneError::remote(target.operation, format!("HTTP {status}: {message}")),
        })
    }
}

async fn decode<T: DeserializeOwned>(
    resp: Response,
    operation: &'static str,
) -> Result<T, ControlPlaneError> {
    resp.json::<T>().await.map_err(|e| {
        ControlPlaneError::remote(operation, format!("Failed to parse response JSON: {e}"))
    })
}

/// Extracts the service's `message` field, falling back to the raw body.
async fn error_message(resp: Response) -> String {
    let body = resp.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or(body)
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn list_apis(&self, next_token: Option<&str>) -> Result<ApiPage, ControlPlaneError> {
        let mut request = self.request(Method::GET, &[]);
        if let Some(token) = next_token {
            request = request.query(&[("nextToken", token)]);
        }
        let resp = self
            .send(
                request,
                Target {
                    operation: "GetApis",
                    kind: "apis",
                    id: next_token.unwrap_or_default(),
                    validates: false,
                },
            )
            .await?;
        decode(resp, "GetApis").await
    }

    async fn import_api(
        &self,
        definition: &str,
        fail_on_warnings: bool,
    ) -> Result<RemoteApi, ControlPlaneError> {
        let request = self
            .request(Method::PUT, &[])
            .query(&[("failOnWarnings", fail_on_warnings)])
            .json(&ImportBody { body: definition });
        let resp = self
            .send(
                request,
                Target {
                    operation: "ImportApi",
                    kind: "api",
                    id: "",
                    validates: true,
                },
            )
            .await?;
        decode(resp, "ImportApi").await
    }

    async fn reimport_api(
        &self,
        api_id: &str,
        definition: &str,
        fail_on_warnings: bool,
    ) -> Result<RemoteApi, ControlPlaneError> {
        let request = self
            .request(Method::PUT, &[api_id])
            .query(&[("failOnWarnings", fail_on_warnings)])
            .json(&ImportBody { body: definition });
        let resp = self
            .send(
                request,
                Target {
                    operation: "ReimportApi",
                    kind: "api",
                    id: api_id,
                    validates: true,
                },
            )
            .await?;
        decode(resp, "ReimportApi").await
    }

    async fn delete_api(&self, api_id: &str) -> Result<(), ControlPlaneError> {
        self.send(
            self.request(Method::DELETE, &[api_id]),
            Target {
                operation: "DeleteApi",
                kind: "api",
                id: api_id,
                validates: false,
            },
        )
        .await?;
        Ok(())
    }

    async fn get_stage(
        &self,
        api_id: &str,
        stage_name: &str,
    ) -> Result<StageLookup, ControlPlaneError> {
        let result = self
            .send(
                self.request(Method::GET, &[api_id, "stages", stage_name]),
                Target {
                    operation: "GetStage",
                    kind: "stage",
                    id: stage_name,
                    validates: false,
                },
            )
            .await;

        match result {
            Ok(resp) => Ok(StageLookup::Found(decode(resp, "GetStage").await?)),
            Err(e) if e.is_not_found() => Ok(StageLookup::Absent),
            Err(e) => Err(e),
        }
    }

    async fn create_stage(
        &self,
        api_id: &str,
        spec: &StageSpec,
    ) -> Result<Stage, ControlPlaneError> {
        let resp = self
            .send(
                self.request(Method::POST, &[api_id, "stages"]).json(spec),
                Target {
                    operation: "CreateStage",
                    kind: "api",
                    id: api_id,
                    validates: false,
                },
            )
            .await?;
        decode(resp, "CreateStage").await
    }

    async fn delete_stage(&self, api_id: &str, stage_name: &str) -> Result<(), ControlPlaneError> {
        self.send(
            self.request(Method::DELETE, &[api_id, "stages", stage_name]),
            Target {
                operation: "DeleteStage",
                kind: "stage",
                id: stage_name,
                validates: false,
            },
        )
        .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

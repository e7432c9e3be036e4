use apipub_core::{
    DOCUMENTATION_CONTENT_TYPE, DOCUMENTATION_KEY, LifecycleRequest, LifecycleResult,
};
use apipub_integrations::{RequestEnvelope, ResponseEnvelope};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn lifecycle(
    State(state): State<AppState>,
    payload: Result<Json<LifecycleRequest>, JsonRejection>,
) -> Result<Json<LifecycleResult>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let result = state.reconciler.handle(&request).await?;
    Ok(Json(result))
}

/// Swagger UI page rendering the definition published next to it.
const VIEWER_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>API documentation</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({
        url: window.location.pathname.replace(/\/+$/, "") + "/swagger.json",
        dom_id: "#swagger-ui",
      });
    };
  </script>
</body>
</html>
"##;

pub async fn documentation_viewer() -> Html<&'static str> {
    Html(VIEWER_HTML)
}

/// Serves the definition last published to `bucket`.
pub async fn documentation(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
) -> Result<Response, ApiError> {
    let body = state
        .store
        .get_object(&bucket, DOCUMENTATION_KEY)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No API documentation published to bucket {bucket}"))
        })?;

    Ok(([(header::CONTENT_TYPE, DOCUMENTATION_CONTENT_TYPE)], body).into_response())
}

pub async fn ping(Json(request): Json<RequestEnvelope>) -> Response {
    envelope_response(apipub_integrations::ping(&request))
}

pub async fn greeting(Json(request): Json<RequestEnvelope>) -> Response {
    envelope_response(apipub_integrations::greeting(&request))
}

/// Maps a proxy response envelope onto a plain HTTP response.
fn envelope_response(envelope: ResponseEnvelope) -> Response {
    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::new();
    for (name, value) in &envelope.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
    }

    (status, headers, envelope.body).into_response()
}

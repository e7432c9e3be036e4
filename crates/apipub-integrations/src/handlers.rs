use serde_json::json;

use crate::envelope::{RequestEnvelope, ResponseEnvelope};

/// Query parameter read by [`greeting`].
pub const GREETING_PARAMETER: &str = "greeting";

/// Liveness check. Always answers `{"ping": "Pong"}`.
pub fn ping(_request: &RequestEnvelope) -> ResponseEnvelope {
    ResponseEnvelope::json(200, &json!({ "ping": "Pong" }))
}

/// Greets the name passed in the `greeting` query parameter.
///
/// A request without the parameter is answered with 500 and a single-line
/// error naming the raw path.
pub fn greeting(request: &RequestEnvelope) -> ResponseEnvelope {
    match request.query(GREETING_PARAMETER) {
        Some(name) => ResponseEnvelope::json(200, &json!({ "greeting": format!("Hello {name}") })),
        None => {
            tracing::warn!(raw_path = %request.raw_path, "Greeting requested without a name");
            ResponseEnvelope::json_inline(
                500,
                &json!({
                    "error": format!(
                        "greeting is expected as a query parameter but it was not present in the request; {}",
                        request.raw_path
                    )
                }),
            )
        }
    }
}

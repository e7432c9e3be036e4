/// Errors raised while constructing an HTTP backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid endpoint {endpoint}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Endpoint {0} cannot carry a path")]
    OpaqueEndpoint(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

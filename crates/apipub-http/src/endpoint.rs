use url::Url;

use crate::error::ClientError;

/// Base URL of a remote service.
///
/// Path segments are appended percent-encoded, so identifiers such as stage
/// names never alter the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    pub fn parse(endpoint: &str) -> Result<Self, ClientError> {
        let base = Url::parse(endpoint).map_err(|source| ClientError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::OpaqueEndpoint(endpoint.to_string()));
        }
        Ok(Self { base })
    }

    pub fn as_str(&self) -> &str {
        self.base.as_str()
    }

    /// Appends `segments` to the base path.
    pub fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

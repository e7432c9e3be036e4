//! HTTP backends for apipub.
//!
//! [`HttpControlPlane`] speaks the JSON control-plane surface under `/v2/apis`
//! and [`HttpObjectStore`] uploads objects with `PUT {endpoint}/{bucket}/{key}`.
//! Both map non-2xx responses into the error types from `apipub-core`.

mod control_plane;
mod endpoint;
mod error;
mod object_store;

pub use control_plane::HttpControlPlane;
pub use endpoint::Endpoint;
pub use error::ClientError;
pub use object_store::HttpObjectStore;

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

//! # apipub-core
//!
//! Keeps a managed HTTP API definition in sync with a remote control plane,
//! driven by Create / Update / Delete lifecycle events from an orchestrator.
//!
//! ## Overview
//!
//! The crate is split along the same seams the reconciler walks through:
//!
//! - [`template`] renders `@@KEY@@` placeholders in the API definition
//! - [`locator`] finds an existing remote API by its name
//! - [`deployment`] creates and tears down deployment stages
//! - [`publisher`] uploads the normalized definition as documentation
//! - [`reconciler`] decides which of the above to run for a request
//!
//! Remote systems are reached only through the [`ControlPlane`] and
//! [`ObjectStore`] traits. Implementations live in separate crates
//! (`apipub-http`, `apipub-memory`).
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use apipub_core::{LifecycleReconciler, ReconcilerSettings};
//!
//! let reconciler = LifecycleReconciler::new(
//!     Arc::new(control_plane),
//!     Arc::new(object_store),
//!     ReconcilerSettings::new("templates/api_definition.yaml", "eu-west-1"),
//! );
//!
//! let request: LifecycleRequest = serde_json::from_slice(&body)?;
//! let result = reconciler.handle(&request).await?;
//! ```

pub mod deployment;
mod error;
pub mod locator;
pub mod publisher;
pub mod reconciler;
pub mod template;
mod traits;
mod types;

pub use deployment::{ACCESS_LOG_FORMAT, DeploymentManager, TearDownOutcome};
pub use error::{ControlPlaneError, ErrorCategory, ReconcileError, StoreError};
pub use locator::ResourceLocator;
pub use publisher::{DOCUMENTATION_CONTENT_TYPE, DOCUMENTATION_KEY, DocumentationPublisher};
pub use reconciler::{LifecycleReconciler, PHYSICAL_RESOURCE_ID, ReconcilerSettings};
pub use template::{Rendered, Substitutions, TemplateSource, render};
pub use traits::{ControlPlane, ObjectStore};
pub use types::{
    AccessLogSettings, ApiPage, LifecycleRequest, LifecycleResult, RemoteApi, RequestType,
    ResourceProperties, ResultData, RouteSettings, Stage, StageLookup, StageSpec,
};

/// Shareable control-plane handle.
pub type DynControlPlane = std::sync::Arc<dyn ControlPlane>;

/// Shareable object-store handle.
pub type DynObjectStore = std::sync::Arc<dyn ObjectStore>;

/// Result of a reconciler operation.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

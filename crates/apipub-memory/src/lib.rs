//! In-memory backends for apipub.
//!
//! [`InMemoryControlPlane`] and [`InMemoryObjectStore`] implement the seams
//! from `apipub-core` without any network access. They record every call and
//! accept one-shot fault injection, which makes them the backends of choice
//! for tests and for `apipub invoke --dry-run`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use apipub_memory::{InMemoryControlPlane, InMemoryObjectStore};
//!
//! let control_plane = Arc::new(InMemoryControlPlane::new());
//! control_plane.seed_api("abc123", "demo").await;
//! ```

mod control_plane;
mod object_store;

pub use control_plane::{Call, Fault, InMemoryControlPlane, Operation};
pub use object_store::{InMemoryObjectStore, StoredObject};

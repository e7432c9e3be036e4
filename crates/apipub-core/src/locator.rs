//! Name-based lookup of remote API resources.

use std::collections::HashSet;

use crate::error::{ControlPlaneError, ReconcileError};
use crate::{DynControlPlane, ReconcileResult};

/// Finds remote APIs by their human-readable name.
///
/// The control plane does not enforce unique names. When several APIs share
/// a name the first one in listing order wins; that order is defined by the
/// control plane and is not guaranteed to be stable.
#[derive(Clone)]
pub struct ResourceLocator {
    control_plane: DynControlPlane,
}

impl ResourceLocator {
    pub fn new(control_plane: DynControlPlane) -> Self {
        Self { control_plane }
    }

    /// Returns the id of the first API whose name equals `name` exactly.
    ///
    /// `None` is the expected answer for an API that was never created or was
    /// already deleted. A page token handed out twice is a remote failure.
    pub async fn find_by_name(&self, name: &str) -> ReconcileResult<Option<String>> {
        let mut next_token: Option<String> = None;
        let mut found: Option<String> = None;
        let mut matches = 0usize;
        let mut seen_tokens = HashSet::new();

        loop {
            let page = self
                .control_plane
                .list_apis(next_token.as_deref())
                .await
                .map_err(|e| ReconcileError::remote("GetApis", name, e))?;

            for api in page.items.into_iter().filter(|api| api.name == name) {
                matches += 1;
                if found.is_none() {
                    found = Some(api.api_id);
                }
            }

            match page.next_token {
                Some(token) if !token.is_empty() => {
                    if !seen_tokens.insert(token.clone()) {
                        return Err(ReconcileError::remote(
                            "GetApis",
                            name,
                            ControlPlaneError::remote(
                                "GetApis",
                                format!("page token {token} was returned twice"),
                            ),
                        ));
                    }
                    next_token = Some(token);
                }
                _ => break,
            }
        }

        if matches > 1 {
            tracing::warn!(
                api_name = %name,
                matches,
                api_id = ?found,
                "Multiple APIs share this name; using the first one listed"
            );
        }

        tracing::debug!(api_name = %name, api_id = ?found, "API lookup by name");
        Ok(found)
    }
}

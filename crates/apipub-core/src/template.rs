//! Placeholder substitution for API definition templates.
//!
//! Templates are trusted text containing `@@KEY@@` tokens. Each token is
//! replaced by the value mapped to `KEY`; a key with no value becomes the
//! visible marker `<KEY not found>` so that misconfiguration shows up in the
//! deployed definition instead of aborting the render.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::ReconcileError;
use crate::ReconcileResult;
use crate::types::ResourceProperties;

/// Key substituted with the API name.
pub const API_NAME_KEY: &str = "API_NAME";
/// Key substituted with the invocation path of the ping integration.
pub const PING_INTEGRATION_KEY: &str = "API_INTEGRATION_PING_LAMBDA";
/// Key substituted with the invocation path of the greeting integration.
pub const GREETING_INTEGRATION_KEY: &str = "API_INTEGRATION_GREETING_LAMBDA";

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@@(.*?)@@").expect("Invalid placeholder regex"));

/// Values available to a render, keyed by placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    values: HashMap<String, String>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Builds the substitutions for a lifecycle request.
    ///
    /// Integration targets are embedded into region-qualified invocation
    /// paths; the raw identifiers are never substituted directly.
    pub fn for_properties(props: &ResourceProperties, region: &str) -> Self {
        Self::new()
            .with(API_NAME_KEY, props.api_name.as_str())
            .with(
                PING_INTEGRATION_KEY,
                integration_uri(region, &props.ping_integration_target),
            )
            .with(
                GREETING_INTEGRATION_KEY,
                integration_uri(region, &props.greeting_integration_target),
            )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Substitutions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Invocation path the control plane uses to call a function integration.
pub fn integration_uri(region: &str, target: &str) -> String {
    format!("arn:aws:apigateway:{region}:lambda:path/2015-03-31/functions/{target}/invocations")
}

/// Output of [`render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Placeholder keys that had no value, in order of first appearance.
    pub missing: Vec<String>,
}

impl Rendered {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Marker written in place of a placeholder whose key has no value.
pub fn missing_marker(key: &str) -> String {
    format!("<{key} not found>")
}

/// Replaces every `@@KEY@@` token in `template`.
pub fn render(template: &str, substitutions: &Substitutions) -> Rendered {
    let mut missing: Vec<String> = Vec::new();

    let text = PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures<'_>| {
            let key = &caps[1];
            match substitutions.get(key) {
                Some(value) => value.to_string(),
                None => {
                    if !missing.iter().any(|k| k == key) {
                        missing.push(key.to_string());
                    }
                    missing_marker(key)
                }
            }
        })
        .into_owned();

    Rendered { text, missing }
}

/// Location of the API definition template on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    path: PathBuf,
}

impl TemplateSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the template. Called once per invocation; never cached.
    pub async fn load(&self) -> ReconcileResult<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ReconcileError::Template {
                path: self.path.clone(),
                source,
            })
    }
}

use std::collections::{BTreeMap, HashMap};
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;

/// Proxy request as delivered to an integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default)]
    pub raw_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl RequestEnvelope {
    pub fn new(raw_path: impl Into<String>) -> Self {
        Self {
            raw_path: raw_path.into(),
            query_string_parameters: None,
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }
}

/// Proxy response returned by an integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl ResponseEnvelope {
    /// JSON response with `value` pretty-printed as the body.
    pub fn json(status_code: u16, value: &serde_json::Value) -> Self {
        let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::with_json_body(status_code, body)
    }

    /// JSON response with `value` on a single line, `{"key": "value"}`.
    pub fn json_inline(status_code: u16, value: &serde_json::Value) -> Self {
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, InlineFormatter);
        let body = match value.serialize(&mut serializer) {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => value.to_string(),
        };
        Self::with_json_body(status_code, body)
    }

    fn with_json_body(status_code: u16, body: String) -> Self {
        Self {
            status_code,
            body,
            headers: BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]),
        }
    }
}

/// Single-line layout with a space after every `:` and `,`.
struct InlineFormatter;

impl Formatter for InlineFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        separate(writer, first)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        separate(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn separate<W: ?Sized + io::Write>(writer: &mut W, first: bool) -> io::Result<()> {
    if first {
        Ok(())
    } else {
        writer.write_all(b", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_proxy_event() {
        let request: RequestEnvelope = serde_json::from_str(
            r#"{"rawPath": "/greeting", "queryStringParameters": {"greeting": "World"}, "version": "2.0"}"#,
        )
        .unwrap();

        assert_eq!(request.raw_path, "/greeting");
        assert_eq!(request.query("greeting"), Some("World"));
        assert_eq!(request.query("other"), None);
    }

    #[test]
    fn test_request_without_query_parameters() {
        let request: RequestEnvelope = serde_json::from_str(r#"{"rawPath": "/ping"}"#).unwrap();
        assert!(request.query_string_parameters.is_none());
        assert_eq!(request.query("greeting"), None);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = ResponseEnvelope::json(200, &serde_json::json!({"ok": true}));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["headers"]["Content-Type"], "application/json");
        assert_eq!(value["body"], "{\n  \"ok\": true\n}");
    }

    #[test]
    fn test_inline_body_spacing() {
        let response =
            ResponseEnvelope::json_inline(500, &serde_json::json!({"error": ["boom", 1]}));

        assert_eq!(response.body, r#"{"error": ["boom", 1]}"#);
        assert_eq!(
            response.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }
}

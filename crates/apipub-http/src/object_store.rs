use std::time::Duration;

use apipub_core::{ObjectStore, StoreError};
use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::error::ClientError;

/// Object store addressed as `{endpoint}/{bucket}/{key}`.
pub struct HttpObjectStore {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: Endpoint::parse(endpoint)?,
        })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let url = self.endpoint.join(&[bucket, key]);
        let resp = self
            .http
            .put(url)
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::upload(bucket, key, format!("Failed to connect: {e}")))?;

        let status = resp.status();
        tracing::debug!(bucket, key, status = status.as_u16(), "Object store responded");
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::upload(bucket, key, format!("HTTP {status}: {body}")));
        }
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let url = self.endpoint.join(&[bucket, key]);
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::download(bucket, key, format!("Failed to connect: {e}")))?;

        let status = resp.status();
        tracing::debug!(bucket, key, status = status.as_u16(), "Object store responded");
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::download(bucket, key, format!("HTTP {status}: {body}")));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| StoreError::download(bucket, key, format!("Failed to read body: {e}")))?;
        Ok(Some(body.to_vec()))
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

use std::collections::{HashMap, VecDeque};

use apipub_core::{ObjectStore, StoreError};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// An object held by [`InMemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

impl StoredObject {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Default)]
struct State {
    objects: HashMap<(String, String), StoredObject>,
    puts: usize,
    faults: VecDeque<String>,
}

/// Object store kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    state: RwLock<State>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next upload fail with `message`.
    pub async fn fail_next_put(&self, message: impl Into<String>) {
        self.state.write().await.faults.push_back(message.into());
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.state
            .read()
            .await
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Number of upload attempts, failed ones included.
    pub async fn put_count(&self) -> usize {
        self.state.read().await.puts
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.puts += 1;
        if let Some(message) = state.faults.pop_front() {
            return Err(StoreError::upload(bucket, key, message));
        }

        state.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.object(bucket, key).await.map(|o| o.body))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

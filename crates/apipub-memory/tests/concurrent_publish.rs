//! Documentation publishes running at the same time against one scratch dir.

use std::sync::Arc;

use apipub_core::{DOCUMENTATION_KEY, DocumentationPublisher};
use apipub_memory::InMemoryObjectStore;

const ROUNDS: usize = 200;

fn definition(title: &str) -> String {
    // Large enough that a write and a read of the same file can interleave.
    let mut yaml =
        format!("openapi: \"3.0.1\"\ninfo:\n  title: {title}\n  version: \"1.0\"\npaths:\n");
    for i in 0..200 {
        yaml.push_str(&format!(
            "  /{title}/{i}:\n    get:\n      summary: {title} route {i}\n"
        ));
    }
    yaml
}

async fn published_title(store: &InMemoryObjectStore, bucket: &str) -> Option<String> {
    let object = store.object(bucket, DOCUMENTATION_KEY).await?;
    let document: serde_json::Value = serde_json::from_slice(&object.body).ok()?;
    document["info"]["title"].as_str().map(str::to_string)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_publishes_keep_buckets_apart() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let store = Arc::new(InMemoryObjectStore::new());
    let publisher = DocumentationPublisher::new(store.clone(), dir.path());

    let alpha = Arc::new(definition("alpha"));
    let beta = Arc::new(definition("beta"));

    for round in 0..ROUNDS {
        let a = {
            let publisher = publisher.clone();
            let alpha = alpha.clone();
            tokio::spawn(async move { publisher.publish("bucket-a", &alpha).await })
        };
        let b = {
            let publisher = publisher.clone();
            let beta = beta.clone();
            tokio::spawn(async move { publisher.publish("bucket-b", &beta).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(
            published_title(&store, "bucket-a").await.as_deref(),
            Some("alpha"),
            "round {round}"
        );
        assert_eq!(
            published_title(&store, "bucket-b").await.as_deref(),
            Some("beta"),
            "round {round}"
        );
    }

    assert_eq!(store.put_count().await, ROUNDS * 2);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

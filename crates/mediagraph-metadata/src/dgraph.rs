//! Dgraph HTTP client.
//!
//! Mutations go to `/mutate?commitNow=true` as `application/rdf`, queries to
//! `/query?ro=true` as `application/dql`. Dgraph reports failures in an
//! `errors` array, sometimes with a 200 status, so both are checked.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use mediagraph_core::NodeId;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::mutation::Mutation;
use crate::query::{Deletion, Query};
use crate::traits::{BlankNodeIds, MetadataError, MetadataResult, MetadataStore};

#[derive(Debug, Deserialize)]
struct DgraphResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<DgraphErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct DgraphErrorEntry {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct MutationData {
    #[serde(default)]
    uids: std::collections::HashMap<String, String>,
}

/// Metadata store backed by a Dgraph alpha.
#[derive(Clone, Debug)]
pub struct DgraphStore {
    client: Client,
    base_url: String,
}

impl DgraphStore {
    pub fn new(base_url: &str, timeout: Duration) -> MetadataResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MetadataError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send(
        &self,
        path: &str,
        content_type: &'static str,
        body: String,
        fail: fn(String) -> MetadataError,
    ) -> MetadataResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| fail(e.to_string()))?;

        let parsed: DgraphResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(fail(format!("Dgraph returned status {}: {}", status, text)))
            }
            Err(e) => return Err(fail(format!("Unreadable Dgraph response: {}", e))),
        };

        if !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(fail(messages.join("; ")));
        }
        if !status.is_success() {
            return Err(fail(format!("Dgraph returned status {}", status)));
        }

        parsed
            .data
            .ok_or_else(|| fail("Dgraph response without data".to_string()))
    }
}

fn parse_assigned_uids(mutation: &Mutation, data: Value) -> Result<BlankNodeIds, String> {
    let data: MutationData = serde_json::from_value(data).map_err(|e| e.to_string())?;

    let mut ids = BlankNodeIds::new();
    for label in mutation.blank_subjects() {
        let raw = data
            .uids
            .get(label)
            .ok_or_else(|| format!("No uid returned for _:{}", label))?;
        let id: NodeId = raw.parse().map_err(|_| format!("Malformed uid: {}", raw))?;
        ids.insert(label, id);
    }
    Ok(ids)
}

#[async_trait]
impl MetadataStore for DgraphStore {
    async fn mutate(&self, mutation: &Mutation) -> MetadataResult<BlankNodeIds> {
        let start = Instant::now();
        let body = format!("{{ set {{\n{}}} }}", mutation.to_rdf());

        let data = self
            .send(
                "/mutate?commitNow=true",
                "application/rdf",
                body,
                MetadataError::WriteFailed,
            )
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    quads = mutation.quads().len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Dgraph mutation failed"
                );
            })?;

        // The transaction is committed from here on. A reply we cannot map
        // back to blank nodes leaves nodes nobody can compensate.
        let ids = parse_assigned_uids(mutation, data).map_err(|reason| {
            tracing::error!(
                error = %reason,
                orphan = "metadata_record",
                quads = mutation.quads().len(),
                "Dgraph committed a mutation but its uids could not be read"
            );
            MetadataError::WriteFailed(reason)
        })?;

        tracing::info!(
            quads = mutation.quads().len(),
            nodes = mutation.blank_subjects().len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Dgraph mutation committed"
        );

        Ok(ids)
    }

    async fn query(&self, query: &Query) -> MetadataResult<Value> {
        let start = Instant::now();
        let data = self
            .send(
                "/query?ro=true",
                "application/dql",
                query.to_dql(),
                MetadataError::ReadFailed,
            )
            .await?;

        tracing::debug!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Dgraph query completed"
        );

        Ok(data)
    }

    async fn delete(&self, deletion: &Deletion) -> MetadataResult<()> {
        let start = Instant::now();
        self.send(
            "/mutate?commitNow=true",
            "application/rdf",
            deletion.to_rdf(),
            MetadataError::DeleteFailed,
        )
        .await
        .inspect_err(|e| {
            tracing::error!(
                error = %e,
                record_id = %deletion.target(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Dgraph delete failed"
            );
        })?;

        tracing::info!(
            record_id = %deletion.target(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Dgraph delete committed"
        );

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "dgraph"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::MediaRecordDraft;
    use axum::extract::{RawQuery, State};
    use axum::routing::post;
    use axum::{Json, Router};
    use chrono::Utc;
    use mediagraph_core::{BlobLocation, VariantKind};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorded {
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    async fn spawn_fake(reply: Value) -> (String, Recorded) {
        let recorded = Recorded::default();

        async fn handle(
            State((recorded, reply)): State<(Recorded, Value)>,
            RawQuery(query): RawQuery,
            body: String,
        ) -> Json<Value> {
            recorded
                .calls
                .lock()
                .unwrap()
                .push((query.unwrap_or_default(), body));
            Json(reply)
        }

        let app = Router::new()
            .route("/mutate", post(handle))
            .route("/query", post(handle))
            .with_state((recorded.clone(), reply));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), recorded)
    }

    fn draft() -> MediaRecordDraft {
        MediaRecordDraft::new("title", Utc::now())
            .with_variant(VariantKind::Original, BlobLocation::new("test", "a.png"))
    }

    #[tokio::test]
    async fn test_mutate_returns_blank_node_ids() {
        let (url, recorded) = spawn_fake(json!({
            "data": {"code": "Success", "uids": {"image": "0x4e21", "size": "0x4e22"}}
        }))
        .await;
        let store = DgraphStore::new(&url, Duration::from_secs(5)).unwrap();

        let draft = draft();
        let ids = store.mutate(&draft.to_mutation()).await.unwrap();
        let created = draft.resolve(&ids).unwrap();
        assert_eq!(created.record_id.as_str(), "0x4e21");

        let calls = recorded.calls.lock().unwrap();
        assert_eq!(calls[0].0, "commitNow=true");
        assert!(calls[0].1.starts_with("{ set {"));
        assert!(calls[0].1.contains("_:image <dgraph.type> \"Image\" ."));
    }

    #[tokio::test]
    async fn test_errors_array_fails_the_call() {
        let (url, _) = spawn_fake(json!({
            "errors": [{"message": "predicate type mismatch"}],
            "data": null
        }))
        .await;
        let store = DgraphStore::new(&url, Duration::from_secs(5)).unwrap();

        let err = store.mutate(&draft().to_mutation()).await.unwrap_err();
        assert!(matches!(err, MetadataError::WriteFailed(ref m) if m.contains("type mismatch")));

        let err = store
            .delete(&Deletion::Node(NodeId::from_u64(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::DeleteFailed(_)));
    }

    #[tokio::test]
    async fn test_query_is_read_only() {
        let (url, recorded) = spawn_fake(json!({"data": {"dd": []}})).await;
        let store = DgraphStore::new(&url, Duration::from_secs(5)).unwrap();

        let tree = store
            .query(&Query::RecordVariants(NodeId::from_u64(0xdead)))
            .await
            .unwrap();
        assert_eq!(tree, json!({"dd": []}));
        assert_eq!(recorded.calls.lock().unwrap()[0].0, "ro=true");
    }

    #[tokio::test]
    async fn test_committed_mutation_without_uids_is_a_write_failure() {
        let (url, _) = spawn_fake(json!({"data": {"code": "Success", "uids": {}}})).await;
        let store = DgraphStore::new(&url, Duration::from_secs(5)).unwrap();

        let err = store.mutate(&draft().to_mutation()).await.unwrap_err();
        assert!(matches!(err, MetadataError::WriteFailed(ref m) if m.contains("_:image")));

        let (url, _) = spawn_fake(json!({
            "data": {"code": "Success", "uids": {"image": "not-a-uid", "size": "0x2"}}
        }))
        .await;
        let store = DgraphStore::new(&url, Duration::from_secs(5)).unwrap();
        let err = store.mutate(&draft().to_mutation()).await.unwrap_err();
        assert!(matches!(err, MetadataError::WriteFailed(ref m) if m.contains("not-a-uid")));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_a_write_failure() {
        let store = DgraphStore::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        let err = store.mutate(&draft().to_mutation()).await.unwrap_err();
        assert!(matches!(err, MetadataError::WriteFailed(_)));
    }
}

//! Collaborator wrappers that count calls and inject failures.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use mediagraph_core::{BlobLocation, StorageBackend};
use mediagraph_metadata::{
    BlankNodeIds, Deletion, MemoryGraph, MetadataError, MetadataResult, MetadataStore, Mutation,
    Query,
};
use mediagraph_services::{NotificationClient, NotificationError, ProcessingRequest};
use mediagraph_storage::{
    BlobHandle, BlobStat, ByteStream, ObjectStorage, Storage, StorageError, StorageResult,
};

/// In-memory object store with per-operation counters.
pub struct CountingStorage {
    inner: ObjectStorage,
    pub fail_put: AtomicBool,
    /// When set, `put` signals `put_started` and waits for `release_put`.
    pub gate_put: AtomicBool,
    pub put_started: Notify,
    pub release_put: Notify,
    puts: AtomicUsize,
    stats: AtomicUsize,
    removes: AtomicUsize,
}

impl CountingStorage {
    pub fn new() -> Self {
        Self {
            inner: ObjectStorage::in_memory(),
            fail_put: AtomicBool::new(false),
            gate_put: AtomicBool::new(false),
            put_started: Notify::new(),
            release_put: Notify::new(),
            puts: AtomicUsize::new(0),
            stats: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
        }
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }

    /// Every call made through the `Storage` trait.
    pub fn calls(&self) -> usize {
        self.puts() + self.stats.load(Ordering::SeqCst) + self.removes()
    }

    /// Look at a blob without counting the call.
    pub async fn peek(&self, location: &BlobLocation) -> StorageResult<BlobStat> {
        self.inner.stat(location).await
    }
}

#[async_trait]
impl Storage for CountingStorage {
    async fn put(
        &self,
        location: &BlobLocation,
        data: ByteStream,
        size: Option<u64>,
        content_type: &str,
        tags: &[(String, String)],
    ) -> StorageResult<BlobHandle> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.gate_put.load(Ordering::SeqCst) {
            self.put_started.notify_one();
            self.release_put.notified().await;
        }
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("injected failure".to_string()));
        }
        self.inner.put(location, data, size, content_type, tags).await
    }

    async fn stat(&self, location: &BlobLocation) -> StorageResult<BlobStat> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        self.inner.stat(location).await
    }

    async fn remove(&self, location: &BlobLocation) -> StorageResult<()> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(location).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

/// In-memory graph with per-operation counters.
pub struct CountingMetadata {
    pub graph: MemoryGraph,
    pub fail_mutate: AtomicBool,
    pub fail_delete: AtomicBool,
    mutations: AtomicUsize,
    deletions: AtomicUsize,
}

impl CountingMetadata {
    pub fn new() -> Self {
        Self {
            graph: MemoryGraph::new(),
            fail_mutate: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            mutations: AtomicUsize::new(0),
            deletions: AtomicUsize::new(0),
        }
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub fn deletions(&self) -> usize {
        self.deletions.load(Ordering::SeqCst)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

#[async_trait]
impl MetadataStore for CountingMetadata {
    async fn mutate(&self, mutation: &Mutation) -> MetadataResult<BlankNodeIds> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        if self.fail_mutate.load(Ordering::SeqCst) {
            return Err(MetadataError::WriteFailed("injected failure".to_string()));
        }
        self.graph.mutate(mutation).await
    }

    async fn query(&self, query: &Query) -> MetadataResult<serde_json::Value> {
        self.graph.query(query).await
    }

    async fn delete(&self, deletion: &Deletion) -> MetadataResult<()> {
        self.deletions.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(MetadataError::DeleteFailed("injected failure".to_string()));
        }
        self.graph.delete(deletion).await
    }

    fn backend_name(&self) -> &'static str {
        "counting-memory"
    }
}

/// How the stub processor answers a notification.
#[derive(Debug, Clone, Copy)]
pub enum NotifyReply {
    Status(u16),
    Timeout,
    Unreachable,
}

/// Processing service stand-in that records what it was sent.
pub struct StubNotifier {
    pub reachable: bool,
    pub reply: NotifyReply,
    probes: AtomicUsize,
    requests: Mutex<Vec<ProcessingRequest>>,
}

impl StubNotifier {
    pub fn new(reachable: bool, reply: NotifyReply) -> Arc<Self> {
        Arc::new(Self {
            reachable,
            reply,
            probes: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ProcessingRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationClient for StubNotifier {
    async fn probe(&self, _timeout: Duration) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.reachable
    }

    async fn notify(
        &self,
        request: &ProcessingRequest,
        timeout: Duration,
    ) -> Result<u16, NotificationError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.reply {
            NotifyReply::Status(status) => Ok(status),
            NotifyReply::Timeout => Err(NotificationError::Timeout(timeout)),
            NotifyReply::Unreachable => {
                Err(NotificationError::Transport("connection refused".to_string()))
            }
        }
    }
}

//! Test helpers: build AppState and router for integration tests.
//!
//! Every app runs on in-memory stores wrapped in counting doubles, so tests
//! can assert on the exact calls a request made.

#![allow(dead_code)]

pub mod doubles;
pub mod fixtures;

use std::sync::Arc;

use axum_test::TestServer;
use doubles::{CountingMetadata, CountingStorage, StubNotifier};
use mediagraph_api::setup::{routes, services};
use mediagraph_core::{BlobLocation, Config, MediaRecord};
use mediagraph_services::NotificationClient;
use serde_json::Value;

pub const TEST_BUCKET: &str = "test";

/// Test application: server plus handles on its collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<CountingStorage>,
    pub metadata: Arc<CountingMetadata>,
    pub notifier: Option<Arc<StubNotifier>>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Upload through HTTP and return the created record id.
    pub async fn upload(&self, title: &str, data: Vec<u8>, content_type: &str) -> String {
        let response = self
            .server
            .post("/")
            .multipart(fixtures::upload_form(title, data, content_type))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["id"].as_str().expect("id in upload response").to_string()
    }

    pub async fn record(&self, id: &str) -> MediaRecord {
        let response = self.server.get(&format!("/{}", id)).await;
        response.assert_status_ok();
        response.json::<MediaRecord>()
    }
}

fn test_config(notify: bool) -> Config {
    Config::from_lookup(|key| {
        let value = match key {
            "STORAGE_BACKEND" | "METADATA_BACKEND" => "memory",
            "STORAGE_BUCKET" => TEST_BUCKET,
            "SHARD_PREFIX_LENGTH" => "7",
            "NOTIFY_URL" if notify => "http://processor.test/",
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("test configuration")
}

/// App without a processing service.
pub fn setup_test_app() -> TestApp {
    build_app(None)
}

/// App whose uploads probe and notify `notifier`.
pub fn setup_test_app_with_notifier(notifier: Arc<StubNotifier>) -> TestApp {
    build_app(Some(notifier))
}

fn build_app(notifier: Option<Arc<StubNotifier>>) -> TestApp {
    let config = test_config(notifier.is_some());
    config.validate().expect("valid test configuration");

    let storage = Arc::new(CountingStorage::new());
    let metadata = Arc::new(CountingMetadata::new());
    let client = notifier
        .clone()
        .map(|stub| stub as Arc<dyn NotificationClient>);

    let state = services::build_state(&config, storage.clone(), metadata.clone(), client);
    let app = routes::setup_routes(&config, state);
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        metadata,
        notifier,
    }
}

/// Location of the only variant of `record`.
pub fn only_location(record: &MediaRecord) -> BlobLocation {
    assert_eq!(record.variants.len(), 1, "expected exactly one variant");
    record.variants[0].location.clone()
}

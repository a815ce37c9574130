//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p khmedia-api`.

pub mod fixtures;

use axum_test::TestServer;
use khmedia_api::setup::storage::Stores;
use khmedia_api::setup::{build_state, routes};
use khmedia_api::AppState;
use khmedia_core::Config;
use khmedia_services::testing::MockRemoteStore;
use khmedia_services::{LocalStorage, RemoteStore};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";
pub const ADMIN_PREFIX: &str = "/test-admin/";
/// Address the guard sees for admin requests (static allow-list entry).
pub const LOCAL_IP: &str = "127.0.0.1";

/// Admin path under the test prefix.
pub fn admin_path(path: &str) -> String {
    format!("{}{}", ADMIN_PREFIX, path.trim_start_matches('/'))
}

pub fn bearer() -> String {
    format!("Bearer {}", TEST_ADMIN_TOKEN)
}

/// Test application: server, state and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub remote: Option<Arc<MockRemoteStore>>,
    pub local: LocalStorage,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn create_test_config(media_root: &str, priority: &str) -> Config {
    let vars: HashMap<String, String> = [
        ("ENVIRONMENT", "test"),
        ("DEBUG", "false"),
        ("ADMIN_URL", "test-admin"),
        ("ADMIN_API_TOKEN", TEST_ADMIN_TOKEN),
        ("ADMIN_MAX_ATTEMPTS", "5"),
        ("TRUSTED_PROXY_COUNT", "1"),
        ("MEDIA_ROOT", media_root),
        ("MEDIA_URL", "/media/"),
        ("STORAGE_PRIORITY", priority),
        ("MAX_UPLOAD_SIZE_BYTES", "5242880"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Config::from_map(&vars).expect("Failed to build test config")
}

/// Setup a test app backed by a temp media root and, optionally, the
/// in-memory remote store.
pub async fn setup_test_app(with_remote: bool, priority: &str) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let media_root = temp_dir.path().to_string_lossy().to_string();
    let config = create_test_config(&media_root, priority);

    let local = LocalStorage::new(temp_dir.path(), "/media/")
        .await
        .expect("Failed to create local storage");
    let remote = with_remote.then(|| Arc::new(MockRemoteStore::new("https://abc.supabase.co")));

    let stores = Stores {
        local: local.clone(),
        remote: remote.clone().map(|r| r as Arc<dyn RemoteStore>),
    };
    let state = build_state(config, stores);
    let app = routes::setup_routes(state.clone()).expect("Failed to setup routes");
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        state,
        remote,
        local,
        _temp_dir: temp_dir,
    }
}

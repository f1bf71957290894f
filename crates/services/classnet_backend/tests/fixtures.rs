//! Test fixtures for end-to-end scenarios against the assembled router

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use classnet_backend::{build_router, AppState};
use classnet_config::{
    AdminAccessToken, AdminConfig, AgentConfig, AppConfig, CatalogConfig, DatabaseConfig,
    ServerConfig, TokensConfig,
};
use classnet_tokens::secrets::hash_token;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const REGISTRATION_TOKEN: &str = "registration-token-for-tests";
pub const SHARED_SECRET: &str = "rotation-secret-for-tests";
pub const ADMIN_TOKEN: &str = "admin-token-for-tests";
pub const PUBLIC_URL: &str = "https://policy.school.example";
pub const INSTALLER: &str = "Install-Agent.ps1";

const CATALOG: &str = r#"{
  "classrooms": [
    { "id": "room-1", "name": "Room1", "defaultGroupId": "base" },
    { "id": "class-x", "name": "ClassX", "defaultGroupId": "base" },
    { "id": "class-y", "name": "ClassY", "activeGroupId": "exam", "defaultGroupId": "base" }
  ],
  "groups": [
    {
      "id": "base",
      "name": "base",
      "rules": [
        { "kind": "whitelist", "value": "https://www.wikipedia.org/" },
        { "kind": "whitelist", "value": "example.org" },
        { "kind": "blocked_subdomain", "value": "ads.example.org" },
        { "kind": "blocked_path", "value": "example.org/games" }
      ]
    },
    {
      "id": "exam",
      "name": "exam",
      "rules": [{ "kind": "whitelist", "value": "exam.example.org" }]
    }
  ]
}"#;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _dir: TempDir,
}

fn write_release(dir: &TempDir) -> String {
    let release = dir.path().join("release");
    fs::create_dir_all(release.join("lib")).unwrap();
    fs::write(release.join("VERSION"), "4.2.0").unwrap();
    fs::write(release.join(INSTALLER), "param($ApiBase)\nWrite-Host 'install'").unwrap();
    fs::write(release.join("Enroll-Machine.ps1"), "Write-Host 'enroll'").unwrap();
    fs::write(release.join("Update-Agent.ps1"), "Write-Host 'update'").unwrap();
    fs::write(release.join("lib/Common.psm1"), "function Get-Common { 1 }").unwrap();
    release.to_string_lossy().into_owned()
}

pub fn create_mock_config(dir: &TempDir) -> AppConfig {
    let catalog_path = dir.path().join("catalog.json");
    fs::write(&catalog_path, CATALOG).unwrap();

    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_url: Some(PUBLIC_URL.to_string()),
            request_timeout_secs: 10,
        },
        tokens: TokensConfig {
            server_secret: "test-server-secret-0123456789abcdef".to_string(),
            registration_token: Some(REGISTRATION_TOKEN.to_string()),
            shared_secret: Some(SHARED_SECRET.to_string()),
            enrollment_ttl_minutes: 30,
        },
        use_agent_updates: true,
        use_enrollment: true,
        database: Some(DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        }),
        admin: Some(AdminConfig {
            access_tokens: vec![AdminAccessToken {
                name: "it-staff".to_string(),
                token_sha256: hash_token(ADMIN_TOKEN),
                classrooms: vec![],
            }],
        }),
        catalog: Some(CatalogConfig {
            path: catalog_path.to_string_lossy().into_owned(),
        }),
        agent: Some(AgentConfig {
            release_dir: write_release(dir),
            version: None,
            files: vec![
                INSTALLER.to_string(),
                "Enroll-Machine.ps1".to_string(),
                "Update-Agent.ps1".to_string(),
                "lib/Common.psm1".to_string(),
            ],
            bootstrap_files: vec![INSTALLER.to_string(), "Enroll-Machine.ps1".to_string()],
        }),
        logging: None,
    }
}

/// Registry backing a scenario runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Sqlite,
    Memory,
}

pub const STORAGES: [Storage; 2] = [Storage::Sqlite, Storage::Memory];

pub async fn spawn_app_on(storage: Storage) -> TestApp {
    spawn_app_with(|config| {
        if storage == Storage::Memory {
            config.database = None;
        }
    })
    .await
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Build the app after letting the caller adjust the configuration.
pub async fn spawn_app_with(adjust: impl FnOnce(&mut AppConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_mock_config(&dir);
    adjust(&mut config);

    let state = AppState::from_config(Arc::new(config)).await.unwrap();
    let router = build_router(&state).unwrap();
    TestApp {
        router,
        state,
        _dir: dir,
    }
}

/// Wrap a hand-built state. `dir` holds the catalog and release files.
pub fn app_from_state(state: AppState, dir: TempDir) -> TestApp {
    let router = build_router(&state).unwrap();
    TestApp {
        router,
        state,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<String>,
    ) -> Response<Body> {
        let mut request = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json)
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
        self.request("GET", uri, headers, None).await
    }

    pub async fn post(&self, uri: &str, headers: &[(&str, &str)], body: &str) -> Response<Body> {
        self.request("POST", uri, headers, Some(body.to_string())).await
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Path part of a whitelist URL, for requests against the router.
pub fn local_path(url: &str) -> String {
    url.strip_prefix(PUBLIC_URL).unwrap_or(url).to_string()
}

/// Token embedded in a whitelist URL.
pub fn token_from_url(url: &str) -> String {
    local_path(url)
        .trim_start_matches("/w/")
        .trim_end_matches("/whitelist.txt")
        .to_string()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

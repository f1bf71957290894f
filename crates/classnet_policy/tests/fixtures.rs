//! Test fixtures for the policy routes

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::Utc;
use classnet_common::models::{Classroom, DeviceUpsert, Rule, RuleGroup, RuleKind};
use classnet_config::TokensConfig;
use classnet_db::{DeviceRepository, InMemoryDeviceRepository};
use classnet_policy::{CatalogData, InMemoryPolicyCatalog};
use classnet_tokens::TokenIssuer;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestEnv {
    pub issuer: Arc<TokenIssuer>,
    pub devices: Arc<InMemoryDeviceRepository>,
    pub catalog: Arc<InMemoryPolicyCatalog>,
}

pub fn issuer() -> TokenIssuer {
    TokenIssuer::from_config(&TokensConfig {
        server_secret: "0123456789abcdef0123456789abcdef".to_string(),
        registration_token: Some("reg-token".to_string()),
        shared_secret: Some("rotate-secret".to_string()),
        enrollment_ttl_minutes: 60,
    })
    .expect("issuer")
}

pub fn group(id: &str, name: &str, domains: &[&str]) -> RuleGroup {
    RuleGroup {
        id: id.to_string(),
        name: name.to_string(),
        display_name: None,
        enabled: true,
        rules: domains
            .iter()
            .map(|d| Rule::new(RuleKind::Whitelist, *d))
            .collect(),
    }
}

pub fn classroom(id: &str, name: &str, default_group: Option<&str>) -> Classroom {
    Classroom {
        id: id.to_string(),
        name: name.to_string(),
        display_name: None,
        active_group_id: None,
        default_group_id: default_group.map(str::to_string),
    }
}

/// Lab A uses group "base", Lab Empty has no group, "exam" is disabled.
pub fn catalog_data() -> CatalogData {
    let mut exam = group("exam", "exam-mode", &["exam.example.org"]);
    exam.enabled = false;
    CatalogData {
        classrooms: vec![
            classroom("lab-a", "Lab A", Some("base")),
            classroom("lab-empty", "Lab Empty", None),
        ],
        groups: vec![group("base", "base", &["example.org", "wikipedia.org"]), exam],
    }
}

pub fn env() -> TestEnv {
    TestEnv {
        issuer: Arc::new(issuer()),
        devices: Arc::new(InMemoryDeviceRepository::new()),
        catalog: Arc::new(InMemoryPolicyCatalog::new(catalog_data()).expect("catalog")),
    }
}

impl TestEnv {
    pub fn router(&self) -> Router {
        classnet_policy::routes(
            self.issuer.clone(),
            self.devices.clone(),
            self.catalog.clone(),
        )
    }

    /// Register `hostname` in `classroom_id` directly and return its token.
    pub async fn device_token(&self, hostname: &str, classroom_id: &str) -> String {
        let credential = self.issuer.issue_device_token().expect("credential");
        self.devices
            .upsert(DeviceUpsert {
                id: format!("id-{}", hostname),
                hostname: hostname.to_string(),
                classroom_id: classroom_id.to_string(),
                installed_version: None,
                token_seed: credential.seed,
                token_hash: credential.hash,
                now: Utc::now(),
            })
            .await
            .expect("upsert");
        credential.token
    }
}

pub async fn get(router: &Router, uri: &str, if_none_match: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().uri(uri);
    if let Some(tag) = if_none_match {
        request = request.header("if-none-match", tag);
    }
    router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

mod fixtures;

use axum::http::StatusCode;
use classnet_backend::AppStateBuilder;
use classnet_common::models::{Classroom, RuleGroup};
use classnet_common::services::{BoxFuture, PolicyCatalog};
use classnet_common::ClassnetError;
use classnet_db::InMemoryDeviceRepository;
use classnet_policy::InMemoryPolicyCatalog;
use fixtures::{
    app_from_state, bearer, body_json, body_text, create_mock_config, local_path,
    REGISTRATION_TOKEN,
};
use std::sync::Arc;
use std::time::Duration;

/// Classroom lookups are immediate; group lookups outlast the request timeout.
struct SlowGroups {
    inner: InMemoryPolicyCatalog,
    delay: Duration,
}

impl PolicyCatalog for SlowGroups {
    fn classroom_by_id<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Option<Classroom>, ClassnetError> {
        self.inner.classroom_by_id(id)
    }

    fn classroom_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Option<Classroom>, ClassnetError> {
        self.inner.classroom_by_name(name)
    }

    fn group_by_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Option<RuleGroup>, ClassnetError> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.inner.group_by_id(id).await
        })
    }

    fn group_by_export_name<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Option<RuleGroup>, ClassnetError> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.inner.group_by_export_name(name).await
        })
    }
}

#[tokio::test]
async fn policy_feed_is_not_cut_off_by_api_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_mock_config(&dir);
    config.server.request_timeout_secs = 1;
    config.database = None;

    let catalog_path = config.catalog.as_ref().unwrap().path.clone();
    let catalog = SlowGroups {
        inner: InMemoryPolicyCatalog::from_file(&catalog_path).unwrap(),
        delay: Duration::from_millis(1500),
    };
    let state = AppStateBuilder::new(Arc::new(config))
        .with_devices(Arc::new(InMemoryDeviceRepository::new()))
        .with_catalog(Arc::new(catalog))
        .build()
        .unwrap();
    let app = app_from_state(state, dir);

    let response = app
        .post(
            "/api/machines/register",
            &[("authorization", &bearer(REGISTRATION_TOKEN))],
            r#"{"hostname":"pc-slow","classroomName":"Room1"}"#,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let url = body_json(response).await["whitelistUrl"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app.get(&local_path(&url), &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.starts_with("## WHITELIST\n"));

    let response = app.get("/export/base.txt", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("example.org/games"));
}

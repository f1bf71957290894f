mod fixtures;

use axum::http::{header, StatusCode};
use classnet_common::conditional::etag_for;
use classnet_db::DeviceRepository;
use classnet_policy::SENTINEL;
use fixtures::{body_text, env, get, group};

#[tokio::test]
async fn known_token_gets_policy_with_etag() {
    let env = env();
    let token = env.device_token("pc-01", "lab-a").await;
    let router = env.router();

    let response = get(&router, &format!("/w/{}/whitelist.txt", token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let etag = response.headers()[header::ETAG].to_str().unwrap().to_string();
    let body = body_text(response).await;

    assert!(body.starts_with("## WHITELIST\nexample.org\nwikipedia.org\n"));
    assert_eq!(etag, etag_for(body.as_bytes()));
}

#[tokio::test]
async fn matching_etag_gets_304_until_rules_change() {
    let env = env();
    let token = env.device_token("pc-02", "lab-a").await;
    let router = env.router();
    let uri = format!("/w/{}/whitelist.txt", token);

    let first = get(&router, &uri, None).await;
    let etag = first.headers()[header::ETAG].to_str().unwrap().to_string();

    let cached = get(&router, &uri, Some(&etag)).await;
    assert_eq!(cached.status(), StatusCode::NOT_MODIFIED);
    assert!(body_text(cached).await.is_empty());

    let mut data = fixtures::catalog_data();
    data.groups[0] = group("base", "base", &["example.org", "khanacademy.org"]);
    env.catalog.replace(data).unwrap();

    let changed = get(&router, &uri, Some(&etag)).await;
    assert_eq!(changed.status(), StatusCode::OK);
    assert_ne!(changed.headers()[header::ETAG].to_str().unwrap(), etag);
    assert!(body_text(changed).await.contains("khanacademy.org"));
}

#[tokio::test]
async fn unknown_or_malformed_tokens_get_sentinel() {
    let env = env();
    let router = env.router();

    for uri in [
        "/w/not-a-token/whitelist.txt",
        "/w/AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA/whitelist.txt",
        "/w//whitelist.txt",
        "/w/whitelist.txt",
        "/w/",
        "/w",
        "/w/%FF/whitelist.txt",
        "/w/abc/whitelist.txt/extra",
        "/w/abc/policy.txt",
    ] {
        let response = get(&router, uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert!(response.headers().get(header::ETAG).is_none(), "{uri}");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store", "{uri}");
        assert_eq!(body_text(response).await, SENTINEL, "{uri}");
    }
}

#[tokio::test]
async fn classroom_without_group_gets_sentinel() {
    let env = env();
    let token = env.device_token("pc-03", "lab-empty").await;
    let router = env.router();

    let response = get(&router, &format!("/w/{}/whitelist.txt", token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, SENTINEL);
}

#[tokio::test]
async fn resolution_touches_last_seen() {
    let env = env();
    let token = env.device_token("pc-04", "lab-a").await;
    let before = env.devices.find_by_hostname("pc-04").await.unwrap().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let router = env.router();
    get(&router, &format!("/w/{}/whitelist.txt", token), None).await;

    let after = env.devices.find_by_hostname("pc-04").await.unwrap().unwrap();
    assert!(after.last_seen_at > before.last_seen_at);
}

#[tokio::test]
async fn export_serves_group_by_name() {
    let env = env();
    let router = env.router();

    let response = get(&router, "/export/base.txt", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let etag = response.headers()[header::ETAG].to_str().unwrap().to_string();
    assert!(body_text(response).await.contains("wikipedia.org"));

    let cached = get(&router, "/export/base.txt", Some(&etag)).await;
    assert_eq!(cached.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn export_of_unknown_group_is_404() {
    let env = env();
    let router = env.router();

    assert_eq!(get(&router, "/export/nope.txt", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "/export/base", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "/export/%FF.txt", None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_of_disabled_group_is_sentinel() {
    let env = env();
    let router = env.router();

    let response = get(&router, "/export/exam-mode.txt", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, SENTINEL);
}

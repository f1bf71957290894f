mod fixtures;

use chrono::{Duration, Utc};
use fixtures::{all_repositories, now, upsert_at, upsert_for};

#[tokio::test]
async fn first_upsert_creates_device() {
    for (backend, repo) in all_repositories().await {
        let upsert = upsert_for("pc-01", "lab-a", Some("1.0.0"));
        let outcome = repo.upsert(upsert.clone()).await.unwrap();

        assert!(outcome.created, "{backend}");
        assert_eq!(outcome.device.id, upsert.id, "{backend}");
        assert_eq!(outcome.device.hostname, "pc-01", "{backend}");
        assert_eq!(outcome.device.installed_version.as_deref(), Some("1.0.0"), "{backend}");
        assert_eq!(outcome.device.token_hash, upsert.token_hash, "{backend}");
    }
}

#[tokio::test]
async fn device_without_version_round_trips() {
    for (backend, repo) in all_repositories().await {
        let outcome = repo
            .upsert(upsert_for("pc-10", "room-1", None))
            .await
            .unwrap();
        assert!(outcome.created, "{backend}");
        assert_eq!(outcome.device.installed_version, None, "{backend}");

        let found = repo.find_by_hostname("pc-10").await.unwrap().unwrap();
        assert_eq!(found.installed_version, None, "{backend}");
        let by_token = repo
            .find_by_token_hash(&outcome.device.token_hash)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_token.id, outcome.device.id, "{backend}");

        // A later version fills the gap, and another versionless upsert keeps it.
        repo.upsert(upsert_for("pc-10", "room-1", Some("2.0.0")))
            .await
            .unwrap();
        let again = repo
            .upsert(upsert_for("pc-10", "room-1", None))
            .await
            .unwrap();
        assert_eq!(again.device.installed_version.as_deref(), Some("2.0.0"), "{backend}");

        let rotated = repo
            .rotate_token("pc-10", "seed-x", "hash-x", Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rotated.installed_version.as_deref(), Some("2.0.0"), "{backend}");
    }
}

#[tokio::test]
async fn repeated_upsert_keeps_identity_and_token() {
    for (backend, repo) in all_repositories().await {
        let start = now();
        let first = repo
            .upsert(upsert_at("pc-02", "lab-a", Some("1.0.0"), start))
            .await
            .unwrap()
            .device;

        let later = start + Duration::minutes(5);
        let second = repo
            .upsert(upsert_at("pc-02", "lab-b", None, later))
            .await
            .unwrap();

        assert!(!second.created, "{backend}");
        let device = second.device;
        assert_eq!(device.id, first.id, "{backend}");
        assert_eq!(device.token_seed, first.token_seed, "{backend}");
        assert_eq!(device.token_hash, first.token_hash, "{backend}");
        assert_eq!(device.classroom_id, "lab-b", "{backend}");
        // A missing version never erases the stored one.
        assert_eq!(device.installed_version.as_deref(), Some("1.0.0"), "{backend}");
        assert_eq!(device.registered_at, first.registered_at, "{backend}");
        assert_eq!(device.last_seen_at, later, "{backend}");
    }
}

#[tokio::test]
async fn rotation_replaces_token_material() {
    for (backend, repo) in all_repositories().await {
        let original = repo
            .upsert(upsert_for("pc-03", "lab-a", None))
            .await
            .unwrap()
            .device;

        let rotated = repo
            .rotate_token("pc-03", "new-seed", "new-hash", Utc::now())
            .await
            .unwrap()
            .expect("device exists");
        assert_eq!(rotated.id, original.id, "{backend}");
        assert_eq!(rotated.token_hash, "new-hash", "{backend}");

        assert!(repo
            .find_by_token_hash(&original.token_hash)
            .await
            .unwrap()
            .is_none());
        let found = repo.find_by_token_hash("new-hash").await.unwrap().unwrap();
        assert_eq!(found.hostname, "pc-03", "{backend}");
    }
}

#[tokio::test]
async fn rotation_of_unknown_host_is_none() {
    for (backend, repo) in all_repositories().await {
        let result = repo
            .rotate_token("ghost", "seed", "hash", Utc::now())
            .await
            .unwrap();
        assert!(result.is_none(), "{backend}");
    }
}

#[tokio::test]
async fn touch_updates_last_seen_only() {
    for (backend, repo) in all_repositories().await {
        let device = repo
            .upsert(upsert_for("pc-04", "lab-a", None))
            .await
            .unwrap()
            .device;

        let seen = device.last_seen_at + Duration::hours(1);
        repo.touch_last_seen(&device.id, seen).await.unwrap();

        let reloaded = repo.find_by_hostname("pc-04").await.unwrap().unwrap();
        assert_eq!(reloaded.last_seen_at, seen, "{backend}");
        assert_eq!(reloaded.token_hash, device.token_hash, "{backend}");
    }
}

#[tokio::test]
async fn concurrent_first_registrations_converge() {
    for (backend, repo) in all_repositories().await {
        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.upsert(upsert_for("pc-05", "lab-a", None)).await
            }));
        }

        let mut created = 0;
        let mut ids = Vec::new();
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            if outcome.created {
                created += 1;
            }
            ids.push(outcome.device.id);
        }

        assert_eq!(created, 1, "{backend}");
        ids.dedup();
        assert_eq!(ids.len(), 1, "{backend}");
    }
}

//! Administrator authentication from configured access tokens.
//!
//! Stand-in for the external admin session service: each configured entry
//! holds the SHA-256 of an access token and the classrooms it may manage.

use classnet_common::models::AdminPrincipal;
use classnet_common::services::{AdminAuthenticator, BoxFuture};
use classnet_common::ClassnetError;
use classnet_config::AdminConfig;
use tracing::debug;

use crate::secrets::hash_token;

#[derive(Debug, Clone)]
struct Entry {
    token_sha256: String,
    principal: AdminPrincipal,
}

#[derive(Debug, Clone, Default)]
pub struct StaticAdminAuthenticator {
    entries: Vec<Entry>,
}

impl StaticAdminAuthenticator {
    pub fn from_config(config: &AdminConfig) -> Self {
        let entries = config
            .access_tokens
            .iter()
            .map(|t| Entry {
                token_sha256: t.token_sha256.trim().to_ascii_lowercase(),
                principal: AdminPrincipal {
                    name: t.name.clone(),
                    classrooms: t.classrooms.clone(),
                },
            })
            .collect();
        Self { entries }
    }

    pub fn authenticate_sync(&self, bearer: &str) -> Option<AdminPrincipal> {
        let presented = hash_token(bearer);
        // Compare against every entry so timing does not reveal which one matched.
        let mut found = None;
        for entry in &self.entries {
            if constant_time_eq::constant_time_eq(
                entry.token_sha256.as_bytes(),
                presented.as_bytes(),
            ) {
                found = Some(entry.principal.clone());
            }
        }
        if found.is_none() {
            debug!("Admin access token not recognized");
        }
        found
    }
}

impl AdminAuthenticator for StaticAdminAuthenticator {
    fn authenticate<'a>(
        &'a self,
        bearer: &'a str,
    ) -> BoxFuture<'a, Option<AdminPrincipal>, ClassnetError> {
        let principal = self.authenticate_sync(bearer);
        Box::pin(async move { Ok(principal) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classnet_config::AdminAccessToken;

    fn authenticator() -> StaticAdminAuthenticator {
        StaticAdminAuthenticator::from_config(&AdminConfig {
            access_tokens: vec![
                AdminAccessToken {
                    name: "lab-teacher".to_string(),
                    token_sha256: hash_token("teacher-token").to_uppercase(),
                    classrooms: vec!["lab-a".to_string()],
                },
                AdminAccessToken {
                    name: "it".to_string(),
                    token_sha256: hash_token("it-token"),
                    classrooms: vec![],
                },
            ],
        })
    }

    #[tokio::test]
    async fn resolves_known_tokens() {
        let auth = authenticator();
        let teacher = auth.authenticate("teacher-token").await.unwrap().unwrap();
        assert_eq!(teacher.name, "lab-teacher");
        assert!(teacher.can_manage("lab-a"));
        assert!(!teacher.can_manage("lab-b"));

        let it = auth.authenticate("it-token").await.unwrap().unwrap();
        assert!(it.can_manage("lab-b"));
    }

    #[tokio::test]
    async fn unknown_tokens_resolve_to_none() {
        let auth = authenticator();
        assert!(auth.authenticate("nope").await.unwrap().is_none());
        assert!(StaticAdminAuthenticator::default()
            .authenticate("it-token")
            .await
            .unwrap()
            .is_none());
    }
}

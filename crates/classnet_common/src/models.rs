// --- File: crates/classnet_common/src/models.rs ---

// Data structures shared by the registry, the policy resolver and the
// distribution endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered machine.
///
/// The live bearer token is never stored. `token_seed` is the per-device
/// random seed the token is derived from, `token_hash` the SHA-256 hex of the
/// token itself, used for lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Internal identifier (UUID v4).
    pub id: String,

    /// Natural key, trimmed and lowercased.
    pub hostname: String,

    pub classroom_id: String,

    pub installed_version: Option<String>,

    #[serde(skip_serializing)]
    pub token_seed: String,

    #[serde(skip_serializing)]
    pub token_hash: String,

    pub registered_at: DateTime<Utc>,

    pub last_seen_at: DateTime<Utc>,
}

/// Values for an insert-or-refresh keyed on hostname.
///
/// `id`, `token_seed` and `token_hash` only apply when the hostname is new;
/// an existing row keeps its identity and token.
#[derive(Debug, Clone)]
pub struct DeviceUpsert {
    pub id: String,
    pub hostname: String,
    pub classroom_id: String,
    pub installed_version: Option<String>,
    pub token_seed: String,
    pub token_hash: String,
    pub now: DateTime<Utc>,
}

/// Outcome of an upsert: the stored row and whether it was just created.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub device: Device,
    pub created: bool,
}

/// A classroom as seen by the policy resolver.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    pub id: String,
    /// Name used by installers when registering.
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Group applied right now, typically set by a schedule.
    #[serde(default)]
    pub active_group_id: Option<String>,
    /// Group applied when nothing else is active.
    #[serde(default)]
    pub default_group_id: Option<String>,
}

impl Classroom {
    /// The group that currently governs this classroom, if any.
    pub fn effective_group_id(&self) -> Option<&str> {
        self.active_group_id
            .as_deref()
            .or(self.default_group_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Which section of the policy document a rule lands in.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Whitelist,
    BlockedSubdomain,
    BlockedPath,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub kind: RuleKind,
    pub value: String,
}

impl Rule {
    pub fn new(kind: RuleKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// A named set of rules.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroup {
    pub id: String,
    /// Public name used by `/export/{name}.txt`.
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

fn default_enabled() -> bool {
    true
}

/// An authenticated administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPrincipal {
    pub name: String,
    /// Classroom ids this principal may manage. Empty means all.
    pub classrooms: Vec<String>,
}

impl AdminPrincipal {
    pub fn can_manage(&self, classroom_id: &str) -> bool {
        self.classrooms.is_empty() || self.classrooms.iter().any(|c| c == classroom_id)
    }
}

// --- File: crates/classnet_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally reachable base URL used when building whitelist URLs.
    /// Falls back to `http://{host}:{port}` when unset.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Per-request timeout applied by the HTTP layer.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ServerConfig {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> String {
        match &self.public_url {
            Some(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            _ => format!("http://{}:{}", self.host, self.port),
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite:data/classnet.db, loaded via CLASSNET__DATABASE__URL
}

// --- Token Config ---
// Every secret here is normally "secret_from_env" in the config files.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TokensConfig {
    /// Root secret the enrollment and device-token keys are derived from.
    pub server_secret: String,
    /// Installation-wide registration token. Unset rejects every registration attempt.
    #[serde(default)]
    pub registration_token: Option<String>,
    /// Operator secret for token rotation. Unset rejects every rotation attempt.
    #[serde(default)]
    pub shared_secret: Option<String>,
    #[serde(default = "default_enrollment_ttl_minutes")]
    pub enrollment_ttl_minutes: i64,
}

fn default_enrollment_ttl_minutes() -> i64 {
    60
}

// --- Admin Access Config ---
// Stands in for the external admin session service.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AdminConfig {
    #[serde(default)]
    pub access_tokens: Vec<AdminAccessToken>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdminAccessToken {
    pub name: String,
    /// SHA-256 hex of the access token.
    pub token_sha256: String,
    /// Classroom ids this admin may provision. Empty means every classroom.
    #[serde(default)]
    pub classrooms: Vec<String>,
}

// --- Catalog Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogConfig {
    /// JSON file with classrooms and rule groups.
    pub path: String,
}

// --- Agent Distribution Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentConfig {
    /// Directory holding the current agent release.
    pub release_dir: String,
    /// Release version. When unset the `VERSION` file in `release_dir` is used.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "default_agent_files")]
    pub files: Vec<String>,
    #[serde(default = "default_bootstrap_files")]
    pub bootstrap_files: Vec<String>,
}

pub fn default_agent_files() -> Vec<String> {
    [
        "Install-Agent.ps1",
        "Enroll-Machine.ps1",
        "Update-Agent.ps1",
        "Uninstall-Agent.ps1",
        "lib/Common.psm1",
        "lib/Policy.psm1",
        "lib/Firewall.psm1",
        "lib/Dns.psm1",
        "scripts/Update-Whitelist.ps1",
        "scripts/Watchdog.ps1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_bootstrap_files() -> Vec<String> {
    ["Install-Agent.ps1", "Enroll-Machine.ps1"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is not set (trace, debug, info, warn, error).
    #[serde(default)]
    pub level: Option<String>,
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,
    pub tokens: TokensConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_agent_updates: bool,
    #[serde(default)]
    pub use_enrollment: bool,

    // --- Optional Sections ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub admin: Option<AdminConfig>,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
    #[serde(default)]
    pub agent: Option<AgentConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

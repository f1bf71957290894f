//! Layered configuration for the classnet services.
//!
//! Sources, later ones winning:
//!
//! 1. `{CONFIG_DIR}/default.toml`
//! 2. `{CONFIG_DIR}/{RUN_ENV}.toml`
//! 3. `CLASSNET__SECTION__KEY` environment variables
//!
//! String values equal to `"secret_from_env"` are then resolved through
//! [`env_vars::inject_env_vars`] before the result is deserialized into
//! [`AppConfig`].

use config::{Config, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Component, Path};
use thiserror::Error;
use tracing::debug;

pub mod env_vars;
pub mod models;

pub use models::*;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("failed to deserialize configuration: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from `CONFIG_DIR` (default `config`) and the environment.
pub fn load_config() -> Result<AppConfig, ConfigLoadError> {
    ensure_dotenv_loaded();
    let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    load_config_from(Path::new(&config_dir))
}

/// Load configuration from an explicit directory and the environment.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, ConfigLoadError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env_vars::get_config_prefix();

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        default = %default_path.display(),
        overlay = %env_path.display(),
        "loading configuration"
    );

    let builder = Config::builder()
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator(env_vars::CONFIG_SEPARATOR)
                .try_parsing(true),
        );

    let mut raw: serde_json::Value = builder.build()?.try_deserialize()?;
    env_vars::inject_env_vars(&mut raw);

    let config: AppConfig = serde_json::from_value(raw)?;
    validate(&config)?;
    Ok(config)
}

/// Check invariants the type system does not capture.
pub fn validate(config: &AppConfig) -> Result<(), ConfigLoadError> {
    if config.tokens.server_secret.trim().len() < 16 {
        return Err(ConfigLoadError::Invalid(
            "tokens.server_secret must be at least 16 characters".to_string(),
        ));
    }
    if config.tokens.enrollment_ttl_minutes <= 0 {
        return Err(ConfigLoadError::Invalid(
            "tokens.enrollment_ttl_minutes must be positive".to_string(),
        ));
    }

    if let Some(agent) = &config.agent {
        for path in agent.files.iter().chain(agent.bootstrap_files.iter()) {
            if !is_safe_relative_path(path) {
                return Err(ConfigLoadError::Invalid(format!(
                    "agent file path '{}' must be relative and stay inside the release directory",
                    path
                )));
            }
        }
        if let Some(missing) = agent
            .bootstrap_files
            .iter()
            .find(|p| !agent.files.contains(p))
        {
            return Err(ConfigLoadError::Invalid(format!(
                "bootstrap file '{}' is not part of the agent release",
                missing
            )));
        }
    }

    Ok(())
}

/// A path is safe when it is non-empty, relative and only has normal components.
pub fn is_safe_relative_path(path: &str) -> bool {
    if path.is_empty() || path.contains('\\') {
        return false;
    }
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Load the dotenv file once per process.
///
/// `DOTENV_OVERRIDE` selects the file, otherwise `.env` in the working directory.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

//! Runtime feature flags.
//!
//! Optional route groups are mounted only when their `use_*` flag is set and
//! the configuration section they need is present:
//!
//! - `use_agent_updates` + `[agent]`: device manifest and file downloads
//! - `use_enrollment` + `[admin]`: enrollment tickets and scripts
//! - both of the above: bootstrap manifest and file downloads
//!
//! The `openapi` compile-time feature adds Swagger UI on top.

use classnet_config::AppConfig;

/// A feature is enabled when its flag is on and its section exists.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

pub fn is_agent_updates_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_agent_updates, config.agent.as_ref())
}

pub fn is_enrollment_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_enrollment, config.admin.as_ref())
}

/// Bootstrap downloads need a release to serve and tickets to authorize them.
pub fn is_bootstrap_enabled(config: &AppConfig) -> bool {
    is_enrollment_enabled(config) && config.agent.is_some()
}

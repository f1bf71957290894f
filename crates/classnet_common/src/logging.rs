//! Tracing setup shared by the classnet binaries.
//!
//! `RUST_LOG` always wins. Otherwise the chosen level applies to the classnet
//! crates and the HTTP trace layer while dependencies log warnings only.

use std::str::FromStr;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the subscriber at INFO.
///
/// ```
/// use classnet_common::logging;
///
/// logging::init();
/// // Later calls keep the first subscriber.
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

pub fn init_with_level(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    // try_init: tests and embedded callers may have installed a subscriber already.
    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!(%level, "logging initialized");
    }
}

/// Install the subscriber from the optional `logging.level` setting.
pub fn init_from_config(level: Option<&str>) {
    init_with_level(parse_level(level));
}

/// A level name from config, INFO when missing or unrecognized.
pub fn parse_level(level: Option<&str>) -> Level {
    level
        .and_then(|l| Level::from_str(l.trim()).ok())
        .unwrap_or(Level::INFO)
}

fn default_directives(level: Level) -> String {
    format!("warn,classnet={level},tower_http={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_levels() {
        assert_eq!(parse_level(Some("debug")), Level::DEBUG);
        assert_eq!(parse_level(Some(" WARN ")), Level::WARN);
        assert_eq!(parse_level(Some("loud")), Level::INFO);
        assert_eq!(parse_level(None), Level::INFO);
    }

    #[test]
    fn directives_scope_level_to_own_crates() {
        let directives = default_directives(Level::DEBUG);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("classnet=DEBUG"));
    }

    #[test]
    fn init_is_idempotent() {
        init_from_config(Some("debug"));
        init();
    }
}

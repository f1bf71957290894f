//! Policy document rendering.
//!
//! The document is a plain text file with three fixed sections. Entries are
//! normalized, deduplicated and sorted, and nothing time-dependent is
//! written, so the same rule set always renders to the same bytes and
//! therefore the same ETag.

use classnet_common::models::{Rule, RuleKind};
use std::collections::BTreeSet;

/// Deny-all document served whenever a policy cannot be resolved.
pub const SENTINEL: &str = "#DESACTIVADO\n";

pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

const SECTIONS: [(RuleKind, &str); 3] = [
    (RuleKind::Whitelist, "## WHITELIST"),
    (RuleKind::BlockedSubdomain, "## BLOCKED-SUBDOMAINS"),
    (RuleKind::BlockedPath, "## BLOCKED-PATHS"),
];

fn strip_scheme(value: &str) -> &str {
    value
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(value)
}

/// Canonical form of one rule value, or `None` when it renders to nothing.
///
/// Blank values and `#` comments are dropped. Values are lowercased and lose
/// their scheme and trailing slashes. Domain rules also lose any path.
pub fn normalize_entry(kind: RuleKind, raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() || value.starts_with('#') {
        return None;
    }

    let lowered = value.to_lowercase();
    let without_scheme = strip_scheme(&lowered);
    let entry = match kind {
        RuleKind::Whitelist | RuleKind::BlockedSubdomain => {
            without_scheme.split('/').next().unwrap_or_default()
        }
        RuleKind::BlockedPath => without_scheme.trim_end_matches('/'),
    };

    if entry.is_empty() || entry.chars().any(char::is_whitespace) {
        None
    } else {
        Some(entry.to_string())
    }
}

/// Render a rule set into the policy document.
pub fn render_policy(rules: &[Rule]) -> String {
    let mut out = String::new();
    for (index, (kind, header)) in SECTIONS.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(header);
        out.push('\n');

        let entries: BTreeSet<String> = rules
            .iter()
            .filter(|rule| rule.kind == *kind)
            .filter_map(|rule| normalize_entry(rule.kind, &rule.value))
            .collect();
        for entry in entries {
            out.push_str(&entry);
            out.push('\n');
        }
    }
    out
}

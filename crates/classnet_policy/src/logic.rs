// --- File: crates/classnet_policy/src/logic.rs ---

use chrono::Utc;
use classnet_common::models::{Device, RuleGroup};
use classnet_common::{not_found, ClassnetError};
use classnet_tokens::looks_like_device_token;
use tracing::{debug, warn};

use crate::handlers::PolicyState;
use crate::render::render_policy;

/// What a policy request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyOutcome {
    /// A rendered policy document.
    Document(String),
    /// Nothing could be resolved; serve the deny-all sentinel.
    Sentinel,
}

fn render_group(group: &RuleGroup) -> PolicyOutcome {
    if group.enabled {
        PolicyOutcome::Document(render_policy(&group.rules))
    } else {
        PolicyOutcome::Sentinel
    }
}

async fn resolve_for_device(
    state: &PolicyState,
    device: &Device,
) -> Result<PolicyOutcome, ClassnetError> {
    let Some(classroom) = state.catalog.classroom_by_id(&device.classroom_id).await? else {
        debug!(hostname = %device.hostname, classroom = %device.classroom_id, "Classroom no longer exists");
        return Ok(PolicyOutcome::Sentinel);
    };

    let Some(group_id) = classroom.effective_group_id() else {
        debug!(classroom = %classroom.id, "Classroom has no active group");
        return Ok(PolicyOutcome::Sentinel);
    };

    Ok(state
        .catalog
        .group_by_id(group_id)
        .await?
        .map(|group| render_group(&group))
        .unwrap_or(PolicyOutcome::Sentinel))
}

/// The token of a `{token}/whitelist.txt` path tail, if it has that shape.
pub fn token_from_feed_path(tail: &str) -> Option<&str> {
    let (token, rest) = tail.split_once('/')?;
    (!token.is_empty() && rest == "whitelist.txt").then_some(token)
}

/// Resolve the policy for a device token taken from the request path.
///
/// Never fails: malformed or unknown tokens, dangling references and storage
/// errors all resolve to the sentinel.
pub async fn resolve_whitelist(state: &PolicyState, token: &str) -> PolicyOutcome {
    if !looks_like_device_token(token) {
        return PolicyOutcome::Sentinel;
    }

    let hash = state.issuer.device_token_hash(token);
    let device = match state.devices.find_by_token_hash(&hash).await {
        Ok(Some(device)) => device,
        Ok(None) => {
            debug!(token = %&hash[..8], "Unknown device token");
            return PolicyOutcome::Sentinel;
        }
        Err(e) => {
            warn!(error = %e, "Device lookup failed, serving sentinel");
            return PolicyOutcome::Sentinel;
        }
    };

    let outcome = match resolve_for_device(state, &device).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(hostname = %device.hostname, error = %e, "Policy resolution failed, serving sentinel");
            return PolicyOutcome::Sentinel;
        }
    };

    // Best effort: a failed touch never affects the response.
    if let Err(e) = state.devices.touch_last_seen(&device.id, Utc::now()).await {
        warn!(hostname = %device.hostname, error = %e, "Failed to record last seen");
    }

    outcome
}

/// Resolve a public group export by name.
///
/// An unknown name is `NotFound`; a disabled group or a catalog failure
/// resolves to the sentinel.
pub async fn export_group(state: &PolicyState, name: &str) -> Result<PolicyOutcome, ClassnetError> {
    match state.catalog.group_by_export_name(name).await {
        Ok(Some(group)) => Ok(render_group(&group)),
        Ok(None) => Err(not_found("Group not found")),
        Err(e) => {
            warn!(group = %name, error = %e, "Group export failed, serving sentinel");
            Ok(PolicyOutcome::Sentinel)
        }
    }
}

//! Session boot resolution.
//!
//! On session entry, decides whether to resume from the local store, the
//! remote store, or build fresh from a bootstrap fetch. Resolution is a
//! pure recency comparison on `updated_at`; remote wins ties so a clean
//! sync converges on the server copy.

use crate::builder::{build_draft, BootstrapSource};
use crate::local_store::LocalStore;
use crate::remote_store::RemoteStore;
use crate::{Draft, Error, Result};
use chrono::{DateTime, Utc};

/// What the caller wants booted
#[derive(Clone, Debug)]
pub struct BootRequest {
    pub user_id: String,
    /// Required only when no resumable draft exists
    pub workout_id: Option<String>,
    pub plan_workout_id: Option<String>,
    /// Consult the remote store; offline-only callers skip the network
    pub prefer_remote: bool,
}

/// Resolve the active session draft for a user
///
/// Order: remote copy when present and at least as fresh as the local one
/// (mirrored into local on adoption, so offline continuation works from
/// that point), else the local copy, else a fresh build from the bootstrap
/// source. A fresh build requires `workout_id`; its absence is a
/// configuration error, fatal to this boot attempt.
///
/// Never yields two simultaneously-live drafts for one user: whatever is
/// adopted becomes the single per-user local row.
pub fn resolve_session(
    local: &LocalStore,
    remote: &dyn RemoteStore,
    bootstrap: &dyn BootstrapSource,
    req: &BootRequest,
    now: DateTime<Utc>,
) -> Result<Draft> {
    let local_copy = local.load(&req.user_id)?;

    let remote_copy = if req.prefer_remote {
        match remote.fetch(&req.user_id) {
            Ok(row) => row,
            Err(e) => {
                // Transient network failure; local is authoritative
                tracing::warn!(
                    "Remote fetch failed for user {}: {}. Continuing without it.",
                    req.user_id,
                    e
                );
                None
            }
        }
    } else {
        None
    };

    if let Some(row) = remote_copy {
        let newer_than_local = local_copy
            .as_ref()
            .map(|l| row.updated_at >= l.updated_at)
            .unwrap_or(true);

        if row.document.user_id == req.user_id && newer_than_local {
            tracing::info!(
                "Resuming draft {} from remote (updated_at {})",
                row.document.draft_id,
                row.updated_at
            );
            // Mirror immediately so offline continuation resumes from here
            local.save(&row.document)?;
            return Ok(row.document);
        }
    }

    if let Some(draft) = local_copy {
        tracing::info!(
            "Resuming draft {} from local store (updated_at {})",
            draft.draft_id,
            draft.updated_at
        );
        return Ok(draft);
    }

    let workout_id = req.workout_id.as_deref().ok_or_else(|| {
        Error::Config(format!(
            "No resumable draft for user {} and no workout to bootstrap from",
            req.user_id
        ))
    })?;

    let payload = bootstrap.fetch(workout_id, req.plan_workout_id.as_deref())?;
    let draft = build_draft(&payload, &req.user_id, now);
    local.save(&draft)?;

    tracing::info!(
        "Started fresh draft {} for workout {}",
        draft.draft_id,
        workout_id
    );
    Ok(draft)
}

/// Destroy the draft in both stores after the user cancels the session
pub fn discard_session(local: &LocalStore, remote: &dyn RemoteStore, user_id: &str) -> Result<()> {
    local.clear(user_id)?;
    if let Err(e) = remote.clear(user_id) {
        tracing::warn!("Remote clear failed for user {}: {}. Ignoring.", user_id, e);
    }
    tracing::info!("Discarded session draft for user {}", user_id);
    Ok(())
}

/// Destroy the draft in both stores after a confirmed permanent save
pub fn complete_session(local: &LocalStore, remote: &dyn RemoteStore, user_id: &str) -> Result<()> {
    local.clear(user_id)?;
    if let Err(e) = remote.clear(user_id) {
        tracing::warn!("Remote clear failed for user {}: {}. Ignoring.", user_id, e);
    }
    tracing::info!("Session committed; cleared draft stores for user {}", user_id);
    Ok(())
}

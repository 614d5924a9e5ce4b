//! Best-effort remote draft persistence with debounced writes.
//!
//! The remote copy exists for cross-install continuity only: one row per
//! user, last write wins by overwrite. Local storage is authoritative, so
//! every remote failure is caught at this boundary, logged, and swallowed.
//! Writes are debounced so a burst of keystrokes becomes a single upsert.

use crate::{Draft, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

/// The remote row: indexed columns alongside the opaque draft document
///
/// The columns mirror what the backend keeps queryable for its
/// one-row-per-user upsert constraint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RemoteRow {
    pub user_id: String,
    pub workout_id: String,
    pub plan_workout_id: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub document: Draft,
}

impl RemoteRow {
    pub fn from_draft(draft: &Draft) -> Self {
        Self {
            user_id: draft.user_id.clone(),
            workout_id: draft.workout_id.clone(),
            plan_workout_id: draft.plan_workout_id.clone(),
            updated_at: draft.updated_at,
            document: draft.clone(),
        }
    }
}

/// The networked draft store seam
///
/// Implementations may fail; callers at this boundary never let those
/// failures reach the user or block the session.
pub trait RemoteStore {
    fn fetch(&self, user_id: &str) -> Result<Option<RemoteRow>>;
    fn upsert(&self, row: &RemoteRow) -> Result<()>;
    fn clear(&self, user_id: &str) -> Result<()>;
}

// ============================================================================
// File-backed implementation
// ============================================================================

/// File-backed remote store (one JSON row file per user)
///
/// Stands in for the networked collaborator; the CLI points it at a
/// directory that a sync daemon or a test owns.
#[derive(Clone)]
pub struct FileRemote {
    dir: PathBuf,
}

impl FileRemote {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", user_id))
    }
}

impl RemoteStore for FileRemote {
    fn fetch(&self, user_id: &str) -> Result<Option<RemoteRow>> {
        let path = self.path_for(user_id);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<RemoteRow>(&contents) {
            Ok(row) if row.user_id == user_id => Ok(Some(row)),
            Ok(row) => {
                tracing::warn!(
                    "Remote row at {:?} belongs to user {}, not {}. Treating as absent.",
                    path,
                    row.user_id,
                    user_id
                );
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse remote row {:?}: {}. Treating as absent.",
                    path,
                    e
                );
                Ok(None)
            }
        }
    }

    fn upsert(&self, row: &RemoteRow) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&row.user_id);
        let contents = serde_json::to_string(row)?;
        std::fs::write(&path, contents)?;
        tracing::debug!(
            "Upserted remote row for user {} (updated_at {})",
            row.user_id,
            row.updated_at
        );
        Ok(())
    }

    fn clear(&self, user_id: &str) -> Result<()> {
        let path = self.path_for(user_id);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// In-memory remote store, for tests and offline-only callers
#[derive(Default)]
pub struct MemoryRemote {
    rows: RefCell<HashMap<String, RemoteRow>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RemoteStore for MemoryRemote {
    fn fetch(&self, user_id: &str) -> Result<Option<RemoteRow>> {
        Ok(self.rows.borrow().get(user_id).cloned())
    }

    fn upsert(&self, row: &RemoteRow) -> Result<()> {
        self.rows
            .borrow_mut()
            .insert(row.user_id.clone(), row.clone());
        Ok(())
    }

    fn clear(&self, user_id: &str) -> Result<()> {
        self.rows.borrow_mut().remove(user_id);
        Ok(())
    }
}

// ============================================================================
// Debounced synchronization
// ============================================================================

/// Debounced remote writer
///
/// Cooperative and single-threaded: the caller queues each new draft state
/// and periodically ticks; the sync sends at most one upsert per window,
/// always carrying the freshest queued state. A send is skipped when the
/// `(draft_id, updated_at)` pair matches the last one sent, so identical
/// states are not re-sent. Failures are logged and dropped; the next
/// window's fresher write supersedes any lost one.
pub struct RemoteSync<R: RemoteStore> {
    remote: R,
    window: Duration,
    pending: Option<Draft>,
    due_at: Option<DateTime<Utc>>,
    last_sent: Option<(Uuid, DateTime<Utc>)>,
}

impl<R: RemoteStore> RemoteSync<R> {
    pub fn new(remote: R, debounce_ms: u64) -> Self {
        Self {
            remote,
            window: Duration::milliseconds(debounce_ms as i64),
            pending: None,
            due_at: None,
            last_sent: None,
        }
    }

    /// Queue the current draft state for upload
    ///
    /// The window opens at the first queued write; later states within the
    /// window replace the pending one without re-arming, so a typing burst
    /// produces exactly one upsert carrying the final state.
    pub fn queue(&mut self, draft: &Draft, now: DateTime<Utc>) {
        if self.due_at.is_none() {
            self.due_at = Some(now + self.window);
        }
        self.pending = Some(draft.clone());
    }

    /// Send the pending state if the debounce window has elapsed
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if matches!(self.due_at, Some(due) if now >= due) {
            self.send_pending();
        }
    }

    /// Force the pending state out immediately
    ///
    /// Used when the app is backgrounded or a screen teardown is imminent,
    /// since the process may die before the window elapses.
    pub fn flush(&mut self) {
        self.send_pending();
    }

    /// True when a queued state has not been sent yet
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending write and clear the remote row
    pub fn clear(&mut self, user_id: &str) {
        self.pending = None;
        self.due_at = None;
        if let Err(e) = self.remote.clear(user_id) {
            tracing::warn!("Remote clear failed for user {}: {}. Ignoring.", user_id, e);
        }
    }

    fn send_pending(&mut self) {
        let Some(draft) = self.pending.take() else {
            self.due_at = None;
            return;
        };
        self.due_at = None;

        let key = (draft.draft_id, draft.updated_at);
        if self.last_sent == Some(key) {
            tracing::debug!("Skipping remote upsert: state already sent");
            return;
        }

        match self.remote.upsert(&RemoteRow::from_draft(&draft)) {
            Ok(()) => {
                self.last_sent = Some(key);
            }
            Err(e) => {
                // Local durability makes retries unnecessary; the next
                // debounce window carries a fresher state anyway.
                tracing::warn!(
                    "Remote upsert failed for user {}: {}. Ignoring.",
                    draft.user_id,
                    e
                );
            }
        }
    }
}

//! On-device draft persistence with file locking.
//!
//! One JSON document per user, written atomically. This store is the
//! durability backbone: it is always available, lowest-latency, and the
//! fallback of last resort when the remote copy is unreachable. Corrupt or
//! foreign documents are treated as absent so boot can fall through to the
//! next source.

use crate::{Draft, Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Per-user local draft store rooted at `<data_dir>/drafts/`
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: data_dir.into().join("drafts"),
        }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", user_id))
    }

    /// Load the draft for a user, if one exists
    ///
    /// Returns `None` when the file is missing, unreadable, unparseable, or
    /// holds a draft belonging to a different user. None of these conditions
    /// is an error: local data integrity problems mean "no resumable draft".
    pub fn load(&self, user_id: &str) -> Result<Option<Draft>> {
        let path = self.path_for(user_id);
        if !path.exists() {
            tracing::debug!("No local draft for user {}", user_id);
            return Ok(None);
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open local draft {:?}: {}. Treating as absent.",
                    path,
                    e
                );
                return Ok(None);
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock local draft {:?}: {}. Treating as absent.",
                path,
                e
            );
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read local draft {:?}: {}. Treating as absent.",
                path,
                e
            );
            return Ok(None);
        }

        if let Err(e) = file.unlock() {
            tracing::warn!(
                "Unable to release lock on local draft {:?}: {}. Treating as absent.",
                path,
                e
            );
            return Ok(None);
        }

        match serde_json::from_str::<Draft>(&contents) {
            Ok(draft) if draft.user_id == user_id => {
                tracing::debug!("Loaded local draft {} from {:?}", draft.draft_id, path);
                Ok(Some(draft))
            }
            Ok(draft) => {
                tracing::warn!(
                    "Local draft at {:?} belongs to user {}, not {}. Treating as absent.",
                    path,
                    draft.user_id,
                    user_id
                );
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse local draft {:?}: {}. Treating as absent.",
                    path,
                    e
                );
                Ok(None)
            }
        }
    }

    /// Save a draft for its owning user
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, draft: &Draft) -> Result<()> {
        let path = self.path_for(&draft.user_id);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "draft path missing parent")
        })?)?;

        // Acquire exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(draft)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace old draft file
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved local draft {} to {:?}", draft.draft_id, path);
        Ok(())
    }

    /// Remove the stored draft for a user, if any
    pub fn clear(&self, user_id: &str) -> Result<()> {
        let path = self.path_for(user_id);
        if path.exists() {
            std::fs::remove_file(&path)?;
            tracing::debug!("Cleared local draft for user {}", user_id);
        }
        Ok(())
    }

    /// The directory this store writes into (for diagnostics and tests)
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

//! Core domain types for the workout session draft engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - The Draft root aggregate and its exercise/set entries
//! - Prescriptions (planned targets) and last-session history snapshots
//! - The UI navigation cursor
//! - The single has-data predicate every other module reuses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hard ceiling on sets per exercise, shared by the builder and mutators.
pub const MAX_SETS_PER_EXERCISE: u32 = 20;

// ============================================================================
// Exercise Classification
// ============================================================================

/// Broad exercise classification; drives which performance fields matter
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Strength,
    Cardio,
}

// ============================================================================
// Prescription and History Types
// ============================================================================

/// Planned target parameters for an exercise, independent of what was logged
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Prescription {
    pub target_sets: Option<u32>,
    pub target_reps: Option<u32>,
    pub target_weight: Option<f64>,
    pub target_time_seconds: Option<u32>,
    pub target_distance: Option<f64>,
    pub superset_group: Option<String>,
    pub superset_index: Option<u32>,
    #[serde(default)]
    pub dropset: bool,
}

/// One set from the user's previous session of this exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistorySet {
    pub set_number: u32,
    #[serde(default)]
    pub drop_index: u32,
    pub reps: Option<u32>,
    pub weight: Option<f64>,
    pub time_seconds: Option<u32>,
    pub distance: Option<f64>,
}

/// Immutable snapshot of the last recorded session for one exercise
///
/// Used only for read comparison (autofill candidates); never mutated.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LastSession {
    pub performed_at: Option<DateTime<Utc>>,
    pub sets: Vec<HistorySet>,
}

// ============================================================================
// Set and Exercise Entries
// ============================================================================

/// A single logged (or to-be-logged) set within the live session
///
/// Performance fields are nullable on purpose: `None` means "not yet
/// entered", which is distinct from an explicit zero.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetEntry {
    /// 1-based, dense, no gaps
    pub set_number: u32,
    /// 0 for a normal set; >0 for a recorded drop sharing the same set_number
    #[serde(default)]
    pub drop_index: u32,
    pub reps: Option<u32>,
    pub weight: Option<f64>,
    pub time_seconds: Option<u32>,
    pub distance: Option<f64>,
    pub notes: Option<String>,
}

impl SetEntry {
    /// Create an empty set with the given number (all performance fields null)
    pub fn empty(set_number: u32) -> Self {
        Self {
            set_number,
            drop_index: 0,
            reps: None,
            weight: None,
            time_seconds: None,
            distance: None,
            notes: None,
        }
    }

    /// The has-data predicate: has the user entered enough for this set to
    /// count as performed?
    ///
    /// Strength: reps or weight non-null. Cardio: time or distance non-null.
    /// This is the single source of truth for completion, progress, and
    /// autofill decisions; call sites must never re-derive it.
    pub fn has_data(&self, kind: ExerciseKind) -> bool {
        match kind {
            ExerciseKind::Strength => self.reps.is_some() || self.weight.is_some(),
            ExerciseKind::Cardio => self.time_seconds.is_some() || self.distance.is_some(),
        }
    }
}

/// One exercise within the live session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseEntry {
    pub exercise_id: String,
    /// Backing template row, when this entry originates from one
    pub workout_exercise_id: Option<String>,
    /// Must stay monotonically consistent with position in `Draft::exercises`
    pub order_index: u32,
    pub name: String,
    pub equipment: Option<String>,
    pub kind: ExerciseKind,
    pub level: Option<String>,
    pub instructions: Option<String>,
    pub prescription: Prescription,
    pub last_session: Option<LastSession>,
    pub best_e1rm: Option<f64>,
    pub total_volume_all_time: Option<f64>,
    /// Explicit user override, independent of the computed completion state
    pub is_done: bool,
    pub sets: Vec<SetEntry>,
}

impl ExerciseEntry {
    /// Count of sets that satisfy the has-data predicate
    pub fn filled_sets(&self) -> usize {
        self.sets.iter().filter(|s| s.has_data(self.kind)).count()
    }
}

// ============================================================================
// Draft Root Aggregate
// ============================================================================

/// Read-only goal context copied from the bootstrap payload
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub goal_id: String,
    pub name: String,
    pub target: Option<f64>,
    pub unit: Option<String>,
}

/// Transient navigation cursor; not meaningful once the session ends
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiCursor {
    pub active_exercise_index: usize,
    /// 1-based, matching SetEntry::set_number
    pub active_set_number: u32,
}

impl Default for UiCursor {
    fn default() -> Self {
        Self {
            active_exercise_index: 0,
            active_set_number: 1,
        }
    }
}

/// The complete state of one in-progress workout session
///
/// Exclusively owned by the active session while live; persisted as an
/// opaque JSON document otherwise. `updated_at` is rewritten on every
/// mutation and is the sole input to store conflict resolution.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Draft {
    pub draft_id: Uuid,
    pub user_id: String,
    pub workout_id: String,
    pub plan_workout_id: Option<String>,
    pub is_plan_workout: bool,
    pub title: String,
    pub notes: Option<String>,
    pub image_key: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Opaque display context from bootstrap; never read by this engine
    #[serde(default)]
    pub header_stats: serde_json::Value,
    #[serde(default)]
    pub goals: Vec<Goal>,
    pub exercises: Vec<ExerciseEntry>,
    pub ui: UiCursor,
}

impl Draft {
    /// Total sets across the draft that satisfy the has-data predicate
    pub fn filled_set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.filled_sets()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_data_strength() {
        let mut set = SetEntry::empty(1);
        assert!(!set.has_data(ExerciseKind::Strength));

        set.reps = Some(5);
        assert!(set.has_data(ExerciseKind::Strength));

        set.reps = None;
        set.weight = Some(60.0);
        assert!(set.has_data(ExerciseKind::Strength));

        // Cardio fields don't count for strength
        set.weight = None;
        set.time_seconds = Some(120);
        assert!(!set.has_data(ExerciseKind::Strength));
    }

    #[test]
    fn test_has_data_cardio() {
        let mut set = SetEntry::empty(1);
        assert!(!set.has_data(ExerciseKind::Cardio));

        set.distance = Some(5.0);
        assert!(set.has_data(ExerciseKind::Cardio));

        set.distance = None;
        set.time_seconds = Some(1800);
        assert!(set.has_data(ExerciseKind::Cardio));

        // Strength fields don't count for cardio
        set.time_seconds = None;
        set.reps = Some(10);
        assert!(!set.has_data(ExerciseKind::Cardio));
    }

    #[test]
    fn test_has_data_zero_is_not_null() {
        let mut set = SetEntry::empty(1);
        set.weight = Some(0.0);
        assert!(set.has_data(ExerciseKind::Strength));
    }

    #[test]
    fn test_has_data_idempotent() {
        let mut set = SetEntry::empty(3);
        set.reps = Some(8);

        let first = set.has_data(ExerciseKind::Strength);
        let second = set.has_data(ExerciseKind::Strength);
        assert_eq!(first, second);
        assert!(first);
    }
}

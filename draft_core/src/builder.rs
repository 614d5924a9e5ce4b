//! Draft construction from a one-shot bootstrap payload.
//!
//! The bootstrap payload is the single snapshot fetched from the backend
//! when a brand-new session starts: workout metadata, goals, and the
//! per-exercise prescription + last-session history. Building a draft from
//! it is deterministic apart from the freshly generated draft id.

use crate::{
    Draft, Error, ExerciseEntry, ExerciseKind, Goal, LastSession, Prescription, Result, SetEntry,
    UiCursor, MAX_SETS_PER_EXERCISE,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Workout metadata portion of the bootstrap payload
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BootstrapWorkout {
    pub workout_id: String,
    pub plan_workout_id: Option<String>,
    #[serde(default)]
    pub is_plan_workout: bool,
    pub title: String,
    pub notes: Option<String>,
    pub image_key: Option<String>,
    #[serde(default)]
    pub header_stats: serde_json::Value,
}

/// One exercise row of the bootstrap payload
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BootstrapExercise {
    pub exercise_id: String,
    pub workout_exercise_id: Option<String>,
    pub order_index: u32,
    pub name: String,
    pub equipment: Option<String>,
    pub kind: ExerciseKind,
    pub level: Option<String>,
    pub instructions: Option<String>,
    #[serde(default)]
    pub prescription: Prescription,
    pub last_session: Option<LastSession>,
    pub best_e1rm: Option<f64>,
    pub total_volume_all_time: Option<f64>,
}

/// The complete one-shot bootstrap snapshot
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BootstrapPayload {
    pub workout: BootstrapWorkout,
    #[serde(default)]
    pub goals: Vec<Goal>,
    pub exercises: Vec<BootstrapExercise>,
}

/// Build a fresh Draft from a bootstrap payload
///
/// Exercises are ordered by `order_index`; each gets an initial set list
/// sized to its prescribed target (clamped to [1, 20], defaulting to 1)
/// with all performance fields null. `started_at` and `updated_at` are both
/// the build instant.
pub fn build_draft(payload: &BootstrapPayload, user_id: &str, now: DateTime<Utc>) -> Draft {
    let mut exercises: Vec<&BootstrapExercise> = payload.exercises.iter().collect();
    exercises.sort_by_key(|e| e.order_index);

    let exercises: Vec<ExerciseEntry> = exercises
        .into_iter()
        .map(|e| {
            let set_count = e
                .prescription
                .target_sets
                .unwrap_or(1)
                .clamp(1, MAX_SETS_PER_EXERCISE);

            ExerciseEntry {
                exercise_id: e.exercise_id.clone(),
                workout_exercise_id: e.workout_exercise_id.clone(),
                order_index: e.order_index,
                name: e.name.clone(),
                equipment: e.equipment.clone(),
                kind: e.kind,
                level: e.level.clone(),
                instructions: e.instructions.clone(),
                prescription: e.prescription.clone(),
                last_session: e.last_session.clone(),
                best_e1rm: e.best_e1rm,
                total_volume_all_time: e.total_volume_all_time,
                is_done: false,
                sets: (1..=set_count).map(SetEntry::empty).collect(),
            }
        })
        .collect();

    tracing::info!(
        "Built draft for workout {} with {} exercises",
        payload.workout.workout_id,
        exercises.len()
    );

    Draft {
        draft_id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        workout_id: payload.workout.workout_id.clone(),
        plan_workout_id: payload.workout.plan_workout_id.clone(),
        is_plan_workout: payload.workout.is_plan_workout,
        title: payload.workout.title.clone(),
        notes: payload.workout.notes.clone(),
        image_key: payload.workout.image_key.clone(),
        started_at: now,
        updated_at: now,
        header_stats: payload.workout.header_stats.clone(),
        goals: payload.goals.clone(),
        exercises,
        ui: UiCursor::default(),
    }
}

/// Source of bootstrap payloads (the backend bootstrap RPC seam)
pub trait BootstrapSource {
    fn fetch(
        &self,
        workout_id: &str,
        plan_workout_id: Option<&str>,
    ) -> Result<BootstrapPayload>;
}

/// File-backed bootstrap source
///
/// Reads a payload prepared by an external system from a JSON file. Unlike
/// the draft stores, a broken payload here is a hard error: a new session
/// cannot start without it.
pub struct FileBootstrap {
    path: PathBuf,
}

impl FileBootstrap {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BootstrapSource for FileBootstrap {
    fn fetch(
        &self,
        workout_id: &str,
        _plan_workout_id: Option<&str>,
    ) -> Result<BootstrapPayload> {
        let payload = load_bootstrap_file(&self.path)?;
        if payload.workout.workout_id != workout_id {
            return Err(Error::Bootstrap(format!(
                "Payload at {:?} is for workout {}, not {}",
                self.path, payload.workout.workout_id, workout_id
            )));
        }
        Ok(payload)
    }
}

/// Load and parse a bootstrap payload from a JSON file
pub fn load_bootstrap_file(path: &Path) -> Result<BootstrapPayload> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Bootstrap(format!("Failed to read {:?}: {}", path, e)))?;

    let payload: BootstrapPayload = serde_json::from_str(&contents)
        .map_err(|e| Error::Bootstrap(format!("Failed to parse {:?}: {}", path, e)))?;

    tracing::debug!(
        "Loaded bootstrap payload for workout {} from {:?}",
        payload.workout.workout_id,
        path
    );
    Ok(payload)
}

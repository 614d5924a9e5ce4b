//! Read-only derived views over a Draft.
//!
//! Everything here is a pure function of the draft value: completion
//! states, progress counts, the call-to-action label, superset letters,
//! formatted set summaries, and session-to-date volume. Nothing reads or
//! writes storage.

use crate::{Draft, ExerciseEntry, ExerciseKind, SetEntry};
use std::collections::BTreeMap;

/// Per-set completion state, derived from the has-data predicate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetState {
    Empty,
    Filled,
}

/// Per-exercise completion state over its sets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExerciseState {
    NotStarted,
    InProgress,
    Complete,
}

pub fn set_state(set: &SetEntry, kind: ExerciseKind) -> SetState {
    if set.has_data(kind) {
        SetState::Filled
    } else {
        SetState::Empty
    }
}

pub fn exercise_state(exercise: &ExerciseEntry) -> ExerciseState {
    let filled = exercise.filled_sets();
    if filled == 0 {
        ExerciseState::NotStarted
    } else if filled == exercise.sets.len() {
        ExerciseState::Complete
    } else {
        ExerciseState::InProgress
    }
}

/// Three-way call-to-action label for an exercise card
pub fn cta_label(exercise: &ExerciseEntry) -> &'static str {
    match exercise_state(exercise) {
        ExerciseState::NotStarted => "Start",
        ExerciseState::InProgress => "Continue",
        ExerciseState::Complete => "Done ✓ Edit",
    }
}

/// Session progress: complete exercises over total
pub fn progress(draft: &Draft) -> (usize, usize) {
    let complete = draft
        .exercises
        .iter()
        .filter(|e| exercise_state(e) == ExerciseState::Complete)
        .count();
    (complete, draft.exercises.len())
}

/// Stable superset-group-to-letter mapping
///
/// Groups are ordered alphabetically by their raw key and labeled A, B, C…
/// then AA, AB… once the alphabet runs out, so no two groups ever share a
/// label.
pub fn superset_labels(draft: &Draft) -> BTreeMap<String, String> {
    draft
        .exercises
        .iter()
        .filter_map(|e| e.prescription.superset_group.clone())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(i, group)| (group, letter_label(i)))
        .collect()
}

/// Spreadsheet-column label for a zero-based position: A..Z, AA, AB…
fn letter_label(mut index: usize) -> String {
    let mut label = String::new();
    loop {
        label.insert(0, (b'A' + (index % 26) as u8) as char);
        index /= 26;
        if index == 0 {
            break;
        }
        index -= 1;
    }
    label
}

/// Short formatted summary of one set
///
/// Strength: "12 reps × 60kg". Cardio: "5.00km • 1800s". Partially entered
/// sets show only the fields they have; empty sets show an em dash.
pub fn format_set(set: &SetEntry, kind: ExerciseKind) -> String {
    let parts: Vec<String> = match kind {
        ExerciseKind::Strength => [
            set.reps.map(|r| format!("{} reps", r)),
            set.weight.map(format_weight),
        ]
        .into_iter()
        .flatten()
        .collect(),
        ExerciseKind::Cardio => [
            set.distance.map(|d| format!("{:.2}km", d)),
            set.time_seconds.map(|t| format!("{}s", t)),
        ]
        .into_iter()
        .flatten()
        .collect(),
    };

    if parts.is_empty() {
        return "—".into();
    }
    let separator = match kind {
        ExerciseKind::Strength => " × ",
        ExerciseKind::Cardio => " • ",
    };
    parts.join(separator)
}

fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{}kg", weight as i64)
    } else {
        format!("{:.1}kg", weight)
    }
}

/// Session-to-date volume: Σ reps × (weight ?? 0) over filled strength sets
pub fn session_volume(draft: &Draft) -> f64 {
    draft
        .exercises
        .iter()
        .filter(|e| e.kind == ExerciseKind::Strength)
        .flat_map(|e| e.sets.iter().filter(|s| s.has_data(e.kind)))
        .map(|s| s.reps.unwrap_or(0) as f64 * s.weight.unwrap_or(0.0))
        .sum()
}

/// True when the cursor sits on the last set of the active exercise
///
/// This is the caller's cue that `next_set` would be a navigation no-op and
/// the editing surface should close instead.
pub fn is_last_set(draft: &Draft) -> bool {
    draft
        .exercises
        .get(draft.ui.active_exercise_index)
        .and_then(|e| e.sets.iter().map(|s| s.set_number).max())
        .map(|max| draft.ui.active_set_number >= max)
        .unwrap_or(true)
}

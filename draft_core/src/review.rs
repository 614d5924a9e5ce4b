//! Pre-commit review: session summary plus non-fatal issues.
//!
//! The review walks the finished draft and produces the numbers an external
//! save collaborator needs, along with warnings the UI surfaces before the
//! session is irrevocably committed. Issues never block; the only hard gate
//! is "at least one filled set across the whole draft".

use crate::selectors::session_volume;
use crate::{Draft, ExerciseKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Aggregate numbers for the commit hand-off
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ReviewSummary {
    pub duration_seconds: i64,
    pub total_exercises: usize,
    /// Exercises with at least one filled set
    pub exercises_with_work: usize,
    /// Filled sets across the whole draft
    pub sets_completed: usize,
    pub total_volume: f64,
}

/// A non-fatal problem worth surfacing before commit
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewIssue {
    /// Strength set with reps but no weight; it still counts as filled but
    /// will be saved with an implicit zero weight
    MissingWeight {
        exercise_name: String,
        set_number: u32,
    },
    /// Exercise the user never logged anything for
    NoCompletedSets { exercise_name: String },
}

impl fmt::Display for ReviewIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewIssue::MissingWeight {
                exercise_name,
                set_number,
            } => write!(
                f,
                "{}: set {} has reps but no weight",
                exercise_name, set_number
            ),
            ReviewIssue::NoCompletedSets { exercise_name } => {
                write!(f, "{}: no completed sets", exercise_name)
            }
        }
    }
}

/// The complete review handed to the save collaborator
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Review {
    pub summary: ReviewSummary,
    pub issues: Vec<ReviewIssue>,
    /// At least one set anywhere is filled
    pub can_commit: bool,
}

/// Build the pre-commit review for a draft
pub fn build_review(draft: &Draft, now: DateTime<Utc>) -> Review {
    let sets_completed = draft.filled_set_count();
    let exercises_with_work = draft
        .exercises
        .iter()
        .filter(|e| e.filled_sets() > 0)
        .count();

    let summary = ReviewSummary {
        duration_seconds: (now - draft.started_at).num_seconds().max(0),
        total_exercises: draft.exercises.len(),
        exercises_with_work,
        sets_completed,
        total_volume: session_volume(draft),
    };

    let mut issues = Vec::new();

    for exercise in &draft.exercises {
        if exercise.kind != ExerciseKind::Strength {
            continue;
        }
        for set in &exercise.sets {
            if set.reps.is_some() && set.weight.is_none() {
                issues.push(ReviewIssue::MissingWeight {
                    exercise_name: exercise.name.clone(),
                    set_number: set.set_number,
                });
            }
        }
    }

    for exercise in &draft.exercises {
        if exercise.filled_sets() == 0 {
            issues.push(ReviewIssue::NoCompletedSets {
                exercise_name: exercise.name.clone(),
            });
        }
    }

    Review {
        summary,
        issues,
        can_commit: sets_completed > 0,
    }
}

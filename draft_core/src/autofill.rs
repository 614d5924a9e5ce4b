//! Pre-fill resolution for empty sets.
//!
//! When the user opens an empty set, the resolver picks the best candidate
//! values from either the immediately preceding set in the current session
//! or the historical last-session record, so repeat sessions feel
//! continuous. It is purely a convenience: autofill never touches a set
//! that already holds data, and the user may overwrite anything it fills.

use crate::mutate::stamped;
use crate::{Draft, Error, ExerciseKind, Result};
use chrono::{DateTime, Utc};

/// Estimated one-rep-max (Epley): `weight * (1 + reps / 30)`
///
/// Unusable (None) for missing or non-positive inputs. Used only to rank
/// autofill candidates, never shown to the user as a projection.
pub fn estimate_one_rep_max(weight: Option<f64>, reps: Option<u32>) -> Option<f64> {
    let weight = weight.filter(|w| *w > 0.0)?;
    let reps = reps.filter(|r| *r > 0)?;
    Some(weight * (1.0 + reps as f64 / 30.0))
}

#[derive(Clone, Copy, Debug)]
struct StrengthCandidate {
    reps: Option<u32>,
    weight: Option<f64>,
}

impl StrengthCandidate {
    fn score(&self) -> Option<f64> {
        estimate_one_rep_max(self.weight, self.reps)
    }
}

/// Pre-fill one empty set from the best available candidate
///
/// No-op (input returned unchanged) when the target set already has data or
/// no usable candidate exists. When values are filled, the draft is
/// restamped like any other mutation.
pub fn autofill_set(
    draft: &Draft,
    exercise_index: usize,
    set_number: u32,
    now: DateTime<Utc>,
) -> Result<Draft> {
    let exercise = draft.exercises.get(exercise_index).ok_or_else(|| {
        Error::Draft(format!(
            "Exercise index {} out of range ({} exercises)",
            exercise_index,
            draft.exercises.len()
        ))
    })?;

    let target = exercise
        .sets
        .iter()
        .find(|s| s.set_number == set_number && s.drop_index == 0)
        .ok_or_else(|| {
            Error::Draft(format!(
                "Set {} not found on exercise {}",
                set_number, exercise_index
            ))
        })?;

    // Never overwrite user input
    if target.has_data(exercise.kind) {
        return Ok(draft.clone());
    }

    // The set logged just before this one in the current session
    let previous = (set_number > 1)
        .then(|| {
            exercise
                .sets
                .iter()
                .find(|s| s.set_number == set_number - 1 && s.drop_index == 0)
        })
        .flatten()
        .filter(|s| s.has_data(exercise.kind));

    let history = exercise.last_session.as_ref();

    match exercise.kind {
        ExerciseKind::Cardio => {
            let candidate = previous
                .map(|s| (s.time_seconds, s.distance))
                .or_else(|| {
                    // Same set number last session
                    history
                        .and_then(|h| h.sets.iter().find(|s| s.set_number == set_number))
                        .filter(|s| s.time_seconds.is_some() || s.distance.is_some())
                        .map(|s| (s.time_seconds, s.distance))
                })
                .or_else(|| {
                    // Any historical set with cardio data, most recent first
                    history
                        .and_then(|h| {
                            h.sets
                                .iter()
                                .rev()
                                .find(|s| s.time_seconds.is_some() || s.distance.is_some())
                        })
                        .map(|s| (s.time_seconds, s.distance))
                });

            let Some((time_seconds, distance)) = candidate else {
                return Ok(draft.clone());
            };

            let mut next = stamped(draft, now);
            let set = set_mut(&mut next, exercise_index, set_number);
            set.time_seconds = time_seconds;
            set.distance = distance;
            Ok(next)
        }

        ExerciseKind::Strength => {
            let in_session = previous.map(|s| StrengthCandidate {
                reps: s.reps,
                weight: s.weight,
            });
            let historical = history
                .and_then(|h| h.sets.iter().find(|s| s.set_number == set_number))
                .map(|s| StrengthCandidate {
                    reps: s.reps,
                    weight: s.weight,
                });

            // Adopt whichever estimates stronger. The user may already have
            // beaten their history earlier in this session; the next set
            // should start from the better number.
            let candidate = match (
                in_session.and_then(|c| c.score().map(|s| (c, s))),
                historical.and_then(|c| c.score().map(|s| (c, s))),
            ) {
                (Some((a, sa)), Some((b, sb))) => Some(if sa >= sb { a } else { b }),
                (Some((a, _)), None) => Some(a),
                (None, Some((b, _))) => Some(b),
                (None, None) => None,
            };

            let Some(candidate) = candidate else {
                return Ok(draft.clone());
            };

            tracing::debug!(
                "Autofilling set {} on exercise {} from {:?}",
                set_number,
                exercise_index,
                candidate
            );

            let mut next = stamped(draft, now);
            let set = set_mut(&mut next, exercise_index, set_number);
            set.reps = candidate.reps;
            set.weight = candidate.weight;
            Ok(next)
        }
    }
}

fn set_mut<'a>(draft: &'a mut Draft, exercise_index: usize, set_number: u32) -> &'a mut crate::SetEntry {
    draft.exercises[exercise_index]
        .sets
        .iter_mut()
        .find(|s| s.set_number == set_number && s.drop_index == 0)
        .expect("target set checked before restamp")
}

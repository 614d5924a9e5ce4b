//! Pure state-transition functions over a Draft.
//!
//! Every mutator takes the current draft by reference and returns a new
//! one; inputs are never modified. Each result carries a strictly newer
//! `updated_at` (clamped to at least 1 ms past the previous stamp, so
//! monotonicity holds even under a frozen clock). Persistence is the
//! caller's job: local synchronously, remote via the debounced sync.

use crate::{Draft, Error, Result, MAX_SETS_PER_EXERCISE, SetEntry};
use chrono::{DateTime, Duration, Utc};

/// One field replacement on a set
///
/// Numeric-or-null by construction; no other validation happens here.
/// Range checking is a Review concern, not a mutation concern.
#[derive(Clone, Debug, PartialEq)]
pub enum SetPatch {
    Reps(Option<u32>),
    Weight(Option<f64>),
    TimeSeconds(Option<u32>),
    Distance(Option<f64>),
    Notes(Option<String>),
}

/// New stamp: `now`, but never at or behind the previous stamp
fn advance(prev: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = prev + Duration::milliseconds(1);
    if now > floor {
        now
    } else {
        floor
    }
}

pub(crate) fn stamped(draft: &Draft, now: DateTime<Utc>) -> Draft {
    let mut next = draft.clone();
    next.updated_at = advance(draft.updated_at, now);
    next
}

fn check_exercise(draft: &Draft, exercise_index: usize) -> Result<()> {
    if exercise_index >= draft.exercises.len() {
        return Err(Error::Draft(format!(
            "Exercise index {} out of range ({} exercises)",
            exercise_index,
            draft.exercises.len()
        )));
    }
    Ok(())
}

/// Replace one field on the matching set
pub fn update_set(
    draft: &Draft,
    exercise_index: usize,
    set_number: u32,
    patch: SetPatch,
    now: DateTime<Utc>,
) -> Result<Draft> {
    check_exercise(draft, exercise_index)?;

    let mut next = stamped(draft, now);
    let exercise = &mut next.exercises[exercise_index];
    let set = exercise
        .sets
        .iter_mut()
        .find(|s| s.set_number == set_number && s.drop_index == 0)
        .ok_or_else(|| {
            Error::Draft(format!(
                "Set {} not found on exercise {}",
                set_number, exercise_index
            ))
        })?;

    match patch {
        SetPatch::Reps(v) => set.reps = v,
        SetPatch::Weight(v) => set.weight = v,
        SetPatch::TimeSeconds(v) => set.time_seconds = v,
        SetPatch::Distance(v) => set.distance = v,
        SetPatch::Notes(v) => set.notes = v,
    }

    Ok(next)
}

/// Append a new empty set (next dense set number, capped at 20)
pub fn add_set(draft: &Draft, exercise_index: usize, now: DateTime<Utc>) -> Result<Draft> {
    check_exercise(draft, exercise_index)?;

    let mut next = stamped(draft, now);
    let exercise = &mut next.exercises[exercise_index];

    let max_number = exercise
        .sets
        .iter()
        .map(|s| s.set_number)
        .max()
        .unwrap_or(0);

    if max_number >= MAX_SETS_PER_EXERCISE {
        tracing::debug!(
            "Exercise {} already at the {}-set cap",
            exercise_index,
            MAX_SETS_PER_EXERCISE
        );
        return Ok(next);
    }

    exercise.sets.push(SetEntry::empty(max_number + 1));
    Ok(next)
}

/// Remove the last set; a no-op when only one remains
///
/// An exercise always keeps at least one set. The UI cursor's set number is
/// clamped to the new length when it points at this exercise.
pub fn remove_set(draft: &Draft, exercise_index: usize, now: DateTime<Utc>) -> Result<Draft> {
    check_exercise(draft, exercise_index)?;

    let mut next = stamped(draft, now);
    let exercise = &mut next.exercises[exercise_index];

    if exercise.sets.len() <= 1 {
        return Ok(next);
    }

    exercise.sets.pop();
    let max_number = exercise
        .sets
        .iter()
        .map(|s| s.set_number)
        .max()
        .unwrap_or(1);

    if next.ui.active_exercise_index == exercise_index
        && next.ui.active_set_number > max_number
    {
        next.ui.active_set_number = max_number;
    }

    Ok(next)
}

/// Set the explicit done flag on an exercise
///
/// This is a user override, fully independent of the computed completion
/// state derived from the has-data predicate.
pub fn toggle_exercise_done(
    draft: &Draft,
    exercise_index: usize,
    done: bool,
    now: DateTime<Utc>,
) -> Result<Draft> {
    check_exercise(draft, exercise_index)?;

    let mut next = stamped(draft, now);
    next.exercises[exercise_index].is_done = done;
    Ok(next)
}

/// Move the cursor to another exercise, opening at its first set
pub fn set_active_exercise(
    draft: &Draft,
    exercise_index: usize,
    now: DateTime<Utc>,
) -> Result<Draft> {
    check_exercise(draft, exercise_index)?;

    let mut next = stamped(draft, now);
    next.ui.active_exercise_index = exercise_index;
    next.ui.active_set_number = 1;
    Ok(next)
}

/// Move the cursor back one set; a no-op on the first set
pub fn prev_set(draft: &Draft, now: DateTime<Utc>) -> Result<Draft> {
    let mut next = stamped(draft, now);
    if next.ui.active_set_number > 1 {
        next.ui.active_set_number -= 1;
    }
    Ok(next)
}

/// Move the cursor forward one set
///
/// On the last set this is a navigation no-op; the caller should use the
/// selectors' last-set cue to close the editing surface instead.
pub fn next_set(draft: &Draft, now: DateTime<Utc>) -> Result<Draft> {
    let mut next = stamped(draft, now);
    let max_number = next
        .exercises
        .get(next.ui.active_exercise_index)
        .and_then(|e| e.sets.iter().map(|s| s.set_number).max())
        .unwrap_or(1);

    if next.ui.active_set_number < max_number {
        next.ui.active_set_number += 1;
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_draft, BootstrapExercise, BootstrapPayload, BootstrapWorkout};
    use crate::{ExerciseKind, Prescription};

    fn test_draft() -> Draft {
        let payload = BootstrapPayload {
            workout: BootstrapWorkout {
                workout_id: "w1".into(),
                plan_workout_id: None,
                is_plan_workout: false,
                title: "Full Body".into(),
                notes: None,
                image_key: None,
                header_stats: serde_json::Value::Null,
            },
            goals: vec![],
            exercises: vec![BootstrapExercise {
                exercise_id: "squat".into(),
                workout_exercise_id: None,
                order_index: 0,
                name: "Back Squat".into(),
                equipment: Some("barbell".into()),
                kind: ExerciseKind::Strength,
                level: None,
                instructions: None,
                prescription: Prescription {
                    target_sets: Some(3),
                    ..Default::default()
                },
                last_session: None,
                best_e1rm: None,
                total_volume_all_time: None,
            }],
        };
        build_draft(&payload, "u1", Utc::now())
    }

    #[test]
    fn test_mutators_do_not_touch_input() {
        let draft = test_draft();
        let snapshot = draft.clone();

        let _ = update_set(&draft, 0, 1, SetPatch::Reps(Some(5)), Utc::now()).unwrap();
        let _ = add_set(&draft, 0, Utc::now()).unwrap();
        let _ = remove_set(&draft, 0, Utc::now()).unwrap();
        let _ = toggle_exercise_done(&draft, 0, true, Utc::now()).unwrap();
        let _ = next_set(&draft, Utc::now()).unwrap();

        assert_eq!(draft, snapshot);
    }

    #[test]
    fn test_every_mutator_strictly_advances_updated_at() {
        let draft = test_draft();

        // Frozen clock: now == the draft's own stamp
        let now = draft.updated_at;
        let results = [
            update_set(&draft, 0, 1, SetPatch::Weight(Some(60.0)), now).unwrap(),
            add_set(&draft, 0, now).unwrap(),
            remove_set(&draft, 0, now).unwrap(),
            toggle_exercise_done(&draft, 0, true, now).unwrap(),
            set_active_exercise(&draft, 0, now).unwrap(),
            prev_set(&draft, now).unwrap(),
            next_set(&draft, now).unwrap(),
        ];

        for next in results {
            assert!(next.updated_at > draft.updated_at);
        }
    }

    #[test]
    fn test_update_set_replaces_one_field() {
        let draft = test_draft();

        let next = update_set(&draft, 0, 2, SetPatch::Reps(Some(8)), Utc::now()).unwrap();
        assert_eq!(next.exercises[0].sets[1].reps, Some(8));
        assert!(next.exercises[0].sets[1].weight.is_none());
        assert!(next.exercises[0].sets[0].reps.is_none());

        // Null clears the field again
        let cleared = update_set(&next, 0, 2, SetPatch::Reps(None), Utc::now()).unwrap();
        assert!(cleared.exercises[0].sets[1].reps.is_none());
    }

    #[test]
    fn test_update_set_notes() {
        let draft = test_draft();
        let next = update_set(
            &draft,
            0,
            1,
            SetPatch::Notes(Some("felt heavy".into())),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(next.exercises[0].sets[0].notes.as_deref(), Some("felt heavy"));
    }

    #[test]
    fn test_update_set_bad_references() {
        let draft = test_draft();
        assert!(update_set(&draft, 5, 1, SetPatch::Reps(Some(1)), Utc::now()).is_err());
        assert!(update_set(&draft, 0, 99, SetPatch::Reps(Some(1)), Utc::now()).is_err());
    }

    #[test]
    fn test_add_set_appends_dense_numbers() {
        let draft = test_draft();
        let next = add_set(&draft, 0, Utc::now()).unwrap();

        assert_eq!(next.exercises[0].sets.len(), 4);
        let added = next.exercises[0].sets.last().unwrap();
        assert_eq!(added.set_number, 4);
        assert_eq!(added.drop_index, 0);
        assert!(added.reps.is_none());
    }

    #[test]
    fn test_add_set_caps_at_twenty() {
        let mut draft = test_draft();
        for _ in 0..30 {
            draft = add_set(&draft, 0, Utc::now()).unwrap();
        }
        assert_eq!(draft.exercises[0].sets.len(), 20);
        assert_eq!(draft.exercises[0].sets.last().unwrap().set_number, 20);
    }

    #[test]
    fn test_remove_set_never_goes_below_one() {
        let mut draft = test_draft();
        for _ in 0..10 {
            draft = remove_set(&draft, 0, Utc::now()).unwrap();
        }
        assert_eq!(draft.exercises[0].sets.len(), 1);
    }

    #[test]
    fn test_remove_set_clamps_cursor() {
        let mut draft = test_draft();
        draft.ui.active_set_number = 3;

        let next = remove_set(&draft, 0, Utc::now()).unwrap();
        assert_eq!(next.exercises[0].sets.len(), 2);
        assert_eq!(next.ui.active_set_number, 2);
    }

    #[test]
    fn test_add_then_remove_restores_sets_exactly() {
        let draft = update_set(
            &test_draft(),
            0,
            1,
            SetPatch::Weight(Some(62.5)),
            Utc::now(),
        )
        .unwrap();

        let added = add_set(&draft, 0, Utc::now()).unwrap();
        let restored = remove_set(&added, 0, Utc::now()).unwrap();

        assert_eq!(restored.exercises[0].sets, draft.exercises[0].sets);
    }

    #[test]
    fn test_toggle_done_is_independent_of_fill_state() {
        let draft = test_draft();
        assert_eq!(draft.exercises[0].filled_sets(), 0);

        let next = toggle_exercise_done(&draft, 0, true, Utc::now()).unwrap();
        assert!(next.exercises[0].is_done);
        assert_eq!(next.exercises[0].filled_sets(), 0);

        let back = toggle_exercise_done(&next, 0, false, Utc::now()).unwrap();
        assert!(!back.exercises[0].is_done);
    }

    #[test]
    fn test_navigation_touches_only_ui() {
        let draft = test_draft();

        let forward = next_set(&draft, Utc::now()).unwrap();
        assert_eq!(forward.ui.active_set_number, 2);
        assert_eq!(forward.exercises, draft.exercises);

        let back = prev_set(&forward, Utc::now()).unwrap();
        assert_eq!(back.ui.active_set_number, 1);

        // prev on the first set stays put
        let still = prev_set(&back, Utc::now()).unwrap();
        assert_eq!(still.ui.active_set_number, 1);
    }

    #[test]
    fn test_next_set_on_last_set_is_a_noop() {
        let mut draft = test_draft();
        draft.ui.active_set_number = 3;

        let next = next_set(&draft, Utc::now()).unwrap();
        assert_eq!(next.ui.active_set_number, 3);
    }
}

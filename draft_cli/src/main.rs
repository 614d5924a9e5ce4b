use chrono::Utc;
use clap::{Parser, Subcommand};
use draft_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repdraft")]
#[command(about = "Live workout session draft engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Skip the remote store entirely (offline mode)
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start (or resume) a session for a workout
    Start {
        #[arg(long)]
        user: String,

        #[arg(long)]
        workout: String,

        #[arg(long)]
        plan_workout: Option<String>,

        /// Bootstrap payload file (workout definition + history snapshot)
        #[arg(long)]
        bootstrap: PathBuf,
    },

    /// Show the active session
    Status {
        #[arg(long)]
        user: String,
    },

    /// Log values on one set (1-based exercise position and set number)
    Log {
        #[arg(long)]
        user: String,

        #[arg(long)]
        exercise: usize,

        #[arg(long)]
        set: u32,

        #[arg(long)]
        reps: Option<u32>,

        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        time: Option<u32>,

        #[arg(long)]
        distance: Option<f64>,

        #[arg(long)]
        notes: Option<String>,

        /// Pre-fill the set from the best candidate before applying values
        #[arg(long)]
        autofill: bool,
    },

    /// Append a set to an exercise
    AddSet {
        #[arg(long)]
        user: String,

        #[arg(long)]
        exercise: usize,
    },

    /// Remove the last set of an exercise
    RemoveSet {
        #[arg(long)]
        user: String,

        #[arg(long)]
        exercise: usize,
    },

    /// Mark an exercise done (or not done)
    Done {
        #[arg(long)]
        user: String,

        #[arg(long)]
        exercise: usize,

        #[arg(long)]
        undone: bool,
    },

    /// Show the pre-commit review
    Review {
        #[arg(long)]
        user: String,
    },

    /// Commit the session and clear the draft stores
    Complete {
        #[arg(long)]
        user: String,
    },

    /// Discard the session without saving
    Discard {
        #[arg(long)]
        user: String,
    },
}

/// Resume-only bootstrap source; commands other than `start` must find an
/// existing draft
struct NoBootstrap;

impl BootstrapSource for NoBootstrap {
    fn fetch(
        &self,
        _workout_id: &str,
        _plan_workout_id: Option<&str>,
    ) -> Result<BootstrapPayload> {
        Err(Error::Config(
            "No active session; run `repdraft start` first".into(),
        ))
    }
}

fn main() -> Result<()> {
    draft_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let prefer_remote = config.sync.prefer_remote && !cli.offline;

    let local = LocalStore::new(&data_dir);
    let remote = FileRemote::new(data_dir.join("remote"));

    match cli.command {
        Commands::Start {
            user,
            workout,
            plan_workout,
            bootstrap,
        } => {
            let source = FileBootstrap::new(&bootstrap);
            let req = BootRequest {
                user_id: user,
                workout_id: Some(workout),
                plan_workout_id: plan_workout,
                prefer_remote,
            };
            let draft = resolve_session(&local, &remote, &source, &req, Utc::now())?;
            if prefer_remote {
                push_remote(&remote, &config, &draft);
            }
            print_status(&draft);
            Ok(())
        }

        Commands::Status { user } => {
            let draft = resume(&local, &remote, &user, prefer_remote)?;
            print_status(&draft);
            Ok(())
        }

        Commands::Log {
            user,
            exercise,
            set,
            reps,
            weight,
            time,
            distance,
            notes,
            autofill,
        } => {
            let mut draft = resume(&local, &remote, &user, prefer_remote)?;
            let ei = exercise_index(&draft, exercise)?;

            if autofill && config.autofill.enabled {
                draft = autofill_set(&draft, ei, set, Utc::now())?;
            }

            let patches = [
                reps.map(|v| SetPatch::Reps(Some(v))),
                weight.map(|v| SetPatch::Weight(Some(v))),
                time.map(|v| SetPatch::TimeSeconds(Some(v))),
                distance.map(|v| SetPatch::Distance(Some(v))),
                notes.map(|v| SetPatch::Notes(Some(v))),
            ];
            for patch in patches.into_iter().flatten() {
                draft = mutate::update_set(&draft, ei, set, patch, Utc::now())?;
            }

            persist(&local, &remote, &config, prefer_remote, &draft)?;

            let entry = &draft.exercises[ei];
            let logged = entry
                .sets
                .iter()
                .find(|s| s.set_number == set && s.drop_index == 0)
                .map(|s| selectors::format_set(s, entry.kind))
                .unwrap_or_else(|| "—".into());
            println!("✓ {} set {}: {}", entry.name, set, logged);
            Ok(())
        }

        Commands::AddSet { user, exercise } => {
            let draft = resume(&local, &remote, &user, prefer_remote)?;
            let ei = exercise_index(&draft, exercise)?;
            let draft = mutate::add_set(&draft, ei, Utc::now())?;
            persist(&local, &remote, &config, prefer_remote, &draft)?;
            println!(
                "✓ {} now has {} sets",
                draft.exercises[ei].name,
                draft.exercises[ei].sets.len()
            );
            Ok(())
        }

        Commands::RemoveSet { user, exercise } => {
            let draft = resume(&local, &remote, &user, prefer_remote)?;
            let ei = exercise_index(&draft, exercise)?;
            let draft = mutate::remove_set(&draft, ei, Utc::now())?;
            persist(&local, &remote, &config, prefer_remote, &draft)?;
            println!(
                "✓ {} now has {} sets",
                draft.exercises[ei].name,
                draft.exercises[ei].sets.len()
            );
            Ok(())
        }

        Commands::Done {
            user,
            exercise,
            undone,
        } => {
            let draft = resume(&local, &remote, &user, prefer_remote)?;
            let ei = exercise_index(&draft, exercise)?;
            let draft = mutate::toggle_exercise_done(&draft, ei, !undone, Utc::now())?;
            persist(&local, &remote, &config, prefer_remote, &draft)?;
            println!(
                "✓ {} marked {}",
                draft.exercises[ei].name,
                if undone { "not done" } else { "done" }
            );
            Ok(())
        }

        Commands::Review { user } => {
            let draft = resume(&local, &remote, &user, prefer_remote)?;
            print_review(&draft);
            Ok(())
        }

        Commands::Complete { user } => {
            let draft = resume(&local, &remote, &user, prefer_remote)?;
            let review = build_review(&draft, Utc::now());
            if !review.can_commit {
                println!("Nothing logged yet - nothing to commit.");
                println!("Use `repdraft discard` to abandon the session instead.");
                return Ok(());
            }
            // The permanent save belongs to the backend collaborator; the
            // draft is handed off and both store copies destroyed.
            print_review(&draft);
            complete_session(&local, &remote, &user)?;
            println!("\n✓ Session committed!");
            Ok(())
        }

        Commands::Discard { user } => {
            discard_session(&local, &remote, &user)?;
            println!("✓ Session discarded.");
            Ok(())
        }
    }
}

/// Boot an existing session (no bootstrap fallback)
fn resume(
    local: &LocalStore,
    remote: &FileRemote,
    user: &str,
    prefer_remote: bool,
) -> Result<Draft> {
    let req = BootRequest {
        user_id: user.to_string(),
        workout_id: None,
        plan_workout_id: None,
        prefer_remote,
    };
    resolve_session(local, remote, &NoBootstrap, &req, Utc::now())
}

/// Save locally (synchronous, the durability backbone), then queue and
/// flush the remote copy; a one-shot process exits right after, which is
/// exactly the forced-flush suspension point.
fn persist(
    local: &LocalStore,
    remote: &FileRemote,
    config: &Config,
    prefer_remote: bool,
    draft: &Draft,
) -> Result<()> {
    local.save(draft)?;
    if prefer_remote {
        push_remote(remote, config, draft);
    }
    Ok(())
}

fn push_remote(remote: &FileRemote, config: &Config, draft: &Draft) {
    let mut sync = RemoteSync::new(remote.clone(), config.sync.debounce_ms);
    sync.queue(draft, Utc::now());
    sync.flush();
}

/// Convert the 1-based position shown by `status` to an index
fn exercise_index(draft: &Draft, position: usize) -> Result<usize> {
    if position == 0 || position > draft.exercises.len() {
        return Err(Error::Draft(format!(
            "Exercise {} out of range (1..={})",
            position,
            draft.exercises.len()
        )));
    }
    Ok(position - 1)
}

fn print_status(draft: &Draft) {
    let (complete, total) = selectors::progress(draft);
    let letters = selectors::superset_labels(draft);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", draft.title);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Progress: {}/{} exercises", complete, total);
    println!();

    for (i, exercise) in draft.exercises.iter().enumerate() {
        let letter = exercise
            .prescription
            .superset_group
            .as_ref()
            .and_then(|g| letters.get(g))
            .map(|c| format!("[{}] ", c))
            .unwrap_or_default();

        println!(
            "  {}. {}{} — {}",
            i + 1,
            letter,
            exercise.name,
            selectors::cta_label(exercise)
        );

        for set in &exercise.sets {
            println!(
                "       set {}: {}",
                set.set_number,
                selectors::format_set(set, exercise.kind)
            );
        }
    }

    let volume = selectors::session_volume(draft);
    if volume > 0.0 {
        println!();
        println!("  Volume so far: {}kg", volume);
    }
    println!();
}

fn print_review(draft: &Draft) {
    let review = build_review(draft, Utc::now());

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  SESSION REVIEW");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  Duration: {} min",
        review.summary.duration_seconds / 60
    );
    println!(
        "  Exercises: {}/{} with work",
        review.summary.exercises_with_work, review.summary.total_exercises
    );
    println!("  Sets completed: {}", review.summary.sets_completed);
    println!("  Total volume: {}kg", review.summary.total_volume);

    if !review.issues.is_empty() {
        println!();
        println!("  Warnings:");
        for issue in &review.issues {
            println!("    ⚠ {}", issue);
        }
    }

    println!();
    if review.can_commit {
        println!("  Ready to commit.");
    } else {
        println!("  Not ready: log at least one set first.");
    }
}

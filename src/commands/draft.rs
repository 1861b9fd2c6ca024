use clap::{Args, Subcommand};

use gymlog::{Gateway, Workout, WorkoutExercise, WorkoutType};

use super::{parse_date, parse_set_arg, resolve_exercise, OutputFormat};

#[derive(Args)]
pub struct DraftCommand {
    #[command(subcommand)]
    pub command: DraftSubcommand,
}

#[derive(Subcommand)]
pub enum DraftSubcommand {
    /// Start a draft for a new workout, or for editing a logged one
    Start {
        /// Workout type (push, pull, legs); required for a new workout
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        workout_type: Option<String>,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Copy the logged workout with this ID into the draft
        #[arg(long, conflicts_with_all = ["workout_type", "date"])]
        from: Option<i64>,
    },

    /// Add a set to a draft
    AddSet {
        /// Set as EXERCISE=WEIGHTxREPS
        set: String,

        /// Draft ID (0 is the draft of a new workout)
        #[arg(long, default_value_t = Workout::UNSAVED_ID)]
        id: i64,
    },

    /// Remove a set from a draft; an exercise left without sets is dropped
    RemoveSet {
        /// Exercise ID or name
        exercise: String,

        /// Set number to remove
        set_number: u32,

        /// Draft ID (0 is the draft of a new workout)
        #[arg(long, default_value_t = Workout::UNSAVED_ID)]
        id: i64,
    },

    /// Show a draft
    Show {
        /// Draft ID (0 is the draft of a new workout)
        #[arg(long, default_value_t = Workout::UNSAVED_ID)]
        id: i64,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List unfinished drafts
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Discard a draft
    Clear {
        /// Draft ID (0 is the draft of a new workout)
        #[arg(long, default_value_t = Workout::UNSAVED_ID)]
        id: i64,
    },

    /// Log the draft as a workout and discard it
    Commit {
        /// Draft ID (0 is the draft of a new workout)
        #[arg(long, default_value_t = Workout::UNSAVED_ID)]
        id: i64,
    },
}

impl DraftCommand {
    pub async fn run(&self, gateway: &Gateway) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            DraftSubcommand::Start {
                workout_type,
                date,
                from,
            } => {
                let draft = match from {
                    Some(id) => gateway
                        .get_workout(*id)
                        .await?
                        .ok_or_else(|| format!("Workout not found: {}", id))?,
                    None => {
                        let workout_type = workout_type
                            .as_deref()
                            .ok_or("--type is required for a new workout")?
                            .parse::<WorkoutType>()?;
                        Workout::new(workout_type, parse_date(date.as_deref())?)
                    }
                };

                if gateway.load_draft(draft.id).await?.is_some() {
                    println!("Replacing existing draft {}", draft.id);
                }
                gateway.save_draft(&draft).await?;

                println!("Started draft {}:", draft.id);
                println!("{}", draft);
                Ok(())
            }

            DraftSubcommand::AddSet { set, id } => {
                let mut draft = load_draft(gateway, *id).await?;

                let (identifier, weight, reps) = parse_set_arg(set)?;
                let exercise = resolve_exercise(gateway, identifier).await?;
                let exercise_id = exercise.id;

                if draft.exercise_mut(exercise_id).is_none() {
                    draft.add_exercise(WorkoutExercise::new(exercise));
                }
                let added = draft
                    .exercise_mut(exercise_id)
                    .map(|entry| entry.add_set(weight, reps).clone())
                    .ok_or_else(|| format!("Exercise not found: {}", identifier))?;

                gateway.save_draft(&draft).await?;
                println!("  {}", added);
                Ok(())
            }

            DraftSubcommand::RemoveSet {
                exercise,
                set_number,
                id,
            } => {
                let mut draft = load_draft(gateway, *id).await?;
                let exercise = resolve_exercise(gateway, exercise).await?;

                let entry = draft
                    .exercise_mut(exercise.id)
                    .ok_or_else(|| format!("{} is not in draft {}", exercise.name, id))?;
                let removed = entry
                    .remove_set(*set_number)
                    .ok_or_else(|| format!("{} has no set {}", exercise.name, set_number))?;
                if entry.sets.is_empty() {
                    draft.remove_exercise(exercise.id);
                }

                gateway.save_draft(&draft).await?;
                println!("Removed from '{}':", exercise.name);
                println!("  {}", removed);
                Ok(())
            }

            DraftSubcommand::Show { id, format } => {
                let draft = load_draft(gateway, *id).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&draft)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", draft);
                    }
                }
                Ok(())
            }

            DraftSubcommand::List { format } => {
                let drafts = gateway.list_drafts().await?;

                if drafts.is_empty() {
                    println!("No drafts found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&drafts)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<6}  {:<10}  {:<6}  {:>9}  {:>5}", "ID", "DATE", "TYPE", "EXERCISES", "SETS");
                        println!("{}", "-".repeat(44));
                        for draft in &drafts {
                            println!(
                                "{:<6}  {:<10}  {:<6}  {:>9}  {:>5}",
                                draft.id,
                                draft.date,
                                draft.workout_type.to_string(),
                                draft.exercises.len(),
                                draft.total_sets()
                            );
                        }
                        println!("\nTotal: {} draft(s)", drafts.len());
                    }
                }
                Ok(())
            }

            DraftSubcommand::Clear { id } => {
                gateway.clear_draft(*id).await?;
                println!("Cleared draft {}", id);
                Ok(())
            }

            DraftSubcommand::Commit { id } => {
                let draft = load_draft(gateway, *id).await?;
                draft.validate()?;

                // Clears the draft in the same transaction
                let saved_id = gateway.upsert_workout(&draft).await?;
                println!("Logged workout {} from draft {}", saved_id, id);
                Ok(())
            }
        }
    }
}

async fn load_draft(gateway: &Gateway, id: i64) -> Result<Workout, Box<dyn std::error::Error>> {
    gateway
        .load_draft(id)
        .await?
        .ok_or_else(|| format!("No draft for workout {}", id).into())
}

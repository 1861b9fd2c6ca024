use clap::{Args, Subcommand};
use futures::StreamExt;
use std::io::{self, Write};

use gymlog::{Gateway, Workout, WorkoutExercise, WorkoutType};

use super::{build_exercises, parse_date, parse_set_arg, resolve_exercise, OutputFormat};

#[derive(Args)]
pub struct WorkoutCommand {
    #[command(subcommand)]
    pub command: WorkoutSubcommand,
}

#[derive(Subcommand)]
pub enum WorkoutSubcommand {
    /// Record a workout
    Log {
        /// Workout type (push, pull, legs)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        workout_type: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Replace the workout with this ID instead of creating a new one
        #[arg(long)]
        id: Option<i64>,

        /// Add an exercise by ID or name (can be repeated)
        #[arg(long = "exercise", short = 'e', value_name = "EXERCISE")]
        exercises: Vec<String>,

        /// Add a set as EXERCISE=WEIGHTxREPS, e.g. "Bench Press=60x10" (can be repeated)
        #[arg(long = "set", short = 's', value_name = "SET")]
        sets: Vec<String>,
    },

    /// Show a workout's details
    Show {
        /// Workout ID
        id: i64,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List workouts, most recent first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Filter by workout type
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        workout_type: Option<String>,

        /// Show at most this many workouts
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Delete a workout
    Delete {
        /// Workout ID
        id: i64,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Append a set to a logged workout
    AddSet {
        /// Workout ID
        id: i64,

        /// Set as EXERCISE=WEIGHTxREPS
        set: String,
    },

    /// Print the workout list every time it changes (Ctrl-C to stop)
    Watch,
}

impl WorkoutCommand {
    pub async fn run(&self, gateway: &Gateway) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WorkoutSubcommand::Log {
                workout_type,
                date,
                id,
                exercises,
                sets,
            } => {
                let workout_type: WorkoutType = workout_type.parse()?;
                let date = parse_date(date.as_deref())?;

                if let Some(id) = id {
                    if gateway.get_workout(*id).await?.is_none() {
                        return Err(format!("Workout not found: {}", id).into());
                    }
                }

                let workout = Workout::new(workout_type, date)
                    .with_id(id.unwrap_or(Workout::UNSAVED_ID))
                    .with_exercises(build_exercises(gateway, exercises, sets).await?);
                workout.validate()?;

                let saved_id = gateway.upsert_workout(&workout).await?;
                let saved = gateway
                    .get_workout(saved_id)
                    .await?
                    .ok_or_else(|| format!("Workout not found: {}", saved_id))?;

                println!("Logged workout:");
                println!("{}", saved);
                Ok(())
            }

            WorkoutSubcommand::Show { id, format } => match gateway.get_workout(*id).await? {
                Some(workout) => {
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&workout)?);
                        }
                        OutputFormat::Text => {
                            println!("{}", workout);
                        }
                    }
                    Ok(())
                }
                None => Err(format!("Workout not found: {}", id).into()),
            },

            WorkoutSubcommand::List {
                format,
                workout_type,
                limit,
            } => {
                let workout_type: Option<WorkoutType> = match workout_type {
                    Some(t) => Some(t.parse::<WorkoutType>()?),
                    None => None,
                };

                let workouts: Vec<Workout> = gateway
                    .list_workouts()
                    .await?
                    .into_iter()
                    .filter(|w| workout_type.map_or(true, |t| w.workout_type == t))
                    .take(limit.unwrap_or(usize::MAX))
                    .collect();

                if workouts.is_empty() {
                    println!("No workouts found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&workouts)?);
                    }
                    OutputFormat::Text => print_workout_table(&workouts),
                }
                Ok(())
            }

            WorkoutSubcommand::Delete { id, force } => {
                let workout = match gateway.get_workout(*id).await? {
                    Some(w) => w,
                    None => return Err(format!("Workout not found: {}", id).into()),
                };

                if !force {
                    print!(
                        "Delete {} workout from {}? [y/N] ",
                        workout.workout_type, workout.date
                    );
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                gateway.delete_workout(workout.id).await?;
                println!("Deleted workout {}", workout.id);
                Ok(())
            }

            WorkoutSubcommand::AddSet { id, set } => {
                let mut workout = match gateway.get_workout(*id).await? {
                    Some(w) => w,
                    None => return Err(format!("Workout not found: {}", id).into()),
                };

                let (identifier, weight, reps) = parse_set_arg(set)?;
                let exercise = resolve_exercise(gateway, identifier).await?;
                let name = exercise.name.clone();
                let exercise_id = exercise.id;

                if workout.exercise_mut(exercise_id).is_none() {
                    workout.add_exercise(WorkoutExercise::new(exercise));
                }
                let added = workout
                    .exercise_mut(exercise_id)
                    .map(|entry| entry.add_set(weight, reps).clone())
                    .ok_or_else(|| format!("Exercise not found: {}", identifier))?;

                gateway.upsert_workout(&workout).await?;
                println!("Added set to '{}' in workout {}:", name, workout.id);
                println!("  {}", added);
                Ok(())
            }

            WorkoutSubcommand::Watch => {
                let mut updates = gateway.watch_workouts();
                loop {
                    tokio::select! {
                        update = updates.next() => match update {
                            Some(Ok(workouts)) => {
                                println!(
                                    "[{}] {} workout(s)",
                                    chrono::Local::now().format("%H:%M:%S"),
                                    workouts.len()
                                );
                                if !workouts.is_empty() {
                                    print_workout_table(&workouts);
                                }
                                println!();
                            }
                            Some(Err(e)) => eprintln!("Error: {}", e),
                            None => break,
                        },
                        _ = tokio::signal::ctrl_c() => break,
                    }
                }
                Ok(())
            }
        }
    }
}

fn print_workout_table(workouts: &[Workout]) {
    println!(
        "{:<6}  {:<10}  {:<6}  {:>9}  {:>5}  {:>10}",
        "ID", "DATE", "TYPE", "EXERCISES", "SETS", "VOLUME"
    );
    println!("{}", "-".repeat(55));
    for workout in workouts {
        println!(
            "{:<6}  {:<10}  {:<6}  {:>9}  {:>5}  {:>10.1}",
            workout.id,
            workout.date,
            workout.workout_type.to_string(),
            workout.exercises.len(),
            workout.total_sets(),
            workout.total_volume()
        );
    }
    println!("\nTotal: {} workout(s)", workouts.len());
}

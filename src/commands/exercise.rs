use clap::{Args, Subcommand};

use gymlog::catalog::{self, CUSTOM_EXERCISE_ID_BASE};
use gymlog::{Exercise, ExerciseCategory, Gateway};

use super::{resolve_exercise, OutputFormat};

#[derive(Args)]
pub struct ExerciseCommand {
    #[command(subcommand)]
    pub command: ExerciseSubcommand,
}

#[derive(Subcommand)]
pub enum ExerciseSubcommand {
    /// List the exercise library
    List {
        /// Filter by category (chest, shoulders, triceps, back, biceps, legs)
        #[arg(long, short)]
        category: Option<String>,

        /// Only show custom exercises
        #[arg(long)]
        custom: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a custom exercise
    Add {
        /// Exercise name
        name: String,

        /// Category (chest, shoulders, triceps, back, biceps, legs)
        #[arg(long, short)]
        category: String,
    },

    /// Delete a custom exercise
    Delete {
        /// Custom exercise ID or name
        identifier: String,
    },

    /// Show how an exercise progressed across workouts
    History {
        /// Exercise ID or name
        identifier: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ExerciseCommand {
    pub async fn run(&self, gateway: &Gateway) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ExerciseSubcommand::List {
                category,
                custom,
                format,
            } => {
                let category: Option<ExerciseCategory> = match category {
                    Some(c) => Some(c.parse::<ExerciseCategory>()?),
                    None => None,
                };

                let exercises: Vec<Exercise> = if *custom {
                    gateway
                        .list_custom_exercises()
                        .await?
                        .into_iter()
                        .filter(|e| category.map_or(true, |c| e.category == c))
                        .collect()
                } else {
                    gateway.exercise_library(category).await?
                };

                if exercises.is_empty() {
                    println!("No exercises found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&exercises)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<6}  {:<30}  {:<10}", "ID", "NAME", "CATEGORY");
                        println!("{}", "-".repeat(56));
                        for exercise in &exercises {
                            let marker = if exercise.is_custom { "  *" } else { "" };
                            println!(
                                "{:<6}  {:<30}  {:<10}{}",
                                exercise.id,
                                exercise.name,
                                exercise.category.to_string(),
                                marker
                            );
                        }
                        println!("\nTotal: {} exercise(s), * = custom", exercises.len());
                    }
                }
                Ok(())
            }

            ExerciseSubcommand::Add { name, category } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err("Exercise name cannot be empty".into());
                }
                let category: ExerciseCategory = category.parse()?;

                if gateway.exercise_name_exists(name).await?
                    || catalog::find_by_name(name, std::iter::empty()).is_some()
                {
                    return Err(format!("An exercise named '{}' already exists", name).into());
                }

                let created = gateway.create_custom_exercise(name, category).await?;
                println!("Created exercise:");
                println!("  {} (id {})", created, created.id);
                Ok(())
            }

            ExerciseSubcommand::Delete { identifier } => {
                let exercise = resolve_exercise(gateway, identifier).await?;
                if exercise.id <= CUSTOM_EXERCISE_ID_BASE {
                    return Err(format!("'{}' is built in and cannot be deleted", exercise.name).into());
                }

                gateway.delete_custom_exercise(exercise.id).await?;
                println!("Deleted exercise: {}", exercise.name);
                Ok(())
            }

            ExerciseSubcommand::History { identifier, format } => {
                let exercise = resolve_exercise(gateway, identifier).await?;
                let history = gateway.exercise_history(exercise.id).await?;

                if history.is_empty() {
                    println!("No logged sets for {}", exercise.name);
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&history)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", exercise.name);
                        println!("{}\n", "=".repeat(exercise.name.len()));
                        println!(
                            "{:<10}  {:>4}  {:>10}  {:>8}  {:>10}",
                            "DATE", "SETS", "MAX WEIGHT", "MAX REPS", "VOLUME"
                        );
                        println!("{}", "-".repeat(50));
                        for entry in &history {
                            println!(
                                "{:<10}  {:>4}  {:>10.1}  {:>8}  {:>10.1}",
                                entry.date.to_string(),
                                entry.sets.len(),
                                entry.max_weight,
                                entry.max_reps,
                                entry.total_volume
                            );
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

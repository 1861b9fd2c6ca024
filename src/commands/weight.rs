use chrono::Local;
use clap::{Args, Subcommand};

use gymlog::Gateway;

use super::{parse_date, OutputFormat};

#[derive(Args)]
pub struct WeightCommand {
    #[command(subcommand)]
    pub command: WeightSubcommand,
}

#[derive(Subcommand)]
pub enum WeightSubcommand {
    /// Log a body-weight measurement
    Log {
        /// Weight in kilograms
        weight: f64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// List logged measurements, most recent first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Show at most this many entries
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Delete a measurement
    Delete {
        /// Entry ID
        id: i64,
    },

    /// Show the latest weight and weekly/monthly averages
    Summary {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl WeightCommand {
    pub async fn run(&self, gateway: &Gateway) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WeightSubcommand::Log { weight, date } => {
                if !weight.is_finite() || *weight <= 0.0 {
                    return Err("Weight must be a positive number".into());
                }
                let date = parse_date(date.as_deref())?;

                let entry = gateway.log_weight(date, *weight).await?;
                println!("Logged {} (id {})", entry, entry.id);
                Ok(())
            }

            WeightSubcommand::List { format, limit } => {
                let mut entries = gateway.list_weights().await?;
                if let Some(limit) = limit {
                    entries.truncate(*limit);
                }

                if entries.is_empty() {
                    println!("No weight entries found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<6}  {:<10}  {:>8}", "ID", "DATE", "WEIGHT");
                        println!("{}", "-".repeat(28));
                        for entry in &entries {
                            println!(
                                "{:<6}  {:<10}  {:>8.1}",
                                entry.id,
                                entry.date.to_string(),
                                entry.weight
                            );
                        }
                        println!("\nTotal: {} entr(ies)", entries.len());
                    }
                }
                Ok(())
            }

            WeightSubcommand::Delete { id } => {
                gateway.delete_weight(*id).await?;
                println!("Deleted weight entry {}", id);
                Ok(())
            }

            WeightSubcommand::Summary { format } => {
                let summary = gateway.weight_summary(Local::now().date_naive()).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                    }
                    OutputFormat::Text => {
                        let Some(latest) = &summary.latest else {
                            println!("No weight entries found");
                            return Ok(());
                        };

                        let average = |value: Option<f64>| {
                            value.map_or_else(|| "-".to_string(), |v| format!("{:.1} kg", v))
                        };
                        println!("Latest:          {}", latest);
                        println!("7-day average:   {}", average(summary.weekly_average));
                        println!("30-day average:  {}", average(summary.monthly_average));
                    }
                }
                Ok(())
            }
        }
    }
}

use clap::{Args, Subcommand};

use super::{CommandResult, OutputFormat};
use gains::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> CommandResult<()> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!("sync:");
                        println!(
                            "  api: {}",
                            config
                                .sync
                                .api_base_url()
                                .unwrap_or_else(|| "(not configured)".to_string())
                        );
                        println!("  auto_sync: {}", config.sync.auto_sync);
                        println!("  interval_secs: {}", config.sync.interval_secs);
                        println!();

                        println!("schedule:");
                        println!(
                            "  {} supplement slot(s), {} planned meal(s), {} plan day(s)",
                            config.schedule.supplements.len(),
                            config.schedule.meal_plan.len(),
                            config.schedule.workout_plan.len()
                        );
                    }
                }
                Ok(())
            }
        }
    }
}

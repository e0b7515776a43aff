//! Sync CLI commands for synchronizing with the server.

use clap::{Args, Subcommand};
use std::time::Duration;

use super::{sync_client, CommandResult, OutputFormat};
use gains::config::Config;
use gains::store::LocalStore;
use gains::sync::{watch, Pulled};

/// Sync with remote server
#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Debug, Subcommand)]
enum SyncSubcommand {
    /// Upload local data
    Push,
    /// Replace local data with the server copy (if the server has any)
    Pull,
    /// Show sync configuration and session state
    Status {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Keep pushing in the background; pulls when the server comes back
    Watch {
        /// Seconds between pushes (defaults to sync.interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Print one stored section from the server
    Remote { data_type: String },
}

impl SyncCommand {
    /// With no subcommand: pull, then push.
    pub async fn run(&self, config: &Config, store: &LocalStore) -> CommandResult<()> {
        let client = sync_client(config, store)?;

        match &self.command {
            None => {
                println!("Syncing with {}...", client.base_url());
                let report = client.full_sync().await?;
                print_pulled(report.pulled);
                println!("Pushed at {}", report.pushed_at.format("%Y-%m-%d %H:%M:%S UTC"));
                println!("Sync complete.");
            }
            Some(SyncSubcommand::Push) => {
                let at = client.push().await?;
                println!("Pushed at {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            Some(SyncSubcommand::Pull) => {
                print_pulled(client.pull().await?);
            }
            Some(SyncSubcommand::Status { format }) => {
                client.check_online().await;
                let status = client.sync_status();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&status)?);
                    }
                    OutputFormat::Text => {
                        println!("Sync Configuration");
                        println!("==================");
                        println!();
                        println!("Server: {}", client.base_url());
                        println!("Auto sync: {}", config.sync.auto_sync);
                        println!(
                            "Server status: {}",
                            if status.is_online { "online" } else { "unreachable" }
                        );
                        match &status.user {
                            Some(user) if status.is_authenticated => {
                                println!("Account: {}", user.email)
                            }
                            _ if status.is_authenticated => println!("Account: logged in"),
                            _ => println!("Account: not logged in"),
                        }
                        match status.last_sync {
                            Some(at) => {
                                println!("Last sync: {}", at.format("%Y-%m-%d %H:%M:%S UTC"))
                            }
                            None => println!("Last sync: never"),
                        }
                    }
                }
            }
            Some(SyncSubcommand::Watch { interval }) => {
                let secs = interval.unwrap_or(config.sync.interval_secs).max(1);
                println!(
                    "Watching {} every {}s (Ctrl-C to stop)",
                    client.base_url(),
                    secs
                );
                let shutdown = async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                };
                let stats = watch(&client, Duration::from_secs(secs), shutdown).await;
                println!(
                    "Stopped: {} push(es), {} pull(s), {} failure(s)",
                    stats.pushes, stats.pulls, stats.failures
                );
            }
            Some(SyncSubcommand::Remote { data_type }) => {
                let data = client.fetch_data_type(data_type).await?;
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
        }

        Ok(())
    }
}

fn print_pulled(pulled: Pulled) {
    match pulled {
        Pulled::Replaced(keys) => println!("Pulled {} section(s) from the server", keys),
        Pulled::Empty => println!("Server has no data yet; kept local data"),
    }
}

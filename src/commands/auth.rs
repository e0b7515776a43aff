//! Account commands: register, login, logout and profile.

use clap::{Args, Subcommand};

use super::{prompt, sync_client, CommandResult, OutputFormat};
use gains::config::Config;
use gains::store::LocalStore;
use gains::sync::Pulled;

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Create an account (local data is cleared)
    Register {
        email: String,

        #[arg(long)]
        name: Option<String>,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and download your data (local data is replaced)
    Login {
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out and clear local data
    Logout,

    /// Show the session and check it with the server
    Status {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or update the account profile
    Profile {
        /// New display name
        #[arg(long)]
        name: Option<String>,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn password_or_prompt(password: &Option<String>) -> std::io::Result<String> {
    match password {
        Some(p) => Ok(p.clone()),
        None => prompt("Password: "),
    }
}

impl AuthCommand {
    pub async fn run(&self, config: &Config, store: &LocalStore) -> CommandResult<()> {
        let client = sync_client(config, store)?;

        match &self.command {
            AuthSubcommand::Register {
                email,
                name,
                password,
            } => {
                let password = password_or_prompt(password)?;
                let user = client.register(email, &password, name.as_deref()).await?;
                println!("Registered {} (id {})", user.email, user.id);
            }
            AuthSubcommand::Login { email, password } => {
                let password = password_or_prompt(password)?;
                let outcome = client.login(email, &password).await?;
                println!("Logged in as {}", outcome.user.email);
                match outcome.pulled {
                    Some(Pulled::Replaced(keys)) => {
                        println!("Downloaded your data ({} section(s))", keys)
                    }
                    Some(Pulled::Empty) => println!("No data on the server yet"),
                    None => println!("Could not download your data; run `gains sync pull` later"),
                }
            }
            AuthSubcommand::Logout => {
                client.logout()?;
                println!("Logged out. Local data cleared.");
            }
            AuthSubcommand::Status { format } => {
                let verified = if client.is_authenticated() {
                    Some(client.verify().await)
                } else {
                    None
                };
                let status = client.sync_status();

                match format {
                    OutputFormat::Json => {
                        let body = serde_json::json!({
                            "status": status,
                            "valid": verified.as_ref().map(|v| v.is_ok()),
                        });
                        println!("{}", serde_json::to_string_pretty(&body)?);
                    }
                    OutputFormat::Text => {
                        println!("Server: {}", client.base_url());
                        match verified {
                            None => println!("Not logged in"),
                            Some(Ok(user)) => println!("Logged in as {}", user.email),
                            Some(Err(e)) => println!("Session invalid: {}", e),
                        }
                    }
                }
            }
            AuthSubcommand::Profile { name, format } => {
                if let Some(name) = name {
                    let user = client.update_profile(name).await?;
                    println!("Name updated to {}", user.name.as_deref().unwrap_or(""));
                }
                let profile = client.profile().await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
                    OutputFormat::Text => {
                        println!("Email: {}", profile.email);
                        println!("Name: {}", profile.name.as_deref().unwrap_or("(not set)"));
                        if let Some(created) = &profile.created_at {
                            println!("Member since: {}", created);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

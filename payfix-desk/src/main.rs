//! payfix-desk - operator client for the payments exception desk

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use payfix_desk::editor::{self, FieldEdits};
use payfix_desk::{render, ApiClient, ClientError, Session, SessionStore, DEFAULT_API_BASE};
use tracing::debug;

#[derive(Parser)]
#[command(name = "payfix-desk")]
#[command(version, about = "Operator client for the payments exception desk")]
struct Cli {
    /// Base URL of the payfix-api service
    #[arg(long, global = true, env = "PAYFIX_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Session file (default: <config dir>/payfix/session.json)
    #[arg(long, global = true, env = "PAYFIX_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        username: Option<String>,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Register an operator account
    Signup {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Check the service is reachable
    Ping,
    /// List the exception queue
    Queue,
    /// Show one queued exception
    Show { id: String },
    /// Correct and resubmit a queued exception
    Fix {
        id: String,
        #[command(flatten)]
        edits: FieldEdits,
        /// Prompt for every field, current value as default
        #[arg(short, long)]
        interactive: bool,
        /// Operator name (default: logged-in user)
        #[arg(long)]
        operator: Option<String>,
    },
    /// List processed transactions
    Processed,
    /// Queue the demo exceptions
    Seed,
    /// Dashboard statistics
    Dashboard {
        /// Window in days (1-365)
        #[arg(long)]
        days: Option<i64>,
    },
    /// Per-operator throughput
    OperatorStats,
    /// Audit trail of accepted fixes
    Audit {
        #[arg(long)]
        tx_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // stderr keeps log lines out of rendered output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let store = match &cli.session_file {
        Some(path) => SessionStore::new(path),
        None => SessionStore::default_location()?,
    };
    let session = store.load()?;
    debug!("Session file: {}", store.path().display());

    let client = ApiClient::new(&cli.api_base)?
        .with_token(session.as_ref().map(|s| s.token.clone()));

    match cli.command {
        Commands::Login { username, password } => {
            let username = match username {
                Some(u) => u,
                None => Input::new().with_prompt("Username").interact_text()?,
            };
            let password = match password {
                Some(p) => p,
                None => Password::new().with_prompt("Password").interact()?,
            };

            let response = client.login(&username, &password).await?;
            store.save(&Session {
                token: response.token,
                username: response.username.clone(),
            })?;
            println!("Logged in as {}", response.username);
        }
        Commands::Logout => {
            if store.clear()? {
                println!("Logged out");
            } else {
                println!("Not logged in");
            }
        }
        Commands::Signup {
            name,
            username,
            password,
        } => {
            let name = match name {
                Some(n) => n,
                None => Input::new().with_prompt("Full name").interact_text()?,
            };
            let username = match username {
                Some(u) => u,
                None => Input::new().with_prompt("Username").interact_text()?,
            };
            let password = match password {
                Some(p) => p,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()?,
            };

            println!("{}", client.signup(&name, &username, &password).await?);
        }
        Commands::Ping => println!("{}", client.ping().await?),
        Commands::Queue => println!("{}", render::exceptions_table(&client.exceptions().await?)),
        Commands::Show { id } => {
            let record = client
                .exception(&id)
                .await?
                .with_context(|| format!("Transaction not found: {}", id))?;
            println!("{}", render::exception_detail(&record));
        }
        Commands::Fix {
            id,
            edits,
            interactive,
            operator,
        } => {
            let operator = operator.or_else(|| session.as_ref().map(|s| s.username.clone()));
            fix(&client, &id, &edits, interactive, operator.as_deref()).await?;
        }
        Commands::Processed => println!("{}", render::processed_lines(&client.processed().await?)),
        Commands::Seed => println!("Inserted: {}", client.seed().await?),
        Commands::Dashboard { days } => {
            println!("{}", render::dashboard(&client.dashboard(days).await?, days))
        }
        Commands::OperatorStats => {
            println!("{}", render::operator_stats(&client.operator_stats().await?))
        }
        Commands::Audit { tx_id } => {
            println!("{}", render::audit_entries(&client.audit(tx_id.as_deref()).await?))
        }
    }

    Ok(())
}

async fn fix(
    client: &ApiClient,
    id: &str,
    overrides: &FieldEdits,
    interactive: bool,
    operator: Option<&str>,
) -> Result<()> {
    let record = client
        .exception(id)
        .await?
        .with_context(|| format!("Transaction not found: {}", id))?;

    let edits = if interactive {
        editor::prompt_edits(&record.transaction, overrides)?
    } else {
        editor::build_edits(&record.transaction, overrides)
    };

    match client.fix(id, operator, edits).await {
        Ok(processed_id) => {
            debug!("Processed as {}", processed_id);
            println!("Transaction processed successfully");
            Ok(())
        }
        Err(ClientError::Api { status, messages }) => {
            eprintln!("Fix rejected:");
            for message in &messages {
                eprintln!("  - {}", message);
            }
            bail!("fix of {} failed with status {}", id, status)
        }
        Err(e) => Err(e.into()),
    }
}

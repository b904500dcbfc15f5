//! `xo`: command line access to the Xen Orchestra user API.
//!
//! This binary is the composition root. It parses configuration from flags
//! and `XOA_*` environment variables, wires `tracing` (with optional OTLP
//! export), builds the HTTP transport and hands it to [`client::Client`].
//! Command results are printed to stdout as JSON.

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use client::{Client, User, UserId};
use tracing::info;
use transport::{HttpCaller, HttpConfig, DEFAULT_TIMEOUT_SECS};

mod telemetry;

#[derive(Parser, Debug)]
#[command(author, version, about = "Xen Orchestra command line client")]
struct Cli {
    /// Base URL of the Xen Orchestra server; `ws://` and `wss://` are accepted.
    #[arg(long, env = "XOA_URL")]
    url: String,

    /// Account used to sign in before running the command.
    #[arg(long, env = "XOA_USER", requires = "password")]
    user: Option<String>,

    /// Password for `--user`.
    #[arg(long, env = "XOA_PASSWORD", hide_env_values = true, requires = "user")]
    password: Option<String>,

    /// Per-request timeout.
    #[arg(long, env = "XOA_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Format of the log lines written to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// OTLP/gRPC collector to export spans to, e.g. `http://localhost:4317`.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Console log format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(subcommand)]
    /// Manage user accounts.
    Users(UserCommands),
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum UserCommands {
    /// List every user.
    List,
    /// Show one user.
    Get {
        #[arg(long)]
        id: String,
    },
    /// Create a user and print it with its new id.
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Delete a user.
    Delete {
        #[arg(long)]
        id: String,
    },
}

impl Cli {
    fn http_config(&self) -> anyhow::Result<HttpConfig> {
        let mut config =
            HttpConfig::new(&self.url)?.with_timeout(Duration::from_secs(self.timeout_secs));
        if let (Some(user), Some(password)) = (&self.user, &self.password) {
            config = config.with_credentials(user, password);
        }
        Ok(config)
    }
}

fn parse_id(raw: &str) -> anyhow::Result<UserId> {
    UserId::new(raw).context("user id must not be empty")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let telemetry = telemetry::init(cli.log_format, cli.otlp_endpoint.as_deref())?;

    let outcome = run(cli).await;

    telemetry.shutdown();
    outcome
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.http_config()?;
    let caller = HttpCaller::new(&config)?;
    info!(endpoint = %caller.endpoint(), "connecting to Xen Orchestra");
    let client = Client::new(caller);

    if let (Some(user), Some(password)) = (&config.username, &config.password) {
        client
            .sign_in(user, password)
            .await
            .with_context(|| format!("failed to sign in as {user}"))?;
    }

    let Commands::Users(command) = cli.command;
    let result = run_users(&client, command).await;
    client.close().await?;
    result
}

async fn run_users(client: &Client, command: UserCommands) -> anyhow::Result<()> {
    match command {
        UserCommands::List => print_json(&client.get_all_users().await?),
        UserCommands::Get { id } => print_json(&client.get_user(&parse_id(&id)?).await?),
        UserCommands::Create { email, password } => {
            let created = client.create_user(&User::new(email, password)).await?;
            print_json(&created)
        }
        UserCommands::Delete { id } => {
            let id = parse_id(&id)?;
            client.delete_user(&id).await?;
            info!(%id, "user deleted");
            Ok(())
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

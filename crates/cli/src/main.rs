//! Zenthra CLI - lead and account management tools.
//!
//! # Usage
//!
//! ```bash
//! # Browse the lead pipeline
//! zen-cli leads list
//! zen-cli leads list --status qualified
//! zen-cli leads search "techcorp"
//! zen-cli leads show <id>
//!
//! # Work a lead
//! zen-cli leads set-status <id> contacted
//! zen-cli leads set-priority <id> high
//! zen-cli leads note <id> "called back, promising"
//! zen-cli leads delete <id>
//!
//! # Capture a lead (requires a configured backend)
//! zen-cli leads add -n "Jane Doe" -e jane@example.com -s "Inquiry" -m "..."
//!
//! # Accounts
//! zen-cli auth sign-in -e admin@zenthra.com -p admin123
//! zen-cli auth whoami
//! zen-cli auth sign-out
//! ```
//!
//! Without `ZENTHRA_SUPABASE_URL`/`ZENTHRA_SUPABASE_ANON_KEY` the tool runs
//! against the built-in mock data: reads serve the sample dataset and lead
//! mutations fail with a configuration error.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "zen-cli")]
#[command(author, version, about = "Zenthra lead-management CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and work the lead pipeline
    Leads {
        #[command(subcommand)]
        action: LeadsAction,
    },
    /// Manage the operator account
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum LeadsAction {
    /// List leads, optionally filtered by status
    List {
        /// Pipeline stage (`new`, `contacted`, `qualified`, `converted`, `closed`)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Show one lead in full
    Show {
        /// Lead id
        id: String,
    },
    /// Free-text search across name, email, company, subject, and message
    Search {
        /// Query string (case-insensitive substring)
        query: String,
    },
    /// Capture a new lead (requires a configured backend)
    Add {
        /// Submitter name
        #[arg(short, long)]
        name: String,

        /// Submitter email
        #[arg(short, long)]
        email: String,

        /// Company (optional)
        #[arg(short, long)]
        company: Option<String>,

        /// Subject line
        #[arg(short, long)]
        subject: String,

        /// Message body
        #[arg(short, long)]
        message: String,
    },
    /// Move a lead to another pipeline stage
    SetStatus {
        /// Lead id
        id: String,
        /// New status (`new`, `contacted`, `qualified`, `converted`, `closed`)
        status: String,
    },
    /// Reassign a lead's priority
    SetPriority {
        /// Lead id
        id: String,
        /// New priority (`low`, `medium`, `high`)
        priority: String,
    },
    /// Replace the operator notes on a lead
    Note {
        /// Lead id
        id: String,
        /// Note text
        text: String,
    },
    /// Delete a lead
    Delete {
        /// Lead id
        id: String,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in with email and password
    SignIn {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    SignUp {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: String,
    },
    /// Sign out and clear local session state
    SignOut,
    /// Show the signed-in account and its capabilities
    Whoami,
    /// Change the account password
    ChangePassword {
        /// Current password
        #[arg(short, long)]
        current: String,

        /// New password
        #[arg(short, long)]
        new: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let stores = commands::build_stores().await?;

    match cli.command {
        Commands::Leads { action } => match action {
            LeadsAction::List { status } => {
                commands::leads::list(&stores, status.as_deref()).await?;
            }
            LeadsAction::Show { id } => commands::leads::show(&stores, &id).await?,
            LeadsAction::Search { query } => commands::leads::search(&stores, &query).await?,
            LeadsAction::Add {
                name,
                email,
                company,
                subject,
                message,
            } => commands::leads::add(&stores, name, email, company, subject, message).await?,
            LeadsAction::SetStatus { id, status } => {
                commands::leads::set_status(&stores, &id, &status).await?;
            }
            LeadsAction::SetPriority { id, priority } => {
                commands::leads::set_priority(&stores, &id, &priority).await?;
            }
            LeadsAction::Note { id, text } => commands::leads::note(&stores, &id, &text).await?,
            LeadsAction::Delete { id } => commands::leads::delete(&stores, &id).await?,
        },
        Commands::Auth { action } => match action {
            AuthAction::SignIn { email, password } => {
                commands::auth::sign_in(&stores, &email, &password).await?;
            }
            AuthAction::SignUp {
                email,
                password,
                name,
            } => commands::auth::sign_up(&stores, &email, &password, &name).await?,
            AuthAction::SignOut => commands::auth::sign_out(&stores).await,
            AuthAction::Whoami => commands::auth::whoami(&stores),
            AuthAction::ChangePassword { current, new } => {
                commands::auth::change_password(&stores, &current, &new).await?;
            }
        },
    }
    Ok(())
}

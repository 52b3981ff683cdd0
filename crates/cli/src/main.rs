//! Salesdesk CLI - Database migrations and account tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sd-cli migrate
//!
//! # Create a seller account
//! sd-cli user create -e ana@example.com -n Ana -s Lopez --password 's3cret-pass'
//!
//! # Issue a bearer token for an existing seller
//! sd-cli token issue -e ana@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create seller accounts
//! - `token issue` - Issue bearer tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sd-cli")]
#[command(author, version, about = "Salesdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage seller accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new seller account
    Create {
        /// Seller email address
        #[arg(short, long)]
        email: String,

        /// First name
        #[arg(short, long)]
        name: String,

        /// Last name
        #[arg(short, long)]
        surname: String,

        /// Password (at least 8 characters)
        #[arg(long, env = "SALESDESK_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a token for an existing seller
    Issue {
        /// Seller email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                surname,
                password,
            } => {
                commands::user::create(&email, &name, &surname, &password).await?;
            }
        },
        Commands::Token { action } => match action {
            TokenAction::Issue { email } => {
                let token = commands::token::issue(&email).await?;
                #[allow(clippy::print_stdout)]
                {
                    println!("{token}");
                }
            }
        },
    }
    Ok(())
}

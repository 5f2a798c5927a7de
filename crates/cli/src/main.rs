//! Boutique CLI - Session store migration and account tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the sessions table used by the storefront
//! boutique-cli migrate
//!
//! # Check that an account can sign in against the upstream API
//! BOUTIQUE_PASSWORD=... boutique-cli login -e shopper@example.com
//!
//! # Create an account and sign in with it
//! BOUTIQUE_PASSWORD=... boutique-cli signup -e shopper@example.com \
//!     --first-name Ada --last-name Lovelace --phone 5550100
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create the `PostgreSQL` session store schema
//! - `login` - Run the sign-in flow with an in-memory token store
//! - `signup` - Run the signup flow (register, then sign in)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "boutique-cli")]
#[command(author, version, about = "Boutique storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Upstream API options shared by the account commands.
#[derive(clap::Args)]
struct ApiArgs {
    /// Base URL of the upstream REST API
    #[arg(long, env = "STOREFRONT_API_URL")]
    api_url: Url,

    /// Account password
    #[arg(long, env = "BOUTIQUE_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the session store schema
    Migrate,
    /// Sign in against the upstream API
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        #[command(flatten)]
        api: ApiArgs,
    },
    /// Create an account, then sign in with it
    Signup {
        /// Account email address
        #[arg(short, long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Phone number (digits only)
        #[arg(long)]
        phone: String,

        #[command(flatten)]
        api: ApiArgs,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads env-backed arguments
    dotenvy::dotenv().ok();

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
        Commands::Migrate => commands::migrate::sessions().await?,
        Commands::Login { email, api } => {
            commands::account::login(&api.api_url, email, api.password).await?;
        }
        Commands::Signup {
            email,
            first_name,
            last_name,
            phone,
            api,
        } => {
            let form = boutique_core::SignupForm {
                first_name,
                last_name,
                email,
                phone,
                confirm_password: api.password.clone(),
                password: api.password,
            };
            commands::account::signup(&api.api_url, form).await?;
        }
    }
    Ok(())
}

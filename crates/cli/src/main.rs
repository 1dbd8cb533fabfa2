//! ShiftWatch CLI - Database tools and a terminal front end for the API.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! shiftwatch-cli migrate
//!
//! # Provision an account directly in the database
//! shiftwatch-cli user create -e ana.rojas@cistcor.com -n "Ana Rojas" -p 987654321 --password 'Planta_2024'
//!
//! # Sign in against the API and watch the dashboard
//! shiftwatch-cli login -e ana.rojas --password 'Planta_2024'
//! shiftwatch-cli dashboard
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create an account (database access required)
//! - `login`, `logout`, `whoami` - Manage the saved session
//! - `dashboard` - Live dashboard, refreshed every poll interval
//! - `temperature`, `fatigue` - Browse and manage readings and snapshots
//! - `theme` - Show or toggle the dashboard theme

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shiftwatch-cli")]
#[command(author, version, about = "ShiftWatch CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage accounts directly in the database
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Sign in and save the session
    Login {
        /// Corporate email, or just the part before the @
        #[arg(short, long)]
        email: String,

        #[arg(long)]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Live dashboard (Ctrl+C to quit)
    Dashboard {
        /// Fetch and print once instead of polling
        #[arg(long)]
        once: bool,
    },
    /// Temperature readings
    Temperature {
        #[command(subcommand)]
        action: TemperatureAction,
    },
    /// Fatigue-camera snapshots
    Fatigue {
        #[command(subcommand)]
        action: FatigueAction,
    },
    /// Dashboard theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Corporate email address
        #[arg(short, long)]
        email: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        /// Nine-digit mobile number
        #[arg(short, long)]
        phone: String,

        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum TemperatureAction {
    /// List readings, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Only this device
        #[arg(short, long)]
        device: Option<String>,

        /// Match device, environment or temperature text
        #[arg(short, long)]
        filter: Option<String>,

        /// Only this local day (YYYY-MM-DD)
        #[arg(long)]
        day: Option<NaiveDate>,
    },
    /// Show one reading
    Show { id: String },
    /// Latest reading of a device
    Latest { device: String },
    /// Latest reading of every device seen recently
    Devices,
    /// Record a reading
    Add {
        #[arg(short, long)]
        device: String,

        #[arg(short, long)]
        environment: String,

        /// Degrees Celsius; omit when the sensor reported nothing
        #[arg(short, long)]
        temperature: Option<f64>,
    },
    /// Delete a reading
    Delete { id: String },
}

#[derive(Subcommand)]
enum FatigueAction {
    /// List snapshots, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Upload a snapshot image (jpg or png)
    Upload {
        #[arg(short, long)]
        camera: String,

        #[arg(short, long)]
        environment: String,

        file: PathBuf,
    },
    /// Delete a snapshot and its image
    Delete { id: String },
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch between dark and light
    Toggle,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shiftwatch_cli=info,shiftwatch_client=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

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
                phone,
                password,
            } => {
                commands::user::create_user(&email, &name, &phone, &password).await?;
            }
        },
        Commands::Login { email, password } => {
            let ctx = commands::Context::from_env()?;
            commands::session::login(&ctx, &email, &password).await?;
        }
        Commands::Logout => {
            let ctx = commands::Context::from_env()?;
            commands::session::logout(&ctx).await;
        }
        Commands::Whoami => {
            let ctx = commands::Context::from_env()?;
            commands::session::whoami(&ctx).await?;
        }
        Commands::Dashboard { once } => {
            let ctx = commands::Context::from_env()?;
            commands::dashboard::run(&ctx, once).await?;
        }
        Commands::Temperature { action } => {
            let ctx = commands::Context::from_env()?;
            match action {
                TemperatureAction::List {
                    page,
                    limit,
                    device,
                    filter,
                    day,
                } => {
                    let query = commands::temperature::ListQuery {
                        page,
                        limit,
                        device,
                        filter,
                        day,
                    };
                    commands::temperature::list(&ctx, &query).await?;
                }
                TemperatureAction::Show { id } => commands::temperature::show(&ctx, &id).await?,
                TemperatureAction::Latest { device } => {
                    commands::temperature::latest(&ctx, &device).await?;
                }
                TemperatureAction::Devices => commands::temperature::devices(&ctx).await?,
                TemperatureAction::Add {
                    device,
                    environment,
                    temperature,
                } => {
                    commands::temperature::add(&ctx, &device, &environment, temperature).await?;
                }
                TemperatureAction::Delete { id } => {
                    commands::temperature::delete(&ctx, &id).await?;
                }
            }
        }
        Commands::Fatigue { action } => {
            let ctx = commands::Context::from_env()?;
            match action {
                FatigueAction::List { page } => commands::fatigue::list(&ctx, page).await?,
                FatigueAction::Upload {
                    camera,
                    environment,
                    file,
                } => commands::fatigue::upload(&ctx, &camera, &environment, &file).await?,
                FatigueAction::Delete { id } => commands::fatigue::delete(&ctx, &id).await?,
            }
        }
        Commands::Theme { action } => {
            let ctx = commands::Context::from_env()?;
            match action {
                ThemeAction::Show => commands::theme::show(&ctx).await,
                ThemeAction::Toggle => commands::theme::toggle(&ctx).await,
            }
        }
    }
    Ok(())
}

//! Comanda CLI - Order from the restaurant menu and manage the catalog.
//!
//! # Usage
//!
//! ```bash
//! # Browse the menu, optionally by category
//! comanda menu list --category 2
//!
//! # Fill the cart and check out
//! comanda auth login -e ana@example.com
//! comanda cart add 12 --quantity 2
//! comanda checkout submit --dni 12345678 --delivery recoger \
//!     --payment yape --yape-phone 987654321 --yape-code 123456
//!
//! # Show the last order and save its receipt
//! comanda order show
//! comanda order receipt --output receipt.txt
//!
//! # Administer the catalog
//! comanda admin dashboard
//! comanda admin product delete 12 --yes
//! ```
//!
//! # Commands
//!
//! - `auth` - Log in, register, log out, show or verify the session
//! - `menu` - List products and show product details
//! - `cart` - Add, change, remove and list cart lines
//! - `checkout` - Show checkout options and totals, submit the order
//! - `order` - Show the last confirmation and write its receipt
//! - `admin` - Dashboard and product/category management
//! - `theme` - Show or change the colour theme preference

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use comanda_client::ClientConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

use commands::{
    AdminAction, AuthAction, CartAction, CheckoutAction, CliError, Context, MenuAction,
    OrderAction, ThemeAction,
};

#[derive(Parser)]
#[command(name = "comanda")]
#[command(author, version, about = "Restaurant ordering client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, register and manage the session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Browse the menu
    Menu {
        #[command(subcommand)]
        action: MenuAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check out the cart
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },
    /// Show the last order
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage products and categories
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Show or change the colour theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::debug!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => return report(&CliError::from(e)),
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "comanda_cli=info,comanda_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match Context::open(config) {
        Ok(ctx) => run(cli, &ctx).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(error: &CliError) -> ExitCode {
    if error.is_unexpected() {
        tracing::error!(error = %error, "Command failed");
    }
    let _ = writeln!(std::io::stderr(), "Error: {error}");
    ExitCode::from(error.exit_code())
}

async fn run(cli: Cli, ctx: &Context) -> Result<(), CliError> {
    match cli.command {
        Commands::Auth { action } => commands::auth::run(ctx, action).await,
        Commands::Menu { action } => commands::menu::run(ctx, action).await,
        Commands::Cart { action } => commands::cart::run(ctx, action).await,
        Commands::Checkout { action } => commands::checkout::run(ctx, action).await,
        Commands::Order { action } => commands::order::run(ctx, action),
        Commands::Admin { action } => commands::admin::run(ctx, action).await,
        Commands::Theme { action } => commands::theme::run(ctx, action),
    }
}

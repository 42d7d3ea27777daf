//! Ankkor CLI - storefront client over the Shopify Storefront API.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog (cached for five minutes)
//! ankkor products --first 20
//! ankkor product linen-shirt --option Size=M
//!
//! # Cart (Shopify-backed when NEXT_PUBLIC_USE_SHOPIFY_CART=true)
//! ankkor cart add gid://shopify/ProductVariant/42 -q 2
//! ankkor cart checkout
//!
//! # Wishlist and account
//! ankkor wishlist add linen-shirt
//! ankkor account login -e shopper@example.com -p hunter2
//!
//! # SEO presence report for a web project
//! ankkor seo-audit ../web
//! ```
//!
//! Persisted state lives under `ANKKOR_DATA_DIR` (default `.ankkor`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use ankkor_storefront::config::StorefrontConfig;
use ankkor_storefront::error::AppError;
use ankkor_storefront::state::AppState;
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "ankkor")]
#[command(author, version, about = "Ankkor storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Refetch instead of using a fresh cache entry
        #[arg(long)]
        refresh: bool,

        /// Show at most this many products
        #[arg(long, default_value_t = 50)]
        first: usize,
    },
    /// Show one product and the selected variant
    Product {
        /// Product handle
        handle: String,

        /// Option selection, e.g. `--option Size=M`
        #[arg(long = "option", value_parser = commands::products::parse_option)]
        options: Vec<(String, String)>,

        /// Refetch instead of using a fresh cache entry
        #[arg(long)]
        refresh: bool,
    },
    /// Show a collection
    Collection {
        /// Collection handle
        handle: String,

        /// Number of products to include
        #[arg(long, default_value_t = 20)]
        first: i64,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Customer account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Send a message through the contact form relay
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
    /// Report which SEO files and patterns a web project has
    SeoAudit {
        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Manage the catalog cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add a variant
    Add {
        /// Variant ID
        variant: String,
        /// Quantity
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 removes it)
    Update {
        /// Line ID (variant ID for the offline cart)
        line: String,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Line ID (variant ID for the offline cart)
        line: String,
    },
    /// Empty the cart
    Clear,
    /// Print the checkout URL
    Checkout,
}

#[derive(Subcommand)]
pub enum WishlistAction {
    /// List saved products
    List,
    /// Save a product
    Add {
        /// Product handle
        handle: String,
    },
    /// Remove a saved product
    Remove {
        /// Product ID
        id: String,
    },
    /// Remove every saved product
    Clear,
}

#[derive(Subcommand)]
pub enum AccountAction {
    /// Create a customer account
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        accepts_marketing: bool,
    },
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Show the signed-in customer
    Show,
    /// Sign out
    Logout,
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Drop every cached product entry
    Clear,
    /// Drop one cached product
    Invalidate {
        /// Product handle
        handle: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(dsn: Option<&str>) -> Option<sentry::ClientInitGuard> {
    let dsn = dsn?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

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

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ankkor_storefront=info,ankkor_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The audit reads only the local tree and needs no Shopify credentials.
    if let Commands::SeoAudit { path } = &cli.command {
        init_tracing();
        commands::seo::audit(path);
        return;
    }

    let config = StorefrontConfig::from_env();
    let dsn = config.as_ref().ok().and_then(|c| c.sentry_dsn.clone());

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = init_sentry(dsn.as_deref());
    init_tracing();

    let result = match config {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(AppError::from(e)),
    };

    if let Err(e) = result {
        e.capture();
        output::error(&e);
        // Flush queued Sentry events before exiting
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: StorefrontConfig) -> Result<(), AppError> {
    let state = AppState::new(config)?;

    match command {
        Commands::Products { refresh, first } => {
            commands::products::list(&state, refresh, first).await?;
        }
        Commands::Product {
            handle,
            options,
            refresh,
        } => commands::products::show(&state, &handle, options, refresh).await?,
        Commands::Collection { handle, first } => {
            commands::products::collection(&state, &handle, first).await?;
        }
        Commands::Cart { action } => commands::cart::run(&state, action).await?,
        Commands::Wishlist { action } => commands::wishlist::run(&state, action).await?,
        Commands::Account { action } => commands::account::run(&state, action).await?,
        Commands::Contact {
            name,
            email,
            subject,
            message,
        } => commands::contact::send(&state, name, email, subject, message).await?,
        Commands::Cache { action } => commands::cache::run(&state, action).await?,
        Commands::SeoAudit { path } => commands::seo::audit(&path),
    }
    Ok(())
}

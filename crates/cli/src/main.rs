//! Ecom CLI - session-store migrations and backend inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! ecom-cli migrate
//!
//! # Check the backend is up
//! ecom-cli health
//!
//! # Browse the catalogue
//! ecom-cli products list --category Electronics
//! ecom-cli products show <product-id>
//!
//! # Inspect a cart
//! ecom-cli cart show <cart-id>
//!
//! # Order history for the user holding ECOM_API_TOKEN
//! ecom-cli orders list
//! ecom-cli orders show <order-id>
//! ```
//!
//! Backend and database settings are read from the same `STOREFRONT_*`
//! variables as the storefront server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use ecom_core::models::catalog::DEFAULT_PAGE_SIZE;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ecom-cli")]
#[command(author, version, about = "Ecom storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the `PostgreSQL` session table used by the storefront
    Migrate,
    /// Check backend health
    Health,
    /// Browse the product catalogue
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Inspect carts
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect orders of the user holding `ECOM_API_TOKEN`
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List one page of products
    List {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Category filter
        #[arg(short, long)]
        category: Option<String>,

        /// Zero-based page index
        #[arg(short, long, default_value_t = 0)]
        page: u32,

        /// Page size
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        size: u32,
    },
    /// Show a product and its variants
    Show {
        /// Product ID
        id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show a cart's lines and totals
    Show {
        /// Cart ID
        id: String,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List order history
    List,
    /// Show a single order
    Show {
        /// Order ID
        id: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ecom_cli=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::sessions().await?,
        Commands::Health => commands::health::check().await?,
        Commands::Products { action } => match action {
            ProductsAction::List {
                search,
                category,
                page,
                size,
            } => commands::catalog::list(search, category, page, size).await?,
            ProductsAction::Show { id } => commands::catalog::show(&id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show { id } => commands::cart::show(&id).await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list().await?,
            OrdersAction::Show { id } => commands::orders::show(&id).await?,
        },
    }
    Ok(())
}

//! Go Marketplace cart CLI - inspect and edit a persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cart show
//!
//! # Add a product (quantity starts at 1, or goes up by 1 if present)
//! gm-cart add --id p1 --title "Tee" --image-url https://img/p1.png --price 10
//!
//! # Adjust a line
//! gm-cart increment p1
//! gm-cart decrement p1
//!
//! # Use a different data directory
//! gm-cart --data-dir /tmp/cart show
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart with line totals and subtotal
//! - `add` - Add one unit of a product
//! - `increment` / `decrement` - Change a line's quantity by one
//!
//! Configuration comes from the environment, see [`config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use go_marketplace_cart::NewLineItem;
use go_marketplace_core::{Price, ProductId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::cart::Change;
use config::CliConfig;

#[derive(Parser)]
#[command(name = "gm-cart")]
#[command(author, version, about = "Go Marketplace cart tools")]
struct Cli {
    /// Directory holding the persisted cart (overrides `CART_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Display title
        #[arg(long)]
        title: String,

        /// Display image URL
        #[arg(long)]
        image_url: String,

        /// Unit price (e.g. 19.99)
        #[arg(long)]
        price: Price,
    },
    /// Add one unit to a line
    Increment {
        /// Product ID
        id: String,
    },
    /// Remove one unit from a line
    Decrement {
        /// Product ID
        id: String,
    },
}

impl Commands {
    fn into_change(self) -> Option<Change> {
        match self {
            Self::Show => None,
            Self::Add {
                id,
                title,
                image_url,
                price,
            } => Some(Change::Add(NewLineItem::new(id, title, image_url, price))),
            Self::Increment { id } => Some(Change::Increment(ProductId::new(id))),
            Self::Decrement { id } => Some(Change::Decrement(ProductId::new(id))),
        }
    }
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "go_marketplace_cart=info,gm_cart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let cart = commands::cart::apply(&config, cli.command.into_change()).await?;
    commands::cart::print(&cart);
    Ok(())
}

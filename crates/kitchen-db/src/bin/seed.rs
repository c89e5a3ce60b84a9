//! # Seed Data Generator
//!
//! Populates the database with a demo chicken-restaurant catalog and a
//! floor of empty tables.
//!
//! ## Usage
//! ```bash
//! # Seed ./kitchen.db (or $KITCHEN_DB_PATH) with 8 tables
//! cargo run -p kitchen-db --bin seed
//!
//! # Custom table count and database path
//! cargo run -p kitchen-db --bin seed -- --tables 12 --db ./data/kitchen.db
//!
//! # More log output
//! RUST_LOG=kitchen_core=debug,kitchen_db=debug cargo run -p kitchen-db --bin seed
//! ```
//!
//! ## Generated Data
//! - Six chicken products
//! - Four menu groups
//! - One single-product menu per product in "One Chicken", priced at the product price
//! - N empty, ungrouped order tables

use std::env;

use kitchen_core::service::{
    CreateMenuGroupRequest, CreateMenuRequest, CreateOrderTableRequest, CreateProductRequest,
    MenuProductRequest,
};
use kitchen_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// (name, price in cents)
const PRODUCTS: &[(&str, i64)] = &[
    ("Fried", 16000),
    ("Seasoned", 16000),
    ("Half and Half", 16000),
    ("Roasted", 16000),
    ("Soy Sauce", 17000),
    ("Boneless", 17000),
];

const MENU_GROUPS: &[&str] = &[
    "Two Chickens",
    "One Chicken",
    "Boneless Two Chickens",
    "New Menu",
];

/// Group holding the single-product menus.
const SINGLE_MENU_GROUP: &str = "One Chicken";

const DEFAULT_TABLES: usize = 8;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore "already initialised"
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}

/// Parses `--tables`, falling back to the default on a malformed value.
fn parse_table_count(value: &str) -> usize {
    match value.parse() {
        Ok(count) => count,
        Err(_) => {
            warn!(value = %value, default = DEFAULT_TABLES, "Invalid --tables value, using default");
            DEFAULT_TABLES
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args: Vec<String> = env::args().collect();

    let mut config = DbConfig::from_env()?;
    let mut tables = DEFAULT_TABLES;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tables" | "-t" => {
                if i + 1 < args.len() {
                    tables = parse_table_count(&args[i + 1]);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kitchen POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -t, --tables <N>   Number of order tables to create (default: 8)");
                println!("  -d, --db <PATH>    Database file path (default: $KITCHEN_DB_PATH or ./kitchen.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %config.database_path.display(), tables, "Seeding database");

    let db = Database::new(config).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        return Ok(());
    }

    let services = db.services();

    let mut single_menu_group_id = String::new();
    for name in MENU_GROUPS {
        let group = services
            .menu_groups
            .create(CreateMenuGroupRequest {
                name: name.to_string(),
            })
            .await?;
        if *name == SINGLE_MENU_GROUP {
            single_menu_group_id = group.id;
        }
    }

    for (name, price_cents) in PRODUCTS {
        let product = services
            .products
            .create(CreateProductRequest {
                name: name.to_string(),
                price_cents: *price_cents,
            })
            .await?;

        services
            .menus
            .create(CreateMenuRequest {
                name: format!("{name} Chicken"),
                price_cents: *price_cents,
                menu_group_id: single_menu_group_id.clone(),
                menu_products: vec![MenuProductRequest {
                    product_id: product.id,
                    quantity: 1,
                }],
            })
            .await?;
    }

    for _ in 0..tables {
        services
            .tables
            .create(CreateOrderTableRequest {
                number_of_guests: 0,
                empty: true,
                table_group_id: None,
            })
            .await?;
    }

    info!(
        products = PRODUCTS.len(),
        menu_groups = MENU_GROUPS.len(),
        menus = PRODUCTS.len(),
        tables,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}

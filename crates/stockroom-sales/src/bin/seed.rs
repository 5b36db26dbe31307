//! # Seed Data Generator
//!
//! Registers a sample garment catalog for one owner, records a handful of
//! sales against it, voids one, and logs the resulting summary.
//!
//! ## Usage
//! ```bash
//! # Seed the configured database for owner "demo"
//! cargo run -p stockroom-sales --bin seed
//!
//! # Custom owner, catalog size and database
//! cargo run -p stockroom-sales --bin seed -- --owner shop-1 --count 40 --db ./data/stockroom.db
//!
//! # Explicit config file
//! cargo run -p stockroom-sales --bin seed -- --config ./stockroom.toml
//! ```
//!
//! Each generated item is one garment in one size, so the default of 24
//! items covers four garments in every size from S to XXXL.

use std::env;
use std::path::PathBuf;

use tracing::{info, warn};

use stockroom_core::{
    CreateSaleRequest, DateRange, NewInventoryItem, PaymentMethod, SaleLineRequest, Size,
};
use stockroom_sales::{SalesConfig, SalesService};

/// Garment names with base price and cost in centavos.
const GARMENTS: &[(&str, i64, i64)] = &[
    ("Classic Tee", 39_900, 15_000),
    ("Linen Shirt", 89_900, 40_000),
    ("Denim Jacket", 249_900, 120_000),
    ("Chino Shorts", 69_900, 30_000),
    ("Hoodie", 129_900, 55_000),
    ("Polo Shirt", 59_900, 25_000),
    ("Cargo Pants", 119_900, 50_000),
    ("Knit Cardigan", 149_900, 65_000),
];

/// Sizes cycled through for every garment.
const SIZES: &[Size] = &[Size::S, Size::M, Size::L, Size::Xl, Size::Xxl, Size::Xxxl];

/// Payment methods cycled through for sample sales.
const PAYMENT_METHODS: &[PaymentMethod] = &[
    PaymentMethod::Cash,
    PaymentMethod::Gcash,
    PaymentMethod::Card,
    PaymentMethod::Paymaya,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut owner = String::from("demo");
    let mut count: usize = 24;
    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--owner" | "-o" => {
                if i + 1 < args.len() {
                    owner = args[i + 1].clone();
                    i += 1;
                }
            }
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(24);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --owner <ID>     Owner to seed (default: demo)");
                println!("  -c, --count <N>      Number of items to register (default: 24)");
                println!("  -d, --db <PATH>      Database file path (overrides config)");
                println!("      --config <PATH>  Config file path");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = SalesConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }
    config.logging.init_tracing()?;

    let service = SalesService::connect(&config).await?;
    let (total, applied) = service.database().migration_status().await?;
    info!(owner = %owner, count = count, applied = applied, total = total, "Seeding");

    // Catalog: every garment in every size until `count` is reached.
    let mut items = Vec::with_capacity(count);
    'catalog: for (garment_idx, garment) in GARMENTS.iter().enumerate() {
        for (size_idx, size) in SIZES.iter().enumerate() {
            if items.len() >= count {
                break 'catalog;
            }

            let item = generate_item(garment, *size, garment_idx * SIZES.len() + size_idx);
            let name = item.name.clone();
            match service.register_item(&owner, item).await {
                Ok(item) => items.push(item),
                Err(e) => warn!(name = %name, error = %e, "Failed to register item"),
            }
        }
    }
    info!(registered = items.len(), "Catalog ready");

    // Sales: pairs of neighbouring items, one or two units each.
    let mut sales = Vec::new();
    for (n, pair) in items.chunks(2).enumerate() {
        let lines = pair
            .iter()
            .map(|item| SaleLineRequest {
                item_id: item.id.clone(),
                quantity: 1 + (n % 2) as i64,
                unit_price_cents: item.price_cents,
                size: None,
            })
            .collect();

        let discount = if n % 3 == 0 { 5_000 } else { 0 };
        let request = CreateSaleRequest::new(lines)
            .with_discount(discount)
            .with_payment_method(PAYMENT_METHODS[n % PAYMENT_METHODS.len()]);

        match service.create_sale(&owner, request).await {
            Ok(sale) => sales.push(sale),
            Err(e) => warn!(error = %e, code = ?e.code(), "Sample sale rejected"),
        }
    }

    if let Some(first) = sales.first() {
        service.void_sale(&owner, &first.id).await?;
    }

    let summary = service.summarize(&owner, &DateRange::all()).await?;
    info!(
        sales = summary.sale_count,
        revenue = %summary.revenue(),
        items_sold = summary.items_sold,
        average = %summary.average_order_value(),
        "Seed complete"
    );
    for top in &summary.top_items {
        info!(name = %top.name, quantity = top.quantity, revenue_cents = top.revenue_cents, "Top item");
    }

    service.database().close().await;
    Ok(())
}

/// Generates one sized garment with a deterministic opening stock.
fn generate_item(
    (name, price_cents, cost_cents): &(&str, i64, i64),
    size: Size,
    seed: usize,
) -> NewInventoryItem {
    // Larger sizes cost a little more.
    let addon = match size {
        Size::Xxl => 5_000,
        Size::Xxxl => 10_000,
        _ => 0,
    };

    NewInventoryItem {
        name: name.to_string(),
        description: Some(format!("{} in size {}", name, size)),
        size,
        price_cents: price_cents + addon,
        cost_cents: *cost_cents,
        quantity: 5 + (seed % 11) as i64,
        image_url: None,
    }
}

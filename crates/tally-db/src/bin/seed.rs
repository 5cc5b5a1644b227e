//! # Seed Data Generator
//!
//! Populates the database with demo phones and one sample receipt.
//!
//! ## Usage
//! ```bash
//! # Seed 24 phones (default) into the configured database
//! cargo run -p tally-db --bin seed
//!
//! # Custom amount and database path
//! cargo run -p tally-db --bin seed -- --count 100 --db ./data/tally.db
//!
//! # Use a specific tally.toml
//! cargo run -p tally-db --bin seed -- --config ./tally.toml
//! ```
//!
//! ## Generated Phones
//! Each catalogue entry carries one of four tax profiles so a fresh
//! database shows every breakdown case:
//! - 10% added at checkout
//! - 7.5% already in the shelf price
//! - exempt
//! - the store default from `tally.toml`

use chrono::Utc;
use std::env;
use std::path::PathBuf;
use tally_core::dto::{CalculateCartTaxRequest, CartTaxRequestItem};
use tally_core::format::{format_currency, generate_tax_breakdown_text};
use tally_core::{Money, Product, ProductCondition, ProductStatus, TaxConfig, TaxRate};
use tally_db::{init_tracing, Database, StoreConfig};
use tracing::warn;
use uuid::Uuid;

/// (brand, model, storage GB, color, condition, cost cents, price cents)
const CATALOGUE: &[(&str, &str, i64, &str, ProductCondition, i64, i64)] = &[
    ("Apple", "iPhone 15", 128, "Black", ProductCondition::New, 62_000, 79_900),
    ("Apple", "iPhone 14", 128, "Blue", ProductCondition::Refurbished, 41_000, 54_900),
    ("Apple", "iPhone SE", 64, "Red", ProductCondition::Used, 14_500, 21_999),
    ("Apple", "iPhone 12", 64, "White", ProductCondition::Used, 17_000, 24_950),
    ("Samsung", "Galaxy S24", 256, "Onyx", ProductCondition::New, 64_000, 85_999),
    ("Samsung", "Galaxy A54", 128, "Lime", ProductCondition::New, 23_500, 34_999),
    ("Samsung", "Galaxy Z Flip5", 256, "Mint", ProductCondition::Refurbished, 52_000, 69_900),
    ("Google", "Pixel 8", 128, "Hazel", ProductCondition::New, 48_000, 69_900),
    ("Google", "Pixel 7a", 128, "Charcoal", ProductCondition::Used, 21_000, 29_999),
    ("OnePlus", "12R", 256, "Cool Blue", ProductCondition::New, 37_000, 49_999),
    ("Motorola", "Moto G Power", 128, "Gray", ProductCondition::New, 12_500, 19_999),
    ("Nokia", "G42", 128, "Purple", ProductCondition::Refurbished, 9_000, 14_950),
];

/// Tax profiles cycled across the catalogue. `None` means the store default.
const TAX_PROFILES: &[Option<TaxConfig>] = &[
    Some(TaxConfig {
        tax_rate: TaxRate::from_bps(1000),
        is_tax_inclusive: false,
        is_tax_exempt: false,
    }),
    Some(TaxConfig {
        tax_rate: TaxRate::from_bps(750),
        is_tax_inclusive: true,
        is_tax_exempt: false,
    }),
    Some(TaxConfig {
        tax_rate: TaxRate::from_bps(0),
        is_tax_inclusive: false,
        is_tax_exempt: true,
    }),
    None,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 24;
    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
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
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>      Number of phones to generate (default: 24)");
                println!("  -d, --db <PATH>      Database file path (default: from tally.toml)");
                println!("      --config <PATH>  Config file path (default: platform config dir)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut store = StoreConfig::load(config_path)?;
    if let Some(path) = db_path {
        store.database.path = Some(path);
    }

    println!("🌱 Tally POS Seed Data Generator");
    println!("================================");
    println!("Store:    {}", store.store.name);
    println!("Database: {}", store.database_path().display());
    println!("Phones:   {}", count);
    println!();

    let db = Database::new(store.db_config()).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} phones", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating phones...");

    let default_tax = store.default_tax_config();
    let start = std::time::Instant::now();
    let mut inserted = Vec::with_capacity(count);

    for seed in 0..count {
        let product = generate_phone(seed, default_tax);
        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {} {}: {}", product.brand_name, product.model, e);
            continue;
        }
        inserted.push(product.id);
    }

    println!("✓ Generated {} phones in {:?}", inserted.len(), start.elapsed());

    // Sample sale: one phone from each tax profile
    let request = CalculateCartTaxRequest {
        items: inserted
            .iter()
            .take(TAX_PROFILES.len())
            .map(|id| CartTaxRequestItem {
                phone_id: id.clone(),
                override_price: None,
                quantity: None,
            })
            .collect(),
    };

    if request.items.is_empty() {
        println!();
        println!("✓ Seed complete!");
        return Ok(());
    }

    let cart = db.tax_service().build_cart(&request).await?;
    let receipt = db.receipts().create(&cart, Money::zero()).await?;
    let symbol = store.currency_symbol();

    println!();
    println!("Sample receipt {}", receipt.receipt.receipt_number);
    for item in &receipt.items {
        println!("  {:<28} {:>12}", item.name, format_currency(item.total, symbol));
    }
    println!("  {:<28} {:>12}", "Subtotal", format_currency(receipt.receipt.subtotal, symbol));
    for line in generate_tax_breakdown_text(&receipt.tax_breakdown, symbol) {
        println!("  {}", line);
    }
    println!("  {:<28} {:>12}", "Total", format_currency(receipt.receipt.final_total, symbol));

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates one demo phone from the catalogue.
fn generate_phone(seed: usize, default_tax: TaxConfig) -> Product {
    let now = Utc::now();
    let (brand, model, storage_gb, color, condition, cost, price) =
        CATALOGUE[seed % CATALOGUE.len()];
    let tax = TAX_PROFILES[seed % TAX_PROFILES.len()].unwrap_or(default_tax);

    // Later passes over the catalogue come back as used stock at a markdown
    let pass = (seed / CATALOGUE.len()) as i64;
    let (condition, price) = if pass == 0 {
        (condition, price)
    } else {
        (ProductCondition::Used, price * (100 - 10 * pass.min(5)) / 100)
    };

    Product {
        id: Uuid::new_v4().to_string(),
        brand_name: brand.to_string(),
        model: model.to_string(),
        storage_gb: Some(storage_gb),
        color: Some(color.to_string()),
        condition,
        imei: Some(format!("35{:013}", seed)),
        cost_price: Money::from_cents(cost.min(price)),
        selling_price: Money::from_cents(price),
        tax_rate: tax.tax_rate,
        is_tax_inclusive: tax.is_tax_inclusive,
        is_tax_exempt: tax.is_tax_exempt,
        status: ProductStatus::Available,
        created_at: now,
        updated_at: now,
    }
}

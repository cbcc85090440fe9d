//! # Seed Data Generator
//!
//! Populates the database with test products and clients for development.
//!
//! ## Usage
//! ```bash
//! # Generate 2,000 products (default)
//! cargo run -p caja-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p caja-db --bin seed -- --count 5000
//!
//! # Specify database path
//! cargo run -p caja-db --bin seed -- --db ./data/caja.db
//! ```
//!
//! ## Generated Data
//! Products across grocery categories, each with:
//! - EAN-13-shaped barcode (checksum not valid): `779{:010}`
//! - Internal item number: `{CATEGORY}{:05}`
//! - Price: $0.99 - $9.99 in cents
//! - Stock: 0 - 100 units
//!
//! The category × name × size grid cycles as needed, so any `--count` is
//! honored; barcodes and item numbers stay unique across repeats.
//!
//! Plus a handful of named clients, some with credit limits and some
//! cash-only, so credit scenarios can be exercised out of the box.

use chrono::Utc;
use std::env;
use caja_core::{Client, Product};
use caja_db::{Database, DbConfig};
use uuid::Uuid;

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEB",
        &[
            "Coca-Cola",
            "Sprite",
            "Fanta Naranja",
            "Agua Mineral",
            "Agua con Gas",
            "Jugo de Naranja",
            "Jugo de Manzana",
            "Limonada",
            "Te Helado",
            "Cerveza Rubia",
            "Vino Tinto",
            "Soda",
        ],
    ),
    (
        "ALM",
        &[
            "Arroz Largo Fino",
            "Fideos Spaghetti",
            "Fideos Tirabuzon",
            "Harina 000",
            "Azucar",
            "Sal Fina",
            "Aceite de Girasol",
            "Vinagre",
            "Arvejas en Lata",
            "Choclo en Lata",
            "Tomate Triturado",
            "Atun en Aceite",
        ],
    ),
    (
        "LAC",
        &[
            "Leche Entera",
            "Leche Descremada",
            "Yogur Natural",
            "Yogur Frutilla",
            "Queso Cremoso",
            "Queso Rallado",
            "Manteca",
            "Crema de Leche",
            "Dulce de Leche",
            "Huevos Docena",
        ],
    ),
    (
        "LIM",
        &[
            "Lavandina",
            "Detergente",
            "Jabon en Polvo",
            "Esponja",
            "Papel Higienico",
            "Rollo de Cocina",
            "Bolsas de Residuo",
            "Desodorante de Ambiente",
        ],
    ),
    (
        "GOL",
        &[
            "Alfajor Chocolate",
            "Alfajor Blanco",
            "Chicle Menta",
            "Caramelos Surtidos",
            "Chocolate con Leche",
            "Galletitas Dulces",
            "Galletitas Saladas",
            "Papas Fritas",
            "Mani Salado",
            "Turron",
        ],
    ),
];

/// Size variants for products
const SIZES: &[(&str, i64)] = &[
    ("500g", 0),
    ("1kg", 120),
    ("500ml", 0),
    ("1L", 80),
    ("1.5L", 150),
    ("2.25L", 260),
    ("x6", 320),
    ("x12", 550),
];

/// Demo clients: (name, credit limit in cents, None = cash-only)
const CLIENTS: &[(&str, Option<i64>)] = &[
    ("Rosa Fernandez", Some(500000)),
    ("Carlos Gimenez", Some(200000)),
    ("Kiosco El Paso", Some(1500000)),
    ("Marta Lopez", None),
    ("Consumidor Final", None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 2000;
    let mut db_path = String::from("./caja_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(2000);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Caja POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 2000)");
                println!("  -d, --db <PATH>    Database file path (default: ./caja_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    // Repository-level debug logs, opt-in via RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("🌱 Caja POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.catalog().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    for seed in 0..count {
        let product = generate_product(seed);

        if let Err(e) = db.catalog().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }

        generated += 1;

        if generated % 500 == 0 {
            println!("  Generated {} products...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    println!(
        "  Rate: {:.0} products/second",
        generated as f64 / elapsed.as_secs_f64()
    );

    // Demo clients
    println!();
    println!("Generating clients...");

    for (name, credit_limit_cents) in CLIENTS {
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            credit_limit_cents: *credit_limit_cents,
            created_at: Utc::now(),
        };
        db.ledger().insert_client(&client).await?;
    }

    println!("✓ Generated {} clients", CLIENTS.len());
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with realistic data.
///
/// `seed` is a running index; the category × name × size grid cycles once
/// exhausted, while barcode and item number stay unique per seed.
fn generate_product(seed: usize) -> Product {
    let now = Utc::now();

    let (category, name, size, price_addon) = grid_slot(seed);

    // EAN-13-shaped barcode (Argentine 779 prefix, checksum not valid)
    let barcode = Some(format!("779{:010}", seed));

    // Internal catalog item number, shared prefix within a category so
    // short-code lookups have something to match against.
    let item_number = Some(format!("{}{:05}", category, seed));

    // Price: base $0.99-$8.99 + size addon
    let base_price = 99 + ((seed * 17) % 800) as i64;
    let price_cents = base_price + price_addon;

    // Stock 0-100, with a few products deliberately out of stock
    let stock_quantity = (seed % 101) as i64;

    Product {
        id: Uuid::new_v4().to_string(),
        name: format!("{} {}", name, size),
        barcode,
        item_number,
        price_cents,
        stock_quantity,
        created_at: now,
        updated_at: now,
    }
}

/// Maps a running index onto the category × name × size grid, wrapping
/// around when the index exceeds the grid.
fn grid_slot(seed: usize) -> (&'static str, &'static str, &'static str, i64) {
    let total_names: usize = CATEGORIES.iter().map(|(_, names)| names.len()).sum();
    let slot = seed % (total_names * SIZES.len());

    let (size, price_addon) = SIZES[slot % SIZES.len()];

    let mut name_slot = slot / SIZES.len();
    for &(category, names) in CATEGORIES {
        if name_slot < names.len() {
            return (category, names[name_slot], size, price_addon);
        }
        name_slot -= names.len();
    }

    unreachable!("slot is bounded by the grid size");
}

// =============================================================================
// Unit Tests
// =============================================================================

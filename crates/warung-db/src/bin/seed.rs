//! # Seed Data Generator
//!
//! Populates a database with an admin account and a demo warung catalog.
//!
//! ## Usage
//! ```bash
//! # Default database ./warung_dev.db, admin/admin123
//! cargo run -p warung-db --bin seed
//!
//! # Custom path and admin credentials
//! cargo run -p warung-db --bin seed -- --db ./data/warung.db --admin owner --password s3cret
//! ```
//!
//! ## Generated Data
//! - One `admin` user (skipped if the username exists)
//! - Products across the usual warung shelves: sembako, minuman, makanan
//!   ringan, rokok, toiletries
//!
//! The catalog is only inserted into an empty products table.

use std::env;

use warung_core::{NewProduct, Role};
use warung_db::{hash_password, Database, DbConfig};

/// (category, [(name, price in rupiah, barcode)])
const CATALOG: &[(&str, &[(&str, i64, &str)])] = &[
    (
        "Sembako",
        &[
            ("Beras Pandan Wangi 5kg", 78_000, "8991002100015"),
            ("Minyak Goreng Bimoli 2L", 38_500, "8992628020012"),
            ("Gula Pasir Gulaku 1kg", 17_500, "8993093665018"),
            ("Telur Ayam 1kg", 28_000, "2000000000017"),
            ("Tepung Terigu Segitiga Biru 1kg", 13_000, "8992760221016"),
            ("Kecap Manis Bango 220ml", 11_500, "8992694240014"),
        ],
    ),
    (
        "Minuman",
        &[
            ("Aqua 600ml", 4_000, "8886008101053"),
            ("Teh Botol Sosro 450ml", 6_000, "8886013311011"),
            ("Kopi Kapal Api Sachet", 1_500, "8991002101012"),
            ("Susu Ultra Coklat 250ml", 6_500, "8998009010019"),
            ("Pocari Sweat 500ml", 8_000, "8997035563018"),
        ],
    ),
    (
        "Makanan Ringan",
        &[
            ("Indomie Goreng", 3_500, "089686010947"),
            ("Chitato Sapi Panggang 68g", 11_000, "089686591828"),
            ("Roma Kelapa 300g", 10_500, "8996001600146"),
            ("Beng-Beng", 2_500, "8996001320013"),
        ],
    ),
    (
        "Rokok",
        &[
            ("Gudang Garam Filter 12", 27_000, "8998989100120"),
            ("Sampoerna Mild 16", 33_500, "8999909096004"),
        ],
    ),
    (
        "Toiletries",
        &[
            ("Sabun Lifebuoy 110g", 4_500, "8999999036157"),
            ("Pepsodent 190g", 13_500, "8999999706180"),
            ("Shampoo Sunsilk Sachet", 1_000, "8999999041458"),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./warung_dev.db");
    let mut admin_username = String::from("admin");
    let mut admin_password = String::from("admin123");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin" | "-u" => {
                if i + 1 < args.len() {
                    admin_username = args[i + 1].clone();
                    i += 1;
                }
            }
            "--password" | "-p" => {
                if i + 1 < args.len() {
                    admin_password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Warung Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>         Database file path (default: ./warung_dev.db)");
                println!("  -u, --admin <NAME>      Admin username (default: admin)");
                println!("  -p, --password <PASS>   Admin password (default: admin123)");
                println!("  -h, --help              Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Warung Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Admin account
    if db.users().find_by_username(&admin_username).await?.is_some() {
        println!("⚠ User '{}' already exists, leaving it alone", admin_username);
    } else {
        let hash = hash_password(&admin_password)?;
        let admin = db.users().create(&admin_username, &hash, Role::Admin).await?;
        println!("✓ Created admin '{}' (id {})", admin.username, admin.id);
    }

    // Catalog
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping catalog to avoid duplicates.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    for (shelf, (category, products)) in CATALOG.iter().enumerate() {
        for (position, (name, price, barcode)) in products.iter().enumerate() {
            let product = NewProduct {
                name: name.to_string(),
                price: *price,
                stock: demo_stock(shelf, position),
                category: category.to_string(),
                description: None,
                barcode: Some(barcode.to_string()),
            };

            if let Err(e) = db.products().create(&product).await {
                eprintln!("Failed to insert {}: {}", product.name, e);
                continue;
            }
            generated += 1;
        }
        println!("  {:<16} {} products", category, products.len());
    }

    println!();
    println!("✓ Generated {} products", generated);
    println!("✓ Seed complete!");

    Ok(())
}

/// Deterministic stock between 0 and 48; some items start sold out.
fn demo_stock(shelf: usize, position: usize) -> i64 {
    ((shelf * 7 + position * 13) % 49) as i64
}

//! # Seed Data Generator
//!
//! Populates a development database with sample books.
//!
//! ## Usage
//! ```bash
//! # Generate 200 books (default)
//! cargo run -p shelf-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p shelf-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p shelf-db --bin seed -- --db ./data/shelfstock.db
//! ```
//!
//! Each generated book gets a title from one of five categories, a volume
//! suffix once titles repeat, a price between $4.99 and $29.98, a stock level
//! between 0 and 40, and an author/language drawn from small fixed lists.
//! Seeding writes records only; no notifications are generated.

use shelf_core::{Money, Record};
use shelf_db::{Database, DbConfig};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Sample titles per category
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Fiction",
        &[
            "Dune",
            "Dune Messiah",
            "The Left Hand of Darkness",
            "Neuromancer",
            "Foundation",
            "Hyperion",
            "Solaris",
            "Kindred",
        ],
    ),
    (
        "Science",
        &[
            "Cosmos",
            "A Brief History of Time",
            "The Selfish Gene",
            "The Gene",
            "Silent Spring",
            "The Elegant Universe",
        ],
    ),
    (
        "History",
        &[
            "SPQR",
            "The Guns of August",
            "Guns, Germs, and Steel",
            "The Silk Roads",
            "Postwar",
        ],
    ),
    (
        "Cooking",
        &[
            "Salt, Fat, Acid, Heat",
            "The Food Lab",
            "Joy of Cooking",
            "Plenty",
        ],
    ),
    (
        "Programming",
        &[
            "The Rust Programming Language",
            "Structure and Interpretation of Computer Programs",
            "The Pragmatic Programmer",
            "Designing Data-Intensive Applications",
        ],
    ),
];

const AUTHORS: &[&str] = &["", "A. Reader", "J. Doe", "M. Writer"];

const LANGUAGES: &[&str] = &["English", "", "French", "German"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./shelfstock_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("ShelfStock Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of books to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./shelfstock_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, count, "Seeding database");

    let db = Database::connect(DbConfig::new(&db_path)).await?;
    let store = db.records();

    let existing = store.count().await?;
    if existing > 0 {
        warn!(existing, "Database already has records, skipping seed");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let record = generate_record(seed);
        if let Err(e) = store.insert(&record).await {
            warn!(name = %record.name, error = %e, "Failed to insert record");
            continue;
        }

        generated += 1;
        if generated % 100 == 0 {
            info!(generated, "Progress");
        }
    }

    let elapsed = start.elapsed();
    info!(generated, ?elapsed, "Records generated");

    let dune = store.search("dune").await?;
    let fiction = store.search("fiction").await?;
    println!("Search 'dune': {} results", dune.len());
    println!("Search 'fiction': {} results", fiction.len());

    db.close().await;
    println!("Seed complete!");

    Ok(())
}

/// Builds one deterministic sample book.
fn generate_record(seed: usize) -> Record {
    let titles: usize = CATEGORIES.iter().map(|(_, t)| t.len()).sum();

    // Walk the titles in order, wrapping with a volume number.
    let mut index = seed % titles;
    let volume = seed / titles;
    let (category, title) = CATEGORIES
        .iter()
        .find_map(|(category, list)| {
            if index < list.len() {
                Some((*category, list[index]))
            } else {
                index -= list.len();
                None
            }
        })
        .unwrap_or(("Fiction", "Untitled"));

    let name = if volume == 0 {
        title.to_string()
    } else {
        format!("{} (Vol. {})", title, volume + 1)
    };

    let price = Money::from_cents(499 + ((seed * 37) % 2500) as i64);
    let quantity = ((seed * 7) % 41) as i64;

    Record::new(name, category, quantity, price)
        .with_author(AUTHORS[seed % AUTHORS.len()])
        .with_language(LANGUAGES[seed % LANGUAGES.len()])
}

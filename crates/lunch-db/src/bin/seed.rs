//! # Demo Data Seeder
//!
//! Writes a profile and two demo reservations for one owner.
//!
//! ## Usage
//! ```bash
//! cargo run -p lunch-db --bin seed -- --owner 3f2a...
//! cargo run -p lunch-db --bin seed -- --db ./data/lunch.db --owner 3f2a... --email ana@example.com
//! LUNCH_DB_PATH=./data/lunch.db RUST_LOG=lunch_db=debug cargo run -p lunch-db --bin seed -- --owner 3f2a...
//! ```
//!
//! The database file is `--db`, else `LUNCH_DB_PATH`, else `./lunch_dev.db`.
//! `LUNCH_DB_MAX_CONNECTIONS` sizes the pool.
//!
//! ## Generated Rows
//! - today + 7 days, `Normal`
//! - today + 9 days, `Hipocalórico`
//!
//! Dates that already have a row for the owner are left untouched, so the
//! tool can be run repeatedly.

use chrono::{Days, Local};
use lunch_core::{MenuType, NewReservation, Profile, DEFAULT_ROLE};
use lunch_db::{Database, DbConfig};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_DB_PATH: &str = "./lunch_dev.db";

const DEMO_ROWS: &[(u64, MenuType)] = &[(7, MenuType::Normal), (9, MenuType::Hipocaloric)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut config = DbConfig::new(DEFAULT_DB_PATH).with_overrides(|key| env::var(key).ok());
    let mut owner: Option<String> = None;
    let mut email = String::from("demo@example.com");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    config.database_path = PathBuf::from(value);
                    i += 1;
                }
            }
            "--owner" | "-o" => {
                if let Some(value) = args.get(i + 1) {
                    owner = Some(value.clone());
                    i += 1;
                }
            }
            "--email" | "-e" => {
                if let Some(value) = args.get(i + 1) {
                    email = value.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {other}");
            }
        }
        i += 1;
    }

    let Some(owner) = owner else {
        print_help();
        return Err("--owner is required".into());
    };

    println!("Lunch Reservations Seeder");
    println!("=========================");
    println!("Database: {}", config.database_path.display());
    println!("Owner:    {owner}");
    println!();

    let db = Database::new(config).await?;
    println!("✓ Connected, migrations applied");

    db.profiles()
        .upsert(&Profile {
            owner_id: owner.clone(),
            email: email.clone(),
            full_name: "Usuario Demo".to_string(),
            employee_id: "EMP001".to_string(),
            department: Some("Tecnología".to_string()),
            role: DEFAULT_ROLE.to_string(),
        })
        .await?;
    println!("✓ Profile written for {email}");

    let today = Local::now().date_naive();
    let mut rows = Vec::new();

    for (offset, menu_type) in DEMO_ROWS {
        let Some(date) = today.checked_add_days(Days::new(*offset)) else {
            continue;
        };

        if db.reservations().find_by_date(&owner, date).await?.is_some() {
            println!("  {date} already reserved, skipping");
            continue;
        }

        rows.push(NewReservation::confirmed(owner.clone(), date, *menu_type));
    }

    let inserted = db.reservations().insert_many(&rows).await?;
    for row in &rows {
        println!("  {} {}", row.date, row.menu_type);
    }

    println!();
    println!("✓ Seed complete: {inserted} reservation(s) created");

    db.close().await;
    Ok(())
}

fn print_help() {
    println!("Lunch Reservations Seeder");
    println!();
    println!("Usage: seed --owner <ID> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -o, --owner <ID>      Owner (user) id the rows belong to (required)");
    println!("  -e, --email <EMAIL>   Profile email (default: demo@example.com)");
    println!("  -d, --db <PATH>       Database file path (default: $LUNCH_DB_PATH, then ./lunch_dev.db)");
    println!("  -h, --help            Show this help message");
}

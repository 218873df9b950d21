use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use expense_tracker::{
    Identity, NewTransaction, TransactionKind, add_transaction, initialize_db, set_premium,
    upsert_user,
};

/// A utility for creating a test database for the expense_tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// Give the test user the Premium tier.
    #[arg(long)]
    premium: bool,
}

/// Sample transactions as (description, amount, kind, days ago, category).
const SAMPLE_TRANSACTIONS: &[(&str, f64, TransactionKind, i64, Option<&str>)] = &[
    ("Salary", 3200.0, TransactionKind::Income, 0, Some("Salary")),
    ("Groceries", 84.2, TransactionKind::Expense, 1, Some("Food")),
    ("Coffee", 4.5, TransactionKind::Expense, 2, Some("Food")),
    ("Bus fare", 3.8, TransactionKind::Expense, 3, Some("Transport")),
    ("Electricity bill", 96.0, TransactionKind::Expense, 5, Some("Utilities")),
    ("Cinema", 18.0, TransactionKind::Expense, 6, None),
    ("Salary", 3200.0, TransactionKind::Income, 30, Some("Salary")),
    ("Rent", 1450.0, TransactionKind::Expense, 31, Some("Housing")),
    ("Groceries", 112.9, TransactionKind::Expense, 35, Some("Food")),
    ("Sold old bike", 150.0, TransactionKind::Income, 40, None),
    ("Salary", 3200.0, TransactionKind::Income, 60, Some("Salary")),
    ("Rent", 1450.0, TransactionKind::Expense, 61, Some("Housing")),
    ("Salary", 3200.0, TransactionKind::Income, 90, Some("Salary")),
    ("Rent", 1450.0, TransactionKind::Expense, 91, Some("Housing")),
    ("Car repair", 640.0, TransactionKind::Expense, 100, Some("Transport")),
    ("Salary", 3200.0, TransactionKind::Income, 120, Some("Salary")),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");
    let user = upsert_user(
        &Identity {
            subject: "test-user".to_owned(),
            name: "Test User".to_owned(),
            email: "test@example.com".to_owned(),
        },
        &conn,
    )?;

    if args.premium {
        println!("Activating Premium...");
        set_premium(user.id, &conn)?;
    }

    println!("Adding sample transactions...");
    let today = OffsetDateTime::now_utc().date();
    for &(description, amount, kind, days_ago, category) in SAMPLE_TRANSACTIONS {
        add_transaction(
            user.id,
            NewTransaction {
                description: description.to_owned(),
                amount,
                kind,
                date: today - Duration::days(days_ago),
                category: category.map(str::to_owned),
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}

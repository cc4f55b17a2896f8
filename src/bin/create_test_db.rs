use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime};

use expense_tracker::{
    NewExpense, PasswordHash, ValidatedPassword, create_expense, create_user, initialize_db,
};

/// A utility for creating a test database for the expense_tracker web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many days of sample expenses to create, counting back from today.
    #[arg(long, default_value_t = 365)]
    days: i64,
}

/// Categories, amounts in cents and descriptions cycled through for the sample expenses.
const SAMPLE_EXPENSES: [(&str, i64, &str); 6] = [
    ("Groceries", 8_450, "Weekly shop"),
    ("Transport", 1_200, "Bus fare"),
    ("Eating Out", 3_275, "Dinner"),
    ("Utilities", 14_999, "Power bill"),
    ("Entertainment", 2_500, "Movie tickets"),
    ("Health", 4_560, "Pharmacy"),
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

    println!("Creating test user 'test' with password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("test", password_hash, &conn)?;

    println!("Creating sample expenses...");

    let today = OffsetDateTime::now_utc().date();
    let mut expense_count = 0;

    for day in 0..args.days.max(0) {
        // One expense every third day keeps each month varied without flooding the tables.
        if day % 3 != 0 {
            continue;
        }

        let date = today - Duration::days(day);
        create_expense(user.id, sample_expense(date, day), &conn)?;
        expense_count += 1;
    }

    println!("Created {expense_count} expenses.");
    println!("Success!");

    Ok(())
}

fn sample_expense(date: Date, day: i64) -> NewExpense {
    let index = (day / 3) as usize % SAMPLE_EXPENSES.len();
    let (category, cents, description) = SAMPLE_EXPENSES[index];
    // Nudge the amount so repeated categories do not all have the same total.
    let cents = cents + (day % 7) * 25;

    NewExpense {
        category: category.to_owned(),
        amount: Decimal::new(cents, 2),
        date,
        description: Some(description.to_owned()),
    }
}

use std::{
    error::Error,
    path::Path,
    process::exit,
    str::FromStr,
    sync::{Arc, Mutex},
};

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use budgethink::{
    BudgetName, BudgetStore, CategoryName, CategoryStore, Money, NewBudget, NewCategory,
    NewTransaction, PasswordHash, SQLiteBudgetStore, SQLiteCategoryStore, SQLiteTransactionStore,
    TransactionStore, TransactionTitle, TransactionType, ValidatedPassword, create_user,
    initialize_db,
};

/// A utility for creating a test database for the REST API server of budgethink.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const TEST_EMAIL: &str = "test@example.com";
const TEST_PASSWORD: &str = "test";

/// How many days of transactions to create, ending today.
const HISTORY_DAYS: i64 = 120;

const EXPENSE_CATEGORIES: [(&str, &str, &[&str]); 7] = [
    (
        "Food & Dining",
        "Groceries, restaurants, and food delivery",
        &["Weekly groceries", "Dinner out", "Coffee"],
    ),
    (
        "Transportation",
        "Public transport, fuel, and car maintenance",
        &["Bus fare", "Fuel", "Taxi ride"],
    ),
    (
        "Housing",
        "Rent, utilities, and home maintenance",
        &["Rent", "Electricity bill", "Internet bill"],
    ),
    (
        "Entertainment",
        "Movies, games, and leisure activities",
        &["Movie tickets", "Streaming subscription", "Concert tickets"],
    ),
    (
        "Shopping",
        "Clothing, electronics, and other purchases",
        &["New clothes", "Headphones", "Kitchenware"],
    ),
    (
        "Healthcare",
        "Medical expenses and insurance",
        &["Doctor consultation", "Pharmacy", "Dental checkup"],
    ),
    (
        "Education",
        "Books, courses, and educational materials",
        &["Online course", "Textbooks", "Workshop"],
    ),
];

const INCOME_CATEGORIES: [(&str, &str, &[&str]); 3] = [
    (
        "Salary",
        "Monthly salary and bonuses",
        &["Salary", "Performance bonus"],
    ),
    (
        "Freelance",
        "Income from freelance work",
        &["Web development project", "Consulting"],
    ),
    (
        "Investments",
        "Investment returns and dividends",
        &["Dividends", "Interest"],
    ),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;
    initialize_db(&conn)?;

    println!("Creating test user {TEST_EMAIL} with password \"{TEST_PASSWORD}\"...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(EmailAddress::from_str(TEST_EMAIL)?, password_hash, &conn)?;

    let conn = Arc::new(Mutex::new(conn));
    let categories = SQLiteCategoryStore::new(conn.clone());
    let transactions = SQLiteTransactionStore::new(conn.clone());
    let budgets = SQLiteBudgetStore::new(conn);

    println!("Creating categories...");
    let mut expense_categories = Vec::new();
    for (name, description, titles) in EXPENSE_CATEGORIES {
        let category = categories.create(new_category(name, description), user.id)?;
        expense_categories.push((category.id, titles));
    }

    let mut income_categories = Vec::new();
    for (name, description, titles) in INCOME_CATEGORIES {
        let category = categories.create(new_category(name, description), user.id)?;
        income_categories.push((category.id, titles));
    }

    println!("Creating transactions...");
    let today = OffsetDateTime::now_utc().date();
    let mut count = 0;

    for day in 0..=HISTORY_DAYS {
        let date = today - Duration::days(HISTORY_DAYS - day);

        // Amounts and categories cycle through fixed sequences so that every
        // run produces the same data relative to today.
        for slot in 0..2 {
            let index = (day * 2 + slot) as usize;
            let (category_id, titles) = expense_categories[index % expense_categories.len()];
            transactions.create(
                NewTransaction {
                    title: TransactionTitle::new_unchecked(titles[index % titles.len()]),
                    description: None,
                    transaction_type: TransactionType::Expense,
                    amount: Money::from_cents(1_000 + (index as i64 * 7_919) % 49_000),
                    date,
                    category_id: Some(category_id),
                },
                user.id,
            )?;
            count += 1;
        }

        if day % 7 == 0 {
            let index = (day / 7) as usize;
            let (category_id, titles) = income_categories[index % income_categories.len()];
            transactions.create(
                NewTransaction {
                    title: TransactionTitle::new_unchecked(titles[index % titles.len()]),
                    description: Some("Deposited to checking".to_owned()),
                    transaction_type: TransactionType::Income,
                    amount: Money::from_cents(100_000 + (index as i64 * 104_729) % 400_000),
                    date,
                    category_id: Some(category_id),
                },
                user.id,
            )?;
            count += 1;
        }
    }
    println!("Created {count} transactions.");

    println!("Creating budgets...");
    for (i, (category_id, _)) in expense_categories.iter().enumerate() {
        let (name, _, _) = EXPENSE_CATEGORIES[i];
        budgets.create(
            NewBudget {
                name: BudgetName::new_unchecked(&format!("{name} Budget")),
                amount_limit: Money::from_cents(100_000 + i as i64 * 50_000),
                category_id: Some(*category_id),
            },
            user.id,
        )?;
    }
    budgets.create(
        NewBudget {
            name: BudgetName::new_unchecked("Monthly spending"),
            amount_limit: Money::from_cents(1_000_000),
            category_id: None,
        },
        user.id,
    )?;

    println!("Success!");

    Ok(())
}

fn new_category(name: &str, description: &str) -> NewCategory {
    NewCategory {
        name: CategoryName::new_unchecked(name),
        description: Some(description.to_owned()),
        hex_color: None,
    }
}

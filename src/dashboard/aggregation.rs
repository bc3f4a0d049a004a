//! Totals, per-category expenses and the monthly income/expense series.
//!
//! Every function here is pure and reports arithmetic failures as
//! [Error::DashboardFailed] instead of panicking.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use time::{Date, Month, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    category::CategoryId,
    money::Money,
    transaction::{Transaction, TransactionType},
};

const MONTH_LABEL_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]");

/// Income, expense and their difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Total income.
    pub income: Money,
    /// Total expense.
    pub expense: Money,
    /// Income minus expense.
    pub balance: Money,
}

/// How much was spent in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryExpense {
    /// The ID of the category.
    pub category_id: CategoryId,
    /// The name of the category.
    pub name: String,
    /// The display color, e.g. "#FF0000".
    pub hex_color: Option<String>,
    /// The sum of the expenses in the category.
    pub total: Money,
}

/// Income and expense for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    /// The month as `YYYY-MM`.
    pub month: String,
    /// Total income.
    pub income: Money,
    /// Total expense.
    pub expense: Money,
}

fn overflow(what: &str) -> Error {
    Error::DashboardFailed(format!("{what} is too large to be represented"))
}

fn add(total: &mut Money, amount: Money, what: &str) -> Result<(), Error> {
    *total = total.checked_add(amount).ok_or_else(|| overflow(what))?;

    Ok(())
}

/// Sum income and expense over `transactions`.
pub(super) fn calculate_totals(transactions: &[Transaction]) -> Result<Totals, Error> {
    let mut totals = Totals::default();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => add(&mut totals.income, transaction.amount, "total income")?,
            TransactionType::Expense => {
                add(&mut totals.expense, transaction.amount, "total expense")?
            }
        }
    }

    totals.balance = totals
        .income
        .checked_sub(totals.expense)
        .ok_or_else(|| overflow("balance"))?;

    Ok(totals)
}

/// Sum expenses per category, largest first with ties ordered by name.
///
/// Uncategorized transactions and categories without expenses are left out.
pub(super) fn expenses_by_category(
    transactions: &[Transaction],
) -> Result<Vec<CategoryExpense>, Error> {
    let mut by_category: HashMap<CategoryId, CategoryExpense> = HashMap::new();

    let categorized_expenses = transactions
        .iter()
        .filter(|transaction| transaction.transaction_type == TransactionType::Expense)
        .filter_map(|transaction| {
            transaction
                .category
                .as_ref()
                .map(|category| (category, transaction.amount))
        });

    for (category, amount) in categorized_expenses {
        let entry = by_category
            .entry(category.id)
            .or_insert_with(|| CategoryExpense {
                category_id: category.id,
                name: category.name.clone(),
                hex_color: category.hex_color.clone(),
                total: Money::ZERO,
            });
        add(&mut entry.total, amount, "category expense")?;
    }

    let mut expenses: Vec<CategoryExpense> = by_category
        .into_values()
        .filter(|expense| expense.total.is_positive())
        .collect();
    expenses.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

    Ok(expenses)
}

fn first_of_month(date: Date) -> Result<Date, Error> {
    date.replace_day(1)
        .map_err(|error| Error::DashboardFailed(error.to_string()))
}

/// The first day of the month `months_span - 1` months before `today`'s month.
///
/// A window reaching past the earliest representable date starts at [Date::MIN].
pub(super) fn window_start(today: Date, months_span: u32) -> Date {
    let current_month = i64::from(today.year()) * 12 + i64::from(u8::from(today.month())) - 1;
    let first_month = current_month - i64::from(months_span.saturating_sub(1));

    let year = i32::try_from(first_month.div_euclid(12));
    let month = u8::try_from(first_month.rem_euclid(12) + 1)
        .ok()
        .and_then(|month| Month::try_from(month).ok());

    match (year, month) {
        (Ok(year), Some(month)) => Date::from_calendar_date(year, month, 1).unwrap_or(Date::MIN),
        _ => Date::MIN,
    }
}

/// Income and expense per month from `start` up to and including the month of
/// `today`, newest month first. Months without transactions are left out.
pub(super) fn monthly_income_vs_expenses(
    transactions: &[Transaction],
    start: Date,
    today: Date,
) -> Result<Vec<MonthlyTotals>, Error> {
    let current_month = first_of_month(today)?;
    let mut by_month: BTreeMap<Date, (Money, Money)> = BTreeMap::new();

    for transaction in transactions.iter().filter(|transaction| transaction.date >= start) {
        let month = first_of_month(transaction.date)?;
        if month > current_month {
            continue;
        }

        let (income, expense) = by_month.entry(month).or_insert((Money::ZERO, Money::ZERO));

        match transaction.transaction_type {
            TransactionType::Income => add(income, transaction.amount, "monthly income")?,
            TransactionType::Expense => add(expense, transaction.amount, "monthly expense")?,
        }
    }

    by_month
        .into_iter()
        .rev()
        .map(|(month, (income, expense))| {
            let label = month
                .format(MONTH_LABEL_FORMAT)
                .map_err(|error| Error::DashboardFailed(error.to_string()))?;

            Ok(MonthlyTotals {
                month: label,
                income,
                expense,
            })
        })
        .collect()
}

//! Implements a SQLite backed category store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    category::{
        Category, CategoryId, CategoryName, CategoryTotals, HexColor, MAX_CATEGORIES_PER_USER,
        NewCategory,
    },
    db::{CreateTable, lock_connection},
    stores::CategoryStore,
};

/// Creates, retrieves, updates and deletes categories in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCategoryStore {
    /// Create a new category store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

/// Selects a category with its transaction totals. Callers append the WHERE
/// clause and must end with `GROUP BY c.id`.
const SELECT_CATEGORY_WITH_TOTALS: &str = "SELECT
        c.id, c.name, c.description, c.hex_color, c.user_id, c.created_at, c.updated_at,
        COUNT(t.id),
        COALESCE(SUM(t.type = 'income'), 0),
        COALESCE(SUM(t.type = 'expense'), 0),
        COALESCE(SUM(CASE WHEN t.type = 'income' THEN t.amount ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN t.type = 'expense' THEN t.amount ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN t.type = 'income' THEN t.amount ELSE -t.amount END), 0)
    FROM category c
    LEFT JOIN \"transaction\" t ON t.category_id = c.id";

impl CategoryStore for SQLiteCategoryStore {
    /// Create a category in the database.
    ///
    /// The limit check and insert run in one SQL transaction while the
    /// connection lock is held, so concurrent requests cannot both pass the check.
    fn create(&self, category: NewCategory, user_id: UserID) -> Result<Category, Error> {
        let mut connection = lock_connection(&self.connection)?;
        let transaction = connection.transaction()?;

        let category_count: i64 = transaction.query_row(
            "SELECT COUNT(id) FROM category WHERE user_id = ?1",
            (user_id.as_i64(),),
            |row| row.get(0),
        )?;

        if category_count >= MAX_CATEGORIES_PER_USER as i64 {
            return Err(Error::CategoryLimitReached(MAX_CATEGORIES_PER_USER));
        }

        let now = OffsetDateTime::now_utc();
        transaction.execute(
            "INSERT INTO category (name, description, hex_color, user_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            (
                category.name.as_ref(),
                category.description.as_deref(),
                category.hex_color.as_ref().map(|color| color.as_ref()),
                user_id.as_i64(),
                now,
            ),
        )?;

        let category = get_category(&transaction, transaction.last_insert_rowid(), user_id)?;
        transaction.commit()?;

        Ok(category)
    }

    fn get(&self, category_id: CategoryId, user_id: UserID) -> Result<Category, Error> {
        let connection = lock_connection(&self.connection)?;

        get_category(&connection, category_id, user_id)
    }

    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Category>, Error> {
        let connection = lock_connection(&self.connection)?;

        connection
            .prepare(&format!(
                "{SELECT_CATEGORY_WITH_TOTALS}
                WHERE c.user_id = :user_id
                GROUP BY c.id
                ORDER BY c.name ASC"
            ))?
            .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
            .map(|maybe_category| maybe_category.map_err(Error::from))
            .collect()
    }

    fn update(
        &self,
        category_id: CategoryId,
        category: NewCategory,
        user_id: UserID,
    ) -> Result<Category, Error> {
        let connection = lock_connection(&self.connection)?;

        let rows_affected = connection.execute(
            "UPDATE category
            SET name = ?1, description = ?2, hex_color = ?3, updated_at = ?4
            WHERE id = ?5 AND user_id = ?6",
            (
                category.name.as_ref(),
                category.description.as_deref(),
                category.hex_color.as_ref().map(|color| color.as_ref()),
                OffsetDateTime::now_utc(),
                category_id,
                user_id.as_i64(),
            ),
        )?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingCategory);
        }

        get_category(&connection, category_id, user_id)
    }

    fn delete(&self, category_id: CategoryId, user_id: UserID) -> Result<(), Error> {
        let connection = lock_connection(&self.connection)?;

        let rows_affected = connection.execute(
            "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
            (category_id, user_id.as_i64()),
        )?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingCategory);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                hex_color TEXT,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(user_id, name),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
            )",
            (),
        )?;

        Ok(())
    }
}

fn get_category(
    connection: &Connection,
    category_id: CategoryId,
    user_id: UserID,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CATEGORY_WITH_TOTALS}
            WHERE c.id = :id AND c.user_id = :user_id
            GROUP BY c.id"
        ))?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Check that `category_id` refers to one of the user's categories.
///
/// # Errors
///
/// Returns [Error::InvalidCategory] if the category does not exist or belongs
/// to another user.
pub(crate) fn ensure_category_owned_by(
    connection: &Connection,
    category_id: CategoryId,
    user_id: UserID,
) -> Result<(), Error> {
    let is_owned: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM category WHERE id = ?1 AND user_id = ?2)",
        (category_id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    if is_owned {
        Ok(())
    } else {
        Err(Error::InvalidCategory(category_id))
    }
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(1)?;
    let raw_color: Option<String> = row.get(3)?;

    Ok(Category {
        id: row.get(0)?,
        name: CategoryName::new_unchecked(&raw_name),
        description: row.get(2)?,
        hex_color: raw_color.as_deref().map(HexColor::new_unchecked),
        user_id: UserID::new(row.get(4)?),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        totals: CategoryTotals {
            transactions_count: row.get(7)?,
            income_count: row.get(8)?,
            expense_count: row.get(9)?,
            total_income: row.get(10)?,
            total_expense: row.get(11)?,
            total_balance: row.get(12)?,
        },
    })
}

//! Implements a SQLite backed transaction store.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, Row, ToSql, types::Type};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    category::CategorySummary,
    db::{CreateTable, lock_connection},
    stores::{TransactionQuery, TransactionStore, sqlite::category::ensure_category_owned_by},
    transaction::{
        NewTransaction, Transaction, TransactionId, TransactionTitle, TransactionType,
        format_amount,
    },
};

/// Stores transactions in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const SELECT_TRANSACTION: &str = "SELECT
        t.id, t.title, t.description, t.type, t.amount, t.date, t.user_id, t.category_id,
        t.created_at, t.updated_at, c.name, c.hex_color
    FROM \"transaction\" t
    LEFT JOIN category c ON c.id = t.category_id";

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// The category check and insert happen while holding the connection lock.
    fn create(&self, transaction: NewTransaction, user_id: UserID) -> Result<Transaction, Error> {
        let connection = lock_connection(&self.connection)?;

        if let Some(category_id) = transaction.category_id {
            ensure_category_owned_by(&connection, category_id, user_id)?;
        }

        let now = OffsetDateTime::now_utc();
        connection.execute(
            "INSERT INTO \"transaction\"
                (title, description, type, amount, date, user_id, category_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            (
                transaction.title.as_ref(),
                transaction.description.as_deref(),
                transaction.transaction_type.as_str(),
                transaction.amount,
                transaction.date,
                user_id.as_i64(),
                transaction.category_id,
                now,
            ),
        )?;

        get_transaction(&connection, connection.last_insert_rowid(), user_id)
    }

    fn get(&self, transaction_id: TransactionId, user_id: UserID) -> Result<Transaction, Error> {
        let connection = lock_connection(&self.connection)?;

        get_transaction(&connection, transaction_id, user_id)
    }

    fn get_query(
        &self,
        query: TransactionQuery,
        user_id: UserID,
    ) -> Result<Vec<Transaction>, Error> {
        let mut where_clauses = vec!["t.user_id = :user_id"];
        let mut params: Vec<(&str, Box<dyn ToSql>)> =
            vec![(":user_id", Box::new(user_id.as_i64()))];

        if let Some(search) = query.search.filter(|search| !search.trim().is_empty()) {
            where_clauses.push(
                "(t.title LIKE :search ESCAPE '\\' \
                OR COALESCE(t.description, '') LIKE :search ESCAPE '\\')",
            );
            params.push((
                ":search",
                Box::new(format!("%{}%", escape_like(search.trim()))),
            ));
        }

        if let Some(transaction_type) = query.transaction_type {
            where_clauses.push("t.type = :type");
            params.push((":type", Box::new(transaction_type.as_str())));
        }

        if let Some(category_id) = query.category_id {
            where_clauses.push("t.category_id = :category_id");
            params.push((":category_id", Box::new(category_id)));
        }

        if let Some(date_from) = query.date_from {
            where_clauses.push("t.date >= :date_from");
            params.push((":date_from", Box::new(date_from)));
        }

        if let Some(date_to) = query.date_to {
            where_clauses.push("t.date <= :date_to");
            params.push((":date_to", Box::new(date_to)));
        }

        let limit_clause = match query.limit {
            Some(limit) => {
                params.push((":limit", Box::new(limit)));
                "LIMIT :limit"
            }
            None => "",
        };

        // Row IDs increase with insertion order, so they break ties on the same date.
        let sql = format!(
            "{SELECT_TRANSACTION}
            WHERE {}
            ORDER BY t.date DESC, t.id DESC
            {limit_clause}",
            where_clauses.join(" AND ")
        );

        let params: Vec<(&str, &dyn ToSql)> = params
            .iter()
            .map(|(name, value)| (*name, value.as_ref()))
            .collect();

        let connection = lock_connection(&self.connection)?;

        connection
            .prepare(&sql)?
            .query_map(params.as_slice(), map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    fn update(
        &self,
        transaction_id: TransactionId,
        transaction: NewTransaction,
        user_id: UserID,
    ) -> Result<Transaction, Error> {
        let connection = lock_connection(&self.connection)?;

        if let Some(category_id) = transaction.category_id {
            ensure_category_owned_by(&connection, category_id, user_id)?;
        }

        let rows_affected = connection.execute(
            "UPDATE \"transaction\"
            SET title = ?1, description = ?2, type = ?3, amount = ?4, date = ?5,
                category_id = ?6, updated_at = ?7
            WHERE id = ?8 AND user_id = ?9",
            (
                transaction.title.as_ref(),
                transaction.description.as_deref(),
                transaction.transaction_type.as_str(),
                transaction.amount,
                transaction.date,
                transaction.category_id,
                OffsetDateTime::now_utc(),
                transaction_id,
                user_id.as_i64(),
            ),
        )?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingTransaction);
        }

        get_transaction(&connection, transaction_id, user_id)
    }

    fn delete(&self, transaction_id: TransactionId, user_id: UserID) -> Result<(), Error> {
        let connection = lock_connection(&self.connection)?;

        let rows_affected = connection.execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (transaction_id, user_id.as_i64()),
        )?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingTransaction);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                amount INTEGER NOT NULL CHECK (amount > 0),
                date TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                category_id INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);
            CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);",
        )
    }
}

fn get_transaction(
    connection: &Connection,
    transaction_id: TransactionId,
    user_id: UserID,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.id = :id AND t.user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &transaction_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Escape the wildcard characters of a `LIKE` pattern.
fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_title: String = row.get(1)?;
    let raw_type: String = row.get(3)?;
    let transaction_type = TransactionType::from_str(&raw_type)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error)))?;
    let amount = row.get(4)?;
    let category_id = row.get(7)?;
    let category_name: Option<String> = row.get(10)?;

    let category = match (category_id, category_name) {
        (Some(id), Some(name)) => Some(CategorySummary {
            id,
            name,
            hex_color: row.get(11)?,
        }),
        _ => None,
    };

    Ok(Transaction {
        id: row.get(0)?,
        title: TransactionTitle::new_unchecked(&raw_title),
        description: row.get(2)?,
        transaction_type,
        amount,
        formatted_amount: format_amount(transaction_type, amount),
        date: row.get(5)?,
        user_id: UserID::new(row.get(6)?),
        category_id,
        category,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

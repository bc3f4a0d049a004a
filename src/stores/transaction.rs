//! Defines the transaction store trait.

use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::CategoryId,
    transaction::{NewTransaction, Transaction, TransactionId, TransactionType},
};

/// Handles the creation and retrieval of a user's transactions.
///
/// Every operation is scoped to `user_id`: a transaction owned by another user
/// behaves as if it does not exist.
pub trait TransactionStore {
    /// Create a new transaction for `user_id`.
    ///
    /// Implementers must return [Error::InvalidCategory] if the transaction's
    /// category does not belong to the user.
    fn create(&self, transaction: NewTransaction, user_id: UserID) -> Result<Transaction, Error>;

    /// Retrieve one of the user's transactions.
    fn get(&self, transaction_id: TransactionId, user_id: UserID) -> Result<Transaction, Error>;

    /// Retrieve the user's transactions that match `query`, newest first.
    ///
    /// Transactions on the same date are ordered from most to least recently created.
    fn get_query(&self, query: TransactionQuery, user_id: UserID)
    -> Result<Vec<Transaction>, Error>;

    /// Replace the fields of one of the user's transactions.
    fn update(
        &self,
        transaction_id: TransactionId,
        transaction: NewTransaction,
        user_id: UserID,
    ) -> Result<Transaction, Error>;

    /// Delete one of the user's transactions.
    fn delete(&self, transaction_id: TransactionId, user_id: UserID) -> Result<(), Error>;
}

/// Defines how transactions should be fetched from [TransactionStore::get_query].
///
/// Filters that are `None` are not applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// Case-insensitive text that must appear in the title or description.
    pub search: Option<String>,
    /// Only include income or expense transactions.
    pub transaction_type: Option<TransactionType>,
    /// Only include transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Include transactions on or after this date.
    pub date_from: Option<Date>,
    /// Include transactions on or before this date.
    pub date_to: Option<Date>,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u32>,
}

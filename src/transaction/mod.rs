//! Dated income and expense events and the handlers that manage them.

mod domain;
mod handlers;

pub use domain::{
    DATE_FORMAT, NewTransaction, Transaction, TransactionForm, TransactionId, TransactionTitle,
    TransactionType, format_amount, parse_date,
};
pub use handlers::{
    TransactionListParams, TransactionState, create_transaction, delete_transaction,
    get_transaction, get_transactions, update_transaction,
};

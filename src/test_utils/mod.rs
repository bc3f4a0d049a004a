//! Shared fixtures for unit and router tests.

#![allow(missing_docs)]

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum_extra::extract::cookie::Cookie;
use axum_test::{TestRequest, TestServer};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde_json::json;
use time::Date;

use crate::{
    auth::{COOKIE_TOKEN, PasswordHash, UserID, ValidatedPassword, create_user},
    build_router,
    db::initialize,
    endpoints,
    money::Money,
    stores::sqlite::{
        SQLAppState, SQLiteBudgetStore, SQLiteCategoryStore, SQLiteTransactionStore,
        create_app_state,
    },
    transaction::{NewTransaction, TransactionTitle, TransactionType},
};

pub(crate) const TEST_PASSWORD: &str = "fK9#mQ2$vL7@xR4!";

/// The lowest cost bcrypt accepts, keeps tests fast.
const TEST_HASH_COST: u32 = 4;

/// SQLite stores sharing one in-memory database with two registered users.
pub(crate) struct TestStores {
    pub connection: Arc<Mutex<Connection>>,
    pub categories: SQLiteCategoryStore,
    pub transactions: SQLiteTransactionStore,
    pub budgets: SQLiteBudgetStore,
    pub user: UserID,
    pub other_user: UserID,
}

pub(crate) fn get_test_stores() -> TestStores {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    let user = insert_test_user("test@test.com", &connection);
    let other_user = insert_test_user("other@test.com", &connection);
    let connection = Arc::new(Mutex::new(connection));

    TestStores {
        categories: SQLiteCategoryStore::new(connection.clone()),
        transactions: SQLiteTransactionStore::new(connection.clone()),
        budgets: SQLiteBudgetStore::new(connection.clone()),
        connection,
        user,
        other_user,
    }
}

fn insert_test_user(email: &str, connection: &Connection) -> UserID {
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        TEST_HASH_COST,
    )
    .expect("Could not hash password.");

    create_user(
        EmailAddress::from_str(email).expect("Invalid test email."),
        password_hash,
        connection,
    )
    .expect("Could not create test user.")
    .id
}

/// An uncategorized transaction titled "Test transaction".
pub(crate) fn new_transaction(
    amount_cents: i64,
    transaction_type: TransactionType,
    date: Date,
) -> NewTransaction {
    NewTransaction {
        title: TransactionTitle::new_unchecked("Test transaction"),
        description: None,
        transaction_type,
        amount: Money::from_cents(amount_cents),
        date,
        category_id: None,
    }
}

/// A server running the full router with a logged in user.
pub(crate) struct TestApp {
    pub server: TestServer,
    pub state: SQLAppState,
    pub user_id: UserID,
    pub auth_cookie: Cookie<'static>,
}

impl TestApp {
    pub fn get(&self, path: &str) -> TestRequest {
        self.server.get(path).add_cookie(self.auth_cookie.clone())
    }

    pub fn post(&self, path: &str) -> TestRequest {
        self.server.post(path).add_cookie(self.auth_cookie.clone())
    }

    pub fn put(&self, path: &str) -> TestRequest {
        self.server.put(path).add_cookie(self.auth_cookie.clone())
    }

    pub fn delete(&self, path: &str) -> TestRequest {
        self.server
            .delete(path)
            .add_cookie(self.auth_cookie.clone())
    }

    /// Register another user directly in the database and log them in.
    pub async fn log_in_new_user(&self, email: &str) -> Cookie<'static> {
        {
            let connection = self
                .state
                .db_connection
                .lock()
                .expect("Could not lock database.");
            insert_test_user(email, &connection);
        }

        log_in(&self.server, email).await
    }
}

async fn log_in(server: &TestServer, email: &str) -> Cookie<'static> {
    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;

    response.assert_status_ok();
    response.cookie(COOKIE_TOKEN)
}

/// Start a test server over an in-memory database and log in a test user.
pub(crate) async fn spawn_app() -> TestApp {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    let state = create_app_state(connection, "foobarbazquxquux", "Etc/UTC")
        .expect("Could not create app state.");

    let user_id = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not lock database.");
        insert_test_user("test@test.com", &connection)
    };

    let server =
        TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");
    let auth_cookie = log_in(&server, "test@test.com").await;

    TestApp {
        server,
        state,
        user_id,
        auth_cookie,
    }
}

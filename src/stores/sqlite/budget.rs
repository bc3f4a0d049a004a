//! Implements a SQLite backed budget store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetId, BudgetName, BudgetType, NewBudget},
    category::CategorySummary,
    db::{CreateTable, lock_connection},
    stores::{BudgetQuery, BudgetStore, sqlite::category::ensure_category_owned_by},
};

/// Stores budgets in a SQLite database.
///
/// The one-budget-without-a-category rule is enforced by a partial unique
/// index, so it holds even if another process writes to the same database.
#[derive(Debug, Clone)]
pub struct SQLiteBudgetStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteBudgetStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const SELECT_BUDGET: &str = "SELECT
        b.id, b.name, b.amount_limit, b.user_id, b.category_id, b.created_at, b.updated_at,
        c.name, c.hex_color
    FROM budget b
    LEFT JOIN category c ON c.id = b.category_id";

impl BudgetStore for SQLiteBudgetStore {
    fn create(&self, budget: NewBudget, user_id: UserID) -> Result<Budget, Error> {
        let connection = lock_connection(&self.connection)?;

        if let Some(category_id) = budget.category_id {
            ensure_category_owned_by(&connection, category_id, user_id)?;
        }

        let now = OffsetDateTime::now_utc();
        connection.execute(
            "INSERT INTO budget (name, amount_limit, user_id, category_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            (
                budget.name.as_ref(),
                budget.amount_limit,
                user_id.as_i64(),
                budget.category_id,
                now,
            ),
        )?;

        get_budget(&connection, connection.last_insert_rowid(), user_id)
    }

    fn get(&self, budget_id: BudgetId, user_id: UserID) -> Result<Budget, Error> {
        let connection = lock_connection(&self.connection)?;

        get_budget(&connection, budget_id, user_id)
    }

    /// Get the user's budgets, keeping those created in the month and year of `query`.
    fn get_query(&self, query: BudgetQuery, user_id: UserID) -> Result<Vec<Budget>, Error> {
        let connection = lock_connection(&self.connection)?;

        let budgets = connection
            .prepare(&format!(
                "{SELECT_BUDGET} WHERE b.user_id = :user_id ORDER BY b.name ASC"
            ))?
            .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(budgets
            .into_iter()
            .filter(|budget| {
                query
                    .month
                    .is_none_or(|month| u8::from(budget.created_at.month()) == month)
                    && query
                        .year
                        .is_none_or(|year| budget.created_at.year() == year)
            })
            .collect())
    }

    fn update(
        &self,
        budget_id: BudgetId,
        budget: NewBudget,
        user_id: UserID,
    ) -> Result<Budget, Error> {
        let connection = lock_connection(&self.connection)?;

        if let Some(category_id) = budget.category_id {
            ensure_category_owned_by(&connection, category_id, user_id)?;
        }

        let rows_affected = connection.execute(
            "UPDATE budget
            SET name = ?1, amount_limit = ?2, category_id = ?3, updated_at = ?4
            WHERE id = ?5 AND user_id = ?6",
            (
                budget.name.as_ref(),
                budget.amount_limit,
                budget.category_id,
                OffsetDateTime::now_utc(),
                budget_id,
                user_id.as_i64(),
            ),
        )?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingBudget);
        }

        get_budget(&connection, budget_id, user_id)
    }

    fn delete(&self, budget_id: BudgetId, user_id: UserID) -> Result<(), Error> {
        let connection = lock_connection(&self.connection)?;

        let rows_affected = connection.execute(
            "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
            (budget_id, user_id.as_i64()),
        )?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingBudget);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteBudgetStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                amount_limit INTEGER NOT NULL CHECK (amount_limit > 0),
                user_id INTEGER NOT NULL,
                category_id INTEGER UNIQUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(user_id, name),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_budget_single_total
                ON budget(user_id) WHERE category_id IS NULL;",
        )
    }
}

fn get_budget(
    connection: &Connection,
    budget_id: BudgetId,
    user_id: UserID,
) -> Result<Budget, Error> {
    connection
        .prepare(&format!(
            "{SELECT_BUDGET} WHERE b.id = :id AND b.user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &budget_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_name: String = row.get(1)?;
    let category_id = row.get(4)?;
    let category_name: Option<String> = row.get(7)?;

    let category = match (category_id, category_name) {
        (Some(id), Some(name)) => Some(CategorySummary {
            id,
            name,
            hex_color: row.get(8)?,
        }),
        _ => None,
    };

    Ok(Budget {
        id: row.get(0)?,
        name: BudgetName::new_unchecked(&raw_name),
        amount_limit: row.get(2)?,
        user_id: UserID::new(row.get(3)?),
        category_id,
        category,
        budget_type: BudgetType::for_category(category_id),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[cfg(test)]
mod budget_store_tests {
    use time::OffsetDateTime;

    use crate::{
        Error,
        budget::{BudgetName, BudgetType, NewBudget},
        category::{CategoryId, CategoryName, NewCategory},
        money::Money,
        stores::{BudgetQuery, BudgetStore, CategoryStore},
        test_utils::{TestStores, get_test_stores},
    };

    fn new_budget(name: &str, category_id: Option<CategoryId>) -> NewBudget {
        NewBudget {
            name: BudgetName::new_unchecked(name),
            amount_limit: Money::from_cents(50_000),
            category_id,
        }
    }

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: CategoryName::new_unchecked(name),
            description: None,
            hex_color: None,
        }
    }

    #[test]
    fn create_total_budget_succeeds() {
        let TestStores { budgets, user, .. } = get_test_stores();

        let budget = budgets.create(new_budget("Everything", None), user).unwrap();

        assert!(budget.id > 0);
        assert_eq!(budget.budget_type, BudgetType::Total);
        assert_eq!(budget.amount_limit, Money::from_cents(50_000));
        assert_eq!(budget.category, None);
    }

    #[test]
    fn create_category_budget_embeds_summary() {
        let TestStores {
            budgets,
            categories,
            user,
            ..
        } = get_test_stores();
        let category = categories.create(new_category("Food"), user).unwrap();

        let budget = budgets
            .create(new_budget("Food budget", Some(category.id)), user)
            .unwrap();

        assert_eq!(budget.budget_type, BudgetType::Category);
        assert_eq!(budget.category.unwrap().name, "Food");
    }

    #[test]
    fn second_total_budget_for_same_user_fails() {
        let TestStores {
            budgets,
            user,
            other_user,
            ..
        } = get_test_stores();
        budgets.create(new_budget("Everything", None), user).unwrap();

        let result = budgets.create(new_budget("Everything again", None), user);

        assert_eq!(result, Err(Error::DuplicateTotalBudget));
        assert!(
            budgets.create(new_budget("Everything", None), other_user).is_ok(),
            "another user should be able to have their own total budget"
        );
    }

    #[test]
    fn total_budget_can_be_updated() {
        let TestStores { budgets, user, .. } = get_test_stores();
        let budget = budgets.create(new_budget("Everything", None), user).unwrap();

        let updated = budgets
            .update(budget.id, new_budget("All spending", None), user)
            .unwrap();

        assert_eq!(updated.name.as_ref(), "All spending");
        assert_eq!(updated.budget_type, BudgetType::Total);
    }

    #[test]
    fn category_budget_cannot_become_second_total_budget() {
        let TestStores {
            budgets,
            categories,
            user,
            ..
        } = get_test_stores();
        let category = categories.create(new_category("Food"), user).unwrap();
        budgets.create(new_budget("Everything", None), user).unwrap();
        let food = budgets
            .create(new_budget("Food budget", Some(category.id)), user)
            .unwrap();

        let result = budgets.update(food.id, new_budget("Food budget", None), user);

        assert_eq!(result, Err(Error::DuplicateTotalBudget));
    }

    #[test]
    fn second_budget_for_category_fails() {
        let TestStores {
            budgets,
            categories,
            user,
            ..
        } = get_test_stores();
        let category = categories.create(new_category("Food"), user).unwrap();
        budgets
            .create(new_budget("Food budget", Some(category.id)), user)
            .unwrap();

        let result = budgets.create(new_budget("Another food budget", Some(category.id)), user);

        assert_eq!(result, Err(Error::DuplicateCategoryBudget));
    }

    #[test]
    fn duplicate_name_fails() {
        let TestStores {
            budgets,
            categories,
            user,
            ..
        } = get_test_stores();
        let category = categories.create(new_category("Food"), user).unwrap();
        budgets.create(new_budget("Monthly", None), user).unwrap();

        let result = budgets.create(new_budget("Monthly", Some(category.id)), user);

        assert_eq!(result, Err(Error::DuplicateBudgetName));
    }

    #[test]
    fn budget_with_other_users_category_fails() {
        let TestStores {
            budgets,
            categories,
            user,
            other_user,
            ..
        } = get_test_stores();
        let category = categories.create(new_category("Theirs"), other_user).unwrap();

        let result = budgets.create(new_budget("Sneaky", Some(category.id)), user);

        assert_eq!(result, Err(Error::InvalidCategory(category.id)));
    }

    #[test]
    fn deleting_category_deletes_its_budget() {
        let TestStores {
            budgets,
            categories,
            user,
            ..
        } = get_test_stores();
        let category = categories.create(new_category("Food"), user).unwrap();
        let budget = budgets
            .create(new_budget("Food budget", Some(category.id)), user)
            .unwrap();

        categories.delete(category.id, user).unwrap();

        assert_eq!(budgets.get(budget.id, user), Err(Error::NotFound));
    }

    #[test]
    fn get_query_filters_by_creation_month() {
        let TestStores { budgets, user, .. } = get_test_stores();
        let budget = budgets.create(new_budget("Everything", None), user).unwrap();
        let now = OffsetDateTime::now_utc();
        let this_month = u8::from(now.month());
        let other_month = this_month % 12 + 1;

        let matching = budgets
            .get_query(
                BudgetQuery {
                    month: Some(this_month),
                    year: Some(now.year()),
                },
                user,
            )
            .unwrap();
        let other = budgets
            .get_query(
                BudgetQuery {
                    month: Some(other_month),
                    year: None,
                },
                user,
            )
            .unwrap();

        assert_eq!(matching, [budget]);
        assert!(other.is_empty());
    }

    #[test]
    fn get_query_is_scoped_to_user() {
        let TestStores {
            budgets,
            user,
            other_user,
            ..
        } = get_test_stores();
        budgets.create(new_budget("Mine", None), user).unwrap();
        budgets.create(new_budget("Theirs", None), other_user).unwrap();

        let names: Vec<String> = budgets
            .get_query(BudgetQuery::default(), user)
            .unwrap()
            .into_iter()
            .map(|budget| budget.name.as_ref().to_owned())
            .collect();

        assert_eq!(names, ["Mine"]);
    }

    #[test]
    fn update_and_delete_of_other_users_budget_fail() {
        let TestStores {
            budgets,
            user,
            other_user,
            ..
        } = get_test_stores();
        let budget = budgets.create(new_budget("Mine", None), user).unwrap();

        assert_eq!(
            budgets.update(budget.id, new_budget("Theirs", None), other_user),
            Err(Error::UpdateMissingBudget)
        );
        assert_eq!(
            budgets.delete(budget.id, other_user),
            Err(Error::DeleteMissingBudget)
        );
        assert_eq!(budgets.delete(budget.id, user), Ok(()));
    }
}

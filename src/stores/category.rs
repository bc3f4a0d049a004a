//! Defines the category store trait.

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryId, NewCategory},
};

/// Creates, retrieves, updates and deletes a user's categories.
///
/// Every operation is scoped to `user_id`: a category owned by another user
/// behaves as if it does not exist.
pub trait CategoryStore {
    /// Create a new category for `user_id`.
    ///
    /// Implementers must reject the category with [Error::CategoryLimitReached]
    /// if the user already has [crate::category::MAX_CATEGORIES_PER_USER]
    /// categories, and with [Error::DuplicateCategoryName] if the name is taken.
    fn create(&self, category: NewCategory, user_id: UserID) -> Result<Category, Error>;

    /// Get one of the user's categories by its ID.
    fn get(&self, category_id: CategoryId, user_id: UserID) -> Result<Category, Error>;

    /// Get all of the user's categories ordered by name.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Category>, Error>;

    /// Replace the user-editable fields of a category.
    fn update(
        &self,
        category_id: CategoryId,
        category: NewCategory,
        user_id: UserID,
    ) -> Result<Category, Error>;

    /// Delete a category. Its transactions are kept without a category.
    fn delete(&self, category_id: CategoryId, user_id: UserID) -> Result<(), Error>;
}

//! Route handlers for creating, reading, replacing and deleting categories.

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, CategoryForm, CategoryId, NewCategory},
    extract::{ApiJson, ApiPath},
    stores::CategoryStore,
};

/// The state needed by the category handlers.
#[derive(Debug, Clone)]
pub struct CategoryState<C> {
    /// The store for managing the user's categories.
    pub category_store: C,
}

impl<C, T, B> FromRef<AppState<C, T, B>> for CategoryState<C>
where
    C: Clone,
{
    fn from_ref(state: &AppState<C, T, B>) -> Self {
        Self {
            category_store: state.category_store.clone(),
        }
    }
}

/// Create a category for the logged in user, responding with 201 and the new category.
///
/// # Errors
///
/// Responds with 400 if the form is invalid, the name is already used or the
/// user has reached the category limit.
pub async fn create_category<C>(
    State(state): State<CategoryState<C>>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<CategoryForm>,
) -> Result<(StatusCode, Json<Category>), Error>
where
    C: CategoryStore,
{
    let new_category = NewCategory::try_from(form)?;
    let category = state.category_store.create(new_category, user_id)?;
    tracing::debug!("User {user_id} created category {}", category.id);

    Ok((StatusCode::CREATED, Json(category)))
}

/// List the logged in user's categories alphabetically.
pub async fn get_categories<C>(
    State(state): State<CategoryState<C>>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Category>>, Error>
where
    C: CategoryStore,
{
    state.category_store.get_by_user(user_id).map(Json)
}

/// Get one of the logged in user's categories.
///
/// Categories of other users are reported as not found.
pub async fn get_category<C>(
    State(state): State<CategoryState<C>>,
    Extension(user_id): Extension<UserID>,
    ApiPath(category_id): ApiPath<CategoryId>,
) -> Result<Json<Category>, Error>
where
    C: CategoryStore,
{
    state.category_store.get(category_id, user_id).map(Json)
}

/// Replace one of the logged in user's categories.
///
/// # Errors
///
/// Responds with 400 if the body is invalid or the name is taken, and 404 if
/// the category does not exist or belongs to another user.
pub async fn update_category<C>(
    State(state): State<CategoryState<C>>,
    Extension(user_id): Extension<UserID>,
    ApiPath(category_id): ApiPath<CategoryId>,
    ApiJson(form): ApiJson<CategoryForm>,
) -> Result<Json<Category>, Error>
where
    C: CategoryStore,
{
    let category = NewCategory::try_from(form)?;

    state
        .category_store
        .update(category_id, category, user_id)
        .map(Json)
}

/// Delete a category, leaving its transactions uncategorized.
pub async fn delete_category<C>(
    State(state): State<CategoryState<C>>,
    Extension(user_id): Extension<UserID>,
    ApiPath(category_id): ApiPath<CategoryId>,
) -> Result<StatusCode, Error>
where
    C: CategoryStore,
{
    state.category_store.delete(category_id, user_id)?;
    tracing::debug!("User {user_id} deleted category {category_id}");

    Ok(StatusCode::NO_CONTENT)
}

//! User-owned labels for grouping transactions, with per-category totals.

mod domain;
mod handlers;

pub use domain::{
    Category, CategoryForm, CategoryId, CategoryName, CategorySummary, CategoryTotals, HexColor,
    MAX_CATEGORIES_PER_USER, MAX_NAME_LENGTH, NewCategory,
};
pub use handlers::{
    CategoryState, create_category, delete_category, get_categories, get_category,
    update_category,
};

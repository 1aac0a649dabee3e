//! Category management for the finance tracker.
//!
//! Categories are reference data that transactions and subscriptions may
//! point to. Deleting a category never cascades into the rows that
//! reference it; those references degrade to "uncategorized".

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::create_category_table;
pub(crate) use core::{Category, CategoryKind, NewCategory, create_category, get_category};
pub(crate) use create_endpoint::create_category_endpoint;
pub(crate) use delete_endpoint::delete_category_endpoint;
pub(crate) use edit_endpoint::edit_category_endpoint;
pub(crate) use list_endpoint::list_categories_endpoint;

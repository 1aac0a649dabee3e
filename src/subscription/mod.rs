//! Subscription management for the finance tracker.
//!
//! Subscriptions are reference data, independent of the transaction group
//! model: toggling one off never touches past transactions.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::create_subscription_table;
pub(crate) use create_endpoint::create_subscription_endpoint;
pub(crate) use delete_endpoint::delete_subscription_endpoint;
pub(crate) use edit_endpoint::edit_subscription_endpoint;
pub(crate) use list_endpoint::list_subscriptions_endpoint;

//! Credit card management for the finance tracker.
//!
//! A credit card tracks a maintained running total of how much of its limit
//! is in use. Creating a card expense charges the total and deleting card
//! expense rows releases it; the total is never recomputed from the
//! transaction table.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::create_credit_card_table;
pub(crate) use core::{
    CreditCard, NewCreditCard, adjust_used_amount, create_credit_card, get_credit_card,
};
pub(crate) use create_endpoint::create_credit_card_endpoint;
pub(crate) use delete_endpoint::delete_credit_card_endpoint;
pub(crate) use edit_endpoint::edit_credit_card_endpoint;
pub(crate) use list_endpoint::list_credit_cards_endpoint;

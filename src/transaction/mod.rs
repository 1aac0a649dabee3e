//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the enums for its kind and payment method
//! - The group expander that turns one create request into 1..N rows
//!   (installment plans) and the resolver that applies edits and deletes
//!   across a whole group
//! - Database functions for storing and querying transactions
//! - The HTTP handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod expansion;
mod grouping;
mod list_endpoint;
mod occurrence_endpoint;
mod query;

pub use core::create_transaction_table;
pub(crate) use core::{Transaction, TransactionKind};
pub(crate) use create_endpoint::create_transaction_endpoint;
pub(crate) use delete_endpoint::delete_transaction_endpoint;
pub(crate) use edit_endpoint::edit_transaction_endpoint;
pub(crate) use list_endpoint::list_transactions_endpoint;
pub(crate) use occurrence_endpoint::create_occurrence_endpoint;
pub(crate) use query::{
    CardExpenseFilter, SortOrder, get_recurring_anchors_dated_before, get_transactions_in_range,
};

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
pub(crate) use core::{insert_transaction_row, test_utils};

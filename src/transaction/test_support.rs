//! Transaction fixtures shared by tests in other modules.

use time::Date;

use crate::{
    database_id::{CategoryId, TransactionId},
    transaction::core::{Transaction, TransactionKind},
};

/// An income row with no group linkage.
pub(crate) fn standalone_income(description: &str, amount: f64, date: Date) -> Transaction {
    Transaction {
        id: 0,
        description: description.to_owned(),
        amount,
        date,
        kind: TransactionKind::Income,
        category_id: None,
        payment_method: None,
        credit_card_id: None,
        installments: 1,
        installment_number: 1,
        parent_transaction_id: None,
        is_recurring: false,
    }
}

/// An expense row with no group linkage and an optional category.
pub(crate) fn standalone_expense_row(
    description: &str,
    amount: f64,
    date: Date,
    category_id: Option<CategoryId>,
) -> Transaction {
    Transaction {
        kind: TransactionKind::Expense,
        category_id,
        ..standalone_income(description, amount, date)
    }
}

/// A recurring income anchor with the given `id`.
pub(crate) fn recurring_income(
    id: TransactionId,
    description: &str,
    amount: f64,
    date: Date,
) -> Transaction {
    Transaction {
        id,
        is_recurring: true,
        ..standalone_income(description, amount, date)
    }
}

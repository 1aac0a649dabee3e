//! Expands a single transaction create request into one or more rows.
//!
//! A request is either standalone (one row), recurring (one row flagged
//! recurring; later occurrences are projected by the monthly summary and
//! materialized on demand), or an installment purchase (N rows spread over
//! consecutive months). The expansion is atomic: either every row of an
//! installment set is created or none of them are.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use time::{Date, Month};

use crate::{
    Error, FieldError,
    credit_card::adjust_used_amount,
    database_id::{CategoryId, CreditCardId},
    money::split_evenly,
    transaction::core::{
        NewTransactionRow, PaymentMethod, Transaction, TransactionKind, insert_transaction_row,
    },
};

/// The largest number of installments a purchase may be split into.
pub(crate) const MAX_INSTALLMENTS: i64 = 24;

/// A validated transaction create request, before expansion into rows.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewTransaction {
    /// A text description of what the transaction was for.
    pub description: String,
    /// The total amount of the transaction, always positive.
    ///
    /// For installment purchases this is the full purchase price; each row
    /// receives an even share.
    pub amount: f64,
    /// When the transaction happened (the first installment's date for
    /// installment purchases).
    pub date: Date,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// How the transaction was paid.
    pub payment_method: Option<PaymentMethod>,
    /// The ID of the credit card the transaction was charged to.
    pub credit_card_id: Option<CreditCardId>,
    /// How many installments to split the purchase into.
    pub installments: i64,
    /// Whether the transaction repeats monthly.
    pub is_recurring: bool,
}

impl NewTransaction {
    /// Check the request against the expansion rules.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::Validation] with per-field messages for missing or
    ///   malformed fields,
    /// - [Error::InvalidInstallmentCount] when `installments` is outside
    ///   [1, [MAX_INSTALLMENTS]],
    /// - [Error::ConflictingTransactionMode] when the request is flagged
    ///   recurring and split into installments at the same time.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !(1..=MAX_INSTALLMENTS).contains(&self.installments) {
            return Err(Error::InvalidInstallmentCount(self.installments));
        }

        if self.is_recurring && self.installments > 1 {
            return Err(Error::ConflictingTransactionMode);
        }

        let mut field_errors = Vec::new();

        if self.description.trim().is_empty() {
            field_errors.push(FieldError::new(
                "description",
                "description must not be empty",
            ));
        }

        if self.amount <= 0.0 {
            field_errors.push(FieldError::new(
                "amount",
                "amount must be greater than zero",
            ));
        }

        if self.installments > 1 {
            if self.kind != TransactionKind::Expense {
                field_errors.push(FieldError::new(
                    "kind",
                    "only expenses can be split into installments",
                ));
            }

            if self.credit_card_id.is_none() {
                field_errors.push(FieldError::new(
                    "credit_card_id",
                    "a credit card is required for installment purchases",
                ));
            }
        }

        if !field_errors.is_empty() {
            return Err(Error::Validation(field_errors));
        }

        Ok(())
    }
}

/// Advance `date` by `months` calendar months, keeping the day of the month
/// and clamping it to the length of the target month.
pub(crate) fn add_months(date: Date, months: i32) -> Date {
    let zero_based_month = date.year() * 12 + date.month() as i32 - 1 + months;
    let year = zero_based_month.div_euclid(12);
    let month = Month::try_from((zero_based_month.rem_euclid(12) + 1) as u8)
        .expect("rem_euclid(12) + 1 is always a valid month");
    let day = date.day().min(time::util::days_in_month(month, year));

    Date::from_calendar_date(year, month, day).expect("day is clamped to the month length")
}

/// Turn one create request into 1..N persisted transaction rows.
///
/// Installment purchases produce one row per installment: the first row on
/// the requested date with no parent, and each later row one month further
/// on pointing back at the first. The full purchase total is charged to the
/// linked credit card's used amount. Expenses with a card and a single
/// installment charge the card as well.
///
/// All rows are written inside one SQL transaction, so a failure part way
/// through never leaves a partial installment set behind.
///
/// # Errors
/// Returns any error from [NewTransaction::validate], an
/// [Error::InvalidCategory]/[Error::InvalidCreditCard] for dangling
/// references, or an [Error::SqlError] for other SQL failures.
pub(crate) fn expand_transaction(
    request: &NewTransaction,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    request.validate()?;

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    let rows = write_rows(request, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(rows)
}

fn write_rows(
    request: &NewTransaction,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let installments = request.installments;
    let amounts = split_evenly(request.amount, installments as u32);

    let anchor = insert_transaction_row(
        &NewTransactionRow {
            description: request.description.clone(),
            amount: amounts[0],
            date: request.date,
            kind: request.kind,
            category_id: request.category_id,
            payment_method: request.payment_method,
            credit_card_id: request.credit_card_id,
            installments,
            installment_number: 1,
            parent_transaction_id: None,
            is_recurring: request.is_recurring,
        },
        connection,
    )?;

    let mut rows = vec![anchor];

    for index in 2..=installments {
        let row = insert_transaction_row(
            &NewTransactionRow {
                description: request.description.clone(),
                amount: amounts[index as usize - 1],
                date: add_months(request.date, index as i32 - 1),
                kind: request.kind,
                category_id: request.category_id,
                payment_method: request.payment_method,
                credit_card_id: request.credit_card_id,
                installments,
                installment_number: index,
                parent_transaction_id: Some(rows[0].id),
                is_recurring: false,
            },
            connection,
        )?;

        rows.push(row);
    }

    // Card expenses grow the card's running total by the full purchase price.
    if request.kind == TransactionKind::Expense
        && let Some(card_id) = request.credit_card_id
    {
        adjust_used_amount(card_id, request.amount, connection)?;
    }

    Ok(rows)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod add_months_tests {
    use time::macros::date;

    use super::add_months;

    #[test]
    fn keeps_day_of_month() {
        assert_eq!(add_months(date!(2024 - 01 - 15), 1), date!(2024 - 02 - 15));
        assert_eq!(add_months(date!(2024 - 01 - 15), 2), date!(2024 - 03 - 15));
    }

    #[test]
    fn clamps_day_to_month_length() {
        assert_eq!(add_months(date!(2024 - 01 - 31), 1), date!(2024 - 02 - 29));
        assert_eq!(add_months(date!(2023 - 01 - 31), 1), date!(2023 - 02 - 28));
        assert_eq!(add_months(date!(2024 - 01 - 31), 2), date!(2024 - 03 - 31));
    }

    #[test]
    fn rolls_over_year_boundary() {
        assert_eq!(add_months(date!(2024 - 11 - 15), 2), date!(2025 - 01 - 15));
        assert_eq!(add_months(date!(2024 - 12 - 31), 1), date!(2025 - 01 - 31));
    }
}

//! Transaction data aggregation for the monthly summary.
//!
//! Provides pure functions to window a month, project recurring
//! transactions into later months, and fold a set of transactions into
//! totals and a per-category expense breakdown.

use std::collections::HashMap;

use rusqlite::Connection;
use serde::Serialize;
use time::{Date, Month};

use crate::{
    Error, FieldError,
    database_id::CategoryId,
    money::round_to_cents,
    transaction::{
        CardExpenseFilter, SortOrder, Transaction, TransactionKind,
        get_recurring_anchors_dated_before, get_transactions_in_range,
    },
};

/// The financial summary of a single month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MonthlySummary {
    /// The sum of all income in the month.
    pub total_income: f64,
    /// The sum of all expenses in the month, credit-card expenses included.
    pub total_expenses: f64,
    /// Income minus expenses. No carry-forward from earlier months.
    pub current_balance: f64,
    /// Summed expense amounts keyed by category ID. Uncategorized expenses
    /// and categories that sum to zero or less are omitted.
    pub expenses_by_category: HashMap<CategoryId, f64>,
}

/// Check that `month` is a calendar month number.
///
/// # Errors
/// Returns [Error::InvalidMonth] when `month` is outside 1-12.
pub(crate) fn validate_month(month: u8) -> Result<Month, Error> {
    Month::try_from(month).map_err(|_| Error::InvalidMonth(month))
}

/// Check that `year` looks like a four-digit calendar year.
///
/// # Errors
/// Returns [Error::Validation] when `year` is outside 1000-9999.
pub(crate) fn validate_year(year: i32) -> Result<i32, Error> {
    if (1000..=9999).contains(&year) {
        Ok(year)
    } else {
        Err(Error::Validation(vec![FieldError::new(
            "year",
            "year must be a four-digit year",
        )]))
    }
}

/// The first and last day of `month` in `year`.
pub(crate) fn month_range(year: i32, month: Month) -> (Date, Date) {
    let first_day = Date::from_calendar_date(year, month, 1)
        .expect("the first day of a month always exists");
    let last_day = Date::from_calendar_date(year, month, time::util::days_in_month(month, year))
        .expect("the last day of a month always exists");

    (first_day, last_day)
}

/// Shift `(year, month)` by `offset` months. Negative offsets go backwards.
pub(crate) fn shift_month(year: i32, month: Month, offset: i32) -> (i32, Month) {
    let zero_based_month = year * 12 + month as i32 - 1 + offset;
    let shifted_year = zero_based_month.div_euclid(12);
    let shifted_month = Month::try_from((zero_based_month.rem_euclid(12) + 1) as u8)
        .expect("rem_euclid(12) + 1 is always a valid month");

    (shifted_year, shifted_month)
}

/// Project recurring series into the month `[first_day, last_day]`.
///
/// Each anchor dated in an earlier month yields a synthetic occurrence on
/// the anchor's day of the month (clamped to the month length), unless the
/// series already has a materialized row among `month_rows`. The synthetic
/// rows are never persisted; they only feed the summary.
pub(crate) fn project_recurring_occurrences(
    anchors: &[Transaction],
    month_rows: &[Transaction],
    first_day: Date,
    last_day: Date,
) -> Vec<Transaction> {
    anchors
        .iter()
        .filter(|anchor| {
            !month_rows.iter().any(|row| {
                row.id == anchor.id || row.parent_transaction_id == Some(anchor.id)
            })
        })
        .map(|anchor| {
            let day = anchor.date.day().min(last_day.day());
            let date = first_day
                .replace_day(day)
                .expect("day is clamped to the month length");

            Transaction {
                date,
                ..anchor.clone()
            }
        })
        .collect()
}

/// Fold `transactions` into totals and the per-category expense breakdown.
pub(crate) fn summarize(transactions: &[Transaction]) -> MonthlySummary {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut expenses_by_category: HashMap<CategoryId, f64> = HashMap::new();

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => total_income += transaction.amount,
            TransactionKind::Expense => {
                total_expenses += transaction.amount;

                if let Some(category_id) = transaction.category_id {
                    *expenses_by_category.entry(category_id).or_insert(0.0) += transaction.amount;
                }
            }
        }
    }

    let expenses_by_category = expenses_by_category
        .into_iter()
        .map(|(category_id, amount)| (category_id, round_to_cents(amount)))
        .filter(|(_, amount)| *amount > 0.0)
        .collect();

    let total_income = round_to_cents(total_income);
    let total_expenses = round_to_cents(total_expenses);

    MonthlySummary {
        total_income,
        total_expenses,
        current_balance: round_to_cents(total_income - total_expenses),
        expenses_by_category,
    }
}

/// Compute the financial summary for `month` of `year`.
///
/// Selects every transaction dated within the month (credit-card expenses
/// included, unlike the history listing), adds the projected occurrences of
/// recurring series anchored in earlier months, and folds the result. A
/// month with no transactions yields zero totals, not an error.
///
/// # Errors
/// Returns [Error::SqlError] if a query fails.
pub(crate) fn compute_monthly_summary(
    year: i32,
    month: Month,
    connection: &Connection,
) -> Result<MonthlySummary, Error> {
    let (first_day, last_day) = month_range(year, month);

    let mut transactions = get_transactions_in_range(
        first_day,
        last_day,
        CardExpenseFilter::Include,
        SortOrder::Ascending,
        connection,
    )?;

    let anchors = get_recurring_anchors_dated_before(first_day, connection)?;
    let mut projected =
        project_recurring_occurrences(&anchors, &transactions, first_day, last_day);
    transactions.append(&mut projected);

    Ok(summarize(&transactions))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Month, macros::date};

    use crate::{
        db::initialize,
        transaction::test_support::{recurring_income, standalone_expense_row, standalone_income},
    };

    use super::{
        compute_monthly_summary, month_range, project_recurring_occurrences, shift_month,
        summarize, validate_month,
    };

    #[test]
    fn validate_month_accepts_calendar_months() {
        assert_eq!(validate_month(1), Ok(Month::January));
        assert_eq!(validate_month(12), Ok(Month::December));
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());
    }

    #[test]
    fn month_range_covers_whole_month() {
        assert_eq!(
            month_range(2024, Month::February),
            (date!(2024 - 02 - 01), date!(2024 - 02 - 29))
        );
        assert_eq!(
            month_range(2023, Month::February),
            (date!(2023 - 02 - 01), date!(2023 - 02 - 28))
        );
    }

    #[test]
    fn shift_month_goes_backwards_across_years() {
        assert_eq!(shift_month(2024, Month::February, -3), (2023, Month::November));
        assert_eq!(shift_month(2024, Month::February, 11), (2025, Month::January));
        assert_eq!(shift_month(2024, Month::February, 0), (2024, Month::February));
    }

    #[test]
    fn summarize_totals_by_kind() {
        let transactions = vec![
            standalone_income("Salary", 5000.0, date!(2024 - 03 - 05)),
            standalone_expense_row("Rent", 1200.0, date!(2024 - 03 - 01), None),
            standalone_expense_row("Groceries", 300.0, date!(2024 - 03 - 10), Some(1)),
        ];

        let summary = summarize(&transactions);

        assert_eq!(summary.total_income, 5000.0);
        assert_eq!(summary.total_expenses, 1500.0);
        assert_eq!(summary.current_balance, 3500.0);
    }

    #[test]
    fn summarize_groups_expenses_by_category() {
        let transactions = vec![
            standalone_expense_row("Groceries", 100.0, date!(2024 - 03 - 10), Some(1)),
            standalone_expense_row("More groceries", 50.0, date!(2024 - 03 - 20), Some(1)),
            standalone_expense_row("Bus fare", 5.0, date!(2024 - 03 - 11), Some(2)),
            standalone_expense_row("Uncategorized", 9.0, date!(2024 - 03 - 12), None),
        ];

        let summary = summarize(&transactions);

        assert_eq!(summary.expenses_by_category.len(), 2);
        assert_eq!(summary.expenses_by_category[&1], 150.0);
        assert_eq!(summary.expenses_by_category[&2], 5.0);
    }

    #[test]
    fn summarize_ignores_income_categories_in_breakdown() {
        let mut income = standalone_income("Salary", 5000.0, date!(2024 - 03 - 05));
        income.category_id = Some(7);

        let summary = summarize(&[income]);

        assert!(summary.expenses_by_category.is_empty());
    }

    #[test]
    fn projection_skips_months_with_materialized_member() {
        let anchor = recurring_income(1, "Salary", 5000.0, date!(2024 - 01 - 05));
        let mut materialized = recurring_income(2, "Salary", 5000.0, date!(2024 - 03 - 05));
        materialized.parent_transaction_id = Some(1);

        let projected = project_recurring_occurrences(
            &[anchor],
            &[materialized],
            date!(2024 - 03 - 01),
            date!(2024 - 03 - 31),
        );

        assert!(projected.is_empty());
    }

    #[test]
    fn projection_lands_on_anchor_day_clamped() {
        let anchor = recurring_income(1, "Rent", 1200.0, date!(2024 - 01 - 31));

        let projected = project_recurring_occurrences(
            &[anchor],
            &[],
            date!(2024 - 02 - 01),
            date!(2024 - 02 - 29),
        );

        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].date, date!(2024 - 02 - 29));
    }

    #[test]
    fn empty_month_yields_zero_totals() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let summary = compute_monthly_summary(2024, Month::March, &conn).unwrap();

        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expenses, 0.0);
        assert_eq!(summary.current_balance, 0.0);
        assert!(summary.expenses_by_category.is_empty());
    }

    #[test]
    fn summary_projects_recurring_income_into_later_months() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn.execute(
            "INSERT INTO \"transaction\"
             (description, amount, date, kind, is_recurring) VALUES
             ('Salary', 5000, '2024-01-05', 'income', 1)",
            (),
        )
        .unwrap();

        let january = compute_monthly_summary(2024, Month::January, &conn).unwrap();
        let march = compute_monthly_summary(2024, Month::March, &conn).unwrap();

        assert_eq!(january.total_income, 5000.0);
        assert_eq!(march.total_income, 5000.0);
        assert_eq!(march.total_expenses, 0.0);
    }
}

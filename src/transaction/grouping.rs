//! Resolves edits and deletes against transaction groups.
//!
//! A transaction is an installment member, a recurring-series member, or
//! standalone. Group operations are keyed by the shared parent id, or the
//! row's own id when it has no parent ([resolve_group_key]); every "apply to
//! all" code path resolves the key through that one helper so edit and
//! delete scopes can never disagree.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior, params};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    credit_card::adjust_used_amount,
    database_id::{CategoryId, TransactionId},
    money::split_evenly,
    transaction::core::{
        PaymentMethod, TRANSACTION_COLUMNS, Transaction, TransactionKind, map_transaction_row,
    },
};

/// The group a transaction belongs to, if any.
///
/// The classification is checked in this order: a row that carries an
/// installment count is an installment member even if a recurring flag were
/// ever set alongside it, then the recurring flag, then standalone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GroupKind {
    /// One installment of a purchase split across months.
    Installment,
    /// One occurrence of a recurring series.
    Recurring,
    /// Not part of any group.
    Standalone,
}

/// How far a mutation should reach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum MutationScope {
    /// Mutate only the targeted row.
    #[default]
    Single,
    /// Mutate every row in the targeted row's group.
    Group,
}

/// Classify which kind of group `transaction` belongs to.
pub(crate) fn classify(transaction: &Transaction) -> GroupKind {
    if transaction.installments > 1 {
        GroupKind::Installment
    } else if transaction.is_recurring {
        GroupKind::Recurring
    } else {
        GroupKind::Standalone
    }
}

/// The id every member of `transaction`'s group shares: the parent's id, or
/// the transaction's own id when it has no parent.
pub(crate) fn resolve_group_key(transaction: &Transaction) -> TransactionId {
    transaction.parent_transaction_id.unwrap_or(transaction.id)
}

/// Retrieve every member of the group keyed by `group_key`, anchor first,
/// then by installment number and date.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn get_group_members(
    group_key: TransactionId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
             WHERE id = :key OR parent_transaction_id = :key
             ORDER BY installment_number ASC, date ASC, id ASC"
        ))?
        .query_map(&[(":key", &group_key)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// The field changes an edit request may carry.
///
/// Absent fields are left untouched. Identifiers and group linkage
/// (installment count and number, parent reference, recurring flag) are
/// immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TransactionChanges {
    /// A new description.
    #[serde(default)]
    pub description: Option<String>,
    /// A new amount. For a group edit of an installment set this is the new
    /// purchase total, re-split evenly across the members.
    #[serde(default)]
    pub amount: Option<f64>,
    /// A new date. Only applied to single-row edits; group members keep
    /// their own dates.
    #[serde(default)]
    pub date: Option<Date>,
    /// A new transaction kind.
    #[serde(default)]
    pub kind: Option<TransactionKind>,
    /// A new category reference.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// A new payment method.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// Apply `changes` to the single row `target`.
///
/// An amount change on a credit-card expense adjusts the card's used amount
/// by the difference.
///
/// # Errors
/// This function will return an:
/// - [Error::UpdateMissingTransaction] if the row disappeared,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn update_single(
    target: &Transaction,
    changes: &TransactionChanges,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    let new_amount = changes.amount.unwrap_or(target.amount);
    let updated = apply_row_update(target, changes, new_amount, true, &sql_transaction)?;

    if target.kind == TransactionKind::Expense
        && let Some(card_id) = target.credit_card_id
    {
        let delta = new_amount - target.amount;
        if delta != 0.0 {
            adjust_used_amount(card_id, delta, &sql_transaction)?;
        }
    }

    sql_transaction.commit()?;

    Ok(updated)
}

/// Apply `changes` to every member of `target`'s group.
///
/// For installment sets a supplied amount is treated as the new purchase
/// total and re-split evenly across the existing members; for recurring
/// series it is applied to each row as-is. Dates are never touched by group
/// edits. The whole group is updated inside one SQL transaction.
///
/// # Errors
/// This function will return an:
/// - [Error::UpdateMissingTransaction] if the group has no members,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn update_group(
    target: &Transaction,
    changes: &TransactionChanges,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let group_key = resolve_group_key(target);
    let members = get_group_members(group_key, connection)?;

    if members.is_empty() {
        return Err(Error::UpdateMissingTransaction);
    }

    let new_amounts: Vec<f64> = match changes.amount {
        Some(new_total) if classify(&members[0]) == GroupKind::Installment => {
            split_evenly(new_total, members.len() as u32)
        }
        Some(new_amount) => vec![new_amount; members.len()],
        None => members.iter().map(|member| member.amount).collect(),
    };

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    let mut updated_members = Vec::with_capacity(members.len());
    for (member, new_amount) in members.iter().zip(&new_amounts) {
        updated_members.push(apply_row_update(
            member,
            changes,
            *new_amount,
            false,
            &sql_transaction,
        )?);
    }

    // A changed total on a card expense moves the card's running total by
    // the difference.
    if members[0].kind == TransactionKind::Expense
        && let Some(card_id) = members[0].credit_card_id
    {
        let old_sum: f64 = members.iter().map(|member| member.amount).sum();
        let new_sum: f64 = new_amounts.iter().sum();
        let delta = new_sum - old_sum;
        if delta != 0.0 {
            adjust_used_amount(card_id, delta, &sql_transaction)?;
        }
    }

    sql_transaction.commit()?;

    Ok(updated_members)
}

fn apply_row_update(
    row: &Transaction,
    changes: &TransactionChanges,
    new_amount: f64,
    apply_date: bool,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let description = changes.description.as_ref().unwrap_or(&row.description);
    let date = if apply_date {
        changes.date.unwrap_or(row.date)
    } else {
        row.date
    };
    let kind = changes.kind.unwrap_or(row.kind);
    let category_id = changes.category_id.or(row.category_id);
    let payment_method = changes.payment_method.or(row.payment_method);

    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\"
             SET description = ?1, amount = ?2, date = ?3, kind = ?4, category_id = ?5,
                 payment_method = ?6
             WHERE id = ?7",
            params![
                description,
                new_amount,
                date,
                kind,
                category_id,
                payment_method,
                row.id,
            ],
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(category_id),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(Transaction {
        description: description.clone(),
        amount: new_amount,
        date,
        kind,
        category_id,
        payment_method,
        ..row.clone()
    })
}

/// Delete exactly the row `target`.
///
/// Deleting the anchor of a group promotes the next member (lowest
/// installment number, then earliest date) to anchor in the same SQL
/// transaction, so the remaining members never reference a missing parent.
/// A deleted credit-card expense releases its amount from the card.
///
/// # Errors
/// This function will return an:
/// - [Error::DeleteMissingTransaction] if the row disappeared,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn delete_single(target: &Transaction, connection: &Connection) -> Result<(), Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    if target.parent_transaction_id.is_none() {
        promote_successor(target.id, &sql_transaction)?;
    }

    let rows_affected = sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &target.id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    if target.kind == TransactionKind::Expense
        && let Some(card_id) = target.credit_card_id
    {
        adjust_used_amount(card_id, -target.amount, &sql_transaction)?;
    }

    sql_transaction.commit()?;

    Ok(())
}

/// Re-anchor the group keyed by `anchor_id` onto its next member, if any.
fn promote_successor(anchor_id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let successor_id: Option<TransactionId> = connection
        .prepare(
            "SELECT id FROM \"transaction\"
             WHERE parent_transaction_id = :key
             ORDER BY installment_number ASC, date ASC, id ASC
             LIMIT 1",
        )?
        .query_row(&[(":key", &anchor_id)], |row| row.get(0))
        .map(Some)
        .or_else(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            error => Err(error),
        })?;

    let Some(successor_id) = successor_id else {
        return Ok(());
    };

    connection.execute(
        "UPDATE \"transaction\" SET parent_transaction_id = NULL WHERE id = ?1",
        [successor_id],
    )?;
    connection.execute(
        "UPDATE \"transaction\" SET parent_transaction_id = ?1
         WHERE parent_transaction_id = ?2 AND id != ?1",
        [successor_id, anchor_id],
    )?;

    Ok(())
}

/// Delete every member of `target`'s group in one logical operation.
///
/// Children are removed before the anchor so no row ever references a
/// deleted parent. Deleted credit-card expense rows release their summed
/// amounts from the card.
///
/// # Errors
/// This function will return an:
/// - [Error::DeleteMissingTransaction] if the group has no members,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn delete_group(target: &Transaction, connection: &Connection) -> Result<usize, Error> {
    let group_key = resolve_group_key(target);
    let members = get_group_members(group_key, connection)?;

    if members.is_empty() {
        return Err(Error::DeleteMissingTransaction);
    }

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    // Children go first so no row ever references a deleted parent.
    let child_rows = sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE parent_transaction_id = :key",
        &[(":key", &group_key)],
    )?;
    let anchor_rows = sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE id = :key",
        &[(":key", &group_key)],
    )?;

    if let Some(card_id) = members[0].credit_card_id
        && members[0].kind == TransactionKind::Expense
    {
        let released: f64 = members.iter().map(|member| member.amount).sum();
        adjust_used_amount(card_id, -released, &sql_transaction)?;
    }

    sql_transaction.commit()?;

    Ok(child_rows + anchor_rows)
}

// ============================================================================
// TESTS
// ============================================================================

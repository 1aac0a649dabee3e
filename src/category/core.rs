//! Defines the core data model and database queries for categories.

use std::str::FromStr;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId};

// ============================================================================
// MODELS
// ============================================================================

/// The kind of entries a category applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    /// A category for income entries, e.g. "Salary".
    Income,
    /// A category for expense entries, e.g. "Groceries".
    Expense,
    /// A category for subscriptions, e.g. "Streaming".
    Subscription,
}

impl CategoryKind {
    /// The string stored in the database for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
            CategoryKind::Subscription => "subscription",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            "subscription" => Ok(CategoryKind::Subscription),
            other => Err(format!("{other} is not a valid category kind")),
        }
    }
}

impl ToSql for CategoryKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for CategoryKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// A label for grouping transactions and subscriptions, e.g. "Groceries".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: String,
    /// The icon glyph shown next to the category name.
    pub icon: String,
    /// The display color for the category, e.g. "#e74c3c".
    pub color: String,
    /// The kind of entries the category applies to.
    pub kind: CategoryKind,
}

/// The fields needed to create or replace a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The display name of the category.
    pub name: String,
    /// The icon glyph shown next to the category name.
    pub icon: String,
    /// The display color for the category.
    pub color: String,
    /// The kind of entries the category applies to.
    pub kind: CategoryKind,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the category table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                icon TEXT NOT NULL,
                color TEXT NOT NULL,
                kind TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Category].
pub(crate) fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        color: row.get(3)?,
        kind: row.get(4)?,
    })
}

/// Create a new category in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn create_category(
    new_category: &NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = connection
        .prepare(
            "INSERT INTO category (name, icon, color, kind)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, icon, color, kind",
        )?
        .query_row(
            (
                &new_category.name,
                &new_category.icon,
                &new_category.color,
                new_category.kind,
            ),
            map_category_row,
        )?;

    Ok(category)
}

/// Retrieve a category from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid category,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn get_category(id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    let category = connection
        .prepare("SELECT id, name, icon, color, kind FROM category WHERE id = :id")?
        .query_one(&[(":id", &id)], map_category_row)?;

    Ok(category)
}

/// Retrieve all categories, ordered by name.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn list_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, icon, color, kind FROM category ORDER BY name ASC, id ASC")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

pub(crate) type RowsAffected = usize;

/// Replace the fields of the category `id` with `new_category`.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn update_category(
    id: CategoryId,
    new_category: &NewCategory,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE category SET name = ?1, icon = ?2, color = ?3, kind = ?4 WHERE id = ?5",
            (
                &new_category.name,
                &new_category.icon,
                &new_category.color,
                new_category.kind,
                id,
            ),
        )
        .map_err(Error::from)
}

/// Delete the category `id`.
///
/// Rows referencing the category keep working: their foreign keys are set to
/// NULL by the schema, so they display as uncategorized.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn delete_category(
    id: CategoryId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM category WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}

// ============================================================================
// TESTS
// ============================================================================

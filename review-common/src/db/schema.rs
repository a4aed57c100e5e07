//! Collection schema definitions
//!
//! Single source of truth for the table layout of each collection kind.
//! Collection names come from configuration, so every name is checked with
//! [`is_valid_identifier`] before it is spliced into SQL.

use crate::{Field, FieldKind};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER", "REAL", "TIMESTAMP")
    pub sql_type: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
}

impl ColumnDefinition {
    /// Create new column definition
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
        }
    }

    /// Mark column as PRIMARY KEY
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

/// Check that a collection or column name is a plain SQL identifier
///
/// Only ASCII letters, digits and underscore; must not start with a digit.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() < 100
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// `CREATE TABLE IF NOT EXISTS` statement for a column list
pub fn create_table_sql(table: &str, columns: &[ColumnDefinition]) -> String {
    let body: Vec<String> = columns.iter().map(ColumnDefinition::to_sql).collect();
    format!("CREATE TABLE IF NOT EXISTS {} ({})", table, body.join(", "))
}

/// Raw collection: one JSON document per ingested row
pub fn raw_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("seq", "INTEGER").primary_key(),
        ColumnDefinition::new("document", "TEXT").not_null(),
    ]
}

/// Clean collection: one typed column per schema field
pub fn clean_columns() -> Vec<ColumnDefinition> {
    let mut columns = vec![ColumnDefinition::new("seq", "INTEGER").primary_key()];
    columns.extend(Field::ALL.iter().map(|field| {
        let column = ColumnDefinition::new(field.name(), sql_type(field.kind()));
        match field.kind() {
            FieldKind::Rating | FieldKind::Count => column.not_null(),
            _ => column,
        }
    }));
    columns
}

/// Aggregate collections: rank preserves the count-descending order
pub fn aggregate_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("rank", "INTEGER").primary_key(),
        ColumnDefinition::new("group_key", "TEXT").not_null(),
        ColumnDefinition::new("avg_rating", "REAL").not_null(),
        ColumnDefinition::new("count", "INTEGER").not_null(),
    ]
}

fn sql_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Integer | FieldKind::Count => "INTEGER",
        FieldKind::Timestamp => "TIMESTAMP",
        FieldKind::Text | FieldKind::TitleText => "TEXT",
        FieldKind::Rating => "REAL",
    }
}

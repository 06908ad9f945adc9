//! Column-level schema changes and their SQL.

use crate::config::OutputControl;
use colsift_schema::{Column, DataType, DefaultValue, Dialect};

/// A single column change.
///
/// `from` is the compared side's value and `to` the reference side's: a
/// change moves the compared schema towards the reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Add a new column.
    AddColumn(Column),
    /// Drop an existing column.
    DropColumn(String),
    /// Change a column's type.
    AlterColumnType {
        name: String,
        from: DataType,
        to: DataType,
        /// The whole column once every change to it is applied. MySQL
        /// restates it, since `MODIFY COLUMN` replaces the definition.
        definition: Column,
    },
    /// Change a column's nullability.
    AlterColumnNullable {
        name: String,
        from: bool,
        to: bool,
        /// See [`Change::AlterColumnType`].
        definition: Column,
    },
    /// Change a column's default value.
    AlterColumnDefault {
        name: String,
        from: Option<DefaultValue>,
        to: Option<DefaultValue>,
    },
}

impl Change {
    /// Generate the SQL statement for this change.
    pub fn to_sql(&self, table_name: &str, dialect: Dialect, control: &OutputControl) -> String {
        let table = control.table(dialect, table_name);
        let ident = |name: &str| control.ident(dialect, name);

        match self {
            Change::AddColumn(col) => {
                let not_null = if col.nullable { "" } else { " NOT NULL" };
                let default = col
                    .default
                    .as_ref()
                    .map(|d| format!(" DEFAULT {}", default_sql(d, dialect)))
                    .unwrap_or_default();
                format!(
                    "ALTER TABLE {} ADD COLUMN {} {}{}{};",
                    table,
                    ident(&col.name),
                    col.data_type,
                    not_null,
                    default
                )
            }
            Change::DropColumn(name) => {
                format!("ALTER TABLE {} DROP COLUMN {};", table, ident(name))
            }
            Change::AlterColumnType {
                name,
                to,
                definition,
                ..
            } => match dialect {
                Dialect::Postgres => format!(
                    "ALTER TABLE {} ALTER COLUMN {} TYPE {} USING {}::{};",
                    table,
                    ident(name),
                    to,
                    ident(name),
                    to
                ),
                Dialect::MySql => modify_column(&table, &ident(name), definition),
                Dialect::Sqlite => rebuild_required(&table, &ident(name)),
            },
            Change::AlterColumnNullable {
                name,
                to,
                definition,
                ..
            } => match dialect {
                Dialect::Postgres => {
                    let action = if *to { "DROP NOT NULL" } else { "SET NOT NULL" };
                    format!(
                        "ALTER TABLE {} ALTER COLUMN {} {};",
                        table,
                        ident(name),
                        action
                    )
                }
                Dialect::MySql => modify_column(&table, &ident(name), definition),
                Dialect::Sqlite => rebuild_required(&table, &ident(name)),
            },
            Change::AlterColumnDefault { name, to, .. } => {
                if dialect == Dialect::Sqlite {
                    return rebuild_required(&table, &ident(name));
                }
                match to {
                    Some(default) => format!(
                        "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {};",
                        table,
                        ident(name),
                        default_sql(default, dialect)
                    ),
                    None => format!(
                        "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT;",
                        table,
                        ident(name)
                    ),
                }
            }
        }
    }
}

/// MySQL only accepts expression defaults when parenthesized.
fn default_sql(default: &DefaultValue, dialect: Dialect) -> String {
    match (default, dialect) {
        (DefaultValue::Function(func), Dialect::MySql) => format!("({})", func),
        _ => default.to_sql(),
    }
}

/// `MODIFY COLUMN` with the complete definition; anything left out is reset.
fn modify_column(table: &str, column: &str, definition: &Column) -> String {
    let null = if definition.nullable { "NULL" } else { "NOT NULL" };
    let default = definition
        .default
        .as_ref()
        .map(|d| format!(" DEFAULT {}", default_sql(d, Dialect::MySql)))
        .unwrap_or_default();
    let auto_increment = if definition.auto_increment {
        " AUTO_INCREMENT"
    } else {
        ""
    };
    format!(
        "ALTER TABLE {} MODIFY COLUMN {} {} {}{}{};",
        table, column, definition.data_type, null, default, auto_increment
    )
}

fn rebuild_required(table: &str, column: &str) -> String {
    format!(
        "-- sqlite cannot alter column {} of {} in place; rebuild the table",
        column, table
    )
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::AddColumn(col) => {
                let nullable = if col.nullable { " (nullable)" } else { "" };
                write!(f, "+ {}: {}{}", col.name, col.data_type, nullable)
            }
            Change::DropColumn(name) => write!(f, "- {}", name),
            Change::AlterColumnType { name, from, to, .. } => {
                write!(f, "~ {}: {} -> {}", name, from, to)
            }
            Change::AlterColumnNullable { name, from, to, .. } => {
                let from_str = if *from { "nullable" } else { "not null" };
                let to_str = if *to { "nullable" } else { "not null" };
                write!(f, "~ {}: {} -> {}", name, from_str, to_str)
            }
            Change::AlterColumnDefault { name, from, to } => {
                let from_str = from
                    .as_ref()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "(none)".to_string());
                let to_str = to
                    .as_ref()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "(none)".to_string());
                write!(f, "~ {} default: {} -> {}", name, from_str, to_str)
            }
        }
    }
}

/// Changes for a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDiff {
    /// Table name.
    pub table: String,
    /// List of changes.
    pub changes: Vec<Change>,
}

impl TableDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Generate SQL statements for all changes, one per line.
    pub fn to_sql(&self, dialect: Dialect, control: &OutputControl) -> String {
        let mut sql = format!("-- Table: {}\n", self.table);
        for change in &self.changes {
            sql.push_str(&change.to_sql(&self.table, dialect, control));
            sql.push('\n');
        }
        sql
    }
}

impl std::fmt::Display for TableDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return writeln!(f, "{}: no changes", self.table);
        }
        writeln!(f, "{}:", self.table)?;
        for change in &self.changes {
            writeln!(f, "  {}", change)?;
        }
        Ok(())
    }
}

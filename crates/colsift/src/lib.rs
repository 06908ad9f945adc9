//! Reconcile column diffs between an ORM model and a live database.
//!
//! Comparing the schema an ORM *thinks* a table has against what the
//! database catalog reports produces a lot of noise: the two speak different
//! vocabularies for the same physical column. This crate provides:
//! - A per-column diff engine ([`diff::compare_column`])
//! - Reconciliation rules that retract differences which are only
//!   vocabulary ([`reconcile()`])
//! - Change generation and SQL rendering for PostgreSQL, MySQL and SQLite
//!
//! # Example
//!
//! ```
//! use colsift::{Comparison, Database, OutputControl};
//! use colsift_schema::{Column, DataType, DefaultValue, Dialect};
//!
//! let comparison = Comparison::new(
//!     Database::model("entities", Dialect::Postgres),
//!     Database::live("app", Dialect::Postgres),
//! );
//!
//! let model = vec![
//!     Column::new("created_at", DataType::parse("timestamp(6)").unwrap()).not_null(),
//! ];
//! let db = vec![
//!     Column::new("created_at", DataType::new("timestamp without time zone"))
//!         .with_default(DefaultValue::function("now()"))
//!         .at_position(3),
//! ];
//!
//! let diff = comparison.compare_table("post", &model, &db).unwrap();
//! // Only the nullability change is real.
//! assert_eq!(
//!     diff.to_sql(comparison.target_dialect(), &OutputControl::default()),
//!     "-- Table: post\nALTER TABLE \"post\" ALTER COLUMN \"created_at\" SET NOT NULL;\n"
//! );
//! ```

pub mod change;
mod comparison;
pub mod config;
mod database;
pub mod diff;
pub mod differences;
mod error;
pub mod generator;
pub mod reconcile;

pub use change::{Change, TableDiff};
pub use comparison::Comparison;
pub use config::OutputControl;
pub use database::{CompareContext, ComparisonSide, Database, ModelSide, ObjectKind};
pub use differences::{AttributeValue, Difference, ObjectDifferences};
pub use error::Error;
pub use generator::{ChangedColumnGenerator, GeneratorRegistry, GenericColumnGenerator, Priority};
pub use reconcile::{ModelColumnGenerator, reconcile};

/// Result type for colsift operations.
pub type Result<T> = std::result::Result<T, Error>;

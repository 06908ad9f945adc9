//! Comparing a model's columns against a database's, table by table.

use crate::Result;
use crate::change::{Change, TableDiff};
use crate::database::{CompareContext, Database, ObjectKind};
use crate::diff::compare_column;
use crate::generator::GeneratorRegistry;
use colsift_schema::{Column, Dialect, DialectTypeResolver, TypeResolver};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A comparison between two sources, typically a model and a database.
///
/// # Example
///
/// ```
/// use colsift::{Comparison, Database};
/// use colsift_schema::{Column, DataType, Dialect};
///
/// let comparison = Comparison::new(
///     Database::model("entities", Dialect::Postgres),
///     Database::live("app", Dialect::Postgres),
/// );
///
/// let model = vec![Column::new("id", DataType::new("int8")).not_null()];
/// let db = vec![Column::new("id", DataType::new("bigint")).not_null().at_position(1)];
///
/// let diff = comparison.compare_table("user", &model, &db).unwrap();
/// assert!(diff.is_empty());
/// ```
pub struct Comparison {
    reference: Database,
    compared: Database,
    registry: GeneratorRegistry,
    resolver: Box<dyn TypeResolver>,
}

impl Comparison {
    /// Compare `compared` against the desired state `reference`, with the
    /// default generators and the built-in type tables.
    pub fn new(reference: Database, compared: Database) -> Self {
        Self {
            reference,
            compared,
            registry: GeneratorRegistry::default(),
            resolver: Box::new(DialectTypeResolver),
        }
    }

    pub fn with_registry(mut self, registry: GeneratorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_resolver(mut self, resolver: impl TypeResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn context(&self) -> CompareContext<'_> {
        CompareContext::new(&self.reference, &self.compared, self.resolver.as_ref())
    }

    /// The dialect generated SQL should target.
    pub fn target_dialect(&self) -> Dialect {
        self.context().database_dialect()
    }

    /// Changes needed to bring one compared column in line with its reference.
    pub fn compare_column(&self, reference: &Column, compared: &Column) -> Result<Vec<Change>> {
        let mut differences = compare_column(reference, compared);
        if differences.is_empty() {
            return Ok(Vec::new());
        }

        let Some(generator) = self.registry.select(ObjectKind::Column, &self.reference) else {
            warn!(column = %reference.name, "no generator registered for columns");
            return Ok(Vec::new());
        };

        debug!(
            column = %reference.name,
            generator = generator.name(),
            differences = differences.len(),
            "column differs"
        );
        generator.fix_changed(reference, compared, &mut differences, &self.context())
    }

    /// Diff the columns of one table.
    ///
    /// Columns are matched by name. Columns only in `reference` are added,
    /// columns only in `compared` are dropped, and columns in both go through
    /// [`Comparison::compare_column`].
    pub fn compare_table(
        &self,
        table: &str,
        reference: &[Column],
        compared: &[Column],
    ) -> Result<TableDiff> {
        let mut changes = Vec::new();

        let reference_names: HashSet<&str> = reference.iter().map(|c| c.name.as_str()).collect();
        let compared_names: HashSet<&str> = compared.iter().map(|c| c.name.as_str()).collect();

        // Columns to add
        for col in reference {
            if !compared_names.contains(col.name.as_str()) {
                changes.push(Change::AddColumn(col.clone()));
            }
        }

        // Columns to drop
        for col in compared {
            if !reference_names.contains(col.name.as_str()) {
                changes.push(Change::DropColumn(col.name.clone()));
            }
        }

        // Columns in both
        for reference_col in reference {
            if let Some(compared_col) = compared.iter().find(|c| c.name == reference_col.name) {
                changes.extend(self.compare_column(reference_col, compared_col)?);
            }
        }

        Ok(TableDiff {
            table: table.to_string(),
            changes,
        })
    }
}

impl std::fmt::Debug for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparison")
            .field("reference", &self.reference)
            .field("compared", &self.compared)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

//! Turning per-column differences into changes.
//!
//! Several generators may know how to handle a changed column. Each declares
//! a [`Priority`] for an object kind, and the [`GeneratorRegistry`] hands the
//! work to the highest one. Specialized generators wrap a more general one
//! and delegate to it once they have done their part, so the generic
//! behavior is always reached.

use crate::Result;
use crate::change::Change;
use crate::database::{CompareContext, Database, ObjectKind};
use crate::differences::{AttributeValue, ObjectDifferences, fields};
use crate::reconcile::ModelColumnGenerator;
use colsift_schema::Column;
use tracing::debug;

/// How strongly a generator wants to handle an object kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Not applicable.
    None,
    /// The generic implementation.
    Default,
    /// Specialized rules layered on top of the generic implementation.
    Additional,
}

/// Produces changes for a column whose two descriptions differ.
pub trait ChangedColumnGenerator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn priority(&self, kind: ObjectKind, database: &Database) -> Priority;

    /// Produce the changes that bring `compared` in line with `reference`,
    /// two descriptions of the same column. May retract differences from
    /// `differences` before doing so.
    fn fix_changed(
        &self,
        reference: &Column,
        compared: &Column,
        differences: &mut ObjectDifferences,
        ctx: &CompareContext<'_>,
    ) -> Result<Vec<Change>>;
}

/// Emits one change per type, nullability or default difference.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericColumnGenerator;

impl ChangedColumnGenerator for GenericColumnGenerator {
    fn name(&self) -> &'static str {
        "generic-column"
    }

    fn priority(&self, kind: ObjectKind, _database: &Database) -> Priority {
        match kind {
            ObjectKind::Column => Priority::Default,
            _ => Priority::None,
        }
    }

    fn fix_changed(
        &self,
        reference: &Column,
        compared: &Column,
        differences: &mut ObjectDifferences,
        _ctx: &CompareContext<'_>,
    ) -> Result<Vec<Change>> {
        let column = reference;
        let definition = target_definition(reference, compared, differences);
        let mut changes = Vec::new();

        for difference in differences.iter() {
            let change = match difference.field.as_str() {
                fields::TYPE => match (&difference.compared, &difference.reference) {
                    (AttributeValue::Type(from), AttributeValue::Type(to)) => {
                        Some(Change::AlterColumnType {
                            name: column.name.clone(),
                            from: from.clone(),
                            to: to.clone(),
                            definition: definition.clone(),
                        })
                    }
                    _ => None,
                },
                fields::NULLABLE => {
                    match (difference.compared.as_bool(), difference.reference.as_bool()) {
                        (Some(from), Some(to)) => Some(Change::AlterColumnNullable {
                            name: column.name.clone(),
                            from,
                            to,
                            definition: definition.clone(),
                        }),
                        _ => None,
                    }
                }
                fields::DEFAULT_VALUE => Some(Change::AlterColumnDefault {
                    name: column.name.clone(),
                    from: difference.compared.as_default().cloned(),
                    to: difference.reference.as_default().cloned(),
                }),
                _ => None,
            };

            match change {
                Some(change) => changes.push(change),
                None => debug!(
                    column = %column.name,
                    difference = %difference,
                    "no change generated"
                ),
            }
        }

        Ok(changes)
    }
}

/// The compared column with every remaining difference settled in favour of
/// the reference. Retracted differences keep the compared side's value.
fn target_definition(
    reference: &Column,
    compared: &Column,
    differences: &ObjectDifferences,
) -> Column {
    let mut target = compared.clone();
    for field in differences.fields() {
        match field {
            fields::TYPE => target.data_type = reference.data_type.clone(),
            fields::NULLABLE => target.nullable = reference.nullable,
            fields::DEFAULT_VALUE => target.default = reference.default.clone(),
            fields::AUTO_INCREMENT => target.auto_increment = reference.auto_increment,
            _ => {}
        }
    }
    target
}

/// The set of generators available to a comparison.
pub struct GeneratorRegistry {
    generators: Vec<Box<dyn ChangedColumnGenerator>>,
}

impl GeneratorRegistry {
    /// A registry with no generators.
    pub fn empty() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    pub fn register(&mut self, generator: impl ChangedColumnGenerator + 'static) -> &mut Self {
        self.generators.push(Box::new(generator));
        self
    }

    /// The highest-priority generator for `kind`, or `None` if no generator
    /// applies. Ties go to the generator registered first.
    pub fn select(&self, kind: ObjectKind, database: &Database) -> Option<&dyn ChangedColumnGenerator> {
        let mut best: Option<(Priority, &dyn ChangedColumnGenerator)> = None;
        for generator in &self.generators {
            let priority = generator.priority(kind, database);
            if priority == Priority::None {
                continue;
            }
            if best.is_none_or(|(current, _)| priority > current) {
                best = Some((priority, generator.as_ref()));
            }
        }
        best.map(|(_, generator)| generator)
    }
}

impl Default for GeneratorRegistry {
    /// The generic column generator plus the model reconciliation rules.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(GenericColumnGenerator)
            .register(ModelColumnGenerator::default());
        registry
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.generators.iter().map(|g| g.name()))
            .finish()
    }
}

//! Suppressing false-positive column differences between an ORM model and
//! a live database.
//!
//! A model and a database catalog routinely describe the same column in
//! different words. Comparing them naively reports differences that would
//! turn into pointless (or harmful) migrations:
//!
//! - **Position.** The model has no notion of column order, so an `order`
//!   difference is always bookkeeping, never a schema change.
//! - **Type aliases.** The model says `int4` or `varchar(255)` where the
//!   catalog says `integer` or `character varying(255)`. Both tokens are
//!   resolved against the *database's* dialect and compared canonically.
//! - **Computed defaults.** Databases fill in defaults such as
//!   `CURRENT_TIMESTAMP` that the model cannot express. A model with no
//!   default facing a database function default is not a difference. The
//!   reverse (model function, database literal or nothing) still is.
//!
//! These rules only hold when exactly one side is model-derived. Between two
//! databases, or two models, every difference is left alone.

use crate::Result;
use crate::change::Change;
use crate::database::{CompareContext, Database, ModelSide, ObjectKind};
use crate::differences::{AttributeValue, ObjectDifferences, fields};
use crate::generator::{ChangedColumnGenerator, GenericColumnGenerator, Priority};
use colsift_schema::{Column, Dialect, TypeResolver};
use tracing::{debug, trace};

/// Attributes whose differences are never meaningful against a model.
const IGNORED_DIFFERENCE_FIELDS: &[&str] = &[fields::ORDER];

/// Remove differences that are artifacts of comparing a model to a database.
///
/// `dialect` must be the dialect of the database-derived side: both recorded
/// types are interpreted as tokens of that dialect. Does nothing when
/// `model_side` is `None`.
///
/// Fails only if the resolver rejects one of the recorded types, in which
/// case the resolver's error is returned unchanged.
pub fn reconcile(
    differences: &mut ObjectDifferences,
    model_side: Option<ModelSide>,
    dialect: Dialect,
    resolver: &dyn TypeResolver,
) -> Result<()> {
    let Some(model_side) = model_side else {
        trace!("both or neither side is model-derived, nothing to reconcile");
        return Ok(());
    };

    for field in IGNORED_DIFFERENCE_FIELDS {
        if differences.remove(field).is_some() {
            debug!(field, "ignoring difference the model cannot express");
        }
    }

    if let Some(difference) = differences.get(fields::TYPE)
        && let (AttributeValue::Type(reference), AttributeValue::Type(compared)) =
            (&difference.reference, &difference.compared)
    {
        let reference_type = resolver.resolve(reference, dialect)?;
        let compared_type = resolver.resolve(compared, dialect)?;
        if reference_type == compared_type {
            debug!(
                %reference,
                %compared,
                canonical = %reference_type,
                %dialect,
                "type difference is an alias"
            );
            differences.remove(fields::TYPE);
        } else {
            trace!(%reference_type, %compared_type, "type difference is real");
        }
    }

    if let Some(difference) = differences.get(fields::DEFAULT_VALUE) {
        let (model, database) = match model_side {
            ModelSide::Reference => (&difference.reference, &difference.compared),
            ModelSide::Compared => (&difference.compared, &difference.reference),
        };
        if model.is_null() && database.is_function_default() {
            debug!(default = %database, "database-computed default has no model equivalent");
            differences.remove(fields::DEFAULT_VALUE);
        }
    }

    Ok(())
}

/// Applies [`reconcile`] to changed columns, then hands the remaining
/// differences to a fallback generator.
///
/// Registered above [`GenericColumnGenerator`] for columns. The fallback is
/// always invoked, whether or not reconciliation was active or removed
/// anything.
pub struct ModelColumnGenerator {
    fallback: Box<dyn ChangedColumnGenerator>,
}

impl ModelColumnGenerator {
    pub fn with_fallback(fallback: impl ChangedColumnGenerator + 'static) -> Self {
        Self {
            fallback: Box::new(fallback),
        }
    }
}

impl Default for ModelColumnGenerator {
    fn default() -> Self {
        Self::with_fallback(GenericColumnGenerator)
    }
}

impl ChangedColumnGenerator for ModelColumnGenerator {
    fn name(&self) -> &'static str {
        "model-column"
    }

    fn priority(&self, kind: ObjectKind, _database: &Database) -> Priority {
        match kind {
            ObjectKind::Column => Priority::Additional,
            _ => Priority::None,
        }
    }

    fn fix_changed(
        &self,
        reference: &Column,
        compared: &Column,
        differences: &mut ObjectDifferences,
        ctx: &CompareContext<'_>,
    ) -> Result<Vec<Change>> {
        {
            let _span = tracing::debug_span!("reconcile", column = %reference.name).entered();
            reconcile(
                differences,
                ctx.model_side(),
                ctx.database_dialect(),
                ctx.resolver,
            )?;
        }
        self.fallback
            .fix_changed(reference, compared, differences, ctx)
    }
}

impl std::fmt::Debug for ModelColumnGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelColumnGenerator")
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

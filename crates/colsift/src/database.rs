//! The two sources of a comparison and which of them is the model.

use colsift_schema::{Dialect, TypeResolver};

/// Where a schema description came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonSide {
    /// Synthesized from ORM mapping metadata.
    Model,
    /// Introspected from a live database catalog.
    Database,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    /// Display name, used in logs
    pub name: String,
    /// Dialect the source's type tokens are written in
    pub dialect: Dialect,
    /// Whether this source is an ORM model or a live database; reconciliation
    /// only runs when exactly one side is a model
    pub side: ComparisonSide,
}

impl Database {
    /// A model-derived source whose ORM targets `dialect`.
    pub fn model(name: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            name: name.into(),
            dialect,
            side: ComparisonSide::Model,
        }
    }

    /// A database-derived source.
    pub fn live(name: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            name: name.into(),
            dialect,
            side: ComparisonSide::Database,
        }
    }

    pub fn is_model(&self) -> bool {
        self.side == ComparisonSide::Model
    }
}

/// Which position in a comparison holds the model-derived source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelSide {
    Reference,
    Compared,
}

impl ModelSide {
    /// Returns `None` unless exactly one of the two sources is model-derived.
    pub fn detect(reference: &Database, compared: &Database) -> Option<Self> {
        match (reference.side, compared.side) {
            (ComparisonSide::Model, ComparisonSide::Database) => Some(ModelSide::Reference),
            (ComparisonSide::Database, ComparisonSide::Model) => Some(ModelSide::Compared),
            _ => None,
        }
    }
}

/// Kinds of schema objects a generator may be asked to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Table,
    Column,
    Index,
    ForeignKey,
}

/// Everything a generator needs to know about the comparison in progress.
#[derive(Clone, Copy)]
pub struct CompareContext<'a> {
    /// The desired state
    pub reference: &'a Database,
    /// The state being brought in line with `reference`
    pub compared: &'a Database,
    pub resolver: &'a dyn TypeResolver,
}

impl<'a> CompareContext<'a> {
    pub fn new(
        reference: &'a Database,
        compared: &'a Database,
        resolver: &'a dyn TypeResolver,
    ) -> Self {
        Self {
            reference,
            compared,
            resolver,
        }
    }

    pub fn model_side(&self) -> Option<ModelSide> {
        ModelSide::detect(self.reference, self.compared)
    }

    /// The dialect of the database-derived side.
    ///
    /// When both or neither side is model-derived this is the compared
    /// side's dialect, since that is the database changes get applied to.
    pub fn database_dialect(&self) -> Dialect {
        match self.model_side() {
            Some(ModelSide::Compared) => self.reference.dialect,
            Some(ModelSide::Reference) | None => self.compared.dialect,
        }
    }
}

impl std::fmt::Debug for CompareContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompareContext")
            .field("reference", &self.reference)
            .field("compared", &self.compared)
            .finish_non_exhaustive()
    }
}

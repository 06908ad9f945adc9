//! Per-attribute differences for one compared object.

use colsift_schema::{DataType, DefaultValue};
use indexmap::IndexMap;
use std::fmt;

/// Attribute names used as difference keys.
pub mod fields {
    /// Ordinal position of the column in its table.
    pub const ORDER: &str = "order";
    pub const TYPE: &str = "type";
    pub const DEFAULT_VALUE: &str = "defaultValue";
    pub const NULLABLE: &str = "nullable";
    pub const AUTO_INCREMENT: &str = "autoIncrement";
}

/// A value recorded for one attribute on one side.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// The source recorded nothing (no default, unknown position, ...).
    Null,
    Type(DataType),
    Default(DefaultValue),
    Bool(bool),
    Int(i64),
    Text(String),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// True for a default the database computes rather than stores.
    pub fn is_function_default(&self) -> bool {
        matches!(self, AttributeValue::Default(d) if d.is_function())
    }

    pub fn as_type(&self) -> Option<&DataType> {
        match self {
            AttributeValue::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_default(&self) -> Option<&DefaultValue> {
        match self {
            AttributeValue::Default(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => write!(f, "null"),
            AttributeValue::Type(t) => write!(f, "{}", t),
            AttributeValue::Default(d) => write!(f, "{}", d),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<DataType> for AttributeValue {
    fn from(value: DataType) -> Self {
        AttributeValue::Type(value)
    }
}

impl From<DefaultValue> for AttributeValue {
    fn from(value: DefaultValue) -> Self {
        AttributeValue::Default(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::Int(i64::from(value))
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(AttributeValue::Null)
    }
}

/// One attribute that differs between the reference and compared objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    pub field: String,
    pub reference: AttributeValue,
    pub compared: AttributeValue,
}

impl Difference {
    pub fn new(
        field: impl Into<String>,
        reference: impl Into<AttributeValue>,
        compared: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            field: field.into(),
            reference: reference.into(),
            compared: compared.into(),
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.compared, self.reference)
    }
}

/// The set of differences found for one compared object, keyed by field.
///
/// Insertion order is preserved so output stays stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectDifferences {
    differences: IndexMap<String, Difference>,
}

impl ObjectDifferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a difference, replacing any previous one for the same field.
    pub fn add(&mut self, difference: Difference) {
        self.differences
            .insert(difference.field.clone(), difference);
    }

    pub fn get(&self, field: &str) -> Option<&Difference> {
        self.differences.get(field)
    }

    /// Retract the difference on `field`, if any.
    pub fn remove(&mut self, field: &str) -> Option<Difference> {
        self.differences.shift_remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.differences.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.differences.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Difference> {
        self.differences.values()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.differences.keys().map(String::as_str)
    }
}

impl FromIterator<Difference> for ObjectDifferences {
    fn from_iter<I: IntoIterator<Item = Difference>>(iter: I) -> Self {
        let mut differences = Self::new();
        for difference in iter {
            differences.add(difference);
        }
        differences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_replaces_same_field() {
        let mut diffs = ObjectDifferences::new();
        diffs.add(Difference::new(fields::NULLABLE, true, false));
        diffs.add(Difference::new(fields::NULLABLE, false, true));
        assert_eq!(diffs.len(), 1);
        assert_eq!(
            diffs.get(fields::NULLABLE).unwrap().reference,
            AttributeValue::Bool(false)
        );
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut diffs: ObjectDifferences = [
            Difference::new(fields::ORDER, None::<u32>, 3u32),
            Difference::new(fields::TYPE, DataType::new("int"), DataType::new("bigint")),
            Difference::new(fields::NULLABLE, true, false),
        ]
        .into_iter()
        .collect();

        assert!(diffs.remove(fields::TYPE).is_some());
        assert!(diffs.remove(fields::TYPE).is_none());
        assert_eq!(
            diffs.fields().collect::<Vec<_>>(),
            vec![fields::ORDER, fields::NULLABLE]
        );
    }

    #[test]
    fn test_option_into_null() {
        assert_eq!(AttributeValue::from(None::<DefaultValue>), AttributeValue::Null);
        assert_eq!(AttributeValue::from(Some(5u32)), AttributeValue::Int(5));
        assert!(AttributeValue::from(DefaultValue::function("now()")).is_function_default());
        assert!(!AttributeValue::from(DefaultValue::literal("0")).is_function_default());
    }

    #[test]
    fn test_difference_display() {
        let diff = Difference::new(fields::DEFAULT_VALUE, None::<DefaultValue>, DefaultValue::literal("x"));
        assert_eq!(diff.to_string(), "defaultValue: 'x' -> null");
    }
}

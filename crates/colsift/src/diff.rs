//! Column diffing.
//!
//! Compares two descriptions of the same column attribute by attribute and
//! records every raw mismatch. No judgement is applied here: a model that
//! says `varchar(255)` and a catalog that says `character varying(255)`
//! produce a `type` difference. Deciding which differences matter is the
//! job of the generators in [`crate::generator`] and [`crate::reconcile`].

use crate::differences::{Difference, ObjectDifferences, fields};
use colsift_schema::Column;

/// Diff two columns with the same name.
pub fn compare_column(reference: &Column, compared: &Column) -> ObjectDifferences {
    let mut differences = ObjectDifferences::new();

    if reference.position != compared.position {
        differences.add(Difference::new(
            fields::ORDER,
            reference.position,
            compared.position,
        ));
    }

    if !reference.data_type.same_token(&compared.data_type) {
        differences.add(Difference::new(
            fields::TYPE,
            reference.data_type.clone(),
            compared.data_type.clone(),
        ));
    }

    if reference.nullable != compared.nullable {
        differences.add(Difference::new(
            fields::NULLABLE,
            reference.nullable,
            compared.nullable,
        ));
    }

    if reference.default != compared.default {
        differences.add(Difference::new(
            fields::DEFAULT_VALUE,
            reference.default.clone(),
            compared.default.clone(),
        ));
    }

    if reference.auto_increment != compared.auto_increment {
        differences.add(Difference::new(
            fields::AUTO_INCREMENT,
            reference.auto_increment,
            compared.auto_increment,
        ));
    }

    differences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differences::AttributeValue;
    use colsift_schema::{DataType, DefaultValue};

    #[test]
    fn test_identical_columns() {
        let col = Column::new("email", DataType::with_params("varchar", [255])).not_null();
        assert!(compare_column(&col, &col).is_empty());
    }

    #[test]
    fn test_type_case_is_not_a_difference() {
        let a = Column::new("email", DataType::with_params("VARCHAR", [255]));
        let b = Column::new("email", DataType::with_params("varchar", [255]));
        assert!(compare_column(&a, &b).is_empty());
    }

    #[test]
    fn test_every_attribute() {
        let model = Column::new("created_at", DataType::new("timestamp")).not_null();
        let db = Column::new("created_at", DataType::new("timestamp without time zone"))
            .with_default(DefaultValue::function("now()"))
            .at_position(4)
            .auto_increment();

        let diffs = compare_column(&model, &db);
        assert_eq!(
            diffs.fields().collect::<Vec<_>>(),
            vec![
                fields::ORDER,
                fields::TYPE,
                fields::NULLABLE,
                fields::DEFAULT_VALUE,
                fields::AUTO_INCREMENT,
            ]
        );

        let order = diffs.get(fields::ORDER).unwrap();
        assert_eq!(order.reference, AttributeValue::Null);
        assert_eq!(order.compared, AttributeValue::Int(4));

        let default = diffs.get(fields::DEFAULT_VALUE).unwrap();
        assert!(default.reference.is_null());
        assert!(default.compared.is_function_default());
    }
}

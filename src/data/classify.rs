use std::fmt;

use super::model::{DType, Dataset};

// ---------------------------------------------------------------------------
// Column roles
// ---------------------------------------------------------------------------

/// How a column takes part in analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Numeric => write!(f, "numeric"),
            ColumnRole::Categorical => write!(f, "categorical"),
        }
    }
}

/// Derive a column's role from its declared dtype.
///
/// Depends only on the dtype, never on sampled cells, so a column keeps its
/// role under any filter (including one that leaves it empty or all-missing).
pub fn classify(dtype: DType) -> ColumnRole {
    match dtype {
        DType::Int64 | DType::Float64 => ColumnRole::Numeric,
        DType::Boolean | DType::Utf8 | DType::Category => ColumnRole::Categorical,
    }
}

impl Dataset {
    /// Role of the named column, `None` if the column does not exist.
    pub fn role_of(&self, column: &str) -> Option<ColumnRole> {
        self.field(column).map(|f| f.role)
    }

    /// Names of all columns with the given role, in column order.
    pub fn columns_with_role(&self, role: ColumnRole) -> Vec<&str> {
        self.fields()
            .iter()
            .filter(|f| f.role == role)
            .map(|f| f.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::arbitrary;
    use crate::data::filter::apply_filters;
    use crate::data::model::{Field, Value};
    use proptest::prelude::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                Field::new("Year", DType::Int64),
                Field::new("Country", DType::Utf8),
                Field::new("CO2", DType::Float64),
                Field::new("Empty", DType::Float64),
            ],
            vec![
                vec![Value::Integer(2020), Value::from("A"), Value::Float(1.0), Value::Null],
                vec![Value::Integer(2021), Value::from("B"), Value::Float(2.0), Value::Null],
            ],
        )
    }

    #[test]
    fn every_dtype_has_a_role() {
        assert_eq!(classify(DType::Int64), ColumnRole::Numeric);
        assert_eq!(classify(DType::Float64), ColumnRole::Numeric);
        assert_eq!(classify(DType::Boolean), ColumnRole::Categorical);
        assert_eq!(classify(DType::Utf8), ColumnRole::Categorical);
        assert_eq!(classify(DType::Category), ColumnRole::Categorical);
    }

    #[test]
    fn all_missing_column_uses_declared_type() {
        assert_eq!(sample().role_of("Empty"), Some(ColumnRole::Numeric));
    }

    #[test]
    fn role_is_stable_under_filtering() {
        let ds = sample();
        let before: Vec<_> = ds.fields().iter().map(|f| f.role).collect();
        let empty = ds.select(&[]);
        let after: Vec<_> = empty.fields().iter().map(|f| f.role).collect();
        assert_eq!(before, after);
        assert_eq!(ds.role_of("Country"), ds.role_of("Country"));
    }

    #[test]
    fn unknown_column_has_no_role() {
        assert_eq!(sample().role_of("Nope"), None);
    }

    #[test]
    fn columns_by_role_keep_order() {
        assert_eq!(
            sample().columns_with_role(ColumnRole::Numeric),
            vec!["Year", "CO2", "Empty"]
        );
    }

    proptest! {
        #[test]
        fn roles_survive_any_filter_set(
            ds in arbitrary::dataset(),
            specs in arbitrary::filter_set(),
        ) {
            let view = apply_filters(&ds, &specs);
            for name in ds.column_names() {
                prop_assert_eq!(view.role_of(name), ds.role_of(name));
            }
            prop_assert_eq!(
                view.columns_with_role(ColumnRole::Categorical),
                ds.columns_with_role(ColumnRole::Categorical)
            );
            prop_assert_eq!(
                view.columns_with_role(ColumnRole::Numeric),
                vec!["Year", "CO2"]
            );
        }
    }
}

use std::collections::BTreeSet;

use super::classify::ColumnRole;
use super::model::{Dataset, Value};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// One user-controlled row predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    /// Keep rows whose value is in `allowed`. Missing cells pass only when
    /// [`Value::Null`] is allowed. An empty set keeps no rows.
    Values {
        column: String,
        allowed: BTreeSet<Value>,
    },
    /// Keep rows whose numeric value lies in `[min, max]`. Missing cells fail.
    Range { column: String, min: f64, max: f64 },
}

impl FilterSpec {
    pub fn column(&self) -> &str {
        match self {
            FilterSpec::Values { column, .. } | FilterSpec::Range { column, .. } => column,
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            FilterSpec::Values { allowed, .. } => allowed.contains(value),
            FilterSpec::Range { min, max, .. } => value
                .as_f64()
                .is_some_and(|v| *min <= v && v <= *max),
        }
    }
}

/// Build the no-op filter set for a freshly loaded dataset: every distinct
/// value allowed for categorical columns (and for the numeric columns listed
/// in `multiselect`), and the observed `[min, max]` for other numeric columns.
///
/// Numeric columns without any values get no range filter.
pub fn default_filters(dataset: &Dataset, multiselect: &[String]) -> Vec<FilterSpec> {
    dataset
        .fields()
        .iter()
        .enumerate()
        .filter_map(|(idx, field)| {
            let as_values =
                field.role == ColumnRole::Categorical || multiselect.contains(&field.name);
            if as_values {
                Some(FilterSpec::Values {
                    column: field.name.clone(),
                    allowed: dataset.unique_values(idx),
                })
            } else {
                let (min, max) = dataset.numeric_range(idx)?;
                Some(FilterSpec::Range {
                    column: field.name.clone(),
                    min,
                    max,
                })
            }
        })
        .collect()
}

/// Return indices of rows that pass every filter (logical AND).
///
/// Filters naming a column the dataset does not have are skipped.
pub fn filtered_indices(dataset: &Dataset, specs: &[FilterSpec]) -> Vec<usize> {
    let resolved: Vec<(usize, &FilterSpec)> = specs
        .iter()
        .filter_map(|spec| match dataset.column_index(spec.column()) {
            Some(idx) => Some((idx, spec)),
            None => {
                log::warn!("Ignoring filter on unknown column '{}'", spec.column());
                None
            }
        })
        .collect();

    dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| resolved.iter().all(|(idx, spec)| spec.matches(&row[*idx])))
        .map(|(i, _)| i)
        .collect()
}

/// Apply all filters and return the filtered view over the same schema.
pub fn apply_filters(dataset: &Dataset, specs: &[FilterSpec]) -> Dataset {
    let indices = filtered_indices(dataset, specs);
    log::debug!(
        "{} filters kept {} of {} rows",
        specs.len(),
        indices.len(),
        dataset.len()
    );
    dataset.select(&indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::arbitrary;
    use crate::data::model::{DType, Field};
    use proptest::prelude::*;

    fn climate() -> Dataset {
        Dataset::new(
            vec![
                Field::new("Year", DType::Int64),
                Field::new("Country", DType::Utf8),
                Field::new("CO2", DType::Float64),
                Field::new("Flat", DType::Float64),
            ],
            vec![
                vec![Value::Integer(2020), Value::from("A"), Value::Float(1.0), Value::Float(7.0)],
                vec![Value::Integer(2020), Value::from("B"), Value::Float(2.0), Value::Float(7.0)],
                vec![Value::Integer(2021), Value::from("A"), Value::Float(3.0), Value::Float(7.0)],
                vec![Value::Integer(2022), Value::Null, Value::Null, Value::Float(7.0)],
            ],
        )
    }

    fn allowed(vals: &[Value]) -> BTreeSet<Value> {
        vals.iter().cloned().collect()
    }

    #[test]
    fn defaults_keep_every_row_with_numeric_values() {
        let ds = climate();
        let specs = default_filters(&ds, &["Year".to_string()]);
        assert_eq!(specs.len(), 4);
        assert!(matches!(&specs[0], FilterSpec::Values { column, .. } if column == "Year"));
        assert_eq!(
            specs[2],
            FilterSpec::Range { column: "CO2".into(), min: 1.0, max: 3.0 }
        );
        // Row 3 has no CO2 value, so the CO2 range drops it.
        assert_eq!(filtered_indices(&ds, &specs), vec![0, 1, 2]);

        let categorical_only: Vec<FilterSpec> = specs
            .into_iter()
            .filter(|s| matches!(s, FilterSpec::Values { .. }))
            .collect();
        assert_eq!(apply_filters(&ds, &categorical_only).len(), ds.len());
    }

    #[test]
    fn single_point_range_excludes_nothing() {
        let ds = climate();
        let spec = FilterSpec::Range { column: "Flat".into(), min: 7.0, max: 7.0 };
        assert_eq!(apply_filters(&ds, &[spec]).len(), 4);
    }

    #[test]
    fn empty_allowed_set_matches_no_rows() {
        let ds = climate();
        let spec = FilterSpec::Values { column: "Country".into(), allowed: BTreeSet::new() };
        assert!(apply_filters(&ds, &[spec]).is_empty());
    }

    #[test]
    fn missing_values_need_explicit_allowance() {
        let ds = climate();
        let without = FilterSpec::Values {
            column: "Country".into(),
            allowed: allowed(&[Value::from("A"), Value::from("B")]),
        };
        assert_eq!(filtered_indices(&ds, &[without]), vec![0, 1, 2]);

        let with = FilterSpec::Values {
            column: "Country".into(),
            allowed: allowed(&[Value::from("A"), Value::Null]),
        };
        assert_eq!(filtered_indices(&ds, &[with]), vec![0, 2, 3]);
    }

    #[test]
    fn range_is_inclusive_and_drops_missing() {
        let ds = climate();
        let spec = FilterSpec::Range { column: "CO2".into(), min: 1.0, max: 2.0 };
        assert_eq!(filtered_indices(&ds, &[spec]), vec![0, 1]);
    }

    #[test]
    fn filters_are_idempotent() {
        let ds = climate();
        let specs = vec![
            FilterSpec::Values { column: "Country".into(), allowed: allowed(&[Value::from("A")]) },
            FilterSpec::Range { column: "Year".into(), min: 2020.0, max: 2021.0 },
        ];
        let once = apply_filters(&ds, &specs);
        let twice = apply_filters(&once, &specs);
        assert_eq!(once.rows(), twice.rows());
    }

    #[test]
    fn filter_order_does_not_matter() {
        let ds = climate();
        let f1 = FilterSpec::Values {
            column: "Year".into(),
            allowed: allowed(&[Value::Integer(2020), Value::Integer(2022)]),
        };
        let f2 = FilterSpec::Range { column: "CO2".into(), min: 0.0, max: 1.5 };
        assert_eq!(
            filtered_indices(&ds, &[f1.clone(), f2.clone()]),
            filtered_indices(&ds, &[f2, f1])
        );
    }

    #[test]
    fn unknown_column_filter_is_skipped() {
        let ds = climate();
        let spec = FilterSpec::Values { column: "Nope".into(), allowed: BTreeSet::new() };
        assert_eq!(apply_filters(&ds, &[spec]).len(), 4);
    }

    proptest! {
        #[test]
        fn filtering_a_filtered_view_changes_nothing(
            ds in arbitrary::dataset(),
            specs in arbitrary::filter_set(),
        ) {
            let once = apply_filters(&ds, &specs);
            let twice = apply_filters(&once, &specs);
            prop_assert_eq!(once.rows(), twice.rows());
        }

        #[test]
        fn filter_order_is_irrelevant(
            ds in arbitrary::dataset(),
            specs in arbitrary::filter_set(),
            shift in 0usize..5,
        ) {
            let expected = filtered_indices(&ds, &specs);

            let mut reversed = specs.clone();
            reversed.reverse();
            prop_assert_eq!(&filtered_indices(&ds, &reversed), &expected);

            let mut rotated = specs.clone();
            if !rotated.is_empty() {
                let by = shift % rotated.len();
                rotated.rotate_left(by);
            }
            prop_assert_eq!(&filtered_indices(&ds, &rotated), &expected);
        }

        #[test]
        fn filters_compose_one_at_a_time(
            ds in arbitrary::dataset(),
            specs in arbitrary::filter_set(),
        ) {
            let all_at_once = apply_filters(&ds, &specs);
            let stepwise = specs
                .iter()
                .fold(ds.clone(), |view, spec| apply_filters(&view, std::slice::from_ref(spec)));
            prop_assert_eq!(all_at_once.rows(), stepwise.rows());
        }

        #[test]
        fn filtered_rows_keep_their_order(
            ds in arbitrary::dataset(),
            specs in arbitrary::filter_set(),
        ) {
            let indices = filtered_indices(&ds, &specs);
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(indices.iter().all(|&i| i < ds.len()));
        }

        #[test]
        fn default_filters_only_drop_rows_missing_a_range_value(ds in arbitrary::dataset()) {
            let specs = default_filters(&ds, &[]);
            let kept = apply_filters(&ds, &specs);
            // Year and CO2 get a range filter only when they have a value.
            let ranged: Vec<usize> = [0, 3]
                .into_iter()
                .filter(|&c| ds.numeric_range(c).is_some())
                .collect();
            let complete = ds
                .rows()
                .iter()
                .filter(|row| ranged.iter().all(|&c| row[c].as_f64().is_some()))
                .count();
            prop_assert_eq!(kept.len(), complete);
        }
    }
}

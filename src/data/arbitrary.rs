//! Random climate datasets and filter sets for property tests.

use std::collections::BTreeSet;

use proptest::prelude::*;

use super::filter::FilterSpec;
use super::model::{DType, Dataset, Field, Row, Value};

const COUNTRIES: &[&str] = &["A", "B", "C"];
const REGIONS: &[&str] = &["N", "S"];
const YEARS: std::ops::Range<i64> = 2000..2005;
const CO2: std::ops::Range<f64> = 0.0..10.0;

fn fields() -> Vec<Field> {
    vec![
        Field::new("Year", DType::Int64),
        Field::new("Country", DType::Utf8),
        Field::new("Region", DType::Utf8),
        Field::new("CO2", DType::Float64),
    ]
}

/// A cell that is missing roughly one time in five.
fn sometimes_missing(present: impl Strategy<Value = Value>) -> impl Strategy<Value = Value> {
    prop_oneof![1 => Just(Value::Null), 4 => present]
}

fn label(choices: &'static [&'static str]) -> impl Strategy<Value = Value> {
    sometimes_missing(prop::sample::select(choices).prop_map(Value::from))
}

fn row() -> impl Strategy<Value = Row> {
    (
        sometimes_missing(YEARS.prop_map(Value::Integer)),
        label(COUNTRIES),
        label(REGIONS),
        sometimes_missing(CO2.prop_map(Value::Float)),
    )
        .prop_map(|(year, country, region, co2)| vec![year, country, region, co2])
}

/// `Year`, `Country`, `Region` and `CO2` over up to forty rows.
pub fn dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(row(), 0..40).prop_map(|rows| Dataset::new(fields(), rows))
}

/// Any subset of the labels, the missing value included.
fn allowed(choices: &'static [&'static str]) -> impl Strategy<Value = BTreeSet<Value>> {
    let mut options: Vec<Value> = choices.iter().map(|c| Value::from(*c)).collect();
    options.push(Value::Null);
    let n = options.len();
    prop::sample::subsequence(options, 0..=n).prop_map(|picked| picked.into_iter().collect())
}

fn values_filter(column: &'static str, choices: &'static [&'static str]) -> impl Strategy<Value = FilterSpec> {
    allowed(choices).prop_map(move |allowed| FilterSpec::Values {
        column: column.to_string(),
        allowed,
    })
}

fn range_filter(column: &'static str, span: std::ops::Range<f64>) -> impl Strategy<Value = FilterSpec> {
    (span.clone(), span).prop_map(move |(a, b)| FilterSpec::Range {
        column: column.to_string(),
        min: a.min(b),
        max: a.max(b),
    })
}

pub fn filter_spec() -> impl Strategy<Value = FilterSpec> {
    prop_oneof![
        values_filter("Country", COUNTRIES),
        values_filter("Region", REGIONS),
        range_filter("CO2", CO2),
        range_filter("Year", 1999.0..2006.0),
    ]
}

/// Zero to four filters, possibly several on the same column.
pub fn filter_set() -> impl Strategy<Value = Vec<FilterSpec>> {
    prop::collection::vec(filter_spec(), 0..5)
}

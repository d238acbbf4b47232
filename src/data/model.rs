use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::classify::{ColumnRole, classify};

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
/// Used as a key in `BTreeMap` / `BTreeSet` downstream so `Value` must be `Ord`.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can group and sort by Value --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn rank(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                Text(_) => 3,
            }
        }
        let ra = rank(self);
        let rb = rank(other);
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            // Mixed numerics order by magnitude, integers first on ties.
            (Integer(a), Float(b)) => (*a as f64).total_cmp(b).then(std::cmp::Ordering::Less),
            (Float(a), Integer(b)) => a.total_cmp(&(*b as f64)).then(std::cmp::Ordering::Greater),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<missing>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

/// NaN and infinities are stored as missing.
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_finite() { Value::Float(v) } else { Value::Null }
    }
}

impl Value {
    /// Interpret the value as an `f64` for numeric computations.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// DType / Field – the declared schema
// ---------------------------------------------------------------------------

/// Declared storage type of a column, fixed at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Int64,
    Float64,
    Boolean,
    Utf8,
    /// Discrete labels declared categorical regardless of their cell type.
    Category,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Boolean => "bool",
            DType::Utf8 => "object",
            DType::Category => "category",
        };
        write!(f, "{name}")
    }
}

/// A named column with its declared dtype and the role derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub dtype: DType,
    pub role: ColumnRole,
}

impl Field {
    pub fn new(name: impl Into<String>, dtype: DType) -> Self {
        let role = classify(dtype);
        Field {
            name: name.into(),
            dtype,
            role,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – rows over a fixed, shared schema
// ---------------------------------------------------------------------------

/// One row, aligned with [`Dataset::fields`].
pub type Row = Vec<Value>;

/// An ordered set of rows over an immutable column set.
///
/// Filtering produces a new `Dataset` that shares the same schema, so the
/// column list never changes after load; only the row count may shrink.
#[derive(Debug, Clone)]
pub struct Dataset {
    fields: Arc<[Field]>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(fields: Vec<Field>, rows: Vec<Row>) -> Self {
        debug_assert!(
            rows.iter().all(|r| r.len() == fields.len()),
            "every row must have one value per field"
        );
        Dataset {
            fields: fields.into(),
            rows,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Ordered column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate the cells of one column.
    pub fn values(&self, column: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |r| &r[column])
    }

    /// Non-missing numeric cells of one column.
    pub fn numeric_values(&self, column: usize) -> Vec<f64> {
        self.values(column).filter_map(Value::as_f64).collect()
    }

    /// Sorted set of distinct values (missing included) of one column.
    pub fn unique_values(&self, column: usize) -> BTreeSet<Value> {
        self.values(column).cloned().collect()
    }

    /// Observed `(min, max)` of a numeric column, `None` if it has no values.
    pub fn numeric_range(&self, column: usize) -> Option<(f64, f64)> {
        self.values(column)
            .filter_map(Value::as_f64)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Keep the rows at `indices`, in order, over the same schema.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            fields: Arc::clone(&self.fields),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Declare the named columns as `Category`. Unknown names are ignored.
    pub fn with_categorical(self, names: &[String]) -> Dataset {
        if names.is_empty() {
            return self;
        }
        let fields: Vec<Field> = self
            .fields
            .iter()
            .map(|f| {
                if names.iter().any(|n| *n == f.name) {
                    Field::new(f.name.clone(), DType::Category)
                } else {
                    f.clone()
                }
            })
            .collect();
        Dataset {
            fields: fields.into(),
            rows: self.rows,
        }
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> &[Row] {
        &self.rows[..n.min(self.rows.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_order_puts_missing_first() {
        let mut vals = vec![Value::from("b"), Value::Null, Value::from(3_i64), Value::from("a")];
        vals.sort();
        assert_eq!(
            vals,
            vec![Value::Null, Value::from(3_i64), Value::from("a"), Value::from("b")]
        );
    }

    #[test]
    fn nan_float_becomes_missing() {
        assert_eq!(Value::from(f64::NAN), Value::Null);
    }

    #[test]
    fn infinite_float_becomes_missing() {
        assert_eq!(Value::from(f64::INFINITY), Value::Null);
        assert_eq!(Value::from(f64::NEG_INFINITY), Value::Null);
        assert_eq!(Value::from(-2.5), Value::Float(-2.5));
    }

    #[test]
    fn select_shares_schema() {
        let ds = Dataset::new(
            vec![Field::new("x", DType::Int64)],
            vec![vec![Value::from(1_i64)], vec![Value::from(2_i64)]],
        );
        let view = ds.select(&[1]);
        assert_eq!(view.len(), 1);
        assert_eq!(view.column_names(), ds.column_names());
        assert!(Arc::ptr_eq(&ds.fields, &view.fields));
    }

    #[test]
    fn numeric_range_skips_missing() {
        let ds = Dataset::new(
            vec![Field::new("x", DType::Float64)],
            vec![vec![Value::Float(2.5)], vec![Value::Null], vec![Value::Float(-1.0)]],
        );
        assert_eq!(ds.numeric_range(0), Some((-1.0, 2.5)));
    }

    #[test]
    fn with_categorical_overrides_dtype() {
        let ds = Dataset::new(vec![Field::new("Year", DType::Int64)], vec![])
            .with_categorical(&["Year".to_string()]);
        assert_eq!(ds.fields()[0].dtype, DType::Category);
        assert_eq!(ds.fields()[0].role, ColumnRole::Categorical);
    }
}

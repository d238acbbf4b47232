use std::collections::HashSet;

use super::classify::ColumnRole;
use super::model::{DType, Dataset};

/// Overview of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: DType,
    pub role: ColumnRole,
    /// Number of missing cells.
    pub missing: usize,
    /// Number of distinct non-missing values.
    pub unique: usize,
}

/// Shape and per-column overview of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: Vec<ColumnProfile>,
}

impl DatasetProfile {
    /// Total missing cells across all columns.
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }
}

pub fn profile(dataset: &Dataset) -> DatasetProfile {
    let columns = dataset
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let mut missing = 0;
            let mut distinct = HashSet::new();
            for value in dataset.values(idx) {
                if value.is_null() {
                    missing += 1;
                } else {
                    distinct.insert(value);
                }
            }
            ColumnProfile {
                name: field.name.clone(),
                dtype: field.dtype,
                role: field.role,
                missing,
                unique: distinct.len(),
            }
        })
        .collect();

    DatasetProfile {
        rows: dataset.len(),
        columns,
    }
}

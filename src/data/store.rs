use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::filter::{FilterSpec, apply_filters};
use super::loader;
use super::model::Dataset;
use crate::error::DataLoadError;

// ---------------------------------------------------------------------------
// Load-once dataset store
// ---------------------------------------------------------------------------

/// Holds the dataset parsed at startup. The base dataset is never mutated;
/// every interaction derives a fresh filtered view from it.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    path: PathBuf,
    base: Arc<Dataset>,
}

impl DatasetStore {
    /// Parse `path` once and declare `categorical` columns as `Category`.
    pub fn open(path: &Path, categorical: &[String]) -> Result<Self, DataLoadError> {
        let dataset = loader::load(path)?.with_categorical(categorical);
        Ok(Self::from_dataset(path, dataset))
    }

    pub fn from_dataset(path: &Path, dataset: Dataset) -> Self {
        DatasetStore {
            path: path.to_path_buf(),
            base: Arc::new(dataset),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The unfiltered dataset, shared.
    pub fn base(&self) -> Arc<Dataset> {
        Arc::clone(&self.base)
    }

    /// Ordered column names.
    pub fn columns(&self) -> Vec<&str> {
        self.base.column_names()
    }

    /// The current view under `filters`.
    pub fn rows(&self, filters: &[FilterSpec]) -> Dataset {
        apply_filters(&self.base, filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{DType, Field, Value};

    #[test]
    fn filtered_view_leaves_base_untouched() {
        let ds = Dataset::new(
            vec![Field::new("Country", DType::Utf8)],
            vec![vec![Value::from("A")], vec![Value::from("B")]],
        );
        let store = DatasetStore::from_dataset(Path::new("mem.csv"), ds);
        let view = store.rows(&[FilterSpec::Values {
            column: "Country".into(),
            allowed: [Value::from("A")].into_iter().collect(),
        }]);
        assert_eq!(view.len(), 1);
        assert_eq!(store.base().len(), 2);
        assert_eq!(store.columns(), vec!["Country"]);
    }

    #[test]
    fn open_applies_categorical_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.csv");
        std::fs::write(&path, "Year,CO2\n2020,1.0\n").unwrap();
        let store = DatasetStore::open(&path, &["Year".to_string()]).unwrap();
        assert_eq!(store.base().field("Year").unwrap().dtype, DType::Category);
        assert_eq!(store.path(), path.as_path());
    }
}

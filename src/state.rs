use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::analysis::dispatch::Analyzer;
use crate::analysis::request::{AnalysisRequest, ViewMode};
use crate::analysis::result::AnalysisResult;
use crate::config::Settings;
use crate::data::classify::ColumnRole;
use crate::data::filter::{FilterSpec, default_filters};
use crate::data::model::{Dataset, Value};
use crate::data::store::DatasetStore;

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Overview,
    Analysis,
}

/// What the overview page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverviewSection {
    #[default]
    Preview,
    Shape,
    ColumnDetails,
    MissingValues,
    UniqueValues,
    ValueCounts,
    FullDataset,
}

impl OverviewSection {
    pub const ALL: [OverviewSection; 7] = [
        OverviewSection::Preview,
        OverviewSection::Shape,
        OverviewSection::ColumnDetails,
        OverviewSection::MissingValues,
        OverviewSection::UniqueValues,
        OverviewSection::ValueCounts,
        OverviewSection::FullDataset,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OverviewSection::Preview => "Dataset Preview",
            OverviewSection::Shape => "Shape & Size",
            OverviewSection::ColumnDetails => "Column Details",
            OverviewSection::MissingValues => "Missing Values",
            OverviewSection::UniqueValues => "Unique Values",
            OverviewSection::ValueCounts => "Value Counts (per column)",
            OverviewSection::FullDataset => "Full Dataset",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisKind {
    #[default]
    Univariate,
    Bivariate,
}

// ---------------------------------------------------------------------------
// Analysis controls
// ---------------------------------------------------------------------------

/// The analysis selectors as the user left them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisControls {
    pub kind: AnalysisKind,
    pub column_a: Option<String>,
    pub column_b: Option<String>,
    pub view: ViewMode,
    pub group_by: Vec<String>,
    /// Display-only axis transforms.
    pub log_x: bool,
    pub log_y: bool,
}

impl AnalysisControls {
    /// The request these controls describe, `None` until columns are chosen.
    pub fn request(&self) -> Option<AnalysisRequest> {
        let a = self.column_a.as_ref()?;
        match self.kind {
            AnalysisKind::Univariate => Some(AnalysisRequest::univariate(a.clone(), self.view)),
            AnalysisKind::Bivariate => {
                let b = self.column_b.as_ref()?;
                Some(
                    AnalysisRequest::bivariate(a.clone(), b.clone(), self.view)
                        .grouped_by(self.group_by.iter().cloned()),
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,
    analyzer: Analyzer,

    /// Loaded dataset (None until a file loads successfully).
    pub store: Option<DatasetStore>,

    /// Current filter controls.
    pub filters: Vec<FilterSpec>,

    /// Base dataset under the current filters.
    pub view: Option<Dataset>,

    pub page: Page,
    pub overview: OverviewSection,
    pub value_counts_column: Option<String>,
    pub controls: AnalysisControls,

    /// Last successfully computed analysis.
    pub result: Option<AnalysisResult>,

    /// Non-fatal message about the last rejected request.
    pub warning: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    dirty: bool,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let analyzer = Analyzer::new(settings.analysis_options());
        Self {
            settings,
            analyzer,
            store: None,
            filters: Vec::new(),
            view: None,
            page: Page::default(),
            overview: OverviewSection::default(),
            value_counts_column: None,
            controls: AnalysisControls::default(),
            result: None,
            warning: None,
            status_message: None,
            dirty: false,
        }
    }

    /// Load `path` and make it the session's dataset. On failure nothing
    /// from the file is kept and the error is shown instead.
    pub fn open(&mut self, path: &Path) {
        match DatasetStore::open(path, &self.settings.categorical_columns) {
            Ok(store) => self.set_store(store),
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset, initialise filters and selectors.
    pub fn set_store(&mut self, store: DatasetStore) {
        let base = store.base();
        self.filters = default_filters(&base, &self.settings.multiselect_columns);

        let names = base.column_names();
        self.controls = AnalysisControls {
            column_a: names.first().map(|s| s.to_string()),
            column_b: names.get(1).map(|s| s.to_string()),
            group_by: self
                .settings
                .group_by
                .iter()
                .filter(|k| base.role_of(k) == Some(ColumnRole::Categorical))
                .cloned()
                .collect(),
            ..AnalysisControls::default()
        };
        self.value_counts_column = names.first().map(|s| s.to_string());

        self.store = Some(store);
        self.result = None;
        self.warning = None;
        self.status_message = None;
        self.refresh();
    }

    /// Flag that a control changed; the next frame recomputes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn refresh_if_dirty(&mut self) {
        if self.dirty {
            self.refresh();
        }
    }

    /// Recompute the filtered view and the analysis from scratch.
    pub fn refresh(&mut self) {
        self.dirty = false;
        let Some(store) = &self.store else {
            return;
        };
        let view = store.rows(&self.filters);

        if let Some(request) = self.controls.request() {
            match self.analyzer.run(&request, &view) {
                Ok(result) => {
                    self.result = Some(result);
                    self.warning = None;
                }
                Err(e) => {
                    log::warn!("Rejected analysis request: {e}");
                    self.warning = Some(e.to_string());
                }
            }
        }
        self.view = Some(view);
    }

    /// The dataset as loaded, before any filter. The overview page describes
    /// this one, not the filtered view.
    pub fn overview_dataset(&self) -> Option<Arc<Dataset>> {
        self.store.as_ref().map(DatasetStore::base)
    }

    /// Every value a value-set filter on `column` can offer.
    pub fn filter_options(&self, column: &str) -> BTreeSet<Value> {
        self.store
            .as_ref()
            .and_then(|s| {
                let base = s.base();
                base.column_index(column).map(|idx| base.unique_values(idx))
            })
            .unwrap_or_default()
    }

    /// Observed `[min, max]` of a numeric column in the unfiltered dataset.
    pub fn range_bounds(&self, column: &str) -> Option<(f64, f64)> {
        let base = self.store.as_ref()?.base();
        base.numeric_range(base.column_index(column)?)
    }

    /// Toggle a single value in a column's value-set filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &Value) {
        if let Some(FilterSpec::Values { allowed, .. }) = self.filter_mut(column) {
            if !allowed.remove(value) {
                allowed.insert(value.clone());
            }
            self.mark_dirty();
        }
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: &str) {
        let all = self.filter_options(column);
        if let Some(FilterSpec::Values { allowed, .. }) = self.filter_mut(column) {
            *allowed = all;
            self.mark_dirty();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: &str) {
        if let Some(FilterSpec::Values { allowed, .. }) = self.filter_mut(column) {
            allowed.clear();
            self.mark_dirty();
        }
    }

    /// Move a range filter's bounds; `min > max` is swapped.
    pub fn set_range(&mut self, column: &str, min: f64, max: f64) {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if let Some(FilterSpec::Range { min, max, .. }) = self.filter_mut(column) {
            *min = lo;
            *max = hi;
            self.mark_dirty();
        }
    }

    fn filter_mut(&mut self, column: &str) -> Option<&mut FilterSpec> {
        self.filters.iter_mut().find(|f| f.column() == column)
    }
}

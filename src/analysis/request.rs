use std::fmt;

/// Whether the caller wants numbers or a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    /// Statistics for one column, tables for two.
    #[default]
    Table,
    Visualization,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Table => write!(f, "Statistics / Table"),
            ViewMode::Visualization => write!(f, "Visualization"),
        }
    }
}

/// What the user asked to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Univariate {
        column: String,
        view: ViewMode,
    },
    Bivariate {
        a: String,
        b: String,
        view: ViewMode,
        /// Extra categorical grouping keys for table views.
        group_by: Vec<String>,
    },
}

impl AnalysisRequest {
    pub fn univariate(column: impl Into<String>, view: ViewMode) -> Self {
        AnalysisRequest::Univariate {
            column: column.into(),
            view,
        }
    }

    pub fn bivariate(a: impl Into<String>, b: impl Into<String>, view: ViewMode) -> Self {
        AnalysisRequest::Bivariate {
            a: a.into(),
            b: b.into(),
            view,
            group_by: Vec::new(),
        }
    }

    /// Set grouping keys on a bivariate request; no effect on univariate ones.
    pub fn grouped_by<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        if let AnalysisRequest::Bivariate { group_by, .. } = &mut self {
            *group_by = keys.into_iter().map(Into::into).collect();
        }
        self
    }
}

use crate::data::model::Value;

use super::stats::{Bins, BoxStats, CrossTab, LinearFit, ScalarSummary};

// ---------------------------------------------------------------------------
// Result variants handed to the presentation layer
// ---------------------------------------------------------------------------

/// Everything needed to render one analysis. Self-contained: rendering never
/// calls back into the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Summary(ColumnSummary),
    /// Independent summaries of two numeric columns.
    SummaryPair([ColumnSummary; 2]),
    Frequency(FrequencyTable),
    Histogram(Histogram),
    /// Same counts and order as [`AnalysisResult::Frequency`], drawn as bars.
    BarChart(FrequencyTable),
    Scatter(ScatterSeries),
    CrossTab(CrossTab),
    /// Same counts as [`AnalysisResult::CrossTab`], drawn as a matrix.
    HeatMap(CrossTab),
    Grouped(GroupedAggregate),
    BoxPlot(BoxPlotSeries),
}

impl AnalysisResult {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisResult::Summary(_) => "summary",
            AnalysisResult::SummaryPair(_) => "summary pair",
            AnalysisResult::Frequency(_) => "frequency table",
            AnalysisResult::Histogram(_) => "histogram",
            AnalysisResult::BarChart(_) => "bar chart",
            AnalysisResult::Scatter(_) => "scatter",
            AnalysisResult::CrossTab(_) => "cross tab",
            AnalysisResult::HeatMap(_) => "heat map",
            AnalysisResult::Grouped(_) => "grouped aggregate",
            AnalysisResult::BoxPlot(_) => "box plot",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub summary: ScalarSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    pub column: String,
    /// Distinct values (missing included) by descending count.
    pub entries: Vec<(Value, usize)>,
}

impl FrequencyTable {
    /// Sum of counts over non-missing values.
    pub fn non_missing_total(&self) -> usize {
        self.entries
            .iter()
            .filter(|(v, _)| !v.is_null())
            .map(|(_, n)| n)
            .sum()
    }

    #[cfg(test)]
    pub fn count(&self, value: &Value) -> usize {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map_or(0, |(_, n)| *n)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    pub bins: Bins,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Value of the colour-key column, if one is in use.
    pub color: Option<Value>,
    /// Values of [`ScatterSeries::hover_columns`], in order.
    pub hover: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub x_column: String,
    pub y_column: String,
    pub color_column: Option<String>,
    pub hover_columns: Vec<String>,
    pub points: Vec<ScatterPoint>,
    /// Present only when a fit was requested and could be computed.
    pub trend: Option<LinearFit>,
}

/// Per-group summaries of one or more numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedAggregate {
    pub keys: Vec<String>,
    pub measures: Vec<String>,
    /// Sorted by key; missing key values form their own groups.
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// One value per entry in [`GroupedAggregate::keys`].
    pub key: Vec<Value>,
    /// One summary per entry in [`GroupedAggregate::measures`].
    pub summaries: Vec<ScalarSummary>,
}

impl GroupedAggregate {
    #[cfg(test)]
    pub fn group(&self, key: &[Value]) -> Option<&Group> {
        self.groups.iter().find(|g| g.key == key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlotSeries {
    pub category_column: String,
    pub value_column: String,
    /// One box per category with at least one value, sorted by category.
    pub boxes: Vec<(Value, BoxStats)>,
}

use std::collections::BTreeMap;

use crate::data::classify::ColumnRole;
use crate::data::model::{Dataset, Value};
use crate::error::InvalidRequestError;

use super::request::{AnalysisRequest, ViewMode};
use super::result::{
    AnalysisResult, BoxPlotSeries, ColumnSummary, FrequencyTable, Group, GroupedAggregate,
    Histogram, ScatterPoint, ScatterSeries,
};
use super::stats::{BoxStats, CrossTab, frequencies, histogram, linear_fit, summarize};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Tunables the dispatcher reads while building results.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    /// Equal-width bin count for histograms.
    pub histogram_bins: usize,
    /// Categorical column used to colour scatter points, when present.
    pub color_key: Option<String>,
    /// Columns attached to each scatter point for hover labels.
    pub hover_columns: Vec<String>,
    /// Whether scatter results carry a linear fit.
    pub trendline: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            histogram_bins: 40,
            color_key: Some("Country".to_string()),
            hover_columns: vec!["Country".to_string(), "Year".to_string()],
            trendline: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// A resolved column reference.
#[derive(Debug, Clone, Copy)]
struct Column<'a> {
    index: usize,
    name: &'a str,
    role: ColumnRole,
}

fn resolve<'a>(dataset: &'a Dataset, name: &str) -> Result<Column<'a>, InvalidRequestError> {
    dataset
        .fields()
        .iter()
        .enumerate()
        .find(|(_, f)| f.name == name)
        .map(|(index, f)| Column {
            index,
            name: &f.name,
            role: f.role,
        })
        .ok_or_else(|| InvalidRequestError::UnknownColumn(name.to_string()))
}

/// Routes a request to the statistic, aggregation or chart data that fits
/// the roles of the selected columns. Stateless between requests.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    options: AnalysisOptions,
}

impl Analyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        Analyzer { options }
    }

    pub fn run(
        &self,
        request: &AnalysisRequest,
        dataset: &Dataset,
    ) -> Result<AnalysisResult, InvalidRequestError> {
        let result = match request {
            AnalysisRequest::Univariate { column, view } => {
                let col = resolve(dataset, column)?;
                self.univariate(dataset, col, *view)
            }
            AnalysisRequest::Bivariate {
                a,
                b,
                view,
                group_by,
            } => {
                if a == b {
                    return Err(InvalidRequestError::SameColumn(a.clone()));
                }
                let a = resolve(dataset, a)?;
                let b = resolve(dataset, b)?;
                self.bivariate(dataset, a, b, *view, group_by)?
            }
        };
        log::debug!("{} rows -> {}", dataset.len(), result.kind());
        Ok(result)
    }

    fn univariate(&self, dataset: &Dataset, col: Column<'_>, view: ViewMode) -> AnalysisResult {
        match (col.role, view) {
            (ColumnRole::Numeric, ViewMode::Table) => AnalysisResult::Summary(ColumnSummary {
                column: col.name.to_string(),
                summary: summarize(&dataset.numeric_values(col.index)),
            }),
            (ColumnRole::Numeric, ViewMode::Visualization) => {
                AnalysisResult::Histogram(Histogram {
                    column: col.name.to_string(),
                    bins: histogram(&dataset.numeric_values(col.index), self.options.histogram_bins),
                })
            }
            (ColumnRole::Categorical, ViewMode::Table) => {
                AnalysisResult::Frequency(frequency_table(dataset, col))
            }
            (ColumnRole::Categorical, ViewMode::Visualization) => {
                AnalysisResult::BarChart(frequency_table(dataset, col))
            }
        }
    }

    fn bivariate(
        &self,
        dataset: &Dataset,
        a: Column<'_>,
        b: Column<'_>,
        view: ViewMode,
        group_by: &[String],
    ) -> Result<AnalysisResult, InvalidRequestError> {
        use ColumnRole::{Categorical, Numeric};

        let result = match (a.role, b.role, view) {
            (Numeric, Numeric, ViewMode::Table) => {
                let keys = group_keys(dataset, None, group_by)?;
                if keys.is_empty() {
                    AnalysisResult::SummaryPair([
                        ColumnSummary {
                            column: a.name.to_string(),
                            summary: summarize(&dataset.numeric_values(a.index)),
                        },
                        ColumnSummary {
                            column: b.name.to_string(),
                            summary: summarize(&dataset.numeric_values(b.index)),
                        },
                    ])
                } else {
                    AnalysisResult::Grouped(grouped(dataset, &keys, &[a, b]))
                }
            }
            (Numeric, Numeric, ViewMode::Visualization) => {
                AnalysisResult::Scatter(self.scatter(dataset, a, b))
            }
            (Categorical, Categorical, ViewMode::Table) => {
                AnalysisResult::CrossTab(crosstab(dataset, a, b))
            }
            (Categorical, Categorical, ViewMode::Visualization) => {
                AnalysisResult::HeatMap(crosstab(dataset, a, b))
            }
            (Numeric, Categorical, ViewMode::Table) => {
                let keys = group_keys(dataset, Some(b), group_by)?;
                AnalysisResult::Grouped(grouped(dataset, &keys, &[a]))
            }
            (Categorical, Numeric, ViewMode::Table) => {
                let keys = group_keys(dataset, Some(a), group_by)?;
                AnalysisResult::Grouped(grouped(dataset, &keys, &[b]))
            }
            (Numeric, Categorical, ViewMode::Visualization) => {
                AnalysisResult::BoxPlot(box_plot(dataset, a, b))
            }
            (Categorical, Numeric, ViewMode::Visualization) => {
                AnalysisResult::BoxPlot(box_plot(dataset, b, a))
            }
        };
        Ok(result)
    }

    fn scatter(&self, dataset: &Dataset, x: Column<'_>, y: Column<'_>) -> ScatterSeries {
        let color = self
            .options
            .color_key
            .as_deref()
            .and_then(|name| resolve(dataset, name).ok())
            .filter(|c| c.role == ColumnRole::Categorical);

        let hover: Vec<Column<'_>> = self
            .options
            .hover_columns
            .iter()
            .filter_map(|name| resolve(dataset, name).ok())
            .filter(|c| c.index != x.index && c.index != y.index)
            .collect();

        let points: Vec<ScatterPoint> = dataset
            .rows()
            .iter()
            .filter_map(|row| {
                Some(ScatterPoint {
                    x: row[x.index].as_f64()?,
                    y: row[y.index].as_f64()?,
                    color: color.map(|c| row[c.index].clone()),
                    hover: hover.iter().map(|h| row[h.index].clone()).collect(),
                })
            })
            .collect();

        let trend = if self.options.trendline {
            let xy: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
            let fit = linear_fit(&xy);
            if fit.is_none() {
                log::debug!("No trend line for {} vs {}: degenerate data", x.name, y.name);
            }
            fit
        } else {
            None
        };

        ScatterSeries {
            x_column: x.name.to_string(),
            y_column: y.name.to_string(),
            color_column: color.map(|c| c.name.to_string()),
            hover_columns: hover.iter().map(|h| h.name.to_string()).collect(),
            points,
            trend,
        }
    }
}

fn frequency_table(dataset: &Dataset, col: Column<'_>) -> FrequencyTable {
    FrequencyTable {
        column: col.name.to_string(),
        entries: frequencies(dataset.values(col.index)),
    }
}

fn crosstab(dataset: &Dataset, a: Column<'_>, b: Column<'_>) -> CrossTab {
    CrossTab::from_pairs(
        a.name,
        b.name,
        dataset.values(a.index).zip(dataset.values(b.index)),
    )
}

/// Grouping keys: `primary` first, then `extra` in order, without duplicates.
/// Only categorical columns can group.
fn group_keys<'a>(
    dataset: &'a Dataset,
    primary: Option<Column<'a>>,
    extra: &[String],
) -> Result<Vec<Column<'a>>, InvalidRequestError> {
    let mut keys: Vec<Column<'a>> = primary.into_iter().collect();
    for name in extra {
        let col = resolve(dataset, name)?;
        if col.role != ColumnRole::Categorical {
            return Err(InvalidRequestError::NonCategoricalKey(name.clone()));
        }
        if !keys.iter().any(|k| k.index == col.index) {
            keys.push(col);
        }
    }
    Ok(keys)
}

fn grouped(dataset: &Dataset, keys: &[Column<'_>], measures: &[Column<'_>]) -> GroupedAggregate {
    let mut buckets: BTreeMap<Vec<Value>, Vec<Vec<f64>>> = BTreeMap::new();
    for row in dataset.rows() {
        let key: Vec<Value> = keys.iter().map(|k| row[k.index].clone()).collect();
        let bucket = buckets
            .entry(key)
            .or_insert_with(|| vec![Vec::new(); measures.len()]);
        for (slot, m) in bucket.iter_mut().zip(measures) {
            if let Some(v) = row[m.index].as_f64() {
                slot.push(v);
            }
        }
    }

    GroupedAggregate {
        keys: keys.iter().map(|k| k.name.to_string()).collect(),
        measures: measures.iter().map(|m| m.name.to_string()).collect(),
        groups: buckets
            .into_iter()
            .map(|(key, values)| Group {
                key,
                summaries: values.iter().map(|v| summarize(v)).collect(),
            })
            .collect(),
    }
}

fn box_plot(dataset: &Dataset, value: Column<'_>, category: Column<'_>) -> BoxPlotSeries {
    let mut buckets: BTreeMap<&Value, Vec<f64>> = BTreeMap::new();
    for row in dataset.rows() {
        let bucket = buckets.entry(&row[category.index]).or_default();
        if let Some(v) = row[value.index].as_f64() {
            bucket.push(v);
        }
    }

    BoxPlotSeries {
        category_column: category.name.to_string(),
        value_column: value.name.to_string(),
        boxes: buckets
            .into_iter()
            .filter_map(|(cat, values)| BoxStats::from_values(&values).map(|b| (cat.clone(), b)))
            .collect(),
    }
}

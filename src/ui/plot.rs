use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, Vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoint, Points,
};

use crate::analysis::result::{BoxPlotSeries, FrequencyTable, Histogram, ScatterSeries};
use crate::analysis::stats::CrossTab;
use crate::color::{ColorMap, generate_palette, heat_color};

const BAR_COLOR: Color32 = Color32::from_rgb(70, 130, 180);

// ---------------------------------------------------------------------------
// Display-only axis transform
// ---------------------------------------------------------------------------

/// Map a data value onto a (possibly log10) axis. Non-positive values have
/// no place on a log axis and are dropped.
fn on_axis(v: f64, log: bool) -> Option<f64> {
    if !log {
        Some(v)
    } else if v > 0.0 {
        Some(v.log10())
    } else {
        None
    }
}

fn axis_label(column: &str, log: bool) -> String {
    if log { format!("log10({column})") } else { column.to_string() }
}

// ---------------------------------------------------------------------------
// Univariate charts
// ---------------------------------------------------------------------------

pub fn histogram(ui: &mut Ui, hist: &Histogram, log_y: bool) {
    let bins = &hist.bins;
    let bars: Vec<Bar> = bins
        .counts
        .iter()
        .enumerate()
        .filter_map(|(i, &count)| {
            let (lo, hi) = (bins.edges[i], bins.edges[i + 1]);
            let height = on_axis(count as f64, log_y)?;
            Some(
                Bar::new((lo + hi) / 2.0, height)
                    .width(hi - lo)
                    .name(format!("[{lo:.3}, {hi:.3}]: {count}"))
                    .fill(BAR_COLOR),
            )
        })
        .collect();

    Plot::new("histogram")
        .x_axis_label(hist.column.clone())
        .y_axis_label(axis_label("count", log_y))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&hist.column));
        });
}

pub fn bar_chart(ui: &mut Ui, table: &FrequencyTable, log_y: bool) {
    let bars: Vec<Bar> = table
        .entries
        .iter()
        .enumerate()
        .filter_map(|(i, (value, count))| {
            let height = on_axis(*count as f64, log_y)?;
            Some(
                Bar::new(i as f64, height)
                    .width(0.8)
                    .name(format!("{value}: {count}"))
                    .fill(BAR_COLOR),
            )
        })
        .collect();

    Plot::new("bar_chart")
        .x_axis_label(table.column.clone())
        .y_axis_label(axis_label("count", log_y))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&table.column));
        });
}

// ---------------------------------------------------------------------------
// Bivariate charts
// ---------------------------------------------------------------------------

pub fn scatter(ui: &mut Ui, series: &ScatterSeries, log_x: bool, log_y: bool) {
    let color_map = series
        .color_column
        .is_some()
        .then(|| ColorMap::new(series.points.iter().filter_map(|p| p.color.as_ref())));

    // Hover text per plotted position, looked up by the label formatter.
    let mut hover_index: Vec<([f64; 2], String)> = Vec::with_capacity(series.points.len());
    let mut groups: Vec<(String, Color32, Vec<[f64; 2]>)> = Vec::new();

    for p in &series.points {
        let (Some(x), Some(y)) = (on_axis(p.x, log_x), on_axis(p.y, log_y)) else {
            continue;
        };
        let (name, color) = match (&color_map, &p.color) {
            (Some(cm), Some(v)) => (v.to_string(), cm.color_for(v)),
            _ => (series.y_column.clone(), BAR_COLOR),
        };
        match groups.iter_mut().find(|(n, _, _)| *n == name) {
            Some((_, _, pts)) => pts.push([x, y]),
            None => groups.push((name, color, vec![[x, y]])),
        }

        let mut text = format!("{}: {}\n{}: {}", series.x_column, p.x, series.y_column, p.y);
        for (col, val) in series.hover_columns.iter().zip(&p.hover) {
            text.push_str(&format!("\n{col}: {val}"));
        }
        hover_index.push(([x, y], text));
    }

    let trend_line: Option<Vec<[f64; 2]>> = series.trend.and_then(|fit| {
        let (lo, hi) = series.points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.x), hi.max(p.x))
        });
        if !lo.is_finite() {
            return None;
        }
        let line: Vec<[f64; 2]> = (0..=50)
            .filter_map(|i| {
                let x = lo + (hi - lo) * i as f64 / 50.0;
                Some([on_axis(x, log_x)?, on_axis(fit.predict(x), log_y)?])
            })
            .collect();
        Some(line)
    });

    Plot::new("scatter")
        .legend(Legend::default())
        .x_axis_label(axis_label(&series.x_column, log_x))
        .y_axis_label(axis_label(&series.y_column, log_y))
        .label_formatter(move |_name, pos: &PlotPoint| {
            nearest_label(&hover_index, pos).unwrap_or_else(|| format!("{:.3}, {:.3}", pos.x, pos.y))
        })
        .show(ui, |plot_ui| {
            for (name, color, pts) in groups {
                plot_ui.points(Points::new(pts).radius(3.0).color(color).name(name));
            }
            if let Some(line) = trend_line {
                plot_ui.line(Line::new(line).color(Color32::DARK_RED).width(2.0).name("trend"));
            }
        });

    if let Some(fit) = &series.trend {
        ui.label(format!(
            "trend: y = {:.4}·x + {:.4}   R² = {:.3}",
            fit.slope, fit.intercept, fit.r_squared
        ));
    }
}

fn nearest_label(index: &[([f64; 2], String)], pos: &PlotPoint) -> Option<String> {
    index
        .iter()
        .find(|([x, y], _)| {
            let tol_x = 1e-9_f64.max(x.abs() * 1e-6);
            let tol_y = 1e-9_f64.max(y.abs() * 1e-6);
            (x - pos.x).abs() <= tol_x && (y - pos.y).abs() <= tol_y
        })
        .map(|(_, text)| text.clone())
}

pub fn box_plot(ui: &mut Ui, series: &BoxPlotSeries, log_y: bool) {
    let palette = generate_palette(series.boxes.len());
    let boxes: Vec<BoxElem> = series
        .boxes
        .iter()
        .zip(palette)
        .enumerate()
        .filter_map(|(i, ((category, stats), color))| {
            let spread = BoxSpread::new(
                on_axis(stats.lower_whisker, log_y)?,
                on_axis(stats.q1, log_y)?,
                on_axis(stats.median, log_y)?,
                on_axis(stats.q3, log_y)?,
                on_axis(stats.upper_whisker, log_y)?,
            );
            Some(
                BoxElem::new(i as f64, spread)
                    .name(format!("{category} (n={})", stats.count))
                    .box_width(0.6)
                    .fill(color.gamma_multiply(0.4))
                    .stroke(Stroke::new(1.5, color)),
            )
        })
        .collect();

    let outliers: Vec<[f64; 2]> = series
        .boxes
        .iter()
        .enumerate()
        .flat_map(|(i, (_, stats))| {
            stats
                .outliers
                .iter()
                .filter_map(move |&v| Some([i as f64, on_axis(v, log_y)?]))
        })
        .collect();

    Plot::new("box_plot")
        .x_axis_label(series.category_column.clone())
        .y_axis_label(axis_label(&series.value_column, log_y))
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes).name(&series.value_column));
            plot_ui.points(Points::new(outliers).radius(2.0).color(Color32::GRAY).name("outliers"));
        });
}

/// Count matrix drawn cell by cell, darker for larger counts.
pub fn heat_map(ui: &mut Ui, table: &CrossTab) {
    if table.row_labels.is_empty() {
        ui.label("No rows with values in both columns.");
        return;
    }

    let label_w = 120.0;
    let header_h = 24.0;
    let cols = table.col_labels.len() as f32;
    let rows = table.row_labels.len() as f32;
    let cell_w = ((ui.available_width() - label_w) / cols).clamp(24.0, 90.0);
    let cell_h = 22.0;

    let size = Vec2::new(label_w + cell_w * cols, header_h + cell_h * rows);
    egui::ScrollArea::both().show(ui, |ui: &mut Ui| {
        let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
        let painter = ui.painter_at(rect);
        let font = FontId::proportional(11.0);
        let text_color = ui.visuals().text_color();
        let max = table.max_count().max(1) as f32;

        for (c, label) in table.col_labels.iter().enumerate() {
            let pos = rect.min + Vec2::new(label_w + cell_w * (c as f32 + 0.5), header_h / 2.0);
            painter.text(pos, Align2::CENTER_CENTER, label.to_string(), font.clone(), text_color);
        }

        for (r, label) in table.row_labels.iter().enumerate() {
            let y = header_h + cell_h * r as f32;
            let pos = rect.min + Vec2::new(label_w - 6.0, y + cell_h / 2.0);
            painter.text(pos, Align2::RIGHT_CENTER, label.to_string(), font.clone(), text_color);

            for (c, &count) in table.counts[r].iter().enumerate() {
                let min = rect.min + Vec2::new(label_w + cell_w * c as f32, y);
                let cell = egui::Rect::from_min_size(min, Vec2::new(cell_w, cell_h)).shrink(1.0);
                let t = count as f32 / max;
                painter.rect_filled(cell, 2.0, heat_color(t));
                let ink = if t > 0.5 { Color32::WHITE } else { Color32::BLACK };
                painter.text(cell.center(), Align2::CENTER_CENTER, count.to_string(), font.clone(), ink);
            }
        }
    });
    ui.label(format!("{} × {}", table.row_column, table.col_column));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_axis_drops_non_positive() {
        assert_eq!(on_axis(100.0, true), Some(2.0));
        assert_eq!(on_axis(0.0, true), None);
        assert_eq!(on_axis(-3.0, false), Some(-3.0));
    }

    #[test]
    fn hover_lookup_matches_plotted_position() {
        let index = vec![([1.0, 2.0], "a".to_string()), ([3.0, 4.0], "b".to_string())];
        assert_eq!(nearest_label(&index, &PlotPoint::new(3.0, 4.0)).as_deref(), Some("b"));
        assert_eq!(nearest_label(&index, &PlotPoint::new(3.5, 4.0)), None);
    }
}

//! Chart Dispatcher Module
//! Resolves column selections against a table and shapes them for the
//! selected chart kind.

use crate::charts::figure::{Figure, FigureData, PieSlice, XySeries};
use crate::charts::kind::{Arity, ChartKind};
use crate::charts::pivot::pivot;
use crate::data::{Column, Table, Value};
use crate::stats::StatsCalculator;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Unknown chart type: '{0}'")]
    Configuration(String),
    #[error("Column '{0}' not found in the data")]
    Selection(String),
    #[error("No column selected for the {0} axis")]
    MissingSelection(&'static str),
    #[error("Column lengths differ: '{x}' has {x_len} values but '{y}' has {y_len}")]
    Shape {
        x: String,
        x_len: usize,
        y: String,
        y_len: usize,
    },
    #[error("Index contains duplicate entries, cannot reshape: ({row}, {column})")]
    DuplicateEntry { row: String, column: String },
    #[error("Column '{column}' {reason}")]
    InvalidValues { column: String, reason: String },
    #[error("Failed to render chart: {0}")]
    Render(String),
}

/// Chart shaping knobs supplied by the host configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub histogram_bins: usize,
    pub violin_points: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            histogram_bins: 10,
            violin_points: 100,
        }
    }
}

/// Everything that determines one chart: source table, kind and selections.
#[derive(Debug, Clone, Copy)]
pub struct ChartRequest<'a> {
    pub table: &'a Table,
    pub kind: ChartKind,
    pub x: Option<&'a str>,
    pub y: Option<&'a str>,
    /// Heatmap cell column. Without it the heatmap pivots Y against itself.
    pub value: Option<&'a str>,
}

impl<'a> ChartRequest<'a> {
    pub fn new(table: &'a Table, kind: ChartKind) -> Self {
        Self {
            table,
            kind,
            x: None,
            y: None,
            value: None,
        }
    }

    pub fn x(mut self, column: &'a str) -> Self {
        self.x = Some(column);
        self
    }

    pub fn y(mut self, column: &'a str) -> Self {
        self.y = Some(column);
        self
    }

    pub fn value(mut self, column: &'a str) -> Self {
        self.value = Some(column);
        self
    }
}

/// Columns a request resolved to.
struct Selected<'a> {
    x: Option<&'a Column>,
    y: &'a Column,
    value: Option<&'a Column>,
}

type Shaper = fn(&Selected<'_>, &ChartOptions) -> Result<FigureData, ChartError>;

/// Numbers from a column, `None` for nulls. Text that is not a number fails.
pub(crate) fn numeric_values(column: &Column) -> Result<Vec<Option<f64>>, ChartError> {
    column
        .values
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            Value::Null => Ok(None),
            Value::Number(n) if !n.is_finite() => Err(ChartError::InvalidValues {
                column: column.name.clone(),
                reason: format!("contains non-finite value '{}' at row {}", n, row + 1),
            }),
            other => other.as_f64().map(Some).ok_or_else(|| ChartError::InvalidValues {
                column: column.name.clone(),
                reason: format!("contains non-numeric value '{}' at row {}", other, row + 1),
            }),
        })
        .collect()
}

/// Non-null numbers, failing when there are none.
fn present_values(column: &Column) -> Result<Vec<f64>, ChartError> {
    let values: Vec<f64> = numeric_values(column)?.into_iter().flatten().collect();
    if values.is_empty() {
        return Err(no_values(column));
    }
    Ok(values)
}

fn x_column<'a>(selected: &Selected<'a>) -> Result<&'a Column, ChartError> {
    selected.x.ok_or(ChartError::MissingSelection("X"))
}

fn shape_xy(selected: &Selected<'_>, _: &ChartOptions) -> Result<FigureData, ChartError> {
    let x = x_column(selected)?;
    let y = numeric_values(selected.y)?;
    Ok(FigureData::Xy(XySeries::new(x.values.clone(), y)))
}

fn shape_histogram(selected: &Selected<'_>, options: &ChartOptions) -> Result<FigureData, ChartError> {
    let values = present_values(selected.y)?;
    Ok(FigureData::Histogram(StatsCalculator::histogram(
        &values,
        options.histogram_bins,
    )))
}

fn shape_box(selected: &Selected<'_>, _: &ChartOptions) -> Result<FigureData, ChartError> {
    let values = present_values(selected.y)?;
    let stats = StatsCalculator::box_stats(&values).ok_or_else(|| no_values(selected.y))?;
    Ok(FigureData::Box(stats))
}

fn shape_violin(selected: &Selected<'_>, options: &ChartOptions) -> Result<FigureData, ChartError> {
    let values = present_values(selected.y)?;
    let stats = StatsCalculator::box_stats(&values).ok_or_else(|| no_values(selected.y))?;
    let density = StatsCalculator::kde(&values, options.violin_points)
        .ok_or_else(|| no_values(selected.y))?;
    Ok(FigureData::Violin { density, stats })
}

fn no_values(column: &Column) -> ChartError {
    ChartError::InvalidValues {
        column: column.name.clone(),
        reason: "has no numeric values to plot".to_string(),
    }
}

fn shape_pie(selected: &Selected<'_>, _: &ChartOptions) -> Result<FigureData, ChartError> {
    let labels = x_column(selected)?;
    let column = selected.y;
    let invalid = |reason: String| ChartError::InvalidValues {
        column: column.name.clone(),
        reason,
    };

    let mut sizes = Vec::with_capacity(column.len());
    for (row, size) in numeric_values(column)?.into_iter().enumerate() {
        match size {
            None => return Err(invalid(format!("has an empty size at row {}", row + 1))),
            Some(s) if s < 0.0 => {
                return Err(invalid(format!("has a negative size {} at row {}", s, row + 1)))
            }
            Some(s) => sizes.push(s),
        }
    }

    let total: f64 = sizes.iter().sum();
    if total <= 0.0 {
        return Err(invalid("sizes must add up to more than zero".to_string()));
    }

    let slices = labels
        .values
        .iter()
        .zip(sizes)
        .map(|(label, size)| PieSlice {
            label: label.to_string(),
            size,
            fraction: size / total,
        })
        .collect();
    Ok(FigureData::Pie(slices))
}

fn shape_heatmap(selected: &Selected<'_>, _: &ChartOptions) -> Result<FigureData, ChartError> {
    let rows = x_column(selected)?;
    let values = selected.value.unwrap_or(selected.y);
    Ok(FigureData::Heatmap(pivot(rows, selected.y, values)?))
}

/// Turns chart requests into figures.
pub struct ChartDispatcher;

impl ChartDispatcher {
    fn shaper(kind: ChartKind) -> Shaper {
        match kind {
            ChartKind::LinePlot
            | ChartKind::BarPlot
            | ChartKind::ScatterPlot
            | ChartKind::AreaPlot
            | ChartKind::HorizontalBarPlot => shape_xy,
            ChartKind::Histogram => shape_histogram,
            ChartKind::PieChart => shape_pie,
            ChartKind::BoxPlot => shape_box,
            ChartKind::ViolinPlot => shape_violin,
            ChartKind::Heatmap => shape_heatmap,
        }
    }

    fn resolve<'a>(table: &'a Table, name: Option<&str>, axis: &'static str) -> Result<&'a Column, ChartError> {
        let name = name.ok_or(ChartError::MissingSelection(axis))?;
        table
            .column(name)
            .ok_or_else(|| ChartError::Selection(name.to_string()))
    }

    /// Resolve the selections the kind needs and shape the figure.
    ///
    /// Single-series kinds never look at the X selection.
    pub fn dispatch(request: &ChartRequest<'_>, options: &ChartOptions) -> Result<Figure, ChartError> {
        let kind = request.kind;
        let y = Self::resolve(request.table, request.y, "Y")?;

        let x = match kind.arity() {
            Arity::Single => None,
            Arity::Pair => {
                let x = Self::resolve(request.table, request.x, "X")?;
                if x.len() != y.len() {
                    return Err(ChartError::Shape {
                        x: x.name.clone(),
                        x_len: x.len(),
                        y: y.name.clone(),
                        y_len: y.len(),
                    });
                }
                Some(x)
            }
        };

        let value = match (kind, request.value) {
            (ChartKind::Heatmap, Some(name)) => Some(Self::resolve(request.table, Some(name), "value")?),
            _ => None,
        };

        let selected = Selected { x, y, value };
        let data = Self::shaper(kind)(&selected, options)?;

        debug!(
            kind = %kind,
            y = %y.name,
            x = x.map(|c| c.name.as_str()).unwrap_or("-"),
            "shaped chart"
        );
        Ok(Figure::new(kind, y.name.clone(), data))
    }

    /// Dispatch by form label, e.g. "Line Plot".
    pub fn dispatch_label(
        label: &str,
        table: &Table,
        x: Option<&str>,
        y: Option<&str>,
        options: &ChartOptions,
    ) -> Result<Figure, ChartError> {
        let kind = ChartKind::from_str(label)
            .map_err(|_| ChartError::Configuration(label.to_string()))?;
        let request = ChartRequest {
            table,
            kind,
            x,
            y,
            value: None,
        };
        Self::dispatch(&request, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::figure::AxisScale;

    fn table() -> Table {
        Table::new(vec![
            Column::text("fruit", ["apple", "pear", "fig"]),
            Column::numeric("count", [3.0, 5.0, 2.0]),
            Column::numeric("price", [1.5, 0.5, 4.0]),
        ])
        .unwrap()
    }

    fn run(kind: ChartKind, x: &str, y: &str) -> Result<Figure, ChartError> {
        let table = table();
        ChartDispatcher::dispatch(
            &ChartRequest::new(&table, kind).x(x).y(y),
            &ChartOptions::default(),
        )
    }

    #[test]
    fn test_line_plot_keeps_series_order() {
        let fig = run(ChartKind::LinePlot, "fruit", "count").unwrap();
        let xy = fig.xy().unwrap();
        assert_eq!(xy.y, vec![Some(3.0), Some(5.0), Some(2.0)]);
        assert_eq!(xy.x[2], Value::Text("fig".into()));
        assert_eq!(
            xy.x_scale,
            AxisScale::Categorical(vec!["apple".into(), "pear".into(), "fig".into()])
        );
        assert_eq!(fig.title, "Line Plot");
        assert_eq!(fig.series_name, "count");
    }

    #[test]
    fn test_single_series_ignores_x() {
        let table = table();
        let request = ChartRequest::new(&table, ChartKind::BoxPlot)
            .x("does-not-exist")
            .y("price");
        let fig = ChartDispatcher::dispatch(&request, &ChartOptions::default()).unwrap();
        match fig.data {
            FigureData::Box(stats) => assert_eq!(stats.median, 1.5),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_y_column_is_named() {
        assert_eq!(
            run(ChartKind::ScatterPlot, "fruit", "Z").unwrap_err(),
            ChartError::Selection("Z".into())
        );
        assert_eq!(
            run(ChartKind::ScatterPlot, "nope", "count").unwrap_err(),
            ChartError::Selection("nope".into())
        );
    }

    #[test]
    fn test_unselected_axis() {
        let table = table();
        let request = ChartRequest::new(&table, ChartKind::BarPlot).y("count");
        assert_eq!(
            ChartDispatcher::dispatch(&request, &ChartOptions::default()).unwrap_err(),
            ChartError::MissingSelection("X")
        );
    }

    #[test]
    fn test_text_y_is_rejected() {
        let err = run(ChartKind::BarPlot, "count", "fruit").unwrap_err();
        assert!(matches!(err, ChartError::InvalidValues { ref column, .. } if column == "fruit"));
    }

    #[test]
    fn test_infinite_y_is_rejected() {
        let table = Table::new(vec![
            Column::text("fruit", ["apple", "pear"]),
            Column::numeric("weight", [1.0, f64::INFINITY]),
        ])
        .unwrap();
        let request = ChartRequest::new(&table, ChartKind::ScatterPlot).x("fruit").y("weight");
        let err = ChartDispatcher::dispatch(&request, &ChartOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ChartError::InvalidValues { ref column, ref reason }
                if column == "weight" && reason.contains("row 2")
        ));
    }

    #[test]
    fn test_pie_fractions() {
        let fig = run(ChartKind::PieChart, "fruit", "count").unwrap();
        let FigureData::Pie(slices) = fig.data else {
            panic!("expected pie");
        };
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[1].label, "pear");
        assert!((slices.iter().map(|s| s.fraction).sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(slices[1].percent_label(), "50.0%");
        assert!(fig.x_label.is_none());
    }

    #[test]
    fn test_pie_rejects_negative_sizes() {
        let table = Table::new(vec![
            Column::text("k", ["a", "b"]),
            Column::numeric("v", [1.0, -1.0]),
        ])
        .unwrap();
        let request = ChartRequest::new(&table, ChartKind::PieChart).x("k").y("v");
        let err = ChartDispatcher::dispatch(&request, &ChartOptions::default()).unwrap_err();
        assert!(err.to_string().contains("negative size"));
    }

    #[test]
    fn test_heatmap_self_pivot_and_value_column() {
        let fig = run(ChartKind::Heatmap, "fruit", "count").unwrap();
        let FigureData::Heatmap(grid) = &fig.data else {
            panic!("expected heatmap");
        };
        assert_eq!(grid.row_keys, vec!["apple", "fig", "pear"]);
        assert_eq!(grid.col_keys, vec!["2", "3", "5"]);
        assert_eq!(grid.get(0, 1), Some(3.0));

        let table = table();
        let request = ChartRequest::new(&table, ChartKind::Heatmap)
            .x("fruit")
            .y("count")
            .value("price");
        let fig = ChartDispatcher::dispatch(&request, &ChartOptions::default()).unwrap();
        let FigureData::Heatmap(grid) = &fig.data else {
            panic!("expected heatmap");
        };
        assert_eq!(grid.get(0, 1), Some(1.5));
    }

    #[test]
    fn test_histogram_uses_configured_bins() {
        let table = table();
        let request = ChartRequest::new(&table, ChartKind::Histogram).y("count");
        let options = ChartOptions {
            histogram_bins: 4,
            ..Default::default()
        };
        let fig = ChartDispatcher::dispatch(&request, &options).unwrap();
        let FigureData::Histogram(bins) = fig.data else {
            panic!("expected histogram");
        };
        assert_eq!(bins.len(), 4);
    }

    #[test]
    fn test_unknown_label_is_configuration_error() {
        let table = table();
        let err = ChartDispatcher::dispatch_label(
            "Radar",
            &table,
            Some("fruit"),
            Some("count"),
            &ChartOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, ChartError::Configuration("Radar".into()));
    }

    #[test]
    fn test_horizontal_bar_labels_swapped() {
        let fig = run(ChartKind::HorizontalBarPlot, "fruit", "count").unwrap();
        assert_eq!(fig.x_label.as_deref(), Some("Y-axis"));
        assert_eq!(fig.y_label.as_deref(), Some("X-axis"));
    }
}

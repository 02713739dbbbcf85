//! Figure Module
//! The drawable chart object handed back to the UI host.

use crate::charts::kind::ChartKind;
use crate::data::Value;
use crate::stats::{BoxStats, Density, HistogramBin};
use serde::Serialize;

/// How X values are placed along the axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AxisScale {
    Numeric,
    /// Distinct labels in first-appearance order; position `i` is label `i`.
    Categorical(Vec<String>),
}

/// Parallel X/Y sequences for the two-column charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XySeries {
    /// X cells exactly as they appear in the table.
    pub x: Vec<Value>,
    /// Y cells as numbers, `None` where the table holds a null.
    pub y: Vec<Option<f64>>,
    /// Axis position of every X cell.
    pub positions: Vec<f64>,
    pub x_scale: AxisScale,
}

impl XySeries {
    pub fn new(x: Vec<Value>, y: Vec<Option<f64>>) -> Self {
        let (positions, x_scale) = Self::place(&x);
        Self {
            x,
            y,
            positions,
            x_scale,
        }
    }

    fn place(x: &[Value]) -> (Vec<f64>, AxisScale) {
        let numeric = x.iter().any(|v| !v.is_null())
            && x.iter().all(|v| v.is_null() || v.as_f64().is_some());

        if numeric {
            let positions = x.iter().map(|v| v.as_f64().unwrap_or(f64::NAN)).collect();
            return (positions, AxisScale::Numeric);
        }

        let mut labels: Vec<String> = Vec::new();
        let positions = x
            .iter()
            .map(|v| {
                let label = v.to_string();
                let idx = match labels.iter().position(|l| *l == label) {
                    Some(idx) => idx,
                    None => {
                        labels.push(label);
                        labels.len() - 1
                    }
                };
                idx as f64
            })
            .collect();
        (positions, AxisScale::Categorical(labels))
    }

    /// Drawable (position, value) pairs, skipping nulls.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.positions
            .iter()
            .zip(self.y.iter())
            .filter_map(|(&x, y)| match y {
                Some(y) if x.is_finite() => Some((x, *y)),
                _ => None,
            })
            .collect()
    }

    /// Tick label for an axis position.
    pub fn label_at(&self, position: f64) -> Option<String> {
        match &self.x_scale {
            AxisScale::Numeric => Some(format!("{}", position)),
            AxisScale::Categorical(labels) => {
                let rounded = position.round();
                if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
                    return None;
                }
                labels.get(rounded as usize).cloned()
            }
        }
    }
}

/// One pie wedge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub size: f64,
    pub fraction: f64,
}

impl PieSlice {
    /// Percentage annotation, one decimal.
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.fraction * 100.0)
    }
}

/// Pivoted grid: one row per distinct row key, one column per column key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub row_keys: Vec<String>,
    pub col_keys: Vec<String>,
    /// `cells[row][col]`, `None` where no table row mapped there.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl HeatmapGrid {
    /// Smallest and largest filled cell.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }
}

/// Shaped data for each kind of chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FigureData {
    /// Line, bar, scatter, area and horizontal bar.
    Xy(XySeries),
    Histogram(Vec<HistogramBin>),
    Pie(Vec<PieSlice>),
    Box(BoxStats),
    Violin { density: Density, stats: BoxStats },
    Heatmap(HeatmapGrid),
}

/// A chart ready to draw: kind, fixed labels and shaped data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Name of the Y column the chart was drawn from.
    pub series_name: String,
    pub data: FigureData,
}

impl Figure {
    pub fn new(kind: ChartKind, series_name: impl Into<String>, data: FigureData) -> Self {
        let spec = kind.spec();
        Self {
            kind,
            title: spec.title.to_string(),
            x_label: spec.x_label.map(str::to_string),
            y_label: spec.y_label.map(str::to_string),
            series_name: series_name.into(),
            data,
        }
    }

    pub fn xy(&self) -> Option<&XySeries> {
        match &self.data {
            FigureData::Xy(series) => Some(series),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorical_positions_follow_first_appearance() {
        let x = vec![
            Value::Text("b".into()),
            Value::Text("a".into()),
            Value::Text("b".into()),
        ];
        let series = XySeries::new(x, vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(series.positions, vec![0.0, 1.0, 0.0]);
        assert_eq!(
            series.x_scale,
            AxisScale::Categorical(vec!["b".into(), "a".into()])
        );
        assert_eq!(series.label_at(1.0), Some("a".to_string()));
        assert_eq!(series.label_at(0.5), None);
    }

    #[test]
    fn test_numeric_positions_keep_values() {
        let x = vec![Value::Number(10.0), Value::Null, Value::Text("30".into())];
        let series = XySeries::new(x, vec![Some(1.0), Some(2.0), None]);
        assert_eq!(series.x_scale, AxisScale::Numeric);
        assert_eq!(series.positions[0], 10.0);
        assert!(series.positions[1].is_nan());
        assert_eq!(series.points(), vec![(10.0, 1.0)]);
    }

    #[test]
    fn test_heatmap_value_range() {
        let grid = HeatmapGrid {
            row_keys: vec!["r".into()],
            col_keys: vec!["a".into(), "b".into()],
            cells: vec![vec![Some(3.0), None]],
        };
        assert_eq!(grid.value_range(), Some((3.0, 3.0)));
        assert_eq!(grid.get(0, 1), None);
    }

    #[test]
    fn test_figure_carries_fixed_labels() {
        let fig = Figure::new(
            ChartKind::Histogram,
            "score",
            FigureData::Histogram(Vec::new()),
        );
        assert_eq!(fig.title, "Histogram");
        assert_eq!(fig.x_label.as_deref(), Some("Value"));
        assert_eq!(fig.y_label.as_deref(), Some("Frequency"));
        assert!(fig.to_json().unwrap().contains("\"Histogram\""));
    }
}

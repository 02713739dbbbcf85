//! Chart kinds and their fixed presentation metadata.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// How many column selections a chart consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Arity {
    /// Only the Y selection is read.
    Single,
    /// Both X and Y selections are read.
    Pair,
}

/// Fixed per-kind rendering metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    pub arity: Arity,
    pub title: &'static str,
    pub x_label: Option<&'static str>,
    pub y_label: Option<&'static str>,
}

/// The ten chart types offered by the form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum ChartKind {
    #[default]
    #[strum(serialize = "Line Plot")]
    #[serde(rename = "Line Plot")]
    LinePlot,
    #[strum(serialize = "Bar Plot")]
    #[serde(rename = "Bar Plot")]
    BarPlot,
    #[strum(serialize = "Scatter Plot")]
    #[serde(rename = "Scatter Plot")]
    ScatterPlot,
    #[strum(serialize = "Histogram")]
    #[serde(rename = "Histogram")]
    Histogram,
    #[strum(serialize = "Pie Chart")]
    #[serde(rename = "Pie Chart")]
    PieChart,
    #[strum(serialize = "Box Plot")]
    #[serde(rename = "Box Plot")]
    BoxPlot,
    #[strum(serialize = "Violin Plot")]
    #[serde(rename = "Violin Plot")]
    ViolinPlot,
    #[strum(serialize = "Heatmap")]
    #[serde(rename = "Heatmap")]
    Heatmap,
    #[strum(serialize = "Area Plot")]
    #[serde(rename = "Area Plot")]
    AreaPlot,
    #[strum(serialize = "Horizontal Bar Plot")]
    #[serde(rename = "Horizontal Bar Plot")]
    HorizontalBarPlot,
}

const XY: (Option<&str>, Option<&str>) = (Some("X-axis"), Some("Y-axis"));

impl ChartKind {
    /// All kinds in form order.
    pub fn all() -> Vec<ChartKind> {
        ChartKind::iter().collect()
    }

    /// Lookup table of arity, title and axis labels.
    pub fn spec(&self) -> ChartSpec {
        let (arity, title, (x_label, y_label)) = match self {
            ChartKind::LinePlot => (Arity::Pair, "Line Plot", XY),
            ChartKind::BarPlot => (Arity::Pair, "Bar Plot", XY),
            ChartKind::ScatterPlot => (Arity::Pair, "Scatter Plot", XY),
            ChartKind::Histogram => (Arity::Single, "Histogram", (Some("Value"), Some("Frequency"))),
            ChartKind::PieChart => (Arity::Pair, "Pie Chart", (None, None)),
            ChartKind::BoxPlot => (Arity::Single, "Box Plot", (Some("Data"), Some("Values"))),
            ChartKind::ViolinPlot => (Arity::Single, "Violin Plot", (Some("Data"), Some("Values"))),
            ChartKind::Heatmap => (Arity::Pair, "Heatmap", XY),
            ChartKind::AreaPlot => (Arity::Pair, "Area Plot", XY),
            // labels swap relative to the vertical bar plot
            ChartKind::HorizontalBarPlot => (
                Arity::Pair,
                "Horizontal Bar Plot",
                (Some("Y-axis"), Some("X-axis")),
            ),
        };
        ChartSpec {
            arity,
            title,
            x_label,
            y_label,
        }
    }

    pub fn arity(&self) -> Arity {
        self.spec().arity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_labels_round_trip() {
        for kind in ChartKind::all() {
            let label = kind.to_string();
            assert_eq!(ChartKind::from_str(&label).unwrap(), kind);
        }
        assert_eq!(ChartKind::all().len(), 10);
    }

    #[test]
    fn test_unknown_label_fails() {
        assert!(ChartKind::from_str("Radar Chart").is_err());
    }

    #[test]
    fn test_single_series_kinds() {
        let single: Vec<ChartKind> = ChartKind::all()
            .into_iter()
            .filter(|k| k.arity() == Arity::Single)
            .collect();
        assert_eq!(
            single,
            vec![ChartKind::Histogram, ChartKind::BoxPlot, ChartKind::ViolinPlot]
        );
    }

    #[test]
    fn test_horizontal_bar_swaps_labels() {
        let bar = ChartKind::BarPlot.spec();
        let hbar = ChartKind::HorizontalBarPlot.spec();
        assert_eq!(bar.x_label, hbar.y_label);
        assert_eq!(bar.y_label, hbar.x_label);
        assert_eq!(ChartKind::PieChart.spec().x_label, None);
    }

    #[test]
    fn test_serde_uses_form_labels() {
        let json = serde_json::to_string(&ChartKind::HorizontalBarPlot).unwrap();
        assert_eq!(json, "\"Horizontal Bar Plot\"");
    }
}

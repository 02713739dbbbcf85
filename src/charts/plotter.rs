//! Chart Plotter Module
//! Draws a `Figure` interactively using egui_plot.

use crate::charts::figure::{AxisScale, Figure, FigureData, HeatmapGrid, PieSlice, XySeries};
use crate::charts::kind::ChartKind;
use crate::charts::renderer::StaticChartRenderer;
use crate::stats::{BoxStats, Density, HistogramBin};
use egui::{Color32, RichText, Stroke};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Line, Plot, PlotPoint, PlotPoints, PlotUi,
    Points, Polygon, Text,
};

/// Series color, matching the exported charts.
pub const SERIES_COLOR: Color32 = Color32::from_rgb(31, 119, 180);

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),  // Blue
    Color32::from_rgb(255, 127, 14),  // Orange
    Color32::from_rgb(44, 160, 44),   // Green
    Color32::from_rgb(214, 39, 40),   // Red
    Color32::from_rgb(148, 103, 189), // Purple
    Color32::from_rgb(140, 86, 75),   // Brown
    Color32::from_rgb(227, 119, 194), // Pink
    Color32::from_rgb(127, 127, 127), // Grey
    Color32::from_rgb(188, 189, 34),  // Olive
    Color32::from_rgb(23, 190, 207),  // Cyan
];

const BAR_WIDTH: f64 = 0.8;

/// Interactive chart drawing for the viewer panel.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw the figure with its title above the plot.
    pub fn draw(ui: &mut egui::Ui, figure: &Figure, height: f32) {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&figure.title).heading().strong());
        });

        let mut plot = Plot::new(format!("figure_{}", figure.kind))
            .height(height)
            .allow_scroll(false);
        if let Some(label) = &figure.x_label {
            plot = plot.x_axis_label(label.clone());
        }
        if let Some(label) = &figure.y_label {
            plot = plot.y_axis_label(label.clone());
        }

        match &figure.data {
            FigureData::Xy(series) => Self::draw_xy(ui, plot, figure.kind, series),
            FigureData::Histogram(bins) => {
                plot.show(ui, |plot_ui| Self::histogram(plot_ui, bins));
            }
            FigureData::Pie(slices) => {
                plot.data_aspect(1.0)
                    .show_axes(false)
                    .show_grid(false)
                    .show(ui, |plot_ui| Self::pie(plot_ui, slices));
            }
            FigureData::Box(stats) => {
                let name = figure.series_name.clone();
                plot.x_axis_formatter(move |mark, _range| {
                    if (mark.value - 1.0).abs() < 1e-6 {
                        name.clone()
                    } else {
                        String::new()
                    }
                })
                .show(ui, |plot_ui| Self::box_plot(plot_ui, stats, &figure.series_name));
            }
            FigureData::Violin { density, stats } => {
                let name = figure.series_name.clone();
                plot.x_axis_formatter(move |mark, _range| {
                    if mark.value.abs() < 1e-6 {
                        name.clone()
                    } else {
                        String::new()
                    }
                })
                .show(ui, |plot_ui| Self::violin(plot_ui, density, stats));
            }
            FigureData::Heatmap(grid) => Self::draw_heatmap(ui, plot, grid),
        }
    }

    /// Formatter text for a categorical position; empty between categories.
    pub fn category_label(series: &XySeries, value: f64) -> String {
        match &series.x_scale {
            AxisScale::Categorical(_) => series.label_at(value).unwrap_or_default(),
            AxisScale::Numeric => format!("{}", value),
        }
    }

    fn draw_xy(ui: &mut egui::Ui, plot: Plot, kind: ChartKind, series: &XySeries) {
        let categorical = matches!(series.x_scale, AxisScale::Categorical(_));
        let points = series.points();
        let horizontal = kind == ChartKind::HorizontalBarPlot;

        let mut plot = plot;
        if categorical {
            let labels = series.clone();
            if horizontal {
                plot = plot.y_axis_formatter(move |mark, _range| {
                    Self::category_label(&labels, mark.value)
                });
            } else {
                plot = plot.x_axis_formatter(move |mark, _range| {
                    Self::category_label(&labels, mark.value)
                });
            }
        }

        plot.show(ui, |plot_ui| match kind {
            ChartKind::ScatterPlot => {
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().map(|&(x, y)| [x, y])))
                        .radius(4.0)
                        .color(SERIES_COLOR),
                );
            }
            ChartKind::BarPlot | ChartKind::HorizontalBarPlot => {
                let bars: Vec<Bar> = points
                    .iter()
                    .map(|&(x, y)| Bar::new(x, y).width(BAR_WIDTH))
                    .collect();
                let chart = BarChart::new(bars).color(SERIES_COLOR);
                plot_ui.bar_chart(if horizontal { chart.horizontal() } else { chart });
            }
            ChartKind::AreaPlot => {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().map(|&(x, y)| [x, y])))
                        .color(SERIES_COLOR)
                        .fill(0.0),
                );
            }
            _ => {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().map(|&(x, y)| [x, y])))
                        .color(SERIES_COLOR)
                        .width(1.5),
                );
            }
        });
    }

    fn histogram(plot_ui: &mut PlotUi, bins: &[HistogramBin]) {
        let bars: Vec<Bar> = bins
            .iter()
            .map(|b| Bar::new((b.start + b.end) / 2.0, b.count as f64).width(b.end - b.start))
            .collect();
        plot_ui.bar_chart(
            BarChart::new(bars)
                .color(SERIES_COLOR)
                .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
                    format!("{}", bar.value)
                })),
        );
    }

    fn pie(plot_ui: &mut PlotUi, slices: &[PieSlice]) {
        let mut start = 0.0f64;
        for (idx, slice) in slices.iter().enumerate() {
            let sweep = slice.fraction * std::f64::consts::TAU;
            if sweep <= 0.0 {
                continue;
            }
            let color = PALETTE[idx % PALETTE.len()];
            let steps = ((90.0 * slice.fraction).ceil() as usize).max(2);

            let mut wedge = vec![[0.0, 0.0]];
            wedge.extend((0..=steps).map(|i| {
                let angle = start + sweep * i as f64 / steps as f64;
                [angle.cos(), angle.sin()]
            }));
            plot_ui.polygon(
                Polygon::new(PlotPoints::new(wedge))
                    .fill_color(color)
                    .stroke(Stroke::new(1.0, Color32::WHITE))
                    .name(&slice.label),
            );

            let mid = start + sweep / 2.0;
            plot_ui.text(Text::new(
                PlotPoint::new(1.15 * mid.cos(), 1.15 * mid.sin()),
                slice.label.clone(),
            ));
            plot_ui.text(Text::new(
                PlotPoint::new(0.6 * mid.cos(), 0.6 * mid.sin()),
                RichText::new(slice.percent_label()).color(Color32::WHITE),
            ));
            start += sweep;
        }
    }

    fn box_plot(plot_ui: &mut PlotUi, stats: &BoxStats, name: &str) {
        let elem = BoxElem::new(
            1.0,
            BoxSpread::new(
                stats.whisker_low,
                stats.q1,
                stats.median,
                stats.q3,
                stats.whisker_high,
            ),
        )
        .box_width(0.5)
        .whisker_width(0.25)
        .fill(SERIES_COLOR.gamma_multiply(0.3))
        .stroke(Stroke::new(1.5, SERIES_COLOR));
        plot_ui.box_plot(BoxPlot::new(vec![elem]).name(name));

        if !stats.outliers.is_empty() {
            plot_ui.points(
                Points::new(PlotPoints::from_iter(stats.outliers.iter().map(|&v| [1.0, v])))
                    .radius(4.0)
                    .filled(false)
                    .color(Color32::BLACK),
            );
        }
    }

    fn violin(plot_ui: &mut PlotUi, density: &Density, stats: &BoxStats) {
        let peak = density.points.iter().map(|&(_, d)| d).fold(0.0f64, f64::max);
        let scale = if peak > 0.0 { 0.4 / peak } else { 0.0 };

        let mut outline: Vec<[f64; 2]> = density
            .points
            .iter()
            .map(|&(v, d)| [d * scale, v])
            .collect();
        outline.extend(density.points.iter().rev().map(|&(v, d)| [-d * scale, v]));

        plot_ui.polygon(
            Polygon::new(PlotPoints::new(outline))
                .fill_color(SERIES_COLOR.gamma_multiply(0.7))
                .stroke(Stroke::new(1.0, SERIES_COLOR)),
        );
        plot_ui.line(
            Line::new(PlotPoints::new(vec![[0.0, stats.whisker_low], [0.0, stats.whisker_high]]))
                .color(Color32::BLACK)
                .width(1.0),
        );
        plot_ui.line(
            Line::new(PlotPoints::new(vec![[0.0, stats.q1], [0.0, stats.q3]]))
                .color(Color32::BLACK)
                .width(5.0),
        );
        plot_ui.points(
            Points::new(PlotPoints::new(vec![[0.0, stats.median]]))
                .radius(3.0)
                .color(Color32::WHITE),
        );
    }

    fn draw_heatmap(ui: &mut egui::Ui, plot: Plot, grid: &HeatmapGrid) {
        let n_rows = grid.row_keys.len();
        let cols = grid.col_keys.clone();
        let rows = grid.row_keys.clone();
        let (lo, hi) = grid.value_range().unwrap_or((0.0, 1.0));

        // cell (r, c) covers [c, c+1] x [n-1-r, n-r]; first row on top
        plot.show_grid(false)
            .data_aspect(1.0)
            .x_axis_formatter(move |mark, _range| Self::cell_label(&cols, mark.value, false))
            .y_axis_formatter(move |mark, _range| Self::cell_label(&rows, mark.value, true))
            .show(ui, |plot_ui| {
                for (r, row) in grid.cells.iter().enumerate() {
                    let y = (n_rows - 1 - r) as f64;
                    for (c, cell) in row.iter().enumerate() {
                        let Some(value) = cell else { continue };
                        let x = c as f64;
                        let rgb = StaticChartRenderer::heat_color(*value, lo, hi);
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::new(vec![
                                [x, y],
                                [x + 1.0, y],
                                [x + 1.0, y + 1.0],
                                [x, y + 1.0],
                            ]))
                            .fill_color(Color32::from_rgb(rgb.0, rgb.1, rgb.2))
                            .stroke(Stroke::NONE),
                        );
                        plot_ui.text(
                            Text::new(PlotPoint::new(x + 0.5, y + 0.5), format!("{}", value))
                                .color(Color32::BLACK),
                        );
                    }
                }
            });
    }

    /// Key label for a heatmap axis mark at a cell center.
    fn cell_label(keys: &[String], value: f64, reversed: bool) -> String {
        let offset = value - 0.5;
        let idx = offset.round();
        if (offset - idx).abs() > 1e-6 || idx < 0.0 || idx as usize >= keys.len() {
            return String::new();
        }
        let idx = idx as usize;
        let idx = if reversed { keys.len() - 1 - idx } else { idx };
        keys[idx].clone()
    }
}

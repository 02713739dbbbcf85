//! Static Chart Renderer
//! Draws a `Figure` with plotters for export.
//!
//! Every kind shares the same frame: caption from the figure title, axis
//! descriptions from its fixed labels, white background. The drawing code
//! is generic over the plotters backend; `render_svg` is the entry point
//! the host uses.

use crate::charts::dispatcher::ChartError;
use crate::charts::figure::{AxisScale, Figure, FigureData, HeatmapGrid, PieSlice, XySeries};
use crate::charts::kind::ChartKind;
use crate::stats::{BoxStats, Density, HistogramBin};
use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;

// Colors
const SERIES: RGBColor = RGBColor(31, 119, 180);
const MEDIAN: RGBColor = RGBColor(255, 127, 14);
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];
// Yellow -> green -> blue ramp for the heatmap
const YLGNBU: [(u8, u8, u8); 5] = [
    (255, 255, 217),
    (199, 233, 180),
    (65, 182, 196),
    (34, 94, 168),
    (8, 29, 88),
];

const BAR_WIDTH: f64 = 0.8;
const BOX_WIDTH: f64 = 0.5;
const VIOLIN_HALF_WIDTH: f64 = 0.4;
const PIE_STEPS: usize = 90;
// Axis data is clamped here so padded spans and tick steps stay finite.
const AXIS_LIMIT: f64 = 1e300;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a figure to an SVG document.
    pub fn render_svg(figure: &Figure, width: u32, height: u32) -> Result<String, ChartError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            Self::draw(root, figure).map_err(|e| ChartError::Render(format!("{:#}", e)))?;
        }
        Ok(svg)
    }

    /// Draw a figure onto any plotters drawing area.
    pub fn draw<DB>(root: DrawingArea<DB, Shift>, figure: &Figure) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        match &figure.data {
            FigureData::Xy(series) if figure.kind == ChartKind::HorizontalBarPlot => {
                Self::draw_horizontal_bars(&root, figure, series)?
            }
            FigureData::Xy(series) => Self::draw_xy(&root, figure, series)?,
            FigureData::Histogram(bins) => Self::draw_histogram(&root, figure, bins)?,
            FigureData::Pie(slices) => Self::draw_pie(&root, figure, slices)?,
            FigureData::Box(stats) => Self::draw_box(&root, figure, stats)?,
            FigureData::Violin { density, stats } => {
                Self::draw_violin(&root, figure, density, stats)?
            }
            FigureData::Heatmap(grid) => Self::draw_heatmap(&root, figure, grid)?,
        }

        root.present()?;
        Ok(())
    }

    fn builder<'a, DB: DrawingBackend>(
        root: &'a DrawingArea<DB, Shift>,
        title: &str,
    ) -> ChartBuilder<'a, 'static, DB> {
        let mut builder = ChartBuilder::on(root);
        builder
            .caption(title, ("sans-serif", 24).into_font())
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60);
        builder
    }

    /// Range over `values` with 5% head room; a degenerate span widens by 5% of
    /// its value, at least one.
    fn padded(values: impl IntoIterator<Item = f64>, include_zero: bool) -> Range<f64> {
        let (mut lo, mut hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(-AXIS_LIMIT, AXIS_LIMIT))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        if !lo.is_finite() {
            return 0.0..1.0;
        }
        if include_zero {
            lo = lo.min(0.0);
            hi = hi.max(0.0);
        }
        if lo == hi {
            let half = (lo.abs() * 0.05).max(1.0);
            return (lo - half)..(hi + half);
        }
        let pad = (hi - lo) * 0.05;
        let lo = if include_zero && lo == 0.0 { 0.0 } else { lo - pad };
        let hi = if include_zero && hi == 0.0 { 0.0 } else { hi + pad };
        lo..hi
    }

    /// Plotters searches tick marks over the span, so it must be finite and non-empty.
    fn checked(range: Range<f64>) -> Result<Range<f64>> {
        anyhow::ensure!(
            (range.end - range.start).is_finite(),
            "axis range {:?} is not finite",
            range
        );
        anyhow::ensure!(range.end > range.start, "axis range {:?} is empty", range);
        Ok(range)
    }

    fn position_range(series: &XySeries) -> Range<f64> {
        match &series.x_scale {
            AxisScale::Categorical(labels) => -0.5..(labels.len() as f64 - 0.5).max(0.5),
            AxisScale::Numeric => Self::padded(series.positions.iter().copied(), false),
        }
    }

    fn draw_xy<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure, series: &XySeries) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let points = series.points();
        let bars = matches!(figure.kind, ChartKind::BarPlot | ChartKind::AreaPlot);
        let mut x_range = Self::position_range(series);
        if figure.kind == ChartKind::BarPlot {
            x_range = (x_range.start - BAR_WIDTH / 2.0)..(x_range.end + BAR_WIDTH / 2.0);
        }
        let y_range = Self::padded(points.iter().map(|&(_, y)| y), bars);

        let mut chart = Self::builder(root, &figure.title)
            .build_cartesian_2d(Self::checked(x_range)?, Self::checked(y_range)?)?;

        let categorical = |v: &f64| series.label_at(*v).unwrap_or_default();
        let mut mesh = chart.configure_mesh();
        if let Some(label) = &figure.x_label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &figure.y_label {
            mesh.y_desc(label.as_str());
        }
        if let AxisScale::Categorical(labels) = &series.x_scale {
            mesh.x_labels(labels.len().max(2)).x_label_formatter(&categorical);
        }
        mesh.draw()?;

        match figure.kind {
            ChartKind::ScatterPlot => {
                chart.draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 4, SERIES.filled())),
                )?;
            }
            ChartKind::BarPlot => {
                chart.draw_series(points.iter().map(|&(x, y)| {
                    Rectangle::new(
                        [(x - BAR_WIDTH / 2.0, 0.0), (x + BAR_WIDTH / 2.0, y)],
                        SERIES.filled(),
                    )
                }))?;
            }
            ChartKind::AreaPlot => {
                chart.draw_series(
                    AreaSeries::new(points.iter().copied(), 0.0, SERIES.mix(0.5))
                        .border_style(SERIES),
                )?;
            }
            _ => {
                chart.draw_series(LineSeries::new(points.iter().copied(), &SERIES))?;
            }
        }
        Ok(())
    }

    fn draw_horizontal_bars<DB>(
        root: &DrawingArea<DB, Shift>,
        figure: &Figure,
        series: &XySeries,
    ) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let points = series.points();
        let positions = Self::position_range(series);
        let positions =
            (positions.start - BAR_WIDTH / 2.0)..(positions.end + BAR_WIDTH / 2.0);
        let values = Self::padded(points.iter().map(|&(_, y)| y), true);

        let mut chart = Self::builder(root, &figure.title)
            .build_cartesian_2d(Self::checked(values)?, Self::checked(positions)?)?;

        let categorical = |v: &f64| series.label_at(*v).unwrap_or_default();
        let mut mesh = chart.configure_mesh();
        if let Some(label) = &figure.x_label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &figure.y_label {
            mesh.y_desc(label.as_str());
        }
        if let AxisScale::Categorical(labels) = &series.x_scale {
            mesh.y_labels(labels.len().max(2)).y_label_formatter(&categorical);
        }
        mesh.draw()?;

        chart.draw_series(points.iter().map(|&(p, v)| {
            Rectangle::new(
                [(0.0, p - BAR_WIDTH / 2.0), (v, p + BAR_WIDTH / 2.0)],
                SERIES.filled(),
            )
        }))?;
        Ok(())
    }

    fn draw_histogram<DB>(
        root: &DrawingArea<DB, Shift>,
        figure: &Figure,
        bins: &[HistogramBin],
    ) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let x_range = Self::padded(bins.iter().flat_map(|b| [b.start, b.end]), false);
        let y_range = Self::padded(bins.iter().map(|b| b.count as f64), true);

        let mut chart = Self::builder(root, &figure.title)
            .build_cartesian_2d(Self::checked(x_range)?, Self::checked(y_range)?)?;
        chart
            .configure_mesh()
            .x_desc(figure.x_label.clone().unwrap_or_default())
            .y_desc(figure.y_label.clone().unwrap_or_default())
            .draw()?;

        chart.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], SERIES.filled())
        }))?;
        chart.draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], WHITE.stroke_width(1))
        }))?;
        Ok(())
    }

    fn draw_pie<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure, slices: &[PieSlice]) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let mut chart = Self::builder(root, &figure.title)
            .build_cartesian_2d(-1.5f64..1.5f64, -1.3f64..1.3f64)?;

        let mut start = 0.0f64;
        for (idx, slice) in slices.iter().enumerate() {
            let sweep = slice.fraction * std::f64::consts::TAU;
            if sweep <= 0.0 {
                continue;
            }
            let color = PALETTE[idx % PALETTE.len()];

            let steps = ((PIE_STEPS as f64 * slice.fraction).ceil() as usize).max(2);
            let mut wedge = vec![(0.0, 0.0)];
            wedge.extend((0..=steps).map(|i| {
                let angle = start + sweep * i as f64 / steps as f64;
                (angle.cos(), angle.sin())
            }));
            chart.draw_series(std::iter::once(Polygon::new(wedge, color.filled())))?;

            let mid = start + sweep / 2.0;
            chart.draw_series(std::iter::once(Text::new(
                slice.label.clone(),
                (1.1 * mid.cos(), 1.1 * mid.sin()),
                ("sans-serif", 14).into_font(),
            )))?;
            chart.draw_series(std::iter::once(Text::new(
                slice.percent_label(),
                (0.6 * mid.cos(), 0.6 * mid.sin()),
                ("sans-serif", 13).into_font(),
            )))?;

            start += sweep;
        }
        Ok(())
    }

    fn draw_box<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure, stats: &BoxStats) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let y_range = Self::padded(
            [stats.whisker_low, stats.whisker_high]
                .into_iter()
                .chain(stats.outliers.iter().copied()),
            false,
        );
        let mut chart = Self::builder(root, &figure.title)
            .build_cartesian_2d(0.5f64..1.5f64, Self::checked(y_range)?)?;

        let name = figure.series_name.clone();
        let tick = |v: &f64| if (*v - 1.0).abs() < 1e-6 { name.clone() } else { String::new() };
        chart
            .configure_mesh()
            .x_desc(figure.x_label.clone().unwrap_or_default())
            .y_desc(figure.y_label.clone().unwrap_or_default())
            .x_labels(3)
            .x_label_formatter(&tick)
            .disable_x_mesh()
            .draw()?;

        let (left, right) = (1.0 - BOX_WIDTH / 2.0, 1.0 + BOX_WIDTH / 2.0);
        let cap = BOX_WIDTH / 4.0;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, stats.q1), (right, stats.q3)],
            SERIES.stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(left, stats.median), (right, stats.median)],
            MEDIAN.stroke_width(2),
        )))?;
        for (from, to) in [(stats.q1, stats.whisker_low), (stats.q3, stats.whisker_high)] {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(1.0, from), (1.0, to)],
                BLACK.stroke_width(1),
            )))?;
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(1.0 - cap, to), (1.0 + cap, to)],
                BLACK.stroke_width(1),
            )))?;
        }
        chart.draw_series(
            stats
                .outliers
                .iter()
                .map(|&v| Circle::new((1.0, v), 4, BLACK.stroke_width(1))),
        )?;
        Ok(())
    }

    fn draw_violin<DB>(
        root: &DrawingArea<DB, Shift>,
        figure: &Figure,
        density: &Density,
        stats: &BoxStats,
    ) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let y_range = Self::padded(density.points.iter().map(|&(v, _)| v), false);
        let mut chart = Self::builder(root, &figure.title)
            .build_cartesian_2d(-0.5f64..0.5f64, Self::checked(y_range)?)?;

        let name = figure.series_name.clone();
        let tick = |v: &f64| if v.abs() < 1e-6 { name.clone() } else { String::new() };
        chart
            .configure_mesh()
            .x_desc(figure.x_label.clone().unwrap_or_default())
            .y_desc(figure.y_label.clone().unwrap_or_default())
            .x_labels(3)
            .x_label_formatter(&tick)
            .disable_x_mesh()
            .draw()?;

        let peak = density
            .points
            .iter()
            .map(|&(_, d)| d)
            .fold(0.0f64, f64::max);
        let scale = if peak > 0.0 { VIOLIN_HALF_WIDTH / peak } else { 0.0 };

        let mut outline: Vec<(f64, f64)> = density
            .points
            .iter()
            .map(|&(v, d)| (d * scale, v))
            .collect();
        outline.extend(density.points.iter().rev().map(|&(v, d)| (-d * scale, v)));

        chart.draw_series(std::iter::once(Polygon::new(outline, SERIES.mix(0.7).filled())))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, stats.whisker_low), (0.0, stats.whisker_high)],
            BLACK.stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(-0.02, stats.q1), (0.02, stats.q3)],
            BLACK.filled(),
        )))?;
        chart.draw_series(std::iter::once(Circle::new(
            (0.0, stats.median),
            3,
            WHITE.filled(),
        )))?;
        Ok(())
    }

    /// Color for `v` on the yellow-green-blue ramp between `lo` and `hi`.
    pub fn heat_color(v: f64, lo: f64, hi: f64) -> RGBColor {
        let t = if hi > lo { ((v - lo) / (hi - lo)).clamp(0.0, 1.0) } else { 0.5 };
        let scaled = t * (YLGNBU.len() - 1) as f64;
        let idx = (scaled.floor() as usize).min(YLGNBU.len() - 2);
        let frac = scaled - idx as f64;
        let (a, b) = (YLGNBU[idx], YLGNBU[idx + 1]);
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }

    fn draw_heatmap<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure, grid: &HeatmapGrid) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let n_rows = grid.row_keys.len() as i32;
        let n_cols = grid.col_keys.len() as i32;
        let (lo, hi) = grid.value_range().unwrap_or((0.0, 1.0));

        let mut chart = Self::builder(root, &figure.title).build_cartesian_2d(
            (0..n_cols.max(1)).into_segmented(),
            (0..n_rows.max(1)).into_segmented(),
        )?;

        // first row is drawn at the top
        let row_at = |segment: i32| (n_rows - 1 - segment).max(0) as usize;
        let col_label = |v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(c) => grid.col_keys.get(*c as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        let row_label = |v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(r) if (0..n_rows).contains(r) => {
                grid.row_keys[row_at(*r)].clone()
            }
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .x_desc(figure.x_label.clone().unwrap_or_default())
            .y_desc(figure.y_label.clone().unwrap_or_default())
            .x_label_formatter(&col_label)
            .y_label_formatter(&row_label)
            .disable_mesh()
            .draw()?;

        for (r, row) in grid.cells.iter().enumerate() {
            let y = n_rows - 1 - r as i32;
            for (c, cell) in row.iter().enumerate() {
                let Some(value) = cell else { continue };
                let x = c as i32;
                chart.draw_series(std::iter::once(Rectangle::new(
                    [
                        (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                        (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                    ],
                    Self::heat_color(*value, lo, hi).filled(),
                )))?;
                chart.draw_series(std::iter::once(Text::new(
                    format!("{}", value),
                    (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                    ("sans-serif", 12).into_font(),
                )))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartDispatcher, ChartOptions, ChartRequest};
    use crate::data::{Column, Table};

    fn table() -> Table {
        Table::new(vec![
            Column::text("city", ["Oslo", "Lima", "Pune", "Nara"]),
            Column::numeric("rain", [12.0, 3.0, 7.5, 9.0]),
            Column::numeric("temp", [4.0, 19.0, 27.0, 15.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_every_kind_renders_svg_with_title() {
        let table = table();
        for kind in ChartKind::all() {
            let request = ChartRequest::new(&table, kind).x("city").y("rain");
            let figure = ChartDispatcher::dispatch(&request, &ChartOptions::default()).unwrap();
            let svg = StaticChartRenderer::render_svg(&figure, 640, 480).unwrap();
            assert!(svg.contains("<svg"), "{} produced no svg", kind);
            assert!(svg.contains(&figure.title), "{} lost its title", kind);
        }
    }

    #[test]
    fn test_numeric_x_renders() {
        let table = table();
        let request = ChartRequest::new(&table, ChartKind::ScatterPlot)
            .x("temp")
            .y("rain");
        let figure = ChartDispatcher::dispatch(&request, &ChartOptions::default()).unwrap();
        let svg = StaticChartRenderer::render_svg(&figure, 400, 300).unwrap();
        assert!(svg.contains("circle"));
    }

    #[test]
    fn test_heat_color_endpoints() {
        assert_eq!(StaticChartRenderer::heat_color(0.0, 0.0, 1.0), RGBColor(255, 255, 217));
        assert_eq!(StaticChartRenderer::heat_color(1.0, 0.0, 1.0), RGBColor(8, 29, 88));
        assert_eq!(StaticChartRenderer::heat_color(5.0, 5.0, 5.0), RGBColor(65, 182, 196));
    }

    #[test]
    fn test_padded_ranges() {
        assert_eq!(StaticChartRenderer::padded([2.0, 2.0], false), 1.0..3.0);
        assert_eq!(StaticChartRenderer::padded(Vec::<f64>::new(), true), 0.0..1.0);
        let r = StaticChartRenderer::padded([1.0, 11.0], true);
        assert_eq!(r.start, 0.0);
        assert!((r.end - 11.55).abs() < 1e-9);
    }

    #[test]
    fn test_extreme_values_keep_axes_finite() {
        let r = StaticChartRenderer::padded([-1e308, 1e308], false);
        assert!(r.start.is_finite() && r.end.is_finite());
        assert!((r.end - r.start).is_finite() && r.end > r.start);

        let r = StaticChartRenderer::padded([1e308, 1e308], false);
        assert!(r.end > r.start);

        assert!(StaticChartRenderer::checked(f64::NEG_INFINITY..0.0).is_err());
        assert!(StaticChartRenderer::checked(1.0..1.0).is_err());
    }

    #[test]
    fn test_extreme_values_render() {
        let table = Table::new(vec![
            Column::text("id", ["a", "b"]),
            Column::numeric("x", [-1e308, 1e308]),
            Column::numeric("y", [-1e308, 1e308]),
        ])
        .unwrap();
        for kind in [ChartKind::ScatterPlot, ChartKind::LinePlot, ChartKind::BoxPlot] {
            let request = ChartRequest::new(&table, kind).x("x").y("y");
            let figure = ChartDispatcher::dispatch(&request, &ChartOptions::default()).unwrap();
            let svg = StaticChartRenderer::render_svg(&figure, 400, 300).unwrap();
            assert!(svg.contains("<svg"), "{} produced no svg", kind);
        }
    }
}

//! Charts module - chart kinds, dispatch and rendering

mod dispatcher;
mod figure;
mod kind;
mod pivot;
mod plotter;
mod renderer;

pub use dispatcher::{ChartDispatcher, ChartError, ChartOptions, ChartRequest};
pub use figure::{AxisScale, Figure, FigureData, HeatmapGrid, PieSlice, XySeries};
pub use kind::{Arity, ChartKind, ChartSpec};
pub use pivot::pivot;
pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;

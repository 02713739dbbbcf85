//! Stats module - distribution summaries for chart shaping

mod calculator;

pub use calculator::{BoxStats, Density, HistogramBin, StatsCalculator};

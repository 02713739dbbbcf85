//! Chartify Form - tabular data in, one of ten standard charts out.
//!
//! Data arrives either as an uploaded CSV/spreadsheet or as a hand-filled
//! grid and is normalized into a [`data::Table`]. A [`charts::ChartKind`]
//! plus column selections is dispatched into a [`charts::Figure`], which
//! the GUI draws with egui_plot and exports as SVG with plotters.
//! [`session::Session`] ties the steps together for one user.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod session;
pub mod stats;

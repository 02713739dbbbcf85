//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;
mod data_panel;

pub use app::ChartifyApp;
pub use chart_viewer::ChartViewer;
pub use control_panel::{ControlPanel, ControlPanelAction, FormSettings};
pub use data_panel::DataPanel;

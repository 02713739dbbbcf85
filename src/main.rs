//! Chartify Form - upload or enter a table and draw it.

use anyhow::Result;
use chartify_form::config::AppConfig;
use chartify_form::gui::ChartifyApp;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1300.0, 850.0])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("Data Visualization App"),
        ..Default::default()
    };

    eframe::run_native(
        "Data Visualization App",
        options,
        Box::new(|cc| Ok(Box::new(ChartifyApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))
}

//! Chartify Form Main Application
//! Main window with control panel, data panel and chart viewer.

use crate::config::AppConfig;
use crate::data::FileKind;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, DataPanel};
use crate::session::{DataSource, Session};
use egui::{Color32, RichText, SidePanel, TopBottomPanel};
use std::path::Path;
use tracing::{error, info};

/// Main application window.
pub struct ChartifyApp {
    config: AppConfig,
    session: Session,
    control_panel: ControlPanel,
    data_panel: DataPanel,
}

impl ChartifyApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        Self {
            session: Session::from_config(&config),
            control_panel: ControlPanel::new(config.default_chart),
            data_panel: DataPanel::new(),
            config,
        }
    }

    /// Push the session's table columns and figure state into the panel.
    fn sync_panel(&mut self) {
        let columns = self
            .session
            .table()
            .map(|t| t.column_names())
            .unwrap_or_default();
        self.control_panel.update_columns(columns);
        self.control_panel.has_figure = self.session.figure().is_some();
        self.control_panel.file_name = self.session.file_name().map(str::to_string);
        self.session.select(self.control_panel.settings.selection());
    }

    fn report<T, E: std::fmt::Display>(&mut self, result: Result<T, E>, ok: impl FnOnce(T) -> String) {
        match result {
            Ok(value) => self.control_panel.set_status(ok(value)),
            Err(e) => self.control_panel.set_status(format!("Error: {}", e)),
        }
    }

    fn handle_source_changed(&mut self) {
        let source = self.control_panel.settings.source;
        self.session.set_source(source);
        if source == DataSource::Manual {
            self.handle_grid_changed();
        } else {
            self.control_panel.set_status("Ready");
            self.sync_panel();
        }
    }

    fn handle_browse_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Data Files", &FileKind::EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let result = match std::fs::read(&path) {
            Ok(bytes) => self
                .session
                .load_file(&name, &bytes)
                .map(|t| format!("Loaded {} rows, {} columns", t.height(), t.width()))
                .map_err(|e| e.to_string()),
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to read file");
                Err(e.to_string())
            }
        };
        self.report(result, |status| status);
        self.sync_panel();
    }

    fn handle_grid_changed(&mut self) {
        let result = self
            .session
            .build_manual(&self.data_panel.grid)
            .map(|t| format!("Table: {} rows, {} columns", t.height(), t.width()));
        self.report(result, |status| status);
        self.sync_panel();
    }

    fn handle_visualize(&mut self) {
        self.session.select(self.control_panel.settings.selection());
        let result = self.session.visualize().map(|f| format!("{} ready", f.title));
        self.report(result, |status| status);
        self.control_panel.has_figure = self.session.figure().is_some();
    }

    fn handle_export_svg(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("SVG", &["svg"])
            .set_file_name("chart.svg")
            .save_file()
        else {
            return;
        };
        let result = self.export_svg(&path);
        self.report(result, |()| format!("Saved {}", path.display()));
    }

    fn export_svg(&self, path: &Path) -> anyhow::Result<()> {
        let svg = self
            .session
            .export_svg(self.config.chart_width, self.config.chart_height)?;
        std::fs::write(path, svg)?;
        info!(path = %path.display(), "exported chart");
        Ok(())
    }
}

impl eframe::App for ChartifyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new("Powered by Pseudowebs")
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });
        });

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::None => {}
                        ControlPanelAction::SourceChanged => self.handle_source_changed(),
                        ControlPanelAction::BrowseFile => self.handle_browse_file(),
                        ControlPanelAction::SelectionChanged => {
                            self.session.select(self.control_panel.settings.selection());
                            self.control_panel.has_figure = self.session.figure().is_some();
                        }
                        ControlPanelAction::Visualize => self.handle_visualize(),
                        ControlPanelAction::ExportSvg => self.handle_export_svg(),
                    }
                });
            });

        // Central panel - data and chart
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                if self.session.source() == DataSource::Manual && self.data_panel.show_grid(ui) {
                    self.handle_grid_changed();
                }
                if let Some(table) = self.session.table() {
                    ui.add_space(10.0);
                    DataPanel::show_preview(ui, table, self.config.preview_rows);
                }
                ui.add_space(15.0);
                ui.separator();
                ChartViewer::show(ui, self.session.figure(), self.session.last_error());
            });
        });
    }
}

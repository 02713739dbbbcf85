//! Control Panel Widget
//! Left side panel with data source, chart selection and actions.

use crate::charts::{Arity, ChartKind};
use crate::session::{DataSource, Selection};
use egui::{Color32, ComboBox, RichText};
use strum::IntoEnumIterator;

/// Form state the user edits in the side panel.
#[derive(Debug, Clone, Default)]
pub struct FormSettings {
    pub source: DataSource,
    pub kind: ChartKind,
    pub x_col: String,
    pub y_col: String,
    /// Heatmap cell column; empty pivots Y against itself.
    pub value_col: String,
}

impl FormSettings {
    pub fn selection(&self) -> Selection {
        let pick = |s: &String| (!s.is_empty()).then(|| s.clone());
        Selection {
            kind: self.kind,
            x: pick(&self.x_col),
            y: pick(&self.y_col),
            value: pick(&self.value_col),
        }
    }
}

/// Left side control panel.
pub struct ControlPanel {
    pub settings: FormSettings,
    pub file_name: Option<String>,
    pub columns: Vec<String>,
    pub status: String,
    pub has_figure: bool,
}

impl ControlPanel {
    pub fn new(default_chart: ChartKind) -> Self {
        Self {
            settings: FormSettings {
                kind: default_chart,
                ..Default::default()
            },
            file_name: None,
            columns: Vec::new(),
            status: "Ready".to_string(),
            has_figure: false,
        }
    }

    /// Replace the column choices, keeping selections that still exist.
    pub fn update_columns(&mut self, columns: Vec<String>) {
        for selected in [
            &mut self.settings.x_col,
            &mut self.settings.y_col,
            &mut self.settings.value_col,
        ] {
            if !columns.contains(selected) {
                selected.clear();
            }
        }
        if self.settings.x_col.is_empty() {
            self.settings.x_col = columns.first().cloned().unwrap_or_default();
        }
        if self.settings.y_col.is_empty() {
            self.settings.y_col = columns.get(1).or(columns.first()).cloned().unwrap_or_default();
        }
        self.columns = columns;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    fn column_combo(
        ui: &mut egui::Ui,
        id: &str,
        label: &str,
        selected: &mut String,
        columns: &[String],
        allow_none: bool,
    ) -> bool {
        let mut changed = false;
        ui.horizontal(|ui| {
            ui.add_sized([90.0, 20.0], egui::Label::new(label));
            ComboBox::from_id_salt(id)
                .width(170.0)
                .selected_text(if selected.is_empty() { "-" } else { selected.as_str() })
                .show_ui(ui, |ui| {
                    if allow_none && ui.selectable_label(selected.is_empty(), "-").clicked() {
                        selected.clear();
                        changed = true;
                    }
                    for col in columns {
                        if ui.selectable_label(selected == col, col).clicked() {
                            *selected = col.clone();
                            changed = true;
                        }
                    }
                });
        });
        changed
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Data Visualization App")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            for source in DataSource::iter() {
                if ui
                    .radio_value(&mut self.settings.source, source, source.to_string())
                    .changed()
                {
                    action = ControlPanelAction::SourceChanged;
                }
            }
        });
        ui.add_space(5.0);

        if self.settings.source == DataSource::Upload {
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let name = self.file_name.as_deref().unwrap_or("No file selected");
                        let color = if self.file_name.is_some() {
                            ui.visuals().text_color()
                        } else {
                            Color32::GRAY
                        };
                        ui.label(RichText::new(name).size(12.0).color(color));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseFile;
                            }
                        });
                    });
                });
        } else {
            ui.label(
                RichText::new("Enter the table in the grid on the right.")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Chart Section =====
        ui.label(RichText::new("🔧 Chart").size(14.0).strong());
        ui.add_space(8.0);

        let mut selection_changed = false;
        ui.horizontal(|ui| {
            ui.add_sized([90.0, 20.0], egui::Label::new("Plot type:"));
            ComboBox::from_id_salt("plot_type")
                .width(170.0)
                .selected_text(self.settings.kind.to_string())
                .show_ui(ui, |ui| {
                    for kind in ChartKind::iter() {
                        if ui
                            .selectable_value(&mut self.settings.kind, kind, kind.to_string())
                            .changed()
                        {
                            selection_changed = true;
                        }
                    }
                });
        });
        ui.add_space(5.0);

        let kind = self.settings.kind;
        if kind.arity() == Arity::Pair {
            selection_changed |= Self::column_combo(
                ui,
                "x_col",
                "X-axis:",
                &mut self.settings.x_col,
                &self.columns,
                false,
            );
        }
        selection_changed |= Self::column_combo(
            ui,
            "y_col",
            "Y-axis:",
            &mut self.settings.y_col,
            &self.columns,
            false,
        );
        if kind == ChartKind::Heatmap {
            selection_changed |= Self::column_combo(
                ui,
                "value_col",
                "Values:",
                &mut self.settings.value_col,
                &self.columns,
                true,
            );
        }
        if kind.arity() == Arity::Single {
            ui.label(
                RichText::new(format!("{} uses only the Y-axis column.", kind))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }
        if selection_changed {
            action = ControlPanelAction::SelectionChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.columns.is_empty(), |ui| {
                let button = egui::Button::new(RichText::new("▶ Visualize").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Visualize;
                }
            });

            ui.add_space(8.0);

            ui.add_enabled_ui(self.has_figure, |ui| {
                let export = egui::Button::new(RichText::new("📄 Export SVG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(export).clicked() {
                    action = ControlPanelAction::ExportSvg;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SourceChanged,
    BrowseFile,
    SelectionChanged,
    Visualize,
    ExportSvg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_columns_keeps_valid_selection() {
        let mut panel = ControlPanel::new(ChartKind::LinePlot);
        panel.update_columns(vec!["a".into(), "b".into()]);
        assert_eq!(panel.settings.x_col, "a");
        assert_eq!(panel.settings.y_col, "b");

        panel.settings.y_col = "a".into();
        panel.update_columns(vec!["b".into(), "c".into()]);
        assert_eq!(panel.settings.x_col, "b");
        assert_eq!(panel.settings.y_col, "c");
    }

    #[test]
    fn test_empty_value_column_is_none() {
        let settings = FormSettings {
            kind: ChartKind::Heatmap,
            x_col: "a".into(),
            y_col: "b".into(),
            ..Default::default()
        };
        let selection = settings.selection();
        assert_eq!(selection.value, None);
        assert_eq!(selection.x.as_deref(), Some("a"));
    }
}

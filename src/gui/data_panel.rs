//! Data Panel Widget
//! Manual entry grid and the preview of the current table.

use crate::data::{ColumnType, ManualGrid, Table};
use egui::{Color32, ComboBox, DragValue, RichText, ScrollArea};

const MAX_DIMENSION: usize = 100;

/// Editor for the manual grid: dimensions, one name/type per column, cells.
pub struct DataPanel {
    pub grid: ManualGrid,
    rows: usize,
    cols: usize,
}

impl Default for DataPanel {
    fn default() -> Self {
        let grid = ManualGrid::default();
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            grid,
        }
    }
}

impl DataPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the grid editor. Returns true when any cell, name, type or
    /// dimension changed.
    pub fn show_grid(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;

        ui.label(RichText::new("✏ Manual Entry").size(16.0).strong());
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.label("Number of rows:");
            changed |= ui
                .add(DragValue::new(&mut self.rows).range(1..=MAX_DIMENSION))
                .changed();
            ui.add_space(15.0);
            ui.label("Number of columns:");
            changed |= ui
                .add(DragValue::new(&mut self.cols).range(1..=MAX_DIMENSION))
                .changed();
        });
        if changed && self.grid.resize(self.rows, self.cols).is_err() {
            self.rows = self.grid.rows();
            self.cols = self.grid.cols();
        }
        ui.add_space(8.0);

        ScrollArea::both()
            .id_salt("manual_grid")
            .max_height(260.0)
            .show(ui, |ui| {
                egui::Grid::new("manual_grid_cells")
                    .striped(true)
                    .spacing([6.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("");
                        for (idx, column) in self.grid.columns_mut().iter_mut().enumerate() {
                            ui.vertical(|ui| {
                                changed |= ui
                                    .add(
                                        egui::TextEdit::singleline(&mut column.name)
                                            .hint_text(format!("Column {}", idx + 1))
                                            .desired_width(110.0),
                                    )
                                    .changed();
                                ComboBox::from_id_salt(("manual_type", idx))
                                    .width(110.0)
                                    .selected_text(column.dtype.label())
                                    .show_ui(ui, |ui| {
                                        for dtype in ColumnType::ALL {
                                            changed |= ui
                                                .selectable_value(
                                                    &mut column.dtype,
                                                    dtype,
                                                    dtype.label(),
                                                )
                                                .changed();
                                        }
                                    });
                            });
                        }
                        ui.end_row();

                        for row in 0..self.rows {
                            ui.label(RichText::new(format!("{}", row + 1)).color(Color32::GRAY));
                            for column in self.grid.columns_mut().iter_mut() {
                                if let Some(cell) = column.cells.get_mut(row) {
                                    changed |= ui
                                        .add(
                                            egui::TextEdit::singleline(cell).desired_width(110.0),
                                        )
                                        .changed();
                                }
                            }
                            ui.end_row();
                        }
                    });
            });

        changed
    }

    /// Draw the first rows of the table and its column types.
    pub fn show_preview(ui: &mut egui::Ui, table: &Table, preview_rows: usize) {
        ui.label(RichText::new("Preview of Data").size(16.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ScrollArea::horizontal().id_salt("preview").show(ui, |ui| {
                    egui::Grid::new("preview_grid")
                        .striped(true)
                        .min_col_width(60.0)
                        .spacing([12.0, 4.0])
                        .show(ui, |ui| {
                            ui.label("");
                            for name in table.column_names() {
                                ui.label(RichText::new(name).strong());
                            }
                            ui.end_row();

                            for (idx, row) in table.head(preview_rows).into_iter().enumerate() {
                                ui.label(RichText::new(idx.to_string()).color(Color32::GRAY));
                                for cell in row {
                                    ui.label(cell);
                                }
                                ui.end_row();
                            }
                        });
                });
            });

        ui.add_space(8.0);
        ui.label(RichText::new("Data Columns").size(14.0).strong());
        egui::Grid::new("dtype_grid")
            .spacing([12.0, 2.0])
            .show(ui, |ui| {
                for (name, dtype) in table.dtypes() {
                    ui.label(name);
                    ui.label(RichText::new(dtype.label()).color(Color32::GRAY));
                    ui.end_row();
                }
            });
        ui.label(
            RichText::new(format!("{} rows × {} columns", table.height(), table.width()))
                .size(11.0)
                .color(Color32::GRAY),
        );
    }
}

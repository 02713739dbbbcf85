//! Chart Viewer Widget
//! Central panel: the data view on top, the current chart below.

use crate::charts::{ChartPlotter, Figure};
use egui::{Color32, RichText};

const CHART_HEIGHT: f32 = 420.0;

pub struct ChartViewer;

impl ChartViewer {
    /// Draw the figure, or a placeholder when there is none yet.
    pub fn show(ui: &mut egui::Ui, figure: Option<&Figure>, error: Option<&str>) {
        if let Some(message) = error {
            egui::Frame::none()
                .rounding(5.0)
                .stroke(egui::Stroke::new(1.5, Color32::from_rgb(220, 53, 69)))
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(format!("Error: {}", message))
                            .color(Color32::from_rgb(220, 53, 69)),
                    );
                });
            ui.add_space(8.0);
        }

        match figure {
            Some(figure) => {
                egui::Frame::none()
                    .rounding(8.0)
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .inner_margin(12.0)
                    .show(ui, |ui| ChartPlotter::draw(ui, figure, CHART_HEIGHT));
            }
            None if error.is_none() => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.label(
                        RichText::new("Choose columns and press Visualize")
                            .size(18.0)
                            .color(Color32::GRAY),
                    );
                });
            }
            None => {}
        }
    }
}

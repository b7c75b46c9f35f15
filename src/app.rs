use eframe::egui::{self, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustyBazaarApp {
    pub state: AppState,
}

impl RustyBazaarApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for RustyBazaarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: report selection ----
        egui::SidePanel::left("selection_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: table + chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let report = self.state.report.as_ref();
            if let Some(report) = report {
                ui.heading(&report.title);
                ui.separator();
                ui.push_id("report_table", |ui: &mut Ui| {
                    table::report_table(ui, report);
                });
                ui.separator();
            }
            plot::report_plot(ui, report, self.state.color_map.as_ref());
        });
    }
}

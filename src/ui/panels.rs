use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::aggregate::Periodicity;
use crate::data::filter::ReviewScore;
use crate::report::{ReportKind, SecondaryKind};
use crate::state::AppState;

const ALL_LABEL: &str = "All";

// ---------------------------------------------------------------------------
// Left side panel – report selection
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Analysis");
    ui.separator();

    let Some(years) = state.dataset.as_ref().map(|ds| ds.years.clone()) else {
        ui.label("No dataset loaded.");
        return;
    };

    // ---- Report family ----
    let current = state.config.report;
    egui::ComboBox::from_id_salt("analysis")
        .selected_text(if current.is_revenue() { "Sales revenue" } else { "Best-selling products" })
        .show_ui(ui, |ui: &mut Ui| {
            if ui
                .selectable_label(!current.is_revenue(), "Best-selling products")
                .clicked()
            {
                state.set_report_kind(ReportKind::BestSelling);
            }
            if ui.selectable_label(current.is_revenue(), "Sales revenue").clicked()
                && !current.is_revenue()
            {
                state.set_report_kind(ReportKind::RevenueTotal);
            }
        });
    ui.separator();

    if state.config.report.is_revenue() {
        revenue_controls(ui, state);
    } else {
        best_selling_controls(ui, state, &years);
    }

    state.refresh();
}

fn best_selling_controls(ui: &mut Ui, state: &mut AppState, years: &[i32]) {
    // ---- Year ----
    ui.strong("Year");
    let year_text = state
        .config
        .year
        .map(|y| y.to_string())
        .unwrap_or_default();
    egui::ComboBox::from_id_salt("year")
        .selected_text(year_text)
        .show_ui(ui, |ui: &mut Ui| {
            for &year in years {
                if ui
                    .selectable_label(state.config.year == Some(year), year.to_string())
                    .clicked()
                {
                    state.set_year(year);
                }
            }
        });
    ui.add_space(6.0);

    // ---- Secondary filter kind ----
    ui.strong("Filter");
    let kind = state.config.secondary_filter;
    egui::ComboBox::from_id_salt("secondary_filter")
        .selected_text(kind.label())
        .show_ui(ui, |ui: &mut Ui| {
            for option in SecondaryKind::ALL {
                if ui.selectable_label(kind == option, option.label()).clicked() {
                    state.set_secondary_kind(option);
                }
            }
        });
    ui.add_space(6.0);

    // ---- Secondary filter value ----
    let options: Vec<String> = match state.config.secondary_filter {
        SecondaryKind::None => return,
        SecondaryKind::Location => {
            ui.strong("State");
            state.state_options()
        }
        SecondaryKind::Review => {
            ui.strong("Minimum review score");
            ReviewScore::all().map(|s| s.to_string()).collect()
        }
    };

    let selected = state.config.secondary_value.clone();
    egui::ComboBox::from_id_salt("secondary_value")
        .selected_text(selected.as_deref().unwrap_or(ALL_LABEL))
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(selected.is_none(), ALL_LABEL).clicked() {
                state.config.secondary_value = None;
            }
            for option in options {
                let is_selected = selected.as_deref() == Some(option.as_str());
                if ui.selectable_label(is_selected, option.as_str()).clicked() {
                    state.config.secondary_value = Some(option);
                }
            }
        });
}

fn revenue_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Sub-analysis");
    let current = state.config.report;
    egui::ComboBox::from_id_salt("sub_analysis")
        .selected_text(current.label())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in ReportKind::REVENUE {
                if ui.selectable_label(current == kind, kind.label()).clicked() {
                    state.set_report_kind(kind);
                }
            }
        });
    ui.add_space(6.0);

    if state.config.report == ReportKind::RevenueTotal {
        ui.strong("Trend period");
        let periodicity = state.config.periodicity;
        egui::ComboBox::from_id_salt("periodicity")
            .selected_text(periodicity.label())
            .show_ui(ui, |ui: &mut Ui| {
                for option in Periodicity::ALL {
                    ui.selectable_value(&mut state.config.periodicity, option, option.label());
                }
            });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
            if ui
                .add_enabled(state.report.is_some(), egui::Button::new("Export table…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} orders, {} item lines  ({})",
                ds.views.orders.len(),
                ds.views.items.len(),
                ds.dir.display()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open e-commerce dataset folder")
        .pick_folder();

    if let Some(dir) = folder {
        state.load_dir(&dir);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let Some(table) = &state.report else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export report table")
        .set_file_name("report.csv")
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = crate::export::write_table(&path, table) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}

use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crate::report::ReportTable;

/// Render the report rows as a three-column table: rank, key, value.
pub fn report_table(ui: &mut Ui, table: &ReportTable) {
    if table.is_empty() {
        ui.label("No rows match this selection.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(260.0)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::exact(40.0))
        .column(Column::initial(240.0).at_least(120.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong(&table.key_column);
            });
            header.col(|ui| {
                ui.strong(&table.value_column);
            });
        })
        .body(|mut body| {
            for (rank, row) in table.rows.iter().enumerate() {
                body.row(18.0, |mut cells| {
                    cells.col(|ui| {
                        ui.label((rank + 1).to_string());
                    });
                    cells.col(|ui| {
                        ui.label(row.key.to_string());
                    });
                    cells.col(|ui| {
                        ui.monospace(table.measure.format(row.value));
                    });
                });
            }
        });
}

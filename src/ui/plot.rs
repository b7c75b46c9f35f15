use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::report::{Chart, ChartKind, ReportTable};

// ---------------------------------------------------------------------------
// Report chart (central panel)
// ---------------------------------------------------------------------------

/// Render the chart of the current report, or a placeholder when no dataset
/// is loaded.
pub fn report_plot(ui: &mut Ui, report: Option<&ReportTable>, colors: Option<&ColorMap>) {
    let Some(table) = report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset folder to view reports  (File → Open dataset folder…)");
        });
        return;
    };

    let chart = &table.chart;
    ui.strong(&chart.title);

    // Points are plotted at x = 0, 1, 2, …; the axis shows their labels.
    let labels: Vec<String> = chart.points.iter().map(|p| p.key.to_string()).collect();

    Plot::new("report_plot")
        .x_axis_label(table.key_column.clone())
        .y_axis_label(table.value_column.clone())
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            axis_label(&labels, mark.value)
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| match chart.kind {
            ChartKind::Bar => plot_ui.bar_chart(bar_chart(chart, colors)),
            ChartKind::Line => {
                let points: Vec<[f64; 2]> = chart
                    .points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| [i as f64, p.value])
                    .collect();
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(&table.value_column)
                        .color(Color32::LIGHT_BLUE)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .radius(3.0)
                        .color(Color32::LIGHT_BLUE),
                );
            }
        });
}

fn bar_chart(chart: &Chart, colors: Option<&ColorMap>) -> BarChart {
    let bars: Vec<Bar> = chart
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let color = colors
                .map(|cm| cm.color_for(&p.key))
                .unwrap_or(Color32::LIGHT_BLUE);
            Bar::new(i as f64, p.value)
                .name(p.key.to_string())
                .fill(color)
        })
        .collect();
    BarChart::new(bars).width(0.7)
}

/// Label for a tick at `value`; only whole indices inside the chart get one.
fn axis_label(labels: &[String], value: f64) -> String {
    if value.fract() != 0.0 || value < 0.0 {
        return String::new();
    }
    labels.get(value as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_labels_only_on_whole_indices() {
        let labels = vec!["2017".to_string(), "2018".to_string()];
        assert_eq!(axis_label(&labels, 0.0), "2017");
        assert_eq!(axis_label(&labels, 1.0), "2018");
        assert_eq!(axis_label(&labels, 0.5), "");
        assert_eq!(axis_label(&labels, -1.0), "");
        assert_eq!(axis_label(&labels, 5.0), "");
    }
}

use std::path::{Path, PathBuf};

use crate::color::ColorMap;
use crate::data::filter::{available_states, available_years};
use crate::data::join::EnrichedViews;
use crate::data::loader::load_dataset;
use crate::report::{
    empty_best_selling, run_report, ReportConfig, ReportError, ReportKind, ReportTable,
    SecondaryKind,
};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A dataset folder together with the views built from it.
pub struct LoadedDataset {
    pub dir: PathBuf,
    pub views: EnrichedViews,
    /// Purchase years present in the order view, most recent first.
    pub years: Vec<i32>,
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded views (None until a dataset folder loads successfully).
    pub dataset: Option<LoadedDataset>,

    /// Current report selection.
    pub config: ReportConfig,

    /// Report computed for `rendered_config`.
    pub report: Option<ReportTable>,

    rendered_config: Option<ReportConfig>,

    /// Bar colours for the current report.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load a dataset folder and build its views.  On failure nothing from
    /// the folder is kept and the error is shown instead.
    pub fn load_dir(&mut self, dir: &Path) {
        match load_dataset(dir) {
            Ok(raw) => {
                let views = EnrichedViews::build(&raw);
                self.set_views(dir.to_path_buf(), views);
            }
            Err(e) => {
                log::error!("Failed to load dataset ({}): {e:#}", e.table());
                self.dataset = None;
                self.report = None;
                self.rendered_config = None;
                self.color_map = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Drop the cached views and read the current folder again.
    pub fn reload(&mut self) {
        if let Some(dir) = self.dataset.as_ref().map(|ds| ds.dir.clone()) {
            self.load_dir(&dir);
        }
    }

    /// Ingest freshly built views and reset the year selection.
    pub fn set_views(&mut self, dir: PathBuf, views: EnrichedViews) {
        let years = available_years(&views.orders);
        if self.config.year.map_or(true, |y| !years.contains(&y)) {
            self.config.year = years.first().copied();
        }
        self.dataset = Some(LoadedDataset { dir, views, years });
        self.rendered_config = None;
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the report if the selection changed since the last run.
    pub fn refresh(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        if self.rendered_config.as_ref() == Some(&self.config) {
            return;
        }

        let table = match self.config.to_report() {
            Ok(report) => Ok(run_report(&ds.views, &report)),
            Err(ReportError::MissingYear) if ds.years.is_empty() => {
                Ok(empty_best_selling(self.config.secondary_filter))
            }
            Err(e) => Err(e),
        };

        match table {
            Ok(table) => {
                self.color_map = Some(ColorMap::new(table.chart.points.iter().map(|p| &p.key)));
                self.report = Some(table);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Invalid report selection: {e}");
                self.report = None;
                self.color_map = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.rendered_config = Some(self.config.clone());
    }

    /// States selectable for the location filter in the chosen year.
    pub fn state_options(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .map(|ds| available_states(&ds.views.items, self.config.year))
            .unwrap_or_default()
    }

    pub fn set_report_kind(&mut self, kind: ReportKind) {
        self.config.report = kind;
    }

    /// Switch the secondary filter; its value resets to "all".
    pub fn set_secondary_kind(&mut self, kind: SecondaryKind) {
        if self.config.secondary_filter != kind {
            self.config.secondary_filter = kind;
            self.config.secondary_value = None;
        }
    }

    pub fn set_year(&mut self, year: i32) {
        self.config.year = Some(year);
        // A state picked for another year may not exist in this one.
        if self.config.secondary_filter == SecondaryKind::Location {
            let keep = self
                .config
                .secondary_value
                .as_ref()
                .is_some_and(|s| self.state_options().contains(s));
            if !keep {
                self.config.secondary_value = None;
            }
        }
    }
}

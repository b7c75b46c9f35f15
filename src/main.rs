mod app;
mod color;
mod data;
mod export;
mod report;
mod state;
mod ui;

use std::path::PathBuf;

use app::RustyBazaarApp;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional dataset folder, loaded before the window opens.
    let mut state = AppState::default();
    if let Some(dir) = std::env::args_os().nth(1).map(PathBuf::from) {
        state.load_dir(&dir);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Bazaar – E-Commerce Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyBazaarApp::new(state)))),
    )
}

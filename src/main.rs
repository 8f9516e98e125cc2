mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::DashboardApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ODS 14 — Vida na Água",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::default()))),
    )
}

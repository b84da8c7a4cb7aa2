#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::NativeOptions;
use fluid_canvas::{config, App};

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = config::load();
    let native_options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.display.width, config.display.height])
            .with_min_inner_size([300.0, 220.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "Fluid Canvas",
        native_options,
        Box::new(|cc| Ok(Box::new(App::new(cc, config)))),
    )
}

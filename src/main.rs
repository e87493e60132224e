mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use anyhow::Context;
use app::SalesDashboardApp;
use config::{CONFIG_FILE, DashboardConfig};
use data::pipeline::run_pipeline;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load_or_default(CONFIG_FILE)?;

    // Clean once, before any window exists. A bad source is fatal.
    let (table, report) = run_pipeline(&config, &config.sources)
        .context("cleaning sales sources")?;
    if table.is_empty() {
        log::warn!("No rows survived cleaning, the dashboard starts empty");
    } else {
        log::info!(
            "Loaded {} cleaned rows, snapshot at {}",
            table.len(),
            config.snapshot_path.display()
        );
    }
    if let Some((first, last)) = table.year_span() {
        log::info!("Orders span {first}-{last}");
    }

    let state = AppState::new(config, table, report);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can render the sidebar photo.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(SalesDashboardApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))
}

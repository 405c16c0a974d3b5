use anyhow::Context;
use eframe::egui;
use rusty_survey::app::RustySurveyApp;
use rusty_survey::config::DashboardConfig;
use rusty_survey::data;
use rusty_survey::state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::default();

    // The survey is read once up front; without it there is nothing to show.
    let dataset = data::loader::load_source(&config.source, config.fetch_timeout)
        .with_context(|| format!("loading survey from {}", config.source))?;
    log::info!("Survey ready: {} records", dataset.len());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    let state = AppState::new(config);
    eframe::run_native(
        "Rusty Survey – Baseline Survey Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(RustySurveyApp::new(state, dataset)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}

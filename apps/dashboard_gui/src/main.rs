mod backend_bridge;
mod config;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::{
    backend_bridge::commands::BackendCommand, config::CliArgs, controller::events::UiEvent,
    ui::DashboardApp,
};

const APP_NAME: &str = "9-Volt";

fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();
    let settings = config::load_settings(&cli)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!(api_url = %settings.api_url, route = %settings.start_route, "starting dashboard");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let start_route = settings.start_route();
    let api_url = settings.api_url.clone();
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_NAME)
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(DashboardApp::new(
                cmd_tx,
                ui_rx,
                start_route,
                api_url,
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("dashboard window failed: {err}"))
}

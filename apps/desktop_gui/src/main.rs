mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use roster_core::config::{load_settings, Settings};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::RosterApp;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides `server_url` from roster.toml and the environment.
    #[arg(long)]
    server_url: Option<String>,
}

fn resolve_settings(args: Args) -> Settings {
    let mut settings = load_settings().unwrap_or_else(|err| {
        tracing::warn!("ignoring unreadable settings, using defaults: {err:#}");
        Settings::default()
    });
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    settings
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    let settings = resolve_settings(Args::parse());

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Mergington High School Activities")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([760.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Mergington High School Activities",
        options,
        Box::new(|_cc| Ok(Box::new(RosterApp::new(cmd_tx, ui_rx)))),
    )
}

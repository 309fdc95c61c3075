//! Activity bar demo
//!
//! Drives the controller activity widget headlessly: loads the app config
//! and theme, feeds synthetic input, polls the real machine status and
//! records every frame's draw calls.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use activity_bar::config::{AppConfig, ThemeWatcher};
use activity_bar::platform::{FileResources, SystemProbe};
use activity_bar::{
    BackgroundProbe, ControllerActivity, InputEvent, PlayerMapping, RecordingRenderer, Size,
    StatusProbe, ThemeDocument, ThemeProperties, Vec2, WidgetOptions, MAX_PLAYERS,
};

/// Headless controller activity strip
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Stop after this many frames (runs until Ctrl+C when omitted)
    #[arg(long)]
    frames: Option<u64>,

    /// Frame duration in milliseconds
    #[arg(long, default_value = "16")]
    frame_ms: u32,

    /// Number of mapped players (device index = player index)
    #[arg(long, default_value = "2")]
    players: usize,

    /// Feed synthetic button presses
    #[arg(long)]
    simulate_input: bool,

    /// Query system status off the frame loop
    #[arg(long)]
    background_probes: bool,

    /// Print each frame's draw commands as JSON
    #[arg(long)]
    json: bool,
}

/// Frames between two synthetic presses
const PRESS_EVERY_FRAMES: u64 = 20;

/// Every n-th synthetic press carries the hotkey modifier
const HOTKEY_EVERY_PRESSES: u64 = 7;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Starting activity bar...");
    info!("Configuration file: {}", args.config);

    let config = AppConfig::load(&args.config).await?;
    info!(
        "Screen {}x{}, theme {} ({}/{})",
        config.screen.width,
        config.screen.height,
        config.theme.path.display(),
        config.theme.view,
        config.theme.element
    );

    let (mut theme_watcher, theme) = ThemeWatcher::new(config.theme.path.clone())
        .await
        .context("Failed to start theme watcher")?;

    let resources = Arc::new(FileResources::new(config.theme_dir()));
    let probe: Arc<dyn StatusProbe> = if args.background_probes {
        info!("Status probes run in the background");
        Arc::new(BackgroundProbe::new(
            Arc::new(SystemProbe::new()),
            tokio::runtime::Handle::current(),
        ))
    } else {
        Arc::new(SystemProbe::new())
    };

    let mut widget = ControllerActivity::new(WidgetOptions::from_config(&config), resources, probe);
    apply_theme(&mut widget, &theme, &config)?;

    let players: PlayerMapping = (0..args.players.min(MAX_PLAYERS))
        .map(|player| (player, player as i32))
        .collect();
    info!("{} player(s) mapped", players.len());

    let viewport = Size::new(config.screen.width, config.screen.height);
    let frame_ms = args.frame_ms.max(1);
    let mut ticker = tokio::time::interval(Duration::from_millis(u64::from(frame_ms)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut frame: u64 = 0;
    let mut presses: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if args.simulate_input && !players.is_empty() && frame % PRESS_EVERY_FRAMES == 0 {
                    presses += 1;
                    let device = (presses as usize % players.len()) as i32;
                    let event = InputEvent::button(device, presses % HOTKEY_EVERY_PRESSES == 0);
                    widget.input(&event);
                }

                widget.update(frame_ms);

                let mut renderer = RecordingRenderer::new(viewport);
                widget.render(Vec2::ZERO, &players, &mut renderer);

                if args.json {
                    println!("{}", serde_json::to_string(renderer.commands())?);
                } else {
                    debug!("Frame {}: {} draw command(s)", frame, renderer.commands().len());
                }

                frame += 1;
                if args.frames.is_some_and(|limit| frame >= limit) {
                    info!("Rendered {} frame(s), stopping", frame);
                    break;
                }
            }

            // Handle theme reload
            Some(theme) = theme_watcher.next_theme() => {
                info!("Theme file changed, reapplying...");
                if let Err(e) = apply_theme(&mut widget, &theme, &config) {
                    warn!("Failed to apply reloaded theme (keeping old theme): {}", e);
                }
            }

            // Handle shutdown signal
            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping frame loop");
                break;
            }
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn apply_theme(
    widget: &mut ControllerActivity,
    theme: &ThemeDocument,
    config: &AppConfig,
) -> Result<()> {
    let element = theme.require_element(&config.theme.view, &config.theme.element)?;
    widget.apply_theme(element, ThemeProperties::ALL);
    info!("Theme applied");
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

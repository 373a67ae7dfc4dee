//! reelguardd - The reelguard service
//!
//! This is the main entry point for the reelguardd service.
//! It wires together all the components:
//! - Configuration loading
//! - Session storage (SQLite in the data directory)
//! - Console host (text overlays, typed navigation, tokio timers)
//! - Tracker bootstrap and the reels time tracker

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use reelguard_config::load_config_or_default;
use reelguard_core::{CoreEvent, Remaining, TrackerBootstrap};
use reelguard_host_api::{HostBindings, HostEventSource, LocationSource};
use reelguard_host_console::ConsoleHost;
use reelguard_store::{KeyValueStorage, SqliteStorage};
use reelguard_util::{
    Clock, SESSION_DB_FILENAME, SystemClock, default_config_path, is_mock_time_active,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{ConsoleCommand, HELP};

/// reelguardd - Time limits for reel feeds
#[derive(Parser, Debug)]
#[command(name = "reelguardd")]
#[command(about = "Time limits for reel feeds", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/reelguard/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set REELGUARD_DATA_DIR env var)
    #[arg(short, long, env = "REELGUARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Budget in minutes, overriding the configured one
    #[arg(short, long)]
    budget: Option<f64>,

    /// Location the console page opens at
    #[arg(long)]
    location: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Whether the main loop keeps going after a command
enum Flow {
    Continue,
    Quit,
}

/// Main service state
struct Service {
    host: Arc<ConsoleHost>,
    bootstrap: TrackerBootstrap,
    overlay_element_id: String,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let policy = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(
            config_path = %args.config.display(),
            budget_minutes = policy.tracker.budget_minutes,
            markers = ?policy.tracker.section_markers,
            "Configuration loaded"
        );

        let data_dir = args
            .data_dir
            .clone()
            .unwrap_or_else(|| policy.service.data_dir.clone());

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join(SESSION_DB_FILENAME);
        let storage: Arc<dyn KeyValueStorage> = Arc::new(
            SqliteStorage::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );

        if !storage.is_healthy() {
            anyhow::bail!("Session storage at {:?} failed its health check", db_path);
        }
        info!(db_path = %db_path.display(), "Session storage initialized");

        if is_mock_time_active() {
            warn!(now = %SystemClock.now(), "Mock time is active");
        }

        let location = args
            .location
            .clone()
            .unwrap_or_else(|| policy.service.start_location.clone());
        let host = Arc::new(ConsoleHost::new(location));
        let overlay_element_id = policy.overlay.element_id.clone();

        let bootstrap = TrackerBootstrap::new(
            policy,
            args.budget,
            HostBindings::from_host(host.clone()),
            storage,
            Arc::new(SystemClock),
        )
        .context("Failed to start tracker")?;

        Ok(Self {
            host,
            bootstrap,
            overlay_element_id,
        })
    }

    async fn run(mut self) -> Result<()> {
        let mut host_events = self.host.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        let mut sigterm = signal(SignalKind::terminate())
            .context("Failed to create SIGTERM handler")?;
        let mut sigint = signal(SignalKind::interrupt())
            .context("Failed to create SIGINT handler")?;

        info!(location = %self.host.current_location(), "Service running");
        self.host.print(HELP)?;
        for event in self.bootstrap.take_startup_events() {
            self.report(&event)?;
        }

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }

                // Timers, document changes, overlay clicks
                Some(host_event) = host_events.recv() => {
                    debug!(event = ?host_event, "Host event");
                    for event in self.bootstrap.handle_event(host_event) {
                        self.report(&event)?;
                    }
                }

                line = lines.next_line() => {
                    match line {
                        Ok(Some(line)) => {
                            if let Flow::Quit = self.handle_command(&line)? {
                                break;
                            }
                        }
                        Ok(None) => {
                            info!("Console closed, shutting down");
                            break;
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to read console input");
                            break;
                        }
                    }
                }
            }
        }

        info!("Shutting down reelguardd");
        self.bootstrap.teardown();
        info!("Shutdown complete");
        Ok(())
    }

    fn handle_command(&mut self, line: &str) -> Result<Flow> {
        let command = match ConsoleCommand::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                self.host.print(&e.to_string())?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            ConsoleCommand::Goto(target) => {
                let location = self.host.navigate(&target);
                self.host.print(&format!("at {}", location))?;
            }
            ConsoleCommand::Ack => {
                if !self.host.acknowledge(&self.overlay_element_id) {
                    self.host.print("no overlay on screen")?;
                }
            }
            ConsoleCommand::Help => self.host.print(HELP)?,
            ConsoleCommand::Quit => return Ok(Flow::Quit),
            command => self.handle_tracker_command(command)?,
        }

        Ok(Flow::Continue)
    }

    fn handle_tracker_command(&mut self, command: ConsoleCommand) -> Result<()> {
        let Some(tracker) = self.bootstrap.tracker_mut() else {
            self.host
                .print("not tracking: open the monitored section first")?;
            return Ok(());
        };

        let text = match command {
            ConsoleCommand::Remaining => describe_remaining(tracker.remaining()),
            ConsoleCommand::Show => match tracker.show_now() {
                Ok(_) => return Ok(()),
                Err(e) => format!("could not show overlay: {}", e),
            },
            ConsoleCommand::Reset => match tracker.reset() {
                Ok(event) => describe_event(&event),
                Err(e) => format!("reset failed: {}", e),
            },
            ConsoleCommand::Status => serde_json::to_string_pretty(&tracker.state())
                .context("Failed to serialize tracker state")?,
            _ => return Ok(()),
        };
        self.host.print(&text)?;
        Ok(())
    }

    fn report(&self, event: &CoreEvent) -> Result<()> {
        info!(event = ?event, "Tracker event");
        self.host.print(&describe_event(event))?;
        Ok(())
    }
}

fn describe_remaining(remaining: Remaining) -> String {
    match remaining {
        Remaining::Unknown => "no active session".to_string(),
        Remaining::Minutes(m) => format!("{:.1} minutes left", m),
    }
}

fn describe_event(event: &CoreEvent) -> String {
    match event {
        CoreEvent::TrackingStarted { session, fresh } => {
            let kind = if *fresh { "new session" } else { "resumed session" };
            format!(
                "tracking started ({}, {} minute budget)",
                kind, session.total_budget_minutes
            )
        }
        CoreEvent::TrackingStopped => "left the section, tracking paused".to_string(),
        CoreEvent::WarningShown { remaining_minutes } => {
            format!("warning: {:.1} minutes left", remaining_minutes)
        }
        CoreEvent::BudgetExhausted => "budget used up".to_string(),
        CoreEvent::OverlayAcknowledged {
            redirected_to: Some(location),
            ..
        } => format!("overlay closed, sent to {}", location),
        CoreEvent::OverlayAcknowledged { .. } => "overlay closed".to_string(),
        CoreEvent::SessionReset { session } => format!(
            "session reset, {} minutes from now",
            session.total_budget_minutes
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "reelguardd starting"
    );

    let service = Service::new(&args)?;
    service.run().await
}

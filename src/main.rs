//! heritage-voice: voice command overlay for the Digital Cultural Heritage Museum
//!
//! Runs the voice-control subsystem of the museum front end:
//! - Recognition source abstraction with a console-backed source
//! - Command dispatcher mapping transcripts to navigation, scroll and info actions
//! - Session lifecycle controller with guarded, bounded capture restarts
//! - Overlay shell rebuilt from broadcast session events
//!
//! Out of scope: page composition, artifact data, offline speech processing

mod commands;
mod config;
mod events;
mod lifecycle;
mod navigation;
mod recognition;
mod session;
mod shell;
#[cfg(test)]
mod testing;

use std::io::Write;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::Collaborators;
use crate::config::{Backend, Config};
use crate::events::SessionEvent;
use crate::lifecycle::ShutdownSignal;
use crate::navigation::{HistoryRouter, ScrollViewport};
use crate::recognition::{ConsoleBackend, RecognitionBackend, SpeechFeed, UnsupportedBackend};
use crate::session::{LifecycleController, UserIntent};
use crate::shell::{ConsoleReader, ConsoleToaster, OverlayModel};

const USAGE: &str = "\
Type speech on its own line (prefix with ~ for an interim result).
Controls: :open  :close  :start  :stop  :toggle  :drop  :fault <reason>  :deny <reason>  :quit";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging; stdout is reserved for the overlay
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = %config.backend,
        "heritage-voice starting"
    );

    let shutdown = ShutdownSignal::new();

    // Shell -> session controller
    let (intent_tx, intent_rx) = mpsc::channel::<UserIntent>(32);
    // Session controller -> overlay renderer
    let (event_tx, _) = broadcast::channel::<SessionEvent>(64);

    let (backend, feed): (Box<dyn RecognitionBackend>, Option<SpeechFeed>) = match config.backend {
        Backend::Console => {
            let (backend, feed) = ConsoleBackend::new();
            (Box::new(backend) as Box<dyn RecognitionBackend>, Some(feed))
        }
        Backend::None => (Box::new(UnsupportedBackend), None),
    };

    let collaborators = Collaborators {
        navigator: Box::new(HistoryRouter::new(config.start_path.clone())),
        viewport: Box::new(ScrollViewport::new(config.viewport_height)),
        notifier: Box::new(ConsoleToaster::new()),
    };

    // Subscribe before the controller can report anything
    let renderer_rx = event_tx.subscribe();
    let mut controller =
        LifecycleController::new(backend, collaborators, config.restart_policy(), event_tx);

    let model = OverlayModel::new(controller.examples());
    let json_events = config.json_events;
    let renderer = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        render_overlay(renderer_rx, model, json_events, &mut stdout).await;
    });

    println!("{}", USAGE);
    if config.start_active {
        if let Err(e) = controller.activate() {
            warn!(error = %e, "could not open voice overlay");
        }
    }

    // Console reader runs on a dedicated thread
    if let Err(e) = ConsoleReader::new(intent_tx, feed).start() {
        error!(?e, "failed to start console reader");
        return Err(e.into());
    }

    info!("voice overlay initialized, entering main loop");
    controller.run(intent_rx, shutdown.wait()).await;

    let snapshot = controller.snapshot();
    info!(
        state = %snapshot.state,
        last_transcript = %snapshot.last_transcript,
        "voice session ended"
    );

    // Dropping the controller closes the event channel and ends the renderer
    drop(controller);
    if let Err(e) = renderer.await {
        warn!(?e, "overlay renderer ended abnormally");
    }

    info!("heritage-voice stopped");
    Ok(())
}

/// Fold session events into the overlay and redraw on change
///
/// Returns the final model once the event channel closes.
async fn render_overlay<W: Write>(
    mut events: broadcast::Receiver<SessionEvent>,
    mut model: OverlayModel,
    json_events: bool,
    out: &mut W,
) -> OverlayModel {
    loop {
        match events.recv().await {
            Ok(event) => {
                if json_events {
                    match serde_json::to_string(&event) {
                        Ok(line) => write_line(out, &line),
                        Err(e) => warn!(?e, "failed to encode session event"),
                    }
                }
                let was_visible = model.visible;
                if !model.apply(&event) {
                    continue;
                }
                match model.render() {
                    Some(frame) => write_line(out, &frame),
                    None if was_visible => write_line(out, "(voice overlay closed)"),
                    None => {}
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "overlay renderer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                break;
            }
        }
    }
    model
}

fn write_line<W: Write>(out: &mut W, line: &str) {
    if let Err(e) = writeln!(out, "{}", line) {
        warn!(error = %e, "failed to write overlay output");
    }
}

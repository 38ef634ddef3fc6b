//! Voice session lifecycle controller
//!
//! Owns the single recognition source, drives the Inactive, Idle and
//! Listening states, and feeds transcripts to the command dispatcher.

use std::future::Future;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::commands::{normalize, Collaborators, Dispatcher, Notification};
use crate::events::SessionEvent;
use crate::recognition::{
    ErrorReason, RecognitionBackend, RecognitionError, RecognitionEvent, RecognitionSource,
    TranscriptEvent,
};

use super::restart::{RestartDecision, RestartPolicy, RestartTracker};

const UNSUPPORTED_TITLE: &str = "Voice Control Not Supported";
const UNSUPPORTED_DESCRIPTION: &str = "This environment does not provide speech recognition.";
const FAULT_TITLE: &str = "Voice Control Error";
const ABANDONED_TITLE: &str = "Voice Control Stopped";
const ABANDONED_DESCRIPTION: &str =
    "Speech recognition kept ending unexpectedly, so listening was stopped. Press Start Listening to try again.";

/// Lifecycle states of the voice overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Overlay hidden, no recognition source
    #[default]
    Inactive,
    /// Overlay shown, source exists but is not capturing
    Idle,
    /// Source capturing, transcripts flowing
    Listening,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Inactive => write!(f, "Inactive"),
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Listening => write!(f, "Listening"),
        }
    }
}

/// Requests coming from the presentation shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIntent {
    /// Show the overlay
    Open,
    /// Hide the overlay
    Close,
    Start,
    Stop,
    /// The single Start/Stop Listening button
    Toggle,
}

/// Point-in-time view of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub active: bool,
    pub listening: bool,
    pub last_transcript: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("speech recognition is not available in this environment")]
    CapabilityUnavailable,

    #[error("voice overlay is not active")]
    NotActive,

    #[error(transparent)]
    Recognition(#[from] RecognitionError),
}

pub struct LifecycleController {
    backend: Box<dyn RecognitionBackend>,
    /// The only live source; `None` while Inactive
    source: Option<Box<dyn RecognitionSource>>,
    /// Receiver paired with the live source's sink
    events: Option<mpsc::UnboundedReceiver<RecognitionEvent>>,
    supported: bool,
    unavailable_reported: bool,
    state: SessionState,
    last_transcript: String,
    dispatcher: Dispatcher,
    collaborators: Collaborators,
    restarts: RestartTracker,
    pending_restart: Option<Instant>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl LifecycleController {
    /// Create a controller; reports a missing recognition capability once
    pub fn new(
        backend: Box<dyn RecognitionBackend>,
        collaborators: Collaborators,
        policy: RestartPolicy,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        let supported = backend.is_supported();
        let mut controller = Self {
            backend,
            source: None,
            events: None,
            supported,
            unavailable_reported: false,
            state: SessionState::Inactive,
            last_transcript: String::new(),
            dispatcher: Dispatcher::default(),
            collaborators,
            restarts: RestartTracker::new(policy),
            pending_restart: None,
            event_tx,
        };

        if supported {
            info!(backend = controller.backend.name(), "speech recognition available");
        } else {
            controller.disable();
        }
        controller
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[cfg(test)]
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    #[cfg(test)]
    pub fn last_transcript(&self) -> &str {
        &self.last_transcript
    }

    pub fn examples(&self) -> Vec<&'static str> {
        self.dispatcher.examples()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            active: self.state != SessionState::Inactive,
            listening: self.state == SessionState::Listening,
            last_transcript: self.last_transcript.clone(),
        }
    }

    /// When a delayed capture restart is due, if one is pending
    #[cfg(test)]
    pub fn pending_restart(&self) -> Option<Instant> {
        self.pending_restart
    }

    /// Show the overlay, creating and subscribing a source
    pub fn activate(&mut self) -> Result<(), SessionError> {
        if !self.supported {
            return Err(SessionError::CapabilityUnavailable);
        }
        if self.state != SessionState::Inactive {
            debug!(state = %self.state, "overlay already active");
            return Ok(());
        }

        let mut source = match self.backend.create() {
            Ok(source) => source,
            Err(RecognitionError::Unavailable) => {
                self.disable();
                return Err(SessionError::CapabilityUnavailable);
            }
            Err(e) => {
                self.report_fault(&e);
                return Err(e.into());
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        source.subscribe(tx);
        self.source = Some(source);
        self.events = Some(rx);
        self.last_transcript.clear();

        self.transition_to(SessionState::Idle);
        self.emit(SessionEvent::OverlayOpened);
        Ok(())
    }

    /// Begin capture from Idle
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Inactive => Err(SessionError::NotActive),
            SessionState::Listening => {
                warn!("start ignored, already listening");
                Ok(())
            }
            SessionState::Idle => {
                self.restarts.reset();
                if let Err(e) = self.request_capture() {
                    self.report_fault(&e);
                    return Err(e.into());
                }
                self.transition_to(SessionState::Listening);
                self.emit(SessionEvent::ListeningStarted);
                Ok(())
            }
        }
    }

    /// Stop capture; a no-op unless Listening
    pub fn stop(&mut self) {
        if self.state != SessionState::Listening {
            debug!(state = %self.state, "stop ignored, not listening");
            return;
        }

        // Idle before the source stops: a racing End is then ignored
        self.pending_restart = None;
        self.transition_to(SessionState::Idle);
        if let Some(source) = self.source.as_mut() {
            source.stop();
        }
        self.emit(SessionEvent::ListeningStopped);
    }

    /// Hide the overlay and release the source
    pub fn deactivate(&mut self) {
        if self.state == SessionState::Inactive {
            return;
        }
        self.stop();
        if let Some(mut source) = self.source.take() {
            source.unsubscribe();
        }
        self.events = None;
        self.transition_to(SessionState::Inactive);
        self.emit(SessionEvent::OverlayClosed);
    }

    /// Stop and release the source regardless of state
    ///
    /// Safe to call repeatedly; the source is stopped at most once.
    pub fn teardown(&mut self) {
        self.pending_restart = None;
        if let Some(mut source) = self.source.take() {
            source.stop();
            source.unsubscribe();
            info!("recognition source released");
        }
        self.events = None;
        if self.state != SessionState::Inactive {
            self.transition_to(SessionState::Inactive);
            self.emit(SessionEvent::OverlayClosed);
        }
    }

    pub fn handle_intent(&mut self, intent: UserIntent) -> Result<(), SessionError> {
        debug!(?intent, "user intent");
        match intent {
            UserIntent::Open => self.activate(),
            UserIntent::Close => {
                self.deactivate();
                Ok(())
            }
            UserIntent::Start => self.start(),
            UserIntent::Stop => {
                self.stop();
                Ok(())
            }
            UserIntent::Toggle => {
                if self.state == SessionState::Listening {
                    self.stop();
                    Ok(())
                } else {
                    self.start()
                }
            }
        }
    }

    /// Process one notification from the recognition source
    pub fn handle_source_event(&mut self, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Result(transcript) => self.handle_transcript(transcript),
            RecognitionEvent::End => self.handle_end(),
            RecognitionEvent::Error(reason) => self.handle_error(reason),
        }
    }

    /// Perform a delayed restart once its deadline has passed
    pub fn fire_pending_restart(&mut self) {
        if self.pending_restart.take().is_some() {
            self.restart_capture();
        }
    }

    /// Run the session, processing intents and source events in order
    ///
    /// Returns when the intent channel closes or `shutdown` resolves; the
    /// source is torn down either way.
    pub async fn run<S>(&mut self, mut intents: mpsc::Receiver<UserIntent>, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(state = %self.state, "session controller started");

        loop {
            let deadline = self.pending_restart;
            // Source events queued before an intent are handled first
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    debug!("session controller shutting down");
                    break;
                }
                Some(event) = next_source_event(&mut self.events) => {
                    self.handle_source_event(event);
                }
                intent = intents.recv() => match intent {
                    Some(intent) => {
                        if let Err(e) = self.handle_intent(intent) {
                            warn!(?intent, error = %e, "intent failed");
                        }
                    }
                    None => {
                        debug!("intent channel closed");
                        break;
                    }
                },
                _ = restart_timer(deadline) => {
                    self.fire_pending_restart();
                }
            }
        }

        self.teardown();
        info!("session controller stopped");
    }

    fn handle_transcript(&mut self, transcript: TranscriptEvent) {
        if self.state != SessionState::Listening {
            debug!(
                state = %self.state,
                text = %transcript.text,
                "discarding transcript, session not listening"
            );
            return;
        }

        self.restarts.reset();
        let text = normalize(&transcript.text);
        if text.is_empty() {
            return;
        }

        debug!(transcript = %text, is_final = transcript.is_final, "transcript received");
        self.last_transcript = text.clone();
        self.emit(SessionEvent::TranscriptUpdated {
            text: text.clone(),
            is_final: transcript.is_final,
        });

        if !transcript.is_final {
            return;
        }
        if let Some(action) = self.dispatcher.dispatch(&text, &mut self.collaborators) {
            self.emit(SessionEvent::CommandDispatched { action });
        }
    }

    fn handle_end(&mut self) {
        if self.state != SessionState::Listening {
            debug!(state = %self.state, "capture ended");
            return;
        }

        match self.restarts.next() {
            RestartDecision::Restart { attempt, delay } => {
                let delay_ms = delay.as_millis() as u64;
                warn!(attempt, delay_ms, "capture ended unexpectedly, restarting");
                self.emit(SessionEvent::RestartRequested { attempt, delay_ms });
                if delay.is_zero() {
                    self.restart_capture();
                } else {
                    self.pending_restart = Some(Instant::now() + delay);
                }
            }
            RestartDecision::GiveUp { attempts } => {
                error!(attempts, "capture keeps ending, giving up");
                self.pending_restart = None;
                self.transition_to(SessionState::Idle);
                self.collaborators
                    .notifier
                    .notify(Notification::destructive(ABANDONED_TITLE, ABANDONED_DESCRIPTION));
                self.emit(SessionEvent::RestartAbandoned { attempts });
                self.emit(SessionEvent::ListeningStopped);
            }
        }
    }

    fn handle_error(&mut self, reason: ErrorReason) {
        warn!(%reason, state = %self.state, "recognition error");
        self.collaborators
            .notifier
            .notify(Notification::destructive(FAULT_TITLE, reason.description()));
        self.emit(SessionEvent::RecognitionFault {
            reason: reason.code().to_string(),
        });
    }

    fn restart_capture(&mut self) {
        if self.state != SessionState::Listening {
            return;
        }
        if let Err(e) = self.request_capture() {
            // No end notification follows a failed start; count it as one
            warn!(error = %e, "capture restart failed");
            self.handle_end();
        }
    }

    fn request_capture(&mut self) -> Result<(), RecognitionError> {
        let source = self.source.as_mut().ok_or(RecognitionError::Unavailable)?;
        match source.start() {
            Err(RecognitionError::AlreadyStarted) => {
                debug!("source already capturing");
                Ok(())
            }
            result => result,
        }
    }

    fn report_fault(&mut self, error: &RecognitionError) {
        let description = match error {
            RecognitionError::Fault(reason) => reason.description(),
            other => other.to_string(),
        };
        warn!(error = %error, "recognition fault");
        self.collaborators
            .notifier
            .notify(Notification::destructive(FAULT_TITLE, description));
    }

    /// Mark the feature unavailable and tell the user, once
    fn disable(&mut self) {
        self.supported = false;
        if self.unavailable_reported {
            return;
        }
        self.unavailable_reported = true;
        error!(backend = self.backend.name(), "speech recognition unavailable, voice control disabled");
        self.collaborators
            .notifier
            .notify(Notification::destructive(UNSUPPORTED_TITLE, UNSUPPORTED_DESCRIPTION));
        self.emit(SessionEvent::CapabilityUnavailable);
    }

    fn transition_to(&mut self, new_state: SessionState) {
        let old_state = self.state;
        if old_state == new_state {
            return;
        }
        info!(from = %old_state, to = %new_state, "session transition");
        self.state = new_state;
    }

    fn emit(&self, event: SessionEvent) {
        debug!(%event, "emitting session event");
        let _ = self.event_tx.send(event);
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn next_source_event(
    events: &mut Option<mpsc::UnboundedReceiver<RecognitionEvent>>,
) -> Option<RecognitionEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn restart_timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

//! Voice overlay view model
//!
//! The overlay never queries the controller; it folds session events into
//! its own model and re-renders.

use crate::commands::Action;
use crate::events::SessionEvent;

const PLACEHOLDER: &str = "Say a command...";
const UNAVAILABLE: &str = "(x) Voice control unavailable in this environment";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayModel {
    pub visible: bool,
    pub listening: bool,
    pub transcript: String,
    pub last_command: Option<Action>,
    pub disabled: bool,
    examples: Vec<&'static str>,
}

impl OverlayModel {
    pub fn new(examples: Vec<&'static str>) -> Self {
        Self {
            examples,
            ..Self::default()
        }
    }

    /// Fold one event into the model; returns whether anything changed
    pub fn apply(&mut self, event: &SessionEvent) -> bool {
        let before = self.clone();
        match event {
            SessionEvent::OverlayOpened => {
                self.visible = true;
                self.transcript.clear();
                self.last_command = None;
            }
            SessionEvent::OverlayClosed => {
                self.visible = false;
                self.listening = false;
            }
            SessionEvent::ListeningStarted => self.listening = true,
            SessionEvent::ListeningStopped => self.listening = false,
            SessionEvent::TranscriptUpdated { text, .. } => self.transcript = text.clone(),
            SessionEvent::CommandDispatched { action } => self.last_command = Some(action.clone()),
            SessionEvent::CapabilityUnavailable => {
                self.disabled = true;
                self.visible = false;
            }
            SessionEvent::RecognitionFault { .. }
            | SessionEvent::RestartRequested { .. }
            | SessionEvent::RestartAbandoned { .. } => {}
        }
        *self != before
    }

    pub fn status_label(&self) -> &'static str {
        if self.listening {
            "Listening..."
        } else {
            "Voice Control Inactive"
        }
    }

    pub fn button_label(&self) -> &'static str {
        if self.listening {
            "Stop Listening"
        } else {
            "Start Listening"
        }
    }

    /// Text rendering of the overlay; `None` while hidden
    pub fn render(&self) -> Option<String> {
        if self.disabled {
            return Some(format!("{}\n", UNAVAILABLE));
        }
        if !self.visible {
            return None;
        }

        let indicator = if self.listening { "(*)" } else { "( )" };
        let transcript = if self.transcript.is_empty() {
            PLACEHOLDER
        } else {
            self.transcript.as_str()
        };

        let mut out = String::new();
        out.push_str(&format!("{} {}\n", indicator, self.status_label()));
        out.push_str(&format!("  > {}\n", transcript));
        if let Some(action) = &self.last_command {
            out.push_str(&format!("  last command: {}\n", action));
        }
        out.push_str(&format!("  [{}]\n", self.button_label()));
        if !self.examples.is_empty() {
            out.push_str("  Try saying:\n");
            for example in &self.examples {
                out.push_str(&format!("    \"{}\"\n", example));
            }
        }
        Some(out)
    }
}

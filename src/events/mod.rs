//! Events module for session lifecycle notifications
//!
//! Structured events broadcast by the session controller. The
//! presentation shell rebuilds its view from these alone.

use serde::{Deserialize, Serialize};

use crate::commands::Action;

/// Events emitted by the session controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Overlay shown and a recognition source is ready
    OverlayOpened,

    /// Overlay hidden and the recognition source released
    OverlayClosed,

    /// Capture began
    ListeningStarted,

    /// Capture ended at the user's request, or restarts were abandoned
    ListeningStopped,

    /// New transcript text to display
    TranscriptUpdated {
        /// Normalized transcript
        text: String,
        /// Whether the recognizer settled on this text
        is_final: bool,
    },

    /// A voice command fired
    CommandDispatched { action: Action },

    /// The recognizer reported an error; session state is unchanged
    RecognitionFault {
        /// Recognizer error code, e.g. `network`
        reason: String,
    },

    /// Capture ended unexpectedly and a restart was requested
    RestartRequested {
        /// Consecutive restart count
        attempt: u32,
        /// Delay before capture is requested again
        delay_ms: u64,
    },

    /// Capture kept ending unexpectedly; listening was stopped
    RestartAbandoned { attempts: u32 },

    /// No speech recognition in this environment; voice control disabled
    CapabilityUnavailable,
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::OverlayOpened => write!(f, "OVERLAY_OPENED"),
            SessionEvent::OverlayClosed => write!(f, "OVERLAY_CLOSED"),
            SessionEvent::ListeningStarted => write!(f, "LISTENING_STARTED"),
            SessionEvent::ListeningStopped => write!(f, "LISTENING_STOPPED"),
            SessionEvent::TranscriptUpdated { text, is_final } => {
                let kind = if *is_final { "final" } else { "interim" };
                write!(f, "TRANSCRIPT_UPDATED ({}: {:?})", kind, text)
            }
            SessionEvent::CommandDispatched { action } => {
                write!(f, "COMMAND_DISPATCHED ({})", action)
            }
            SessionEvent::RecognitionFault { reason } => {
                write!(f, "RECOGNITION_FAULT ({})", reason)
            }
            SessionEvent::RestartRequested { attempt, delay_ms } => {
                write!(f, "RESTART_REQUESTED (#{} in {}ms)", attempt, delay_ms)
            }
            SessionEvent::RestartAbandoned { attempts } => {
                write!(f, "RESTART_ABANDONED (after {})", attempts)
            }
            SessionEvent::CapabilityUnavailable => write!(f, "CAPABILITY_UNAVAILABLE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::RestartRequested {
            attempt: 2,
            delay_ms: 250,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("restart_requested"));
        assert!(json.contains("250"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"command_dispatched","action":{"type":"history","offset":-1}}"#;
        let event: SessionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            SessionEvent::CommandDispatched {
                action: Action::History { offset: -1 }
            }
        );
    }

    #[test]
    fn test_event_display() {
        let event = SessionEvent::TranscriptUpdated {
            text: "go back".to_string(),
            is_final: true,
        };
        assert_eq!(event.to_string(), r#"TRANSCRIPT_UPDATED (final: "go back")"#);
    }
}

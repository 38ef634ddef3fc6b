//! Recognition source contract
//!
//! A recognition source produces transcript, end-of-capture and error
//! notifications. Sources are created by a [`RecognitionBackend`] and owned
//! exclusively by the session controller.

use tokio::sync::mpsc;

/// A single transcript produced by the recognition source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEvent {
    /// Raw recognized text, before normalization
    pub text: String,
    /// Whether the recognizer considers this result settled
    pub is_final: bool,
}

impl TranscriptEvent {
    /// A settled transcript
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    /// An in-progress transcript
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }
}

/// Machine-readable reason attached to a recognition error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorReason {
    /// The recognition backend could not reach its network service
    Network,
    /// Microphone access was denied
    NotAllowed,
    /// The recognition service refused the request
    ServiceNotAllowed,
    /// No speech was detected before the recognizer gave up
    NoSpeech,
    /// Capture was aborted
    Aborted,
    /// The audio device failed
    AudioCapture,
    /// Any other backend-specific code
    Other(String),
}

impl ErrorReason {
    /// Parse a recognizer error code (`network`, `not-allowed`, ...)
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            other => Self::Other(other.to_string()),
        }
    }

    /// The recognizer error code
    pub fn code(&self) -> &str {
        match self {
            Self::Network => "network",
            Self::NotAllowed => "not-allowed",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::NoSpeech => "no-speech",
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio-capture",
            Self::Other(code) => code,
        }
    }

    /// Human-readable explanation shown to the user
    pub fn description(&self) -> String {
        match self {
            Self::Network => {
                "Speech recognition needs a network connection. Check your connection and try again."
                    .to_string()
            }
            Self::NotAllowed => {
                "Microphone access was denied. Allow microphone access to use voice control."
                    .to_string()
            }
            Self::ServiceNotAllowed => {
                "The speech recognition service is not allowed in this environment.".to_string()
            }
            Self::NoSpeech => "No speech was detected. Try speaking again.".to_string(),
            Self::Aborted => "Speech recognition was aborted.".to_string(),
            Self::AudioCapture => "No microphone could be used for audio capture.".to_string(),
            Self::Other(code) => format!("Speech recognition failed ({code})."),
        }
    }
}

impl std::fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Notifications delivered by a recognition source to its subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// A transcript was recognized
    Result(TranscriptEvent),
    /// Capture ended, whether requested or not
    End,
    /// The recognizer reported an error
    Error(ErrorReason),
}

/// Subscriber side of a recognition source
pub type EventSink = mpsc::UnboundedSender<RecognitionEvent>;

/// Errors raised by recognition sources
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    #[error("recognition source is already capturing")]
    AlreadyStarted,

    #[error("speech recognition is not available in this environment")]
    Unavailable,

    #[error("speech recognition failed: {0}")]
    Fault(ErrorReason),
}

/// A live speech-to-text capture handle
///
/// Sources must emit [`RecognitionEvent::End`] whenever capture ends,
/// including after [`RecognitionSource::stop`]. Calling `stop` on a source
/// that is not capturing must be harmless.
pub trait RecognitionSource {
    /// Begin continuous capture
    fn start(&mut self) -> Result<(), RecognitionError>;

    /// Request capture cease
    fn stop(&mut self);

    /// Register the sink that receives this source's events
    fn subscribe(&mut self, sink: EventSink);

    /// Release the registered sink
    fn unsubscribe(&mut self);
}

/// Feature detection and construction of recognition sources
pub trait RecognitionBackend {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether this runtime offers speech recognition at all
    fn is_supported(&self) -> bool;

    /// Create a new, idle source
    fn create(&self) -> Result<Box<dyn RecognitionSource>, RecognitionError>;
}

/// Backend for environments without speech recognition
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedBackend;

impl RecognitionBackend for UnsupportedBackend {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_supported(&self) -> bool {
        false
    }

    fn create(&self) -> Result<Box<dyn RecognitionSource>, RecognitionError> {
        Err(RecognitionError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reason_codes() {
        assert_eq!(ErrorReason::from_code("network"), ErrorReason::Network);
        assert_eq!(ErrorReason::from_code(" Not-Allowed "), ErrorReason::NotAllowed);
        assert_eq!(
            ErrorReason::from_code("bad-grammar"),
            ErrorReason::Other("bad-grammar".to_string())
        );
        assert_eq!(ErrorReason::Other("bad-grammar".into()).code(), "bad-grammar");
    }

    #[test]
    fn test_network_is_distinguished() {
        let network = ErrorReason::Network.description();
        let generic = ErrorReason::Other("x".into()).description();
        assert!(network.contains("network"));
        assert_ne!(network, generic);
    }

    #[test]
    fn test_unsupported_backend() {
        let backend = UnsupportedBackend;
        assert!(!backend.is_supported());
        assert!(matches!(backend.create(), Err(RecognitionError::Unavailable)));
    }
}

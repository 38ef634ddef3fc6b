//! Recognition module for speech-to-text capture
//!
//! Defines the recognition source contract consumed by the session
//! controller, plus a console-backed source for running without a
//! microphone.

mod console;
mod source;

pub use console::{ConsoleBackend, SpeechFeed};
pub use source::{
    ErrorReason, RecognitionBackend, RecognitionError, RecognitionEvent,
    RecognitionSource, TranscriptEvent, UnsupportedBackend,
};

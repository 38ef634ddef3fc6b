//! Command module for voice command interpretation
//!
//! Normalizes transcripts, matches them against the ordered command
//! grammar and applies the resulting action through the navigation,
//! viewport and notification collaborators.

mod dispatcher;
mod effects;
mod rules;

pub use dispatcher::{normalize, Dispatcher};
pub use effects::{Action, Collaborators, Navigator, Notification, Notifier, Severity, Viewport};

//! Session module for the voice overlay lifecycle
//!
//! Provides the lifecycle controller with three states:
//! - Inactive: overlay hidden, no recognition source
//! - Idle: overlay shown, source ready but not capturing
//! - Listening: capturing, transcripts dispatched as commands

mod controller;
mod restart;

pub use controller::{LifecycleController, UserIntent};
pub use restart::RestartPolicy;

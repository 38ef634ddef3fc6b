//! Shell module for the voice overlay presentation
//!
//! A thin view over session events, plus console input and toasts.

mod input;
mod toast;
mod view;

pub use input::ConsoleReader;
pub use toast::ConsoleToaster;
pub use view::OverlayModel;

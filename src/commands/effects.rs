//! Side effects produced by voice commands and the collaborators that
//! perform them

use serde::{Deserialize, Serialize};

/// Scroll direction for viewport commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Down,
    Up,
}

impl ScrollDirection {
    /// Signed multiplier applied to the viewport height
    pub fn sign(self) -> i64 {
        match self {
            ScrollDirection::Down => 1,
            ScrollDirection::Up => -1,
        }
    }
}

/// A resolved command, ready to be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Navigate to an absolute path
    Navigate { path: String },
    /// Move through the history stack by a relative offset
    History { offset: i32 },
    /// Scroll by one viewport height
    Scroll { direction: ScrollDirection },
    /// Show the informational notification about the site
    ShowInfo,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Navigate { path } => write!(f, "navigate {}", path),
            Action::History { offset } => write!(f, "history {:+}", offset),
            Action::Scroll { direction: ScrollDirection::Down } => write!(f, "scroll down"),
            Action::Scroll { direction: ScrollDirection::Up } => write!(f, "scroll up"),
            Action::ShowInfo => write!(f, "show info"),
        }
    }
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Destructive,
}

/// A user-visible notification (toast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Router collaborator
pub trait Navigator {
    /// Push an absolute path
    fn navigate_to(&mut self, path: &str);

    /// Move through history; `-1` is back, `+1` is forward
    fn go(&mut self, offset: i32);
}

/// Scrollable viewport collaborator
pub trait Viewport {
    /// Visible height, in the same units as `scroll_by`
    fn height(&self) -> i64;

    fn scroll_by(&mut self, delta: i64);
}

/// Toast/alert collaborator
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

/// The collaborators a dispatched action can reach
pub struct Collaborators {
    pub navigator: Box<dyn Navigator>,
    pub viewport: Box<dyn Viewport>,
    pub notifier: Box<dyn Notifier>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serialization() {
        let action = Action::Navigate {
            path: "/explore".to_string(),
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("navigate"));
        assert!(json.contains("/explore"));

        let json = r#"{"type":"scroll","direction":"up"}"#;
        let action: Action = serde_json::from_str(json).unwrap();
        assert_eq!(
            action,
            Action::Scroll {
                direction: ScrollDirection::Up
            }
        );
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::History { offset: -1 }.to_string(), "history -1");
        assert_eq!(Action::History { offset: 1 }.to_string(), "history +1");
    }
}

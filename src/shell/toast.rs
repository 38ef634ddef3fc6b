//! Console toast presenter

use tracing::{info, warn};

use crate::commands::{Notification, Notifier, Severity};

/// Prints notifications to stdout, below the overlay
#[derive(Debug, Default)]
pub struct ConsoleToaster;

impl ConsoleToaster {
    pub fn new() -> Self {
        Self
    }

    pub fn format(notification: &Notification) -> String {
        let marker = match notification.severity {
            Severity::Info => "i",
            Severity::Destructive => "!",
        };
        format!(
            "[{}] {}\n    {}",
            marker, notification.title, notification.description
        )
    }
}

impl Notifier for ConsoleToaster {
    fn notify(&mut self, notification: Notification) {
        match notification.severity {
            Severity::Info => info!(title = %notification.title, "notification"),
            Severity::Destructive => warn!(title = %notification.title, "notification"),
        }
        println!("{}", Self::format(&notification));
    }
}

//! Transcript interpretation and action dispatch

use tracing::{debug, info};

use super::effects::{Action, Collaborators, Notification};
use super::rules::{CommandRule, ABOUT_DESCRIPTION, ABOUT_TITLE, COMMAND_RULES};

/// Lowercase and trim a raw transcript
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase().trim().to_string()
}

/// Maps transcripts to actions using an ordered rule table
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    rules: &'static [CommandRule],
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(COMMAND_RULES)
    }
}

impl Dispatcher {
    pub fn new(rules: &'static [CommandRule]) -> Self {
        Self { rules }
    }

    /// Resolve a transcript to at most one action, without side effects
    pub fn interpret(&self, raw: &str) -> Option<Action> {
        let text = normalize(raw);
        if text.is_empty() {
            return None;
        }

        let rule = self.rules.iter().find(|rule| rule.matcher.capture(&text).is_some())?;
        let argument = rule.matcher.capture(&text).unwrap_or_default();
        let action = rule.effect.resolve(argument);

        debug!(rule = rule.name, ?action, "command rule matched");
        action
    }

    /// Interpret a transcript and apply the resulting action
    pub fn dispatch(&self, raw: &str, collaborators: &mut Collaborators) -> Option<Action> {
        let Some(action) = self.interpret(raw) else {
            debug!(transcript = %normalize(raw), "no command matched");
            return None;
        };

        apply(&action, collaborators);
        info!(%action, "voice command dispatched");
        Some(action)
    }

    /// Example phrases, in rule order
    pub fn examples(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.example).collect()
    }
}

/// Perform an action against the collaborators
pub fn apply(action: &Action, collaborators: &mut Collaborators) {
    match action {
        Action::Navigate { path } => collaborators.navigator.navigate_to(path),
        Action::History { offset } => collaborators.navigator.go(*offset),
        Action::Scroll { direction } => {
            let delta = direction.sign() * collaborators.viewport.height();
            collaborators.viewport.scroll_by(delta);
        }
        Action::ShowInfo => collaborators
            .notifier
            .notify(Notification::info(ABOUT_TITLE, ABOUT_DESCRIPTION)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::effects::{ScrollDirection, Severity};
    use crate::testing::recording_collaborators;

    fn interpret(raw: &str) -> Option<Action> {
        Dispatcher::default().interpret(raw)
    }

    fn navigate(path: &str) -> Option<Action> {
        Some(Action::Navigate {
            path: path.to_string(),
        })
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Go To Explore \n"), "go to explore");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_go_to_destinations() {
        assert_eq!(interpret("go to explore"), navigate("/explore"));
        assert_eq!(interpret("Go to Exhibitions"), navigate("/exhibitions"));
        assert_eq!(interpret("go to about us"), navigate("/aboutus"));
        assert_eq!(interpret("  go to ethics  "), navigate("/ethics"));
    }

    #[test]
    fn test_go_to_home_is_root() {
        assert_eq!(interpret("go to home"), navigate("/"));
        assert_eq!(interpret("go to ho me"), navigate("/"));
    }

    #[test]
    fn test_scroll_matches_anywhere() {
        let down = Some(Action::Scroll {
            direction: ScrollDirection::Down,
        });
        let up = Some(Action::Scroll {
            direction: ScrollDirection::Up,
        });
        assert_eq!(interpret("scroll down"), down);
        assert_eq!(interpret("scrolldown"), down);
        assert_eq!(interpret("please scroll down a bit"), down);
        assert_eq!(interpret("scroll up"), up);
        assert_eq!(interpret("could you scrollup"), up);
    }

    #[test]
    fn test_history_commands() {
        assert_eq!(interpret("go back"), Some(Action::History { offset: -1 }));
        assert_eq!(interpret("please go back"), Some(Action::History { offset: -1 }));
        assert_eq!(interpret("go forward"), Some(Action::History { offset: 1 }));
    }

    #[test]
    fn test_go_to_prefix_wins_only_at_start() {
        // Literally starts with "go to", so it is a destination
        assert_eq!(interpret("go to back"), navigate("/back"));
        // "go to" appears later; the history rule matches by substring
        assert_eq!(
            interpret("i want to go back, not go to page"),
            Some(Action::History { offset: -1 })
        );
        assert_eq!(interpret("let us go to explore"), None);
    }

    #[test]
    fn test_about_command() {
        assert_eq!(interpret("Tell me more about this website"), Some(Action::ShowInfo));
    }

    #[test]
    fn test_unmatched_and_empty_are_noops() {
        assert_eq!(interpret("what time is it"), None);
        assert_eq!(interpret(""), None);
        assert_eq!(interpret("   "), None);
        assert_eq!(interpret("go to"), None);
    }

    #[test]
    fn test_dispatch_scroll_uses_viewport_height() {
        let (mut collaborators, log) = recording_collaborators(720);
        let dispatcher = Dispatcher::default();

        dispatcher.dispatch("scroll down", &mut collaborators);
        dispatcher.dispatch("scroll up", &mut collaborators);

        assert_eq!(log.lock().unwrap().scrolls, vec![720, -720]);
    }

    #[test]
    fn test_dispatch_navigation_and_history() {
        let (mut collaborators, log) = recording_collaborators(800);
        let dispatcher = Dispatcher::default();

        dispatcher.dispatch("go to explore", &mut collaborators);
        dispatcher.dispatch("go back", &mut collaborators);
        dispatcher.dispatch("go forward", &mut collaborators);

        let log = log.lock().unwrap();
        assert_eq!(log.paths, vec!["/explore".to_string()]);
        assert_eq!(log.history, vec![-1, 1]);
    }

    #[test]
    fn test_dispatch_show_info_notification() {
        let (mut collaborators, log) = recording_collaborators(800);

        let action = Dispatcher::default().dispatch("tell me more about this website", &mut collaborators);
        assert_eq!(action, Some(Action::ShowInfo));

        let log = log.lock().unwrap();
        assert_eq!(log.notifications.len(), 1);
        assert_eq!(log.notifications[0].severity, Severity::Info);
        assert_eq!(log.notifications[0].title, ABOUT_TITLE);
        assert_eq!(log.notifications[0].description, ABOUT_DESCRIPTION);
    }

    #[test]
    fn test_dispatch_unmatched_has_no_effect() {
        let (mut collaborators, log) = recording_collaborators(800);
        assert_eq!(Dispatcher::default().dispatch("what time is it", &mut collaborators), None);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_examples_follow_rule_order() {
        let examples = Dispatcher::default().examples();
        assert_eq!(examples.first(), Some(&"go to explore"));
        assert!(examples.contains(&"tell me more about this website"));
        for example in examples {
            assert!(interpret(example).is_some(), "example {example:?} must dispatch");
        }
    }
}

//! The voice command grammar
//!
//! Rules are evaluated in declaration order and the first match wins.
//! `go to` is matched as a prefix of the whole transcript; every other
//! rule matches its phrases anywhere in the transcript. Keeping `go to`
//! first with prefix semantics is what stops "go to back" from being read
//! as "go back".

use super::effects::{Action, ScrollDirection};

pub const ABOUT_TITLE: &str = "About the Digital Cultural Heritage Museum";

pub const ABOUT_DESCRIPTION: &str = "This is a modern, voice-controlled digital museum designed to make cultural heritage accessible to everyone. It leverages cutting-edge web technologies to provide an immersive and inclusive experience for exploring artifacts and exhibitions.";

/// How a rule tests a normalized transcript
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Transcript starts with the phrase; the remainder is the argument
    Prefix(&'static str),
    /// Transcript contains any of the phrases
    AnyOf(&'static [&'static str]),
}

impl Matcher {
    /// Returns the argument tail on a match (empty for phrase rules)
    pub fn capture<'a>(&self, text: &'a str) -> Option<&'a str> {
        match self {
            Matcher::Prefix(prefix) => text.strip_prefix(prefix),
            Matcher::AnyOf(phrases) => phrases
                .iter()
                .any(|phrase| text.contains(phrase))
                .then_some(""),
        }
    }
}

/// What a matched rule does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    NavigateTo,
    HistoryBack,
    HistoryForward,
    ScrollDown,
    ScrollUp,
    ShowInfo,
}

impl Effect {
    /// Build the action for this effect from the captured argument
    pub fn resolve(self, argument: &str) -> Option<Action> {
        match self {
            Effect::NavigateTo => destination_path(argument).map(|path| Action::Navigate { path }),
            Effect::HistoryBack => Some(Action::History { offset: -1 }),
            Effect::HistoryForward => Some(Action::History { offset: 1 }),
            Effect::ScrollDown => Some(Action::Scroll {
                direction: ScrollDirection::Down,
            }),
            Effect::ScrollUp => Some(Action::Scroll {
                direction: ScrollDirection::Up,
            }),
            Effect::ShowInfo => Some(Action::ShowInfo),
        }
    }
}

/// A pattern-to-effect binding
#[derive(Debug, Clone, Copy)]
pub struct CommandRule {
    pub name: &'static str,
    pub matcher: Matcher,
    pub effect: Effect,
    /// Phrase shown to users as an example of this command
    pub example: &'static str,
}

pub static COMMAND_RULES: &[CommandRule] = &[
    CommandRule {
        name: "go_to",
        matcher: Matcher::Prefix("go to "),
        effect: Effect::NavigateTo,
        example: "go to explore",
    },
    CommandRule {
        name: "scroll_down",
        matcher: Matcher::AnyOf(&["scroll down", "scrolldown"]),
        effect: Effect::ScrollDown,
        example: "scroll down",
    },
    CommandRule {
        name: "scroll_up",
        matcher: Matcher::AnyOf(&["scroll up", "scrollup"]),
        effect: Effect::ScrollUp,
        example: "scroll up",
    },
    CommandRule {
        name: "go_back",
        matcher: Matcher::AnyOf(&["go back"]),
        effect: Effect::HistoryBack,
        example: "go back",
    },
    CommandRule {
        name: "go_forward",
        matcher: Matcher::AnyOf(&["go forward"]),
        effect: Effect::HistoryForward,
        example: "go forward",
    },
    CommandRule {
        name: "about",
        matcher: Matcher::AnyOf(&["tell me more about this website"]),
        effect: Effect::ShowInfo,
        example: "tell me more about this website",
    },
];

/// Map a spoken destination to a route path
///
/// Whitespace is removed so "exhibit detail" becomes `/exhibitdetail`;
/// `home` is the root route.
pub fn destination_path(destination: &str) -> Option<String> {
    let name: String = destination.chars().filter(|c| !c.is_whitespace()).collect();
    match name.as_str() {
        "" => None,
        "home" => Some("/".to_string()),
        _ => Some(format!("/{}", name)),
    }
}

//! In-memory history router
//!
//! Behaves like browser history: pushing a path discards any forward
//! entries, and offsets that would leave the stack are ignored.

use tracing::{debug, info};

use crate::commands::Navigator;

#[derive(Debug, Clone)]
pub struct HistoryRouter {
    entries: Vec<String>,
    index: usize,
}

impl HistoryRouter {
    pub fn new(start_path: impl Into<String>) -> Self {
        Self {
            entries: vec![start_path.into()],
            index: 0,
        }
    }

    /// The path currently shown
    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    fn target(&self, offset: i32) -> Option<usize> {
        let target = self.index as i64 + offset as i64;
        (0..self.entries.len() as i64)
            .contains(&target)
            .then_some(target as usize)
    }
}

impl Navigator for HistoryRouter {
    fn navigate_to(&mut self, path: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(path.to_string());
        self.index = self.entries.len() - 1;
        info!(path, "navigated");
    }

    fn go(&mut self, offset: i32) {
        match self.target(offset) {
            Some(target) => {
                self.index = target;
                info!(offset, path = %self.current(), "history moved");
            }
            None => debug!(offset, "history offset out of range, ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_back() {
        let mut router = HistoryRouter::new("/");
        router.navigate_to("/explore");
        router.navigate_to("/exhibitions");
        assert_eq!(router.current(), "/exhibitions");

        router.go(-1);
        assert_eq!(router.current(), "/explore");
        router.go(1);
        assert_eq!(router.current(), "/exhibitions");
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let mut router = HistoryRouter::new("/");
        router.navigate_to("/explore");
        router.go(-1);
        router.navigate_to("/about");

        assert_eq!(router.target(1), None);
        router.go(1);
        assert_eq!(router.current(), "/about");
        router.go(-1);
        assert_eq!(router.current(), "/");
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut router = HistoryRouter::new("/");
        router.go(-1);
        router.go(1);
        assert_eq!(router.current(), "/");
    }
}

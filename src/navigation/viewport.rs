//! Scroll position tracking for the page viewport

use tracing::info;

use crate::commands::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollViewport {
    height: i64,
    offset: i64,
}

impl ScrollViewport {
    pub fn new(height: i64) -> Self {
        Self { height, offset: 0 }
    }
}

impl Viewport for ScrollViewport {
    fn height(&self) -> i64 {
        self.height
    }

    fn scroll_by(&mut self, delta: i64) {
        // Cannot scroll above the top of the page
        self.offset = self.offset.saturating_add(delta).max(0);
        info!(delta, offset = self.offset, "viewport scrolled");
    }
}

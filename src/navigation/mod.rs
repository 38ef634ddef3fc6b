//! Navigation module providing the router and viewport collaborators

mod router;
mod viewport;

pub use router::HistoryRouter;
pub use viewport::ScrollViewport;

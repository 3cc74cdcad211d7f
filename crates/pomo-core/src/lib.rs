//! pomo-core - Shared functionality for the pomo crates
//!
//! Standard on-disk locations and the small formatting helpers every
//! front-end needs to render a timer.

pub mod format;
pub mod paths;

pub use paths::Paths;

//! Theme styling for the form UI: semantic roles, the Nord palette and
//! helper builders for Ratatui widgets. Prefer these helpers over
//! hard-coding colors.

pub mod nord;
pub mod roles;
pub mod theme_helpers;

pub use nord::NordTheme;
pub use roles::Theme;

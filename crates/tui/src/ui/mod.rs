//! Terminal rendering of the form: components, theme, field navigation and
//! the event loop that drives them.

pub mod components;
pub mod main_component;
pub mod navigation;
pub mod runtime;
pub mod theme;

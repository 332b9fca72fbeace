//! UI components: the form, field info, activity log and key hints.

pub mod common;
pub mod component;
pub mod form;
pub mod hint_bar;
pub mod info;
pub mod logs;

pub use component::*;
pub use form::FormComponent;
pub use hint_bar::HintBarComponent;
pub use info::InfoComponent;
pub use logs::LogsComponent;

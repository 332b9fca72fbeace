//! Component system for the form UI.
//!
//! Components are self-contained UI elements that handle their own events and
//! render themselves into a provided `Rect`. They never change the form data
//! directly: user intent is reported back to the host as [`Effect`]s.

use crossterm::event::KeyEvent;
use ichub_types::{Effect, Msg};
use ratatui::{Frame, layout::Rect};

use crate::app::App;

/// A UI element with local behavior.
///
/// # Component Lifecycle
///
/// 1. **Event Handling**: keys arrive through `handle_key_events()`, timer and
///    navigation messages through `handle_message()`
/// 2. **Rendering**: `render()` draws the component into the provided area
///
/// Both handlers return the effects the host should apply, in order.
pub(crate) trait Component {
    /// Handle an application message (ticks, resizes, navigation steps).
    fn handle_message(&mut self, _app: &mut App, _msg: &Msg) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle key events when this component has focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Render the component into the given area.
    ///
    /// Rendering may refresh caches derived from `app` (row lists, the field
    /// registry) but must not change form data.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);
}

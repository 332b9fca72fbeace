//! Single-line strip of key bindings for the current mode.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::theme::theme_helpers as th;

const BROWSE_HINTS: &[(&str, &str)] = &[
    ("↑↓", "move"),
    ("Enter", "open/edit"),
    ("←→", "choose"),
    ("a/d", "add/remove item"),
    ("i", "info"),
    ("n", "next error"),
    ("^R", "required only"),
    ("^S", "save"),
    ("q", "quit"),
];

const EDIT_HINTS: &[(&str, &str)] = &[("Enter", "done"), ("Esc", "revert"), ("↑↓", "done and move")];

#[derive(Debug, Default)]
pub struct HintBarComponent;

impl Component for HintBarComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let hints = if app.form.editor.is_some() { EDIT_HINTS } else { BROWSE_HINTS };
        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (key, action) in hints {
            spans.push(Span::styled(format!(" {key}"), th::key_hint_style(theme)));
            spans.push(Span::styled(format!(" {action} "), theme.text_muted_style()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)).style(th::panel_style(theme)), rect);
    }
}

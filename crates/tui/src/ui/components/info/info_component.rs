//! Side panel with the documentation of the requested or focused field.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use super::content::build_field_info_text;
use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::theme::theme_helpers as th;

#[derive(Debug, Default)]
pub struct InfoComponent;

impl Component for InfoComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let app: &App = app;
        let theme = &*app.ctx.theme;
        let block = th::block(theme, Some("Field info"), false);

        // An explicit request wins over the focused field.
        let subject = app
            .info_key
            .clone()
            .map(|key| (key.clone(), key))
            .or_else(|| {
                let focused = app.form.focused()?;
                let row = app.rows.iter().find(|row| row.path == focused)?;
                Some((row.path.clone(), row.schema_key.clone()))
            });

        let text = match subject.and_then(|(path, key)| app.find_descriptor(&key).map(|field| (path, field))) {
            Some((path, field)) => {
                let errors = app.errors.state_for(&path, &field.key);
                build_field_info_text(theme, field, &errors)
            }
            None => Text::from(Line::from(Span::styled(
                "Select a field to see its documentation.",
                theme.text_muted_style(),
            ))),
        };
        let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, rect);
    }
}

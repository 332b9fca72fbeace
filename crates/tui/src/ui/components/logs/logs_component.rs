//! Activity panel: errors that could not be tied to a field, followed by the
//! session log (saves, filter changes, navigation misses).

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem},
};

use super::state::LogLevel;
use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::theme::Theme;
use crate::ui::theme::theme_helpers as th;

#[derive(Debug, Default)]
pub struct LogsComponent;

fn level_style(theme: &dyn Theme, level: LogLevel) -> Style {
    match level {
        LogLevel::Info => theme.text_secondary_style(),
        LogLevel::Warn => theme.status_warning(),
        LogLevel::Error => theme.status_error(),
    }
}

impl Component for LogsComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let block = th::block(theme, Some("Activity"), false);

        let mut items: Vec<ListItem> = app
            .errors
            .unattributed()
            .iter()
            .map(|message| {
                ListItem::new(Line::from(vec![
                    Span::styled("form: ", theme.status_error()),
                    Span::styled(message.clone(), theme.text_primary_style()),
                ]))
            })
            .collect();
        let pinned = items.len();
        items.extend(
            app.logs
                .entries
                .iter()
                .map(|entry| ListItem::new(Line::from(Span::styled(entry.message.clone(), level_style(theme, entry.level))))),
        );

        let list = List::new(items).block(block);
        let mut list_state = app.logs.list_state.clone();
        if let Some(selected) = list_state.selected() {
            list_state.select(Some(selected + pinned));
        }
        frame.render_stateful_widget(list, rect, &mut list_state);
    }
}

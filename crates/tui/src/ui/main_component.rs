//! Top-level view: lays out the form, the field info panel, the activity log
//! and the hint bar, and routes input to the form.

use crossterm::event::KeyEvent;
use ichub_types::{Effect, Msg};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::components::{Component, FormComponent, HintBarComponent, InfoComponent, LogsComponent};
use super::theme::theme_helpers as th;
use crate::app::App;

#[derive(Debug, Default)]
pub struct MainView {
    pub form_view: FormComponent,
    pub info_view: InfoComponent,
    pub logs_view: LogsComponent,
    pub hint_bar_view: HintBarComponent,
}

impl MainView {
    fn render_header(&self, frame: &mut Frame, area: Rect, app: &App) {
        let theme = &*app.ctx.theme;
        let error_count = app.errors.error_paths().count() + app.errors.unattributed().len();
        let mut spans = vec![
            Span::styled(
                format!(" {} ", app.title),
                theme.text_secondary_style().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("· {} fields ", app.fields.len()), theme.text_muted_style()),
        ];
        if error_count > 0 {
            spans.push(Span::styled(format!("· {error_count} errors "), theme.status_error()));
        }
        if app.required_only {
            spans.push(Span::styled("· required only ", theme.status_info()));
        }
        if app.dirty {
            spans.push(Span::styled("· unsaved", theme.status_warning()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)).style(th::panel_style(theme)), area);
    }
}

impl Component for MainView {
    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<Effect> {
        self.form_view.handle_message(app, msg)
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        self.form_view.handle_key_events(app, key)
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let [header, body, hints] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(5), Constraint::Length(1)]).areas(rect);
        let [form_area, side] = Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)]).areas(body);
        let [info_area, logs_area] = Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(side);

        self.render_header(frame, header, app);
        self.form_view.render(frame, form_area, app);
        self.info_view.render(frame, info_area, app);
        self.logs_view.render(frame, logs_area, app);
        self.hint_bar_view.render(frame, hints, app);
    }
}

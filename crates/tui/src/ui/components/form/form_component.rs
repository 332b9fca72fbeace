//! Form component: key handling, navigation steps and rendering for the
//! sectioned field list.
//!
//! The component never mutates form data. Value edits come back as
//! [`Effect::DataChanged`] carrying the whole proposed document; the host
//! applies it and the next frame re-renders from the new data.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ichub_types::{Effect, Msg, NavigationEvent};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    widgets::{List, ListItem},
};
use tracing::{debug, warn};

use super::controls::{self, Control};
use super::rows::{FormRow, RowKind};
use super::row_view::row_view;
use super::state::Highlight;
use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::theme::theme_helpers as th;

const PAGE: isize = 10;
const HIGHLIGHT_SYMBOL: &str = "› ";

#[derive(Debug, Default)]
pub struct FormComponent;

impl FormComponent {
    fn selected_row(app: &App) -> Option<FormRow> {
        app.rows.get(app.form.selected()).cloned()
    }

    fn editing_row(app: &App) -> Option<FormRow> {
        let path = app.form.editor.as_ref()?.path.as_str();
        app.rows.iter().find(|row| row.path == path).cloned()
    }

    /// Reports focus moving to the selected row.
    fn sync_focus(app: &mut App) -> Vec<Effect> {
        let target = Self::selected_row(app).filter(FormRow::is_input).map(|row| row.path);
        let had_focus = app.form.focused().is_some();
        if !app.form.set_focused(target.clone()) {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if had_focus {
            effects.push(Effect::FieldBlurred);
        }
        if let Some(path) = target {
            effects.push(Effect::FieldFocused(path));
        }
        effects
    }

    fn move_selection(app: &mut App, delta: isize) -> Vec<Effect> {
        let editing = Self::editing_row(app);
        let mut effects: Vec<Effect> = controls::commit_edit(app, editing.as_ref()).into_iter().collect();
        let len = app.rows.len() as isize;
        if len == 0 {
            return effects;
        }
        let next = (app.form.selected() as isize + delta).clamp(0, len - 1);
        app.form.select(next as usize);
        effects.extend(Self::sync_focus(app));
        effects
    }

    /// Enter/Space on the selected row: toggle containers, start editing or
    /// flip the value.
    fn activate(app: &mut App, row: &FormRow) -> Vec<Effect> {
        match &row.kind {
            RowKind::Section { name, .. } => {
                app.form.toggle_section(name);
                app.refresh_rows();
                Vec::new()
            }
            RowKind::Group { .. } | RowKind::ArrayHeader { .. } => {
                app.form.toggle_group(&row.path);
                Vec::new()
            }
            RowKind::ItemCard { .. } => {
                app.form.toggle_item(&row.path);
                Vec::new()
            }
            RowKind::Field { .. } | RowKind::ScalarItem { .. } => match controls::control_for(row) {
                Some(Control::Text | Control::Numeric { .. }) => {
                    controls::begin_edit(app, row);
                    Vec::new()
                }
                Some(Control::Checkbox) => controls::toggle_checkbox(app, row).into_iter().collect(),
                Some(Control::Choice(options)) => controls::cycle_choice(app, row, options, 1).into_iter().collect(),
                None => Vec::new(),
            },
        }
    }

    fn handle_editing_keys(app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let row = Self::editing_row(app);
        let Some(editor) = app.form.editor.as_mut() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Char(character) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                editor.draft.insert_char(character);
            }
            KeyCode::Backspace => editor.draft.backspace(),
            KeyCode::Delete => editor.draft.delete(),
            KeyCode::Left => {
                editor.draft.move_left();
                return Vec::new();
            }
            KeyCode::Right => {
                editor.draft.move_right();
                return Vec::new();
            }
            KeyCode::Home => {
                editor.draft.move_home();
                return Vec::new();
            }
            KeyCode::End => {
                editor.draft.move_end();
                return Vec::new();
            }
            KeyCode::Enter | KeyCode::Tab => return controls::commit_edit(app, row.as_ref()).into_iter().collect(),
            KeyCode::Esc => return controls::cancel_edit(app, row.as_ref()).into_iter().collect(),
            KeyCode::Up => return Self::move_selection(app, -1),
            KeyCode::Down => return Self::move_selection(app, 1),
            _ => return Vec::new(),
        }
        match row {
            Some(row) => controls::apply_draft(app, &row).into_iter().collect(),
            None => {
                app.form.editor = None;
                Vec::new()
            }
        }
    }

    /// Next error path after the last one visited, wrapping around.
    fn next_error_target(app: &mut App) -> Option<String> {
        let targets = app.error_targets();
        if targets.is_empty() {
            return None;
        }
        let target = targets[app.error_cursor % targets.len()].clone();
        app.error_cursor = (app.error_cursor + 1) % targets.len();
        Some(target)
    }

    fn handle_navigation(app: &mut App, event: &NavigationEvent) -> Vec<Effect> {
        if !app.navigation.is_current(event.generation()) {
            debug!(generation = event.generation(), "ignoring stale navigation step");
            return Vec::new();
        }
        match event {
            NavigationEvent::ExpandSection { section, .. } => {
                app.form.expand_section(section);
                app.refresh_rows();
                Vec::new()
            }
            NavigationEvent::Reveal { key, .. } => {
                app.form.reveal_ancestors(key);
                app.refresh_rows();
                let Some((path, entry)) = app.registry.lookup(key) else {
                    warn!(%key, "navigation target is not rendered");
                    return Vec::new();
                };
                let (path, kind, row) = (path.to_string(), entry.kind, entry.row);
                let editing = Self::editing_row(app);
                let mut effects: Vec<Effect> = controls::commit_edit(app, editing.as_ref()).into_iter().collect();
                app.form.select(row);
                app.form.highlight = Some(Highlight { path, kind });
                if kind.takes_focus() {
                    effects.extend(Self::sync_focus(app));
                }
                effects
            }
            NavigationEvent::ClearHighlight { .. } => {
                app.form.highlight = None;
                Vec::new()
            }
            NavigationEvent::Finished { generation } => {
                if app.navigation.finish(*generation) {
                    vec![Effect::NavigationFinished]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

impl Component for FormComponent {
    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<Effect> {
        match msg {
            Msg::Navigation(event) => Self::handle_navigation(app, event),
            Msg::Tick | Msg::Resize(..) => Vec::new(),
        }
    }

    /// Keys while not editing:
    ///
    /// - **↑/↓, PgUp/PgDn, Home/End**: move the selection
    /// - **Enter/Space**: toggle a container, edit text, flip a checkbox or
    ///   cycle a choice
    /// - **←/→**: previous/next choice, flip a checkbox
    /// - **Backspace/Delete**: clear the value, or remove the selected item
    /// - **a** add an item, **d** remove an item
    /// - **i** show field documentation, **n** jump to the next error
    /// - **Ctrl+R** required-only filter, **Ctrl+S** save, **q/Esc** quit
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        app.refresh_rows();
        if app.form.editor.is_some() {
            return Self::handle_editing_keys(app, key);
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('r') => vec![Effect::ToggleRequiredOnly],
                KeyCode::Char('s') => vec![Effect::Save],
                _ => Vec::new(),
            };
        }

        let row = Self::selected_row(app);
        let row_count = app.rows.len() as isize;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Self::move_selection(app, -1),
            KeyCode::Down | KeyCode::Char('j') => Self::move_selection(app, 1),
            KeyCode::PageUp => Self::move_selection(app, -PAGE),
            KeyCode::PageDown => Self::move_selection(app, PAGE),
            KeyCode::Home => Self::move_selection(app, -row_count),
            KeyCode::End => Self::move_selection(app, row_count),
            KeyCode::Enter | KeyCode::Char(' ') => row.map(|row| Self::activate(app, &row)).unwrap_or_default(),
            KeyCode::Left | KeyCode::Right => {
                let step = if key.code == KeyCode::Left { -1 } else { 1 };
                let Some(row) = row else { return Vec::new() };
                match controls::control_for(&row) {
                    Some(Control::Choice(options)) => controls::cycle_choice(app, &row, options, step).into_iter().collect(),
                    Some(Control::Checkbox) => controls::toggle_checkbox(app, &row).into_iter().collect(),
                    _ => Vec::new(),
                }
            }
            KeyCode::Backspace | KeyCode::Delete => {
                let Some(row) = row else { return Vec::new() };
                if matches!(row.kind, RowKind::ItemCard { .. }) {
                    return controls::delete_item(app, &row).into_iter().collect();
                }
                controls::clear_value(app, &row).into_iter().collect()
            }
            KeyCode::Char('a') => row.and_then(|row| controls::add_item(app, &row)).into_iter().collect(),
            KeyCode::Char('d') => row.and_then(|row| controls::delete_item(app, &row)).into_iter().collect(),
            KeyCode::Char('i') | KeyCode::Char('?') => row
                .filter(|row| row.descriptor().is_some_and(|field| field.has_documentation()))
                .map(|row| vec![Effect::InfoRequested(row.schema_key)])
                .unwrap_or_default(),
            KeyCode::Char('n') => Self::next_error_target(app).map(Effect::NavigateTo).into_iter().collect(),
            KeyCode::Char('q') | KeyCode::Esc => vec![Effect::Quit],
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        app.refresh_rows();
        let title = if app.required_only {
            "Form · required fields"
        } else {
            "Form"
        };
        let block = th::block(&*app.ctx.theme, Some(title), true);
        let inner = block.inner(rect);
        let symbol_width = HIGHLIGHT_SYMBOL.chars().count();
        let width = (inner.width as usize).saturating_sub(symbol_width);

        let views: Vec<_> = app.rows.iter().map(|row| row_view(app, row, width)).collect();
        let heights: Vec<u16> = views.iter().map(|view| view.lines.len() as u16).collect();
        let value_columns: Vec<usize> = views.iter().map(|view| view.value_column).collect();
        let items: Vec<ListItem> = views.into_iter().map(|view| ListItem::new(view.lines)).collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(app.ctx.theme.selection_style())
            .highlight_symbol(HIGHLIGHT_SYMBOL);
        frame.render_stateful_widget(list, rect, &mut app.form.list_state);

        // Record where each visible row landed.
        let offset = app.form.list_state.offset();
        let mut y = inner.y;
        for (index, row) in app.rows.iter().enumerate().skip(offset) {
            if y >= inner.bottom() {
                break;
            }
            let height = heights[index].min(inner.bottom() - y);
            let area = Rect::new(inner.x, y, inner.width, height);
            app.registry.set_area(&row.path, area);

            if let Some(editor) = app.form.editor.as_ref().filter(|editor| editor.path == row.path) {
                let column = symbol_width + value_columns[index] + editor.draft.cursor_column();
                let x = inner.x.saturating_add(column as u16).min(inner.right().saturating_sub(1));
                frame.set_cursor_position(Position::new(x, y));
            }
            y = y.saturating_add(heights[index]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::FormSession;
    use ichub_util::FormsConfig;
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(data: Value) -> App {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": { "type": "string", "x-section": "Identification" },
                "weight": { "type": "number", "x-section": "Identification" },
                "tags": { "type": "array", "x-section": "Identification", "items": { "type": "string" } },
                "materialList": {
                    "type": "array",
                    "x-section": "Materials",
                    "items": {
                        "type": "object",
                        "required": ["name"],
                        "properties": { "name": { "type": "string" } }
                    }
                }
            }
        });
        let (sender, _receiver) = mpsc::unbounded_channel();
        let session = FormSession {
            schema,
            data,
            ..FormSession::default()
        };
        App::new(session, FormsConfig::default(), sender).expect("app")
    }

    fn press(form: &mut FormComponent, app: &mut App, code: KeyCode) -> Vec<Effect> {
        let effects = form.handle_key_events(app, key(code));
        app.apply_effects(effects.clone());
        effects
    }

    #[test]
    fn typing_into_a_text_field_reports_the_whole_document() {
        let mut app = app(json!({}));
        let mut form = FormComponent;
        assert_eq!(press(&mut form, &mut app, KeyCode::Down), vec![Effect::FieldFocused("name".into())]);
        assert!(press(&mut form, &mut app, KeyCode::Enter).is_empty());
        assert_eq!(
            press(&mut form, &mut app, KeyCode::Char('B')),
            vec![Effect::DataChanged {
                data: json!({ "name": "B" }),
                key: "name".into()
            }]
        );
        assert!(!app.errors.state_for("name", "name").has_error);
    }

    #[test]
    fn numeric_drafts_keep_partial_input() {
        let mut app = app(json!({}));
        let mut form = FormComponent;
        app.form.select(2);
        press(&mut form, &mut app, KeyCode::Enter);
        assert!(press(&mut form, &mut app, KeyCode::Char('-')).is_empty());
        press(&mut form, &mut app, KeyCode::Char('1'));
        assert_eq!(app.data["weight"], json!(-1));
        assert!(press(&mut form, &mut app, KeyCode::Char('.')).is_empty());
        assert!(press(&mut form, &mut app, KeyCode::Enter).is_empty());
        assert!(app.form.editor.is_none());
        assert_eq!(app.data["weight"], json!(-1));
    }

    #[test]
    fn escape_restores_the_original_value() {
        let mut app = app(json!({ "name": "Bolt" }));
        let mut form = FormComponent;
        app.form.select(1);
        press(&mut form, &mut app, KeyCode::Enter);
        press(&mut form, &mut app, KeyCode::Backspace);
        assert_eq!(app.data["name"], json!("Bol"));
        press(&mut form, &mut app, KeyCode::Esc);
        assert_eq!(app.data["name"], json!("Bolt"));
    }

    #[test]
    fn appending_to_a_primitive_array_adds_an_empty_string() {
        let mut app = app(json!({}));
        let mut form = FormComponent;
        app.form.select(3);
        assert_eq!(
            press(&mut form, &mut app, KeyCode::Char('a')),
            vec![Effect::DataChanged {
                data: json!({ "tags": [""] }),
                key: "tags".into()
            }]
        );
        assert!(!app.errors.state_for("tags", "tags").is_flagged());
    }

    #[tokio::test]
    async fn reveal_highlights_and_focuses_the_target() {
        let mut app = app(json!({ "name": "Bolt", "materialList": [{}] }));
        let mut form = FormComponent;
        let generation = app.navigation.start("materialList[0].name", Some("Materials".into()));

        let expand = Msg::Navigation(NavigationEvent::ExpandSection {
            generation,
            section: "Materials".into(),
        });
        assert!(form.handle_message(&mut app, &expand).is_empty());
        assert_eq!(app.form.expanded_section(), Some("Materials"));

        let stale = Msg::Navigation(NavigationEvent::Reveal {
            generation: generation + 1,
            key: "name".into(),
        });
        assert!(form.handle_message(&mut app, &stale).is_empty());

        let reveal = Msg::Navigation(NavigationEvent::Reveal {
            generation,
            key: "materialList[0].name".into(),
        });
        assert_eq!(
            form.handle_message(&mut app, &reveal),
            vec![Effect::FieldFocused("materialList[0].name".into())]
        );
        assert!(app.form.is_highlighted("materialList[0].name"));
        let selected = &app.rows[app.form.selected()];
        assert_eq!(selected.path, "materialList[0].name");

        let clear = Msg::Navigation(NavigationEvent::ClearHighlight {
            generation,
            key: "materialList[0].name".into(),
        });
        form.handle_message(&mut app, &clear);
        assert!(app.form.highlight.is_none());
        let finished = Msg::Navigation(NavigationEvent::Finished { generation });
        assert_eq!(form.handle_message(&mut app, &finished), vec![Effect::NavigationFinished]);
        assert!(!app.navigation.is_active());
    }
}

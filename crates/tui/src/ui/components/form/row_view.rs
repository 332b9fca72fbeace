//! Turns a [`FormRow`] into styled lines.

use ichub_types::{ErrorState, FieldDescriptor, FieldType, ItemType};
use ichub_util::get_value;
use ichub_util::text_processing::{humanize_key, scalar_to_text, truncate_to_width};
use ratatui::text::{Line, Span};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use super::controls::option_index;
use super::rows::{FormRow, RowKind};
use crate::app::App;
use crate::ui::theme::Theme;
use crate::ui::theme::theme_helpers as th;

const INDENT: &str = "  ";

pub(crate) struct RowView {
    pub lines: Vec<Line<'static>>,
    /// Display column where the editable value starts on the first line.
    pub value_column: usize,
}

pub(crate) fn row_view(app: &App, row: &FormRow, width: usize) -> RowView {
    let theme = &*app.ctx.theme;
    let indent = INDENT.repeat(row.depth);
    let state = match row.kind {
        RowKind::Section { .. } => ErrorState::default(),
        _ => app.errors.state_for(&row.path, &row.schema_key),
    };

    let mut spans = vec![Span::raw(indent.clone())];
    let mut value_column = indent.width();
    match &row.kind {
        RowKind::Section { name, expanded, roots } => {
            let flagged = roots
                .iter()
                .any(|root| app.errors.state_for(root, root).is_flagged());
            spans.push(Span::styled(
                format!("{} {name}", disclosure(*expanded)),
                th::header_style(theme, *expanded),
            ));
            if flagged {
                spans.push(Span::styled(" ●", theme.status_error()));
            }
        }
        RowKind::Group { field, expanded } => {
            let label = field
                .as_ref()
                .map(|field| field.label.clone())
                .unwrap_or_else(|| humanize_key(&row.schema_key));
            spans.push(Span::styled(
                format!("{} {label}", disclosure(*expanded)),
                th::header_style(theme, *expanded),
            ));
            push_markers(&mut spans, theme, field.as_ref(), &state);
        }
        RowKind::ArrayHeader { field, len, expanded } => {
            spans.push(Span::styled(
                format!("{} {}", disclosure(*expanded), field.label),
                th::header_style(theme, *expanded),
            ));
            spans.push(Span::styled(format!(" [{}]", item_count(*len)), theme.text_muted_style()));
            push_markers(&mut spans, theme, Some(field), &state);
        }
        RowKind::ItemCard { index, expanded, .. } => {
            spans.push(Span::styled(
                format!("{} Item {}", disclosure(*expanded), index + 1),
                th::label_style(theme, state.has_error),
            ));
            if state.has_child_errors {
                spans.push(Span::styled(" ●", theme.status_error()));
            }
        }
        RowKind::Field { field } => {
            let label = format!("{}{}: ", field.label, if field.required { "*" } else { "" });
            value_column += label.width();
            spans.push(Span::styled(label, th::label_style(theme, state.has_error)));
            let available = width.saturating_sub(value_column + 4);
            spans.extend(value_spans(app, row, &field.field_type, available));
            push_markers(&mut spans, theme, None, &state);
            if field.has_documentation() {
                spans.push(Span::styled(" ⓘ", theme.text_muted_style()));
            }
        }
        RowKind::ScalarItem { .. } => {
            let bullet = "• ".to_string();
            value_column += bullet.width();
            spans.push(Span::styled(bullet, th::label_style(theme, state.has_error)));
            let field_type = match row.array_target().map(|(_, items)| items) {
                Some(ItemType::Boolean) => FieldType::Checkbox,
                Some(ItemType::Number) => FieldType::Number,
                Some(ItemType::Integer) => FieldType::Integer,
                _ => FieldType::Text,
            };
            let available = width.saturating_sub(value_column + 4);
            spans.extend(value_spans(app, row, &field_type, available));
            push_markers(&mut spans, theme, None, &state);
        }
    }

    let mut first = Line::from(spans);
    if app.form.is_highlighted(&row.path) && !row.path.is_empty() {
        let filled = row.container_kind().is_some_and(|kind| kind.takes_focus());
        first = first.style(th::highlight_style(theme, filled));
    }
    let mut lines = vec![first];

    let focused = app.form.focused() == Some(row.path.as_str());
    if focused
        && let RowKind::Field { field } = &row.kind
        && matches!(field.field_type, FieldType::Textarea)
        && !app.form.is_editing(&row.path)
    {
        lines.extend(textarea_lines(theme, app, row, &indent, width));
    }
    if focused && state.has_error {
        for message in &state.messages {
            lines.push(Line::from(vec![
                Span::raw(format!("{indent}{INDENT}")),
                Span::styled(format!("↳ {message}"), theme.status_error()),
            ]));
        }
    }
    RowView { lines, value_column }
}

fn disclosure(expanded: bool) -> &'static str {
    if expanded { "▾" } else { "▸" }
}

fn item_count(len: usize) -> String {
    match len {
        1 => "1 item".to_string(),
        n => format!("{n} items"),
    }
}

fn push_markers(spans: &mut Vec<Span<'static>>, theme: &dyn Theme, field: Option<&FieldDescriptor>, state: &ErrorState) {
    if field.is_some_and(|field| field.required) {
        spans.push(Span::styled("*", theme.text_muted_style()));
    }
    if state.has_error {
        spans.push(Span::styled(" !", theme.status_error()));
    } else if state.has_child_errors {
        spans.push(Span::styled(" ●", theme.status_error()));
    }
}

/// Spans for the current value. Values of the wrong JSON type show as empty.
fn value_spans(app: &App, row: &FormRow, field_type: &FieldType, available: usize) -> Vec<Span<'static>> {
    let theme = &*app.ctx.theme;
    if let Some(editor) = app.form.editor.as_ref().filter(|editor| editor.path == row.path) {
        let style = if editor.invalid {
            theme.status_error()
        } else {
            th::value_style(theme, false, true)
        };
        return vec![Span::styled(editor.draft.input().to_string(), style)];
    }

    let value = get_value(&app.data, &row.path);
    let placeholder = || -> Span<'static> {
        let hint = match &row.kind {
            RowKind::Field { field } => field.placeholder.clone().unwrap_or_else(|| "—".to_string()),
            _ => "—".to_string(),
        };
        Span::styled(truncate_to_width(&hint, available), th::value_style(theme, true, false))
    };
    let text_span = |text: String| -> Span<'static> {
        Span::styled(truncate_to_width(&text, available), th::value_style(theme, false, false))
    };

    match field_type {
        FieldType::Text | FieldType::Date | FieldType::DateTime | FieldType::Time | FieldType::Email | FieldType::Url => {
            match value {
                Some(Value::String(text)) if !text.is_empty() => vec![text_span(text.clone())],
                _ => vec![placeholder()],
            }
        }
        FieldType::Textarea => match value {
            Some(Value::String(text)) if !text.is_empty() => {
                let mut lines = text.lines();
                let first = lines.next().unwrap_or_default().to_string();
                let more = lines.next().is_some();
                let mut spans = vec![text_span(first)];
                if more {
                    spans.push(Span::styled(" …", theme.text_muted_style()));
                }
                spans
            }
            _ => vec![placeholder()],
        },
        FieldType::Number | FieldType::Integer => match value {
            Some(number @ Value::Number(_)) => vec![text_span(scalar_to_text(Some(number)))],
            _ => vec![placeholder()],
        },
        FieldType::Checkbox => {
            let checked = value.and_then(Value::as_bool).unwrap_or(false);
            vec![Span::styled(
                if checked { "[x]" } else { "[ ]" },
                th::value_style(theme, !checked, false),
            )]
        }
        FieldType::Select { options } => match option_index(options, value) {
            Some(index) => vec![text_span(format!("‹ {} ›", options[index].label))],
            None => vec![Span::styled("‹ select ›", th::value_style(theme, true, false))],
        },
        FieldType::Radio { options } => {
            let selected = option_index(options, value);
            let mut spans = Vec::with_capacity(options.len());
            for (index, option) in options.iter().enumerate() {
                let chosen = selected == Some(index);
                let mark = if chosen { "(•)" } else { "( )" };
                spans.push(Span::styled(
                    format!("{mark} {} ", option.label),
                    th::value_style(theme, !chosen, false),
                ));
            }
            spans
        }
        FieldType::Array { .. } | FieldType::Object { .. } => Vec::new(),
    }
}

fn textarea_lines(theme: &dyn Theme, app: &App, row: &FormRow, indent: &str, width: usize) -> Vec<Line<'static>> {
    let Some(Value::String(text)) = get_value(&app.data, &row.path) else {
        return Vec::new();
    };
    let prefix = format!("{indent}{INDENT}");
    let wrap_width = width.saturating_sub(prefix.width() + 2).max(10);
    text.lines()
        .flat_map(|line| textwrap::wrap(line, wrap_width).into_iter().map(|part| part.into_owned()).collect::<Vec<_>>())
        .skip(1)
        .map(|part| Line::from(vec![Span::raw(prefix.clone()), Span::styled(part, theme.accent_primary_style())]))
        .collect::<Vec<_>>()
}

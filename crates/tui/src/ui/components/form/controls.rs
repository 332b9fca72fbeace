//! Value edits for individual rows.
//!
//! Every function here reads the current data from `App` and returns the
//! `DataChanged` effect describing the proposed document; nothing writes to
//! `app.data` directly.

use ichub_engine::{NumericInput, append_item, parse_numeric_input, remove_item, update_item};
use ichub_types::{Effect, FieldType, ItemType, SelectOption};
use ichub_util::text_processing::scalar_to_text;
use ichub_util::{get_value, set_value};
use serde_json::Value;

use super::rows::{FormRow, RowKind};
use super::state::Editor;
use crate::app::App;
use crate::ui::components::common::TextInputState;

/// How a row's value is edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Control<'a> {
    Text,
    Numeric { integer: bool },
    Checkbox,
    Choice(&'a [SelectOption]),
}

pub(crate) fn control_for(row: &FormRow) -> Option<Control<'_>> {
    match &row.kind {
        RowKind::Field { field } => match &field.field_type {
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Date
            | FieldType::DateTime
            | FieldType::Time
            | FieldType::Email
            | FieldType::Url => Some(Control::Text),
            FieldType::Number => Some(Control::Numeric { integer: false }),
            FieldType::Integer => Some(Control::Numeric { integer: true }),
            FieldType::Checkbox => Some(Control::Checkbox),
            FieldType::Select { options } | FieldType::Radio { options } => Some(Control::Choice(options)),
            FieldType::Array { .. } | FieldType::Object { .. } => None,
        },
        RowKind::ScalarItem { .. } => match row.array_target()?.1 {
            ItemType::Text => Some(Control::Text),
            ItemType::Number => Some(Control::Numeric { integer: false }),
            ItemType::Integer => Some(Control::Numeric { integer: true }),
            ItemType::Boolean => Some(Control::Checkbox),
            ItemType::Object(_) => None,
        },
        _ => None,
    }
}

/// Proposes `value` for the row, or nothing when the value is unchanged.
pub(crate) fn write_value(app: &App, row: &FormRow, value: Value) -> Option<Effect> {
    if get_value(&app.data, &row.path) == Some(&value) {
        return None;
    }
    match &row.kind {
        RowKind::ScalarItem { array_path, index, .. } => Some(Effect::DataChanged {
            data: update_item(&app.data, array_path, *index, value),
            key: array_path.clone(),
        }),
        RowKind::Field { .. } => Some(Effect::DataChanged {
            data: set_value(&app.data, &row.path, value),
            key: row.path.clone(),
        }),
        _ => None,
    }
}

pub(crate) fn begin_edit(app: &mut App, row: &FormRow) {
    let original = get_value(&app.data, &row.path).cloned();
    let text = scalar_to_text(original.as_ref());
    app.form.editor = Some(Editor {
        path: row.path.clone(),
        draft: TextInputState::with_text(text),
        original,
        invalid: false,
    });
}

/// Pushes the draft into the data as the user types.
///
/// Numeric drafts that are still being typed (`-`, `12.`) or that do not
/// parse leave the stored value alone.
pub(crate) fn apply_draft(app: &mut App, row: &FormRow) -> Option<Effect> {
    let control = control_for(row)?;
    let text = app.form.editor.as_ref()?.draft.input().to_string();
    match control {
        Control::Text => write_value(app, row, Value::String(text)),
        Control::Numeric { integer } => {
            let parsed = parse_numeric_input(&text, integer);
            if let Some(editor) = app.form.editor.as_mut() {
                editor.invalid = parsed == NumericInput::Invalid;
            }
            match parsed {
                NumericInput::Empty => write_value(app, row, Value::Null),
                NumericInput::Value(value) => write_value(app, row, value),
                NumericInput::Transient | NumericInput::Invalid => None,
            }
        }
        Control::Checkbox | Control::Choice(_) => None,
    }
}

/// Ends the edit, settling transient numeric input.
pub(crate) fn commit_edit(app: &mut App, row: Option<&FormRow>) -> Option<Effect> {
    let editor = app.form.editor.take()?;
    let row = row?;
    match control_for(row)? {
        Control::Numeric { integer } => {
            let text = editor.draft.input().trim();
            let settled = text.trim_end_matches('.');
            match parse_numeric_input(settled, integer) {
                NumericInput::Value(value) => write_value(app, row, value),
                NumericInput::Empty | NumericInput::Transient => write_value(app, row, Value::Null),
                NumericInput::Invalid => None,
            }
        }
        Control::Text => write_value(app, row, Value::String(editor.draft.input().to_string())),
        Control::Checkbox | Control::Choice(_) => None,
    }
}

/// Ends the edit and restores the value the field had when editing began.
pub(crate) fn cancel_edit(app: &mut App, row: Option<&FormRow>) -> Option<Effect> {
    let editor = app.form.editor.take()?;
    let row = row?;
    let current = get_value(&app.data, &row.path);
    if current == editor.original.as_ref() {
        return None;
    }
    write_value(app, row, editor.original.unwrap_or(Value::Null))
}

pub(crate) fn toggle_checkbox(app: &App, row: &FormRow) -> Option<Effect> {
    let checked = get_value(&app.data, &row.path).and_then(Value::as_bool).unwrap_or(false);
    write_value(app, row, Value::Bool(!checked))
}

/// Index of the option matching `value`. Numbers stored as strings match
/// numeric options.
pub(crate) fn option_index(options: &[SelectOption], value: Option<&Value>) -> Option<usize> {
    let value = value?;
    options.iter().position(|option| match (&option.value, value) {
        (expected, actual) if expected == actual => true,
        (Value::Number(number), Value::String(text)) => number.to_string() == *text,
        (Value::String(text), Value::Number(number)) => number.to_string() == *text,
        _ => false,
    })
}

/// Selects the next (`step > 0`) or previous option, wrapping around.
pub(crate) fn cycle_choice(app: &App, row: &FormRow, options: &[SelectOption], step: isize) -> Option<Effect> {
    if options.is_empty() {
        return None;
    }
    let len = options.len() as isize;
    let next = match option_index(options, get_value(&app.data, &row.path)) {
        Some(current) => (current as isize + step).rem_euclid(len),
        None if step >= 0 => 0,
        None => len - 1,
    };
    write_value(app, row, options[next as usize].value.clone())
}

/// Resets the row to its empty value.
pub(crate) fn clear_value(app: &App, row: &FormRow) -> Option<Effect> {
    let empty = match control_for(row)? {
        Control::Text => Value::String(String::new()),
        Control::Numeric { .. } | Control::Choice(_) => Value::Null,
        Control::Checkbox => Value::Bool(false),
    };
    write_value(app, row, empty)
}

pub(crate) fn add_item(app: &App, row: &FormRow) -> Option<Effect> {
    let (array_path, items) = row.array_target()?;
    Some(Effect::DataChanged {
        data: append_item(&app.data, array_path, items),
        key: array_path.to_string(),
    })
}

pub(crate) fn delete_item(app: &mut App, row: &FormRow) -> Option<Effect> {
    let index = row.item_index()?;
    let (array_path, _) = row.array_target()?;
    let array_path = array_path.to_string();
    app.form.forget_items_under(&array_path);
    Some(Effect::DataChanged {
        data: remove_item(&app.data, &array_path, index),
        key: array_path,
    })
}

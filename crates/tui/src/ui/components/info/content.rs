//! Documentation text for a single field.

use ichub_types::{ErrorState, FieldDescriptor, FieldValidation};
use ratatui::{
    style::Modifier,
    text::{Line, Span, Text},
};

use crate::ui::theme::Theme;

/// Builds the info panel body for `field`, followed by any errors recorded
/// for it.
pub fn build_field_info_text(theme: &dyn Theme, field: &FieldDescriptor, errors: &ErrorState) -> Text<'static> {
    let heading = theme.text_secondary_style().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(field.label.clone(), heading)),
        detail(theme, "Key", &field.key),
        detail(theme, "Type", field.field_type.name()),
        detail(theme, "Section", &field.section),
        detail(theme, "Required", if field.required { "yes" } else { "no" }),
    ];
    if let Some(urn) = &field.urn {
        lines.push(detail(theme, "URN", urn));
    }
    let options = field.field_type.options();
    if !options.is_empty() {
        let labels: Vec<&str> = options.iter().map(|option| option.label.as_str()).collect();
        lines.push(detail(theme, "Options", &labels.join(", ")));
    }
    if let Some(validation) = field.validation.as_ref().filter(|validation| !validation.is_empty()) {
        for constraint in constraints(validation) {
            lines.push(detail(theme, "Rule", &constraint));
        }
    }
    if let Some(description) = field.description.as_deref().filter(|text| !text.trim().is_empty()) {
        lines.push(Line::default());
        lines.extend(description.lines().map(|line| Line::from(Span::styled(line.to_string(), theme.text_primary_style()))));
    }
    if errors.has_error {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Errors", theme.status_error().add_modifier(Modifier::BOLD))));
        lines.extend(
            errors
                .messages
                .iter()
                .map(|message| Line::from(Span::styled(format!("• {message}"), theme.status_error()))),
        );
    } else if errors.has_child_errors {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Nested fields have errors", theme.status_warning())));
    }
    Text::from(lines)
}

fn detail(theme: &dyn Theme, name: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{name}: "), theme.text_muted_style()),
        Span::styled(value.to_string(), theme.text_primary_style()),
    ])
}

fn constraints(validation: &FieldValidation) -> Vec<String> {
    let mut rules = Vec::new();
    if let Some(min) = validation.min {
        rules.push(format!("≥ {min}"));
    }
    if let Some(max) = validation.max {
        rules.push(format!("≤ {max}"));
    }
    if let Some(min) = validation.min_length {
        rules.push(format!("at least {min} characters"));
    }
    if let Some(max) = validation.max_length {
        rules.push(format!("at most {max} characters"));
    }
    if let Some(pattern) = &validation.pattern {
        rules.push(format!("matches {pattern}"));
    }
    if let Some(min) = validation.min_items {
        rules.push(format!("at least {min} items"));
    }
    if let Some(max) = validation.max_items {
        rules.push(format!("at most {max} items"));
    }
    rules
}

use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
};

use super::roles::{Theme, ThemeRoles};

/// Build a standard Block with theme surfaces and borders.
pub fn block<'a, T: Theme + ?Sized>(theme: &'a T, title: Option<&'a str>, focused: bool) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(theme.border_style(focused))
        .style(panel_style(theme));
    if let Some(t) = title {
        block = block.title(Span::styled(t, theme.text_secondary_style().add_modifier(Modifier::BOLD)));
    }
    block
}

/// Style for panel-like containers.
pub fn panel_style<T: Theme + ?Sized>(theme: &T) -> Style {
    let ThemeRoles { surface, text, .. } = *theme.roles();
    Style::default().bg(surface).fg(text)
}

/// Darken an RGB color by a multiplicative factor (0.0..=1.0).
/// Non-RGB colors are returned unchanged.
pub fn darken_rgb(color: Color, factor: f32) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let f = factor.clamp(0.0, 1.0);
            Color::Rgb((r as f32 * f) as u8, (g as f32 * f) as u8, (b as f32 * f) as u8)
        }
        other => other,
    }
}

/// Section and group header text.
pub fn header_style<T: Theme + ?Sized>(theme: &T, expanded: bool) -> Style {
    let style = theme.text_secondary_style().add_modifier(Modifier::BOLD);
    if expanded { style } else { style.fg(theme.roles().accent_secondary) }
}

/// Field label, marking errors in the error color.
pub fn label_style<T: Theme + ?Sized>(theme: &T, flagged: bool) -> Style {
    if flagged {
        theme.status_error().add_modifier(Modifier::BOLD)
    } else {
        theme.text_primary_style()
    }
}

/// Current field value; empty values are drawn with the muted placeholder style.
pub fn value_style<T: Theme + ?Sized>(theme: &T, empty: bool, editing: bool) -> Style {
    if editing {
        return Style::default()
            .fg(theme.roles().text_secondary)
            .add_modifier(Modifier::UNDERLINED);
    }
    if empty { theme.text_muted_style() } else { theme.accent_primary_style() }
}

/// Navigation highlight. Inputs get a filled background; containers only
/// a bold accent so their nested rows stay readable.
pub fn highlight_style<T: Theme + ?Sized>(theme: &T, filled: bool) -> Style {
    if filled {
        Style::default()
            .bg(theme.roles().highlight_bg)
            .fg(theme.roles().selection_fg)
            .add_modifier(Modifier::BOLD)
    } else {
        theme.status_warning().add_modifier(Modifier::BOLD)
    }
}

/// Hint bar key caps.
pub fn key_hint_style<T: Theme + ?Sized>(theme: &T) -> Style {
    theme.accent_emphasis_style()
}

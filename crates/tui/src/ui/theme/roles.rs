use std::fmt::Debug;

use ratatui::style::{Color, Modifier, Style};

/// Colors the form draws with, named by what they mark rather than by hue.
#[derive(Debug, Clone)]
pub struct ThemeRoles {
    /// Panel fill behind the form, info and activity panes.
    pub surface: Color,
    pub border: Color,
    /// Border of the pane that owns keyboard input.
    pub focus: Color,

    /// Field values.
    pub text: Color,
    /// Field labels and item card titles.
    pub text_secondary: Color,
    /// Placeholders, empty values and hints.
    pub text_muted: Color,

    /// Section headers.
    pub accent_primary: Color,
    /// Collapsed containers.
    pub accent_secondary: Color,

    pub info: Color,
    pub warning: Color,
    /// Error markers and messages.
    pub error: Color,

    pub selection_bg: Color,
    pub selection_fg: Color,
    /// Background of a field while a navigation highlight is active.
    pub highlight_bg: Color,
}

/// Semantic styles built from [`ThemeRoles`].
pub trait Theme: Send + Sync + Debug {
    fn roles(&self) -> &ThemeRoles;

    fn text_primary_style(&self) -> Style {
        Style::default().fg(self.roles().text)
    }
    fn text_secondary_style(&self) -> Style {
        Style::default().fg(self.roles().text_secondary)
    }
    fn text_muted_style(&self) -> Style {
        Style::default().fg(self.roles().text_muted)
    }

    fn border_style(&self, focused: bool) -> Style {
        let roles = self.roles();
        Style::default().fg(if focused { roles.focus } else { roles.border })
    }

    /// Row under the list cursor.
    fn selection_style(&self) -> Style {
        Style::default().fg(self.roles().selection_fg).bg(self.roles().selection_bg)
    }

    fn status_info(&self) -> Style {
        Style::default().fg(self.roles().info)
    }
    fn status_warning(&self) -> Style {
        Style::default().fg(self.roles().warning)
    }
    fn status_error(&self) -> Style {
        Style::default().fg(self.roles().error)
    }

    fn accent_primary_style(&self) -> Style {
        Style::default().fg(self.roles().accent_primary)
    }
    /// Bold accent for section titles.
    fn accent_emphasis_style(&self) -> Style {
        self.accent_primary_style().add_modifier(Modifier::BOLD)
    }
}

//! Interaction state of the form: which containers are open, which row is
//! selected, the draft being edited and the active navigation highlight.

use std::collections::HashSet;

use ichub_util::field_path::ancestor_paths;
use ratatui::widgets::ListState;
use serde_json::Value;

use super::registry::ContainerKind;
use crate::ui::components::common::TextInputState;

/// Highlight left on a field by navigation until it is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub path: String,
    pub kind: ContainerKind,
}

/// In-progress edit of one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    /// Data path being edited.
    pub path: String,
    pub draft: TextInputState,
    /// Stored value when editing started, restored on cancel.
    pub original: Option<Value>,
    /// Draft currently fails to parse (numeric controls only).
    pub invalid: bool,
}

#[derive(Debug, Default)]
pub struct FormState {
    expanded_section: Option<String>,
    /// Object groups and arrays the user closed. Groups default to open.
    collapsed_groups: HashSet<String>,
    /// Array item cards the user closed.
    collapsed_items: HashSet<String>,
    /// Data path of the focused field.
    focused: Option<String>,
    pub editor: Option<Editor>,
    pub highlight: Option<Highlight>,
    pub list_state: ListState,
}

impl FormState {
    pub fn expanded_section(&self) -> Option<&str> {
        self.expanded_section.as_deref()
    }

    /// Opens `section`, closing whichever section was open before.
    pub fn expand_section(&mut self, section: &str) {
        self.expanded_section = Some(section.to_string());
    }

    pub fn toggle_section(&mut self, section: &str) {
        if self.expanded_section() == Some(section) {
            self.expanded_section = None;
        } else {
            self.expand_section(section);
        }
    }

    pub fn is_group_expanded(&self, path: &str) -> bool {
        !self.collapsed_groups.contains(path)
    }

    pub fn toggle_group(&mut self, path: &str) {
        if !self.collapsed_groups.remove(path) {
            self.collapsed_groups.insert(path.to_string());
        }
    }

    pub fn is_item_expanded(&self, path: &str) -> bool {
        !self.collapsed_items.contains(path)
    }

    pub fn toggle_item(&mut self, path: &str) {
        if !self.collapsed_items.remove(path) {
            self.collapsed_items.insert(path.to_string());
        }
    }

    /// Opens every group and item card on the way to `path`.
    pub fn reveal_ancestors(&mut self, path: &str) {
        for ancestor in ancestor_paths(path) {
            self.collapsed_groups.remove(&ancestor);
            self.collapsed_items.remove(&ancestor);
        }
    }

    /// Drops open/closed memory for item cards below an array whose items
    /// shifted, so indices do not inherit a neighbour's state.
    pub fn forget_items_under(&mut self, array_path: &str) {
        let prefix = format!("{array_path}[");
        self.collapsed_items.retain(|path| !path.starts_with(&prefix));
        self.collapsed_groups.retain(|path| !path.starts_with(&prefix));
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Moves focus to `path`. Returns true when focus actually changed.
    pub fn set_focused(&mut self, path: Option<String>) -> bool {
        if self.focused == path {
            return false;
        }
        self.focused = path;
        true
    }

    pub fn selected(&self) -> usize {
        self.list_state.selected().unwrap_or(0)
    }

    pub fn select(&mut self, index: usize) {
        self.list_state.select(Some(index));
    }

    pub fn clamp_selection(&mut self, row_count: usize) {
        if row_count == 0 {
            self.list_state.select(None);
        } else if self.selected() >= row_count {
            self.select(row_count - 1);
        } else if self.list_state.selected().is_none() {
            self.select(0);
        }
    }

    pub fn is_editing(&self, path: &str) -> bool {
        self.editor.as_ref().is_some_and(|editor| editor.path == path)
    }

    pub fn is_highlighted(&self, path: &str) -> bool {
        self.highlight.as_ref().is_some_and(|highlight| highlight.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_section_is_open_at_a_time() {
        let mut state = FormState::default();
        state.toggle_section("Identification");
        assert_eq!(state.expanded_section(), Some("Identification"));
        state.toggle_section("Materials");
        assert_eq!(state.expanded_section(), Some("Materials"));
        state.toggle_section("Materials");
        assert_eq!(state.expanded_section(), None);
    }

    #[test]
    fn groups_default_open_and_reveal_reopens_ancestors() {
        let mut state = FormState::default();
        assert!(state.is_group_expanded("physical"));
        state.toggle_group("physical");
        state.toggle_item("materialList[0]");
        assert!(!state.is_group_expanded("physical"));

        state.reveal_ancestors("physical.weight.value");
        state.reveal_ancestors("materialList[0].name");
        assert!(state.is_group_expanded("physical"));
        assert!(state.is_item_expanded("materialList[0]"));
    }

    #[test]
    fn forgetting_items_keeps_unrelated_state() {
        let mut state = FormState::default();
        state.toggle_item("materialList[1]");
        state.toggle_group("materialList[1].origin");
        state.toggle_group("physical");
        state.forget_items_under("materialList");
        assert!(state.is_item_expanded("materialList[1]"));
        assert!(state.is_group_expanded("materialList[1].origin"));
        assert!(!state.is_group_expanded("physical"));
    }
}

//! Render-time registry of field containers.
//!
//! The renderer records every row it lays out, keyed by data path, so field
//! navigation can find a target without searching the rendered tree.

use std::collections::HashMap;

use ichub_util::normalize_path;
use ratatui::layout::Rect;

/// What kind of container a registered row is.
///
/// Drives the highlight style and whether navigation moves focus onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Input,
    ArrayHeader,
    ObjectGroup,
    ArrayItem,
}

impl ContainerKind {
    /// Only plain inputs receive focus after a navigation.
    pub fn takes_focus(self) -> bool {
        matches!(self, ContainerKind::Input)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredField {
    pub kind: ContainerKind,
    /// Row index in the visible row list.
    pub row: usize,
    /// Screen area from the last frame, if the row was on screen.
    pub area: Option<Rect>,
}

#[derive(Debug, Default)]
pub struct FieldRegistry {
    entries: HashMap<String, RegisteredField>,
    order: Vec<String>,
}

impl FieldRegistry {
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn register(&mut self, path: &str, kind: ContainerKind, row: usize) {
        if self
            .entries
            .insert(path.to_string(), RegisteredField { kind, row, area: None })
            .is_none()
        {
            self.order.push(path.to_string());
        }
    }

    pub fn set_area(&mut self, path: &str, area: Rect) {
        if let Some(entry) = self.entries.get_mut(path) {
            entry.area = Some(area);
        }
    }

    /// Finds the container for `key`.
    ///
    /// Exact data paths win; schema keys such as `materialList[item].name`
    /// fall back to the first registered row with the same normalized path.
    pub fn lookup(&self, key: &str) -> Option<(&str, &RegisteredField)> {
        if let Some((path, entry)) = self.entries.get_key_value(key) {
            return Some((path.as_str(), entry));
        }
        let normalized = normalize_path(key);
        self.order
            .iter()
            .find(|path| normalize_path(path) == normalized)
            .and_then(|path| self.entries.get_key_value(path.as_str()))
            .map(|(path, entry)| (path.as_str(), entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_keys_resolve_to_first_concrete_row() {
        let mut registry = FieldRegistry::default();
        registry.register("materialList", ContainerKind::ArrayHeader, 3);
        registry.register("materialList[0]", ContainerKind::ArrayItem, 4);
        registry.register("materialList[0].name", ContainerKind::Input, 5);
        registry.register("materialList[1].name", ContainerKind::Input, 8);

        let (path, entry) = registry.lookup("materialList[item].name").expect("normalized match");
        assert_eq!(path, "materialList[0].name");
        assert_eq!(entry.row, 5);
        assert_eq!(registry.lookup("materialList[1].name").map(|(_, entry)| entry.row), Some(8));
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn areas_attach_to_registered_rows_only() {
        let mut registry = FieldRegistry::default();
        registry.register("name", ContainerKind::Input, 0);
        registry.set_area("name", Rect::new(1, 2, 30, 1));
        registry.set_area("ghost", Rect::new(0, 0, 1, 1));
        assert_eq!(registry.lookup("name").and_then(|(_, entry)| entry.area), Some(Rect::new(1, 2, 30, 1)));
        assert!(registry.lookup("ghost").is_none());
        assert!(registry.lookup("name").is_some_and(|(_, entry)| entry.kind.takes_focus()));
    }
}

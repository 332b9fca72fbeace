//! Per-path validation error state consumed by renderers.

use serde::{Deserialize, Serialize};

/// Error information attached to one field path.
///
/// `has_child_errors` is set on ancestors of an erroring path so collapsed
/// containers can flag "errors inside" without repeating the message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorState {
    pub has_error: bool,
    pub messages: Vec<String>,
    pub has_child_errors: bool,
}

impl ErrorState {
    /// Records a direct error message, ignoring duplicates.
    pub fn push_message(&mut self, message: &str) {
        self.has_error = true;
        if !self.messages.iter().any(|existing| existing == message) {
            self.messages.push(message.to_string());
        }
    }

    pub fn mark_child_errors(&mut self) {
        self.has_child_errors = true;
    }

    /// True when the field itself or anything beneath it is in error.
    pub fn is_flagged(&self) -> bool {
        self.has_error || self.has_child_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_message_deduplicates() {
        let mut state = ErrorState::default();
        state.push_message("is required");
        state.push_message("is required");
        assert!(state.has_error);
        assert_eq!(state.messages, vec!["is required".to_string()]);
    }
}

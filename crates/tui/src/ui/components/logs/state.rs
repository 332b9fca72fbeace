use std::collections::VecDeque;

use ratatui::widgets::ListState;

/// Entries kept in memory; older ones are dropped first.
pub const MAX_LOG_ENTRIES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One line in the activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct LogsState {
    pub entries: VecDeque<LogEntry>,
    pub list_state: ListState,
}

impl LogsState {
    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        if self.entries.len() == MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            level,
            message: message.into(),
        });
        // Follow the tail.
        self.list_state.select(Some(self.entries.len() - 1));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_entries_are_dropped_at_capacity() {
        let mut logs = LogsState::default();
        for index in 0..MAX_LOG_ENTRIES + 3 {
            logs.info(format!("entry {index}"));
        }
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs.entries.front().map(|entry| entry.message.as_str()), Some("entry 3"));
        assert_eq!(logs.list_state.selected(), Some(MAX_LOG_ENTRIES - 1));
    }
}

use serde_json::Value;

/// Messages that can be sent to update the application state.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Periodic UI tick
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// Step of an in-flight field navigation
    Navigation(NavigationEvent),
}

/// Steps emitted by a field navigation task, in order.
///
/// `generation` identifies the navigation that produced the event so stale
/// events from a superseded navigation can be ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// Expand the section that owns the target field.
    ExpandSection { generation: u64, section: String },
    /// Scroll the target into view and apply the highlight.
    Reveal { generation: u64, key: String },
    /// Remove the highlight applied by `Reveal`.
    ClearHighlight { generation: u64, key: String },
    /// The navigation has completed.
    Finished { generation: u64 },
}

impl NavigationEvent {
    pub fn generation(&self) -> u64 {
        match self {
            NavigationEvent::ExpandSection { generation, .. }
            | NavigationEvent::Reveal { generation, .. }
            | NavigationEvent::ClearHighlight { generation, .. }
            | NavigationEvent::Finished { generation } => *generation,
        }
    }
}

/// Side effects reported by the form to its host.
///
/// These are the whole surface between the form core and the page that owns
/// the data: the form proposes transitions, the host decides what to keep.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The user changed a value; `data` is the complete proposed form data.
    DataChanged { data: Value, key: String },
    /// A field received focus.
    FieldFocused(String),
    /// The focused field lost focus.
    FieldBlurred,
    /// The documentation affordance of a field was activated.
    InfoRequested(String),
    /// A navigation sequence started.
    NavigationStarted,
    /// A navigation sequence ended (completed, cancelled or no-op).
    NavigationFinished,
    /// Ask the host to navigate to a field.
    NavigateTo(String),
    /// Toggle the required-only field filter.
    ToggleRequiredOnly,
    /// Persist the current data.
    Save,
    /// Leave the form.
    Quit,
}

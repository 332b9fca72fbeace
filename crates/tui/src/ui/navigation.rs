//! Field navigation: bring a field into view and highlight it briefly.
//!
//! A navigation is a short sequence of steps separated by timers:
//! expand the owning section (only when it is not already open), wait for the
//! layout to settle, reveal and highlight the field, wait, then clear the
//! highlight. The sequence runs as a tokio task that reports each step over a
//! channel; the UI loop applies the steps. Starting another navigation or
//! dropping the controller aborts the task in flight, and every event carries
//! a generation number so steps queued by an aborted task are ignored.

use std::time::Duration;

use ichub_types::{FieldDescriptor, NavigationEvent};
use ichub_util::field_path::{is_descendant_path, root_segment};
use ichub_util::normalize_path;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

/// Finds the section that owns `key`.
///
/// Tries an exact descriptor key, then an index-insensitive match, then the
/// deepest descriptor containing the key (array items and object members),
/// and finally the descriptor named by the key's root segment.
pub fn resolve_section(fields: &[FieldDescriptor], key: &str) -> Option<String> {
    if let Some(field) = fields.iter().find(|field| field.key == key) {
        return Some(field.section.clone());
    }
    let normalized = normalize_path(key);
    if let Some(field) = fields.iter().find(|field| normalize_path(&field.key) == normalized) {
        return Some(field.section.clone());
    }
    if let Some(field) = fields
        .iter()
        .filter(|field| is_descendant_path(key, &field.key))
        .max_by_key(|field| field.key.len())
    {
        return Some(field.section.clone());
    }
    let root = root_segment(key)?;
    fields
        .iter()
        .find(|field| field.key == root)
        .map(|field| field.section.clone())
}

/// Aborts the wrapped task when dropped.
#[derive(Debug)]
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Debug)]
pub struct NavigationController {
    sender: UnboundedSender<NavigationEvent>,
    settle_delay: Duration,
    highlight_duration: Duration,
    generation: u64,
    active: Option<AbortOnDrop>,
}

impl NavigationController {
    pub fn new(sender: UnboundedSender<NavigationEvent>, settle_delay: Duration, highlight_duration: Duration) -> Self {
        Self {
            sender,
            settle_delay,
            highlight_duration,
            generation: 0,
            active: None,
        }
    }

    /// Starts navigating to `key`, cancelling any navigation in flight.
    ///
    /// `expand` names the section to open first; pass `None` when the owning
    /// section is already expanded. Returns the new generation.
    pub fn start(&mut self, key: &str, expand: Option<String>) -> u64 {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        debug!(%key, generation, expand = ?expand, "starting field navigation");

        let steps = NavigationSteps {
            sender: self.sender.clone(),
            generation,
            key: key.to_string(),
            expand,
            settle_delay: self.settle_delay,
            highlight_duration: self.highlight_duration,
        };
        self.active = Some(AbortOnDrop(tokio::spawn(steps.run())));
        generation
    }

    /// Aborts the navigation in flight, if any.
    pub fn cancel(&mut self) {
        if self.active.take().is_some() {
            debug!(generation = self.generation, "cancelled field navigation");
        }
    }

    /// True when `generation` belongs to the navigation in flight.
    pub fn is_current(&self, generation: u64) -> bool {
        self.active.is_some() && generation == self.generation
    }

    /// Marks the navigation identified by `generation` as done.
    pub fn finish(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.active = None;
            return true;
        }
        false
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

struct NavigationSteps {
    sender: UnboundedSender<NavigationEvent>,
    generation: u64,
    key: String,
    expand: Option<String>,
    settle_delay: Duration,
    highlight_duration: Duration,
}

impl NavigationSteps {
    async fn run(self) {
        let generation = self.generation;
        if let Some(section) = self.expand {
            if self.sender.send(NavigationEvent::ExpandSection { generation, section }).is_err() {
                return;
            }
            sleep(self.settle_delay).await;
        }
        let reveal = NavigationEvent::Reveal {
            generation,
            key: self.key.clone(),
        };
        if self.sender.send(reveal).is_err() {
            return;
        }
        sleep(self.highlight_duration).await;
        let _ = self.sender.send(NavigationEvent::ClearHighlight {
            generation,
            key: self.key,
        });
        let _ = self.sender.send(NavigationEvent::Finished { generation });
    }
}

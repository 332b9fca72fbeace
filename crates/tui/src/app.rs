//! Application state for the form editor.
//!
//! `App` is the host of the form: it owns the document, the merged error
//! index and the form's interaction state, and applies the [`Effect`]s the
//! components report. Components read from it while rendering and mutate only
//! their own interaction state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ichub_engine::{
    ErrorIndex, HierarchyError, attribute_error, correlate_issues, filter_required, flatten_fields, interpret_tree,
    is_known_path, validate_form,
};
use ichub_types::{Effect, FieldDescriptor, NavigationEvent};
use ichub_util::field_path::is_descendant_path;
use ichub_util::{FormsConfig, normalize_path};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::ui::components::form::{FieldRegistry, FormLayout, FormRow, FormState, build_rows};
use crate::ui::components::logs::LogsState;
use crate::ui::navigation::{NavigationController, resolve_section};
use crate::ui::theme::{NordTheme, Theme};

const DEFAULT_TITLE: &str = "Industry Core Hub";

/// Inputs for one editing session.
#[derive(Debug, Clone, Default)]
pub struct FormSession {
    pub schema: Value,
    /// Initial form data; `null` starts from an empty object.
    pub data: Value,
    /// Validation messages reported by the backend for `data`.
    pub errors: Vec<String>,
    /// Where `Save` writes the document.
    pub output: Option<PathBuf>,
    pub required_only: bool,
}

/// Cross-cutting objects shared by every component.
pub struct SharedCtx {
    pub theme: Box<dyn Theme>,
    pub config: FormsConfig,
}

impl std::fmt::Debug for SharedCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCtx").field("config", &self.config).finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct App {
    pub ctx: SharedCtx,
    pub title: String,
    /// Full descriptor tree; object members stay nested.
    schema_tree: Vec<FieldDescriptor>,
    /// Descriptors currently shown (all, or required only), flattened.
    pub fields: Vec<FieldDescriptor>,
    pub layout: FormLayout,
    pub data: Value,
    /// Backend messages still considered current.
    external_errors: Vec<String>,
    pub errors: ErrorIndex,
    pub required_only: bool,
    output: Option<PathBuf>,
    pub form: FormState,
    pub registry: FieldRegistry,
    /// Rows from the last layout pass.
    pub rows: Vec<FormRow>,
    pub navigation: NavigationController,
    pub logs: LogsState,
    /// Field whose documentation was explicitly requested.
    pub info_key: Option<String>,
    /// Position in the error list for "next error".
    pub error_cursor: usize,
    /// Data changed since the last save.
    pub dirty: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: FormSession, config: FormsConfig, navigation_events: UnboundedSender<NavigationEvent>) -> Result<Self> {
        let schema_tree = interpret_tree(&session.schema).context("interpreting the form schema")?;
        let title = session
            .schema
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TITLE)
            .to_string();
        let data = match session.data {
            Value::Null => Value::Object(Default::default()),
            data => data,
        };
        let navigation = NavigationController::new(navigation_events, config.settle_delay(), config.highlight_duration());

        let mut app = Self {
            ctx: SharedCtx {
                theme: Box::new(NordTheme::new()),
                config,
            },
            title,
            schema_tree,
            fields: Vec::new(),
            layout: FormLayout::default(),
            data,
            external_errors: session.errors,
            errors: ErrorIndex::default(),
            required_only: session.required_only,
            output: session.output,
            form: FormState::default(),
            registry: FieldRegistry::default(),
            rows: Vec::new(),
            navigation,
            logs: LogsState::default(),
            info_key: None,
            error_cursor: 0,
            dirty: false,
            should_quit: false,
        };
        app.apply_field_filter().context("laying out form sections")?;
        if let Some(first) = app.layout.section_names().next().map(str::to_string) {
            app.form.expand_section(&first);
        }
        app.revalidate();
        app.refresh_rows();
        info!(fields = app.fields.len(), title = %app.title, "form session ready");
        Ok(app)
    }

    /// Rebuilds the visible descriptor list and section layout.
    fn apply_field_filter(&mut self) -> Result<(), HierarchyError> {
        let fields = if self.required_only {
            flatten_fields(&filter_required(&self.schema_tree))
        } else {
            flatten_fields(&self.schema_tree)
        };
        self.layout = FormLayout::build(&fields)?;
        self.fields = fields;
        Ok(())
    }

    /// Re-runs the layout pass and re-registers every visible container.
    pub fn refresh_rows(&mut self) {
        self.rows = build_rows(&self.layout, &self.data, &self.form);
        self.registry.clear();
        for (index, row) in self.rows.iter().enumerate() {
            if let Some(kind) = row.container_kind() {
                self.registry.register(&row.path, kind, index);
            }
        }
        self.form.clamp_selection(self.rows.len());
    }

    /// Local validation of the shown fields merged with the backend messages
    /// still in effect. Backend messages about fields that are not shown go
    /// to the unattributed bucket.
    pub fn revalidate(&mut self) {
        let issues = validate_form(&self.fields, &self.data);
        let mut errors = correlate_issues(&issues);
        for raw in &self.external_errors {
            errors.record_raw(raw, |path| is_known_path(&self.fields, path));
        }
        self.errors = errors;
        debug!(
            attributed = self.errors.error_paths().count(),
            unattributed = self.errors.unattributed().len(),
            "revalidated form"
        );
    }

    /// Drops backend messages about `key` or anything below it.
    fn forget_external_errors(&mut self, key: &str) {
        let changed = normalize_path(key);
        self.external_errors.retain(|raw| match attribute_error(raw) {
            Some(attributed) => {
                let path = normalize_path(&attributed.path);
                path != changed && !is_descendant_path(&path, &changed)
            }
            None => true,
        });
    }

    /// Error paths worth visiting: shown fields only, without the
    /// index-stripped duplicates recorded next to concrete item paths.
    pub fn error_targets(&self) -> Vec<String> {
        let paths: Vec<&str> = self
            .errors
            .error_paths()
            .filter(|path| is_known_path(&self.fields, path))
            .collect();
        paths
            .iter()
            .filter(|path| {
                let normalized = normalize_path(path);
                normalized != **path || !paths.iter().any(|other| other != *path && normalize_path(other) == normalized)
            })
            .map(|path| path.to_string())
            .collect()
    }

    /// Descriptor for `key`, searching object members and array item fields.
    pub fn find_descriptor(&self, key: &str) -> Option<&FieldDescriptor> {
        fn search<'a>(fields: &'a [FieldDescriptor], key: &str) -> Option<&'a FieldDescriptor> {
            fields.iter().find_map(|field| {
                if field.key == key {
                    return Some(field);
                }
                search(field.children(), key)
            })
        }
        search(&self.schema_tree, key).or_else(|| {
            let normalized = normalize_path(key);
            fn search_normalized<'a>(fields: &'a [FieldDescriptor], normalized: &str) -> Option<&'a FieldDescriptor> {
                fields.iter().find_map(|field| {
                    if normalize_path(&field.key) == normalized {
                        return Some(field);
                    }
                    search_normalized(field.children(), normalized)
                })
            }
            search_normalized(&self.schema_tree, &normalized)
        })
    }

    fn navigate_to(&mut self, key: &str) -> Vec<Effect> {
        let Some(section) = resolve_section(&self.fields, key) else {
            warn!(%key, "no section owns the navigation target");
            self.logs.warn(format!("Cannot navigate to {key}: field not shown"));
            return Vec::new();
        };
        let expand = (self.form.expanded_section() != Some(section.as_str())).then_some(section);
        self.navigation.start(key, expand);
        vec![Effect::NavigationStarted]
    }

    fn save(&mut self) {
        let Some(path) = self.output.clone() else {
            self.logs.warn("No output file configured; start with --output to save");
            return;
        };
        let written = serde_json::to_string_pretty(&self.data)
            .context("serializing form data")
            .and_then(|text| std::fs::write(&path, text + "\n").with_context(|| format!("writing {}", path.display())));
        match written {
            Ok(()) => {
                self.dirty = false;
                info!(path = %path.display(), "saved form data");
                self.logs.info(format!("Saved to {}", path.display()));
            }
            Err(error) => {
                warn!(error = %format!("{error:#}"), "save failed");
                self.logs.error(format!("Save failed: {error:#}"));
            }
        }
    }

    /// Applies one effect; returns follow-up effects.
    pub fn handle_effect(&mut self, effect: Effect) -> Vec<Effect> {
        match effect {
            Effect::DataChanged { data, key } => {
                debug!(%key, "form data changed");
                self.data = data;
                self.dirty = true;
                self.forget_external_errors(&key);
                self.revalidate();
                self.refresh_rows();
                Vec::new()
            }
            Effect::FieldFocused(key) => {
                debug!(%key, "field focused");
                self.info_key = None;
                Vec::new()
            }
            Effect::FieldBlurred => {
                debug!("field blurred");
                Vec::new()
            }
            Effect::InfoRequested(key) => {
                self.info_key = Some(key);
                Vec::new()
            }
            Effect::NavigationStarted => {
                debug!("navigation started");
                Vec::new()
            }
            Effect::NavigationFinished => {
                debug!("navigation finished");
                Vec::new()
            }
            Effect::NavigateTo(key) => self.navigate_to(&key),
            Effect::ToggleRequiredOnly => {
                self.required_only = !self.required_only;
                match self.apply_field_filter() {
                    Ok(()) => {
                        let label = if self.required_only { "required fields only" } else { "all fields" };
                        self.logs.info(format!("Showing {label}"));
                        self.error_cursor = 0;
                        self.revalidate();
                    }
                    Err(error) => {
                        self.required_only = !self.required_only;
                        warn!(%error, "cannot change field filter");
                        self.logs.error(format!("Cannot change field filter: {error}"));
                    }
                }
                self.refresh_rows();
                Vec::new()
            }
            Effect::Save => {
                self.save();
                Vec::new()
            }
            Effect::Quit => {
                self.should_quit = true;
                Vec::new()
            }
        }
    }

    /// Applies effects in order, including any follow-ups they produce.
    pub fn apply_effects(&mut self, effects: Vec<Effect>) {
        let mut queue: std::collections::VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            queue.extend(self.handle_effect(effect));
        }
    }
}

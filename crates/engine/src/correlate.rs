//! Error correlator: maps validation error strings onto field paths.
//!
//! Validators report errors as human-readable sentences ("name is required",
//! "materialList[0].share must be less than or equal to 100"). Attribution is
//! done by an ordered list of matchers; the first one that recognizes a field
//! reference wins. Strings no matcher recognizes are kept in an explicit
//! `unattributed` bucket for the host to show elsewhere.
//!
//! Each attributed error is indexed under its exact path and under its
//! normalized (index-stripped) path, and every ancestor of either is marked
//! with `has_child_errors` so collapsed containers can flag their contents.

use ichub_types::{ErrorState, FieldDescriptor};
use ichub_util::PathSegment;
use ichub_util::field_path::{ancestor_paths, is_descendant_path, normalize_path, parse_path};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::validate::ValidationIssue;

const PATH_PATTERN: &str = r"[A-Za-z_][\w-]*(?:\[(?:\d+|item)\])*(?:\.[A-Za-z_][\w-]*(?:\[(?:\d+|item)\])*)*";

/// Field reference recovered from an error string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributedError {
    pub path: String,
    /// Message with the field identifier removed.
    pub message: String,
}

struct ErrorMatcher {
    name: &'static str,
    regex: Regex,
}

// The quoted matcher runs first, so a sentence quoting any identifier is
// filed under that identifier even when another matcher would also apply.
static MATCHERS: Lazy<Vec<ErrorMatcher>> = Lazy::new(|| {
    let specs = [
        (
            "quoted",
            format!(r#"^(?P<before>.*?)['"`](?P<path>{PATH_PATTERN})['"`](?P<after>.*)$"#),
        ),
        ("required", format!(r"^(?P<path>{PATH_PATTERN})\s+(?P<message>is required\b.*)$")),
        ("must", format!(r"^(?P<path>{PATH_PATTERN})\s+(?P<message>must\b.*)$")),
    ];
    specs
        .into_iter()
        .filter_map(|(name, pattern)| match Regex::new(&pattern) {
            Ok(regex) => Some(ErrorMatcher { name, regex }),
            Err(error) => {
                tracing::error!(matcher = name, %error, "invalid error matcher pattern");
                None
            }
        })
        .collect()
});

/// Recovers the field path and stripped message from one error string.
pub fn attribute_error(raw: &str) -> Option<AttributedError> {
    let text = raw.trim();
    for matcher in MATCHERS.iter() {
        let Some(captures) = matcher.regex.captures(text) else {
            continue;
        };
        let Some(path) = captures.name("path").map(|m| m.as_str().to_string()) else {
            continue;
        };
        let message = match captures.name("message") {
            Some(message) => message.as_str().trim().to_string(),
            None => {
                let after = captures.name("after").map(|m| m.as_str().trim()).unwrap_or_default();
                let before = captures.name("before").map(|m| m.as_str().trim()).unwrap_or_default();
                if after.is_empty() { before.to_string() } else { after.to_string() }
            }
        };
        tracing::trace!(matcher = matcher.name, %path, "attributed validation error");
        return Some(AttributedError { path, message });
    }
    None
}

/// Per-path error index built from a list of error strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorIndex {
    entries: IndexMap<String, ErrorState>,
    unattributed: Vec<String>,
}

/// Builds an [`ErrorIndex`] from raw error strings.
pub fn correlate<S: AsRef<str>>(errors: &[S]) -> ErrorIndex {
    let mut index = ErrorIndex::default();
    for raw in errors {
        index.record_raw(raw.as_ref(), |_| true);
    }
    index
}

/// True when `path` names one of `fields` or one of their nested members,
/// comparing index-stripped forms so `list[3].name` matches `list[item].name`.
pub fn is_known_path(fields: &[FieldDescriptor], path: &str) -> bool {
    let normalized = normalize_path(path);
    fn walk(fields: &[FieldDescriptor], normalized: &str) -> bool {
        fields
            .iter()
            .any(|field| normalize_path(&field.key) == normalized || walk(field.children(), normalized))
    }
    !normalized.is_empty() && walk(fields, &normalized)
}

/// Builds an [`ErrorIndex`] from structured issues, skipping string matching.
pub fn correlate_issues(issues: &[ValidationIssue]) -> ErrorIndex {
    let mut index = ErrorIndex::default();
    for issue in issues {
        index.record(&issue.path, &issue.message);
    }
    index
}

impl ErrorIndex {
    /// Attributes one raw error string. Strings no matcher recognizes, or
    /// whose path `owns` rejects, go to the unattributed bucket verbatim.
    pub fn record_raw(&mut self, raw: &str, owns: impl Fn(&str) -> bool) {
        match attribute_error(raw) {
            Some(attributed) if owns(&attributed.path) => self.record(&attributed.path, &attributed.message),
            Some(attributed) => {
                tracing::debug!(path = %attributed.path, "error names no known field");
                self.unattributed.push(raw.trim().to_string());
            }
            None => self.unattributed.push(raw.trim().to_string()),
        }
    }

    /// Records a direct error at `path`, its normalized form and the
    /// child-error flag on every ancestor.
    pub fn record(&mut self, path: &str, message: &str) {
        self.entries.entry(path.to_string()).or_default().push_message(message);
        let normalized = normalize_path(path);
        if normalized != path && !normalized.is_empty() {
            self.entries.entry(normalized.clone()).or_default().push_message(message);
        }

        for ancestor in ancestor_paths(path).into_iter().chain(ancestor_paths(&normalized)) {
            self.entries.entry(ancestor).or_default().mark_child_errors();
        }
    }

    /// Raw entry for a path, without any matching policy.
    pub fn get(&self, path: &str) -> Option<&ErrorState> {
        self.entries.get(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.unattributed.is_empty()
    }

    /// Errors that could not be attributed to any field.
    pub fn unattributed(&self) -> &[String] {
        &self.unattributed
    }

    /// Paths carrying direct errors, in first-reported order.
    pub fn error_paths(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, state)| state.has_error)
            .map(|(path, _)| path.as_str())
    }

    /// Error state for a rendered field.
    ///
    /// `data_path` is the concrete path being rendered and `schema_key` the
    /// descriptor key (which may contain `[item]`). Direct messages come from
    /// the first of: exact data path, normalized data path, schema key,
    /// normalized schema key. When the data path holds concrete indices only
    /// the exact match applies, so an error on one array item does not bleed
    /// into its siblings. Child errors are flagged from ancestor marks or by
    /// containment of any erroring path under the field's path.
    pub fn state_for(&self, data_path: &str, schema_key: &str) -> ErrorState {
        let candidates = Self::candidate_paths(data_path, schema_key);

        let mut state = ErrorState::default();
        if let Some(direct) = candidates
            .iter()
            .filter_map(|path| self.entries.get(path))
            .find(|entry| entry.has_error)
        {
            state.has_error = true;
            state.messages = direct.messages.clone();
        }

        let flagged_by_ancestry = candidates
            .iter()
            .filter_map(|path| self.entries.get(path))
            .any(|entry| entry.has_child_errors);
        let flagged_by_containment = self
            .error_paths()
            .any(|path| candidates.iter().any(|candidate| is_descendant_path(path, candidate)));
        state.has_child_errors = flagged_by_ancestry || flagged_by_containment;
        state
    }

    /// Error state for a descriptor independent of any concrete item.
    pub fn state_for_key(&self, schema_key: &str) -> ErrorState {
        self.state_for(schema_key, schema_key)
    }

    fn candidate_paths(data_path: &str, schema_key: &str) -> Vec<String> {
        let mut candidates = vec![data_path.to_string()];
        let concrete = parse_path(data_path)
            .iter()
            .any(|segment| matches!(segment, PathSegment::Index(_)));
        if concrete {
            return candidates;
        }
        for candidate in [normalize_path(data_path), schema_key.to_string(), normalize_path(schema_key)] {
            if !candidate.is_empty() && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }
}

//! Dotted/bracketed path access into nested form data.
//!
//! Paths look like `materialList[0].name`: dot-separated keys, each optionally
//! followed by one or more bracketed array indices. Schema keys may carry a
//! generic `[item]` placeholder instead of a concrete index; those segments can
//! be normalized away or rebased onto a concrete data path but cannot be read
//! or written directly.
//!
//! The accessor never consults a schema. Writes are pure structural surgery:
//! missing containers are created from the path syntax, and primitives that sit
//! where a container is needed are replaced.

use std::fmt::Write as _;

use serde_json::{Map, Value};
use tracing::debug;

/// One addressable step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
    /// Non-numeric bracket content such as `item`.
    Placeholder(String),
}

/// Splits a path into segments. Parsing is lenient: an unclosed bracket is
/// kept as part of the key text and empty segments are skipped.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut pending = String::new();
    let mut chars = path.trim().chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => flush_key(&mut pending, &mut segments),
            '[' => {
                let mut inner = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(next);
                }
                if !closed {
                    pending.push('[');
                    pending.push_str(&inner);
                    continue;
                }
                flush_key(&mut pending, &mut segments);
                let inner = inner.trim();
                match inner.parse::<usize>() {
                    Ok(index) => segments.push(PathSegment::Index(index)),
                    Err(_) => segments.push(PathSegment::Placeholder(inner.to_string())),
                }
            }
            other => pending.push(other),
        }
    }
    flush_key(&mut pending, &mut segments);
    segments
}

fn flush_key(pending: &mut String, segments: &mut Vec<PathSegment>) {
    let key = pending.trim();
    if !key.is_empty() {
        segments.push(PathSegment::Key(key.to_string()));
    }
    pending.clear();
}

/// Renders segments back into canonical path syntax.
pub fn render_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
            PathSegment::Placeholder(name) => {
                let _ = write!(out, "[{name}]");
            }
        }
    }
    out
}

/// Reads the value at `path`. Returns `None` when the path is missing or runs
/// through a value of the wrong shape.
pub fn get_value<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in parse_path(path) {
        current = match (&segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Returns a copy of `root` with `value` written at `path`; `root` itself is
/// left untouched.
pub fn set_value(root: &Value, path: &str, value: Value) -> Value {
    with_value(root.clone(), path, value)
}

/// Owned variant of [`set_value`] for callers that already hold the data.
pub fn with_value(mut root: Value, path: &str, value: Value) -> Value {
    let segments = parse_path(path);
    if segments.iter().any(|segment| matches!(segment, PathSegment::Placeholder(_))) {
        debug!(path, "ignoring write through a placeholder segment");
        return root;
    }
    assign(&mut root, &segments, value);
    root
}

fn assign(target: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return;
    };

    match head {
        PathSegment::Key(key) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                let slot = map.entry(key.clone()).or_insert(Value::Null);
                assign(slot, rest, value);
            }
        }
        PathSegment::Index(index) => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            if let Value::Array(items) = target {
                if items.len() <= *index {
                    items.resize(index + 1, Value::Null);
                }
                assign(&mut items[*index], rest, value);
            }
        }
        PathSegment::Placeholder(_) => {}
    }
}

/// Strips array indices and placeholders: `items[2].name` becomes `items.name`.
pub fn normalize_path(path: &str) -> String {
    let keys = parse_path(path)
        .into_iter()
        .filter(|segment| matches!(segment, PathSegment::Key(_)))
        .collect::<Vec<_>>();
    render_path(&keys)
}

/// Every proper prefix of `path`, nearest first: `a.b[0].c` yields
/// `a.b[0]`, `a.b`, `a`.
pub fn ancestor_paths(path: &str) -> Vec<String> {
    let segments = parse_path(path);
    (1..segments.len()).rev().map(|len| render_path(&segments[..len])).collect()
}

/// True when `candidate` lies strictly beneath `parent`
/// (`parent.` or `parent[` prefix).
pub fn is_descendant_path(candidate: &str, parent: &str) -> bool {
    if parent.is_empty() {
        return !candidate.is_empty();
    }
    candidate
        .strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
}

/// Moves `key` from one prefix to another, e.g. rebasing the schema key
/// `materialList[item].name` from `materialList[item]` onto the concrete data
/// path `materialList[3]`. Returns `None` when `key` is not under `from`.
pub fn rebase_path(key: &str, from: &str, to: &str) -> Option<String> {
    if key == from {
        return Some(to.to_string());
    }
    if !is_descendant_path(key, from) {
        return None;
    }
    Some(format!("{to}{}", &key[from.len()..]))
}

/// Appends a child key to a parent path.
pub fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

/// Appends an array index to a path.
pub fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// First key segment of the path, used as a coarse fallback when nothing more
/// specific matches.
pub fn root_segment(path: &str) -> Option<String> {
    parse_path(path).into_iter().find_map(|segment| match segment {
        PathSegment::Key(key) => Some(key),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_keys_indices_and_placeholders() {
        assert_eq!(
            parse_path("materialList[0].name"),
            vec![
                PathSegment::Key("materialList".into()),
                PathSegment::Index(0),
                PathSegment::Key("name".into()),
            ]
        );
        assert_eq!(
            parse_path("materialList[item].name"),
            vec![
                PathSegment::Key("materialList".into()),
                PathSegment::Placeholder("item".into()),
                PathSegment::Key("name".into()),
            ]
        );
        assert_eq!(parse_path("grid[1][2]").len(), 3);
        assert_eq!(parse_path("broken[1"), vec![PathSegment::Key("broken[1".into())]);
        assert!(parse_path("").is_empty());
    }

    #[test]
    fn set_then_get_round_trips() {
        let root = json!({ "name": "part" });
        let cases = [
            ("name", json!("renamed")),
            ("materialList[2].name", json!("steel")),
            ("nested.deep.value", json!(42)),
            ("matrix[1][0]", json!(true)),
            ("tags[0]", json!("")),
        ];
        for (path, value) in cases {
            let updated = set_value(&root, path, value.clone());
            assert_eq!(get_value(&updated, path), Some(&value), "path {path}");
        }
    }

    #[test]
    fn set_does_not_mutate_input_and_preserves_siblings() {
        let root = json!({
            "a": { "b": 1, "c": [1, 2] },
            "d": "keep"
        });
        let snapshot = root.clone();
        let updated = set_value(&root, "a.c[1]", json!(9));

        assert_eq!(root, snapshot);
        assert_eq!(updated["a"]["b"], json!(1));
        assert_eq!(updated["d"], json!("keep"));
        assert_eq!(updated["a"]["c"], json!([1, 9]));
    }

    #[test]
    fn set_creates_containers_from_path_syntax() {
        let updated = set_value(&json!({}), "materialList[1].name", json!("x"));
        assert_eq!(updated, json!({ "materialList": [null, { "name": "x" }] }));
    }

    #[test]
    fn set_overwrites_primitives_in_the_way() {
        let root = json!({ "a": "scalar", "list": 3 });
        let updated = set_value(&root, "a.b", json!(1));
        assert_eq!(updated["a"], json!({ "b": 1 }));
        let updated = set_value(&updated, "list[0]", json!("first"));
        assert_eq!(updated["list"], json!(["first"]));
    }

    #[test]
    fn get_returns_none_on_shape_mismatch() {
        let root = json!({ "a": "scalar", "items": [{ "name": "x" }] });
        assert!(get_value(&root, "a.b").is_none());
        assert!(get_value(&root, "items.name").is_none());
        assert!(get_value(&root, "items[4]").is_none());
        assert!(get_value(&root, "items[item].name").is_none());
        assert_eq!(get_value(&root, ""), Some(&root));
    }

    #[test]
    fn writes_through_placeholders_are_ignored() {
        let root = json!({ "items": [] });
        assert_eq!(set_value(&root, "items[item].name", json!("x")), root);
    }

    #[test]
    fn normalizes_and_lists_ancestors() {
        assert_eq!(normalize_path("items[2].name"), "items.name");
        assert_eq!(normalize_path("materialList[item].name"), "materialList.name");
        assert_eq!(normalize_path("plain.path"), "plain.path");
        assert_eq!(ancestor_paths("a.b[0].c"), vec!["a.b[0]", "a.b", "a"]);
        assert!(ancestor_paths("single").is_empty());
    }

    #[test]
    fn descendant_and_rebase_helpers() {
        assert!(is_descendant_path("items[0].name", "items"));
        assert!(is_descendant_path("address.city", "address"));
        assert!(!is_descendant_path("addressLine", "address"));
        assert!(!is_descendant_path("address", "address"));
        assert_eq!(
            rebase_path("materialList[item].name", "materialList[item]", "materialList[3]"),
            Some("materialList[3].name".to_string())
        );
        assert_eq!(rebase_path("other.name", "materialList[item]", "materialList[3]"), None);
        assert_eq!(root_segment("materialList[0].name"), Some("materialList".to_string()));
    }
}

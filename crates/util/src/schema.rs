//! Local `$ref` resolution for form schemas.
//!
//! Form schemas may reference shared definitions (`#/$defs/Address`). The
//! helpers here follow such pointers against the schema root while bounding
//! recursion depth and refusing to re-enter a reference already on the active
//! path, so self-referential schemas terminate.

use std::collections::HashSet;

use serde_json::{Map, Value};

const MAX_SCHEMA_RESOLUTION_DEPTH: usize = 64;

/// Tracks the active resolution path while walking a schema.
#[derive(Debug, Default)]
pub struct SchemaResolutionContext {
    depth: usize,
    visited_references: HashSet<String>,
}

impl SchemaResolutionContext {
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Returns the `$ref` pointer of a schema node, if any.
pub fn extract_schema_reference(schema: &Value) -> Option<&str> {
    schema.get("$ref").and_then(Value::as_str)
}

fn normalize_reference(reference: &str) -> String {
    reference.strip_prefix('#').unwrap_or(reference).to_string()
}

/// Follows a `$ref` (possibly chained) to the object that defines the node.
/// Non-reference nodes resolve to themselves; dangling pointers to `None`.
pub fn resolve_schema_map<'a>(schema: &'a Value, root: &'a Value) -> Option<&'a Map<String, Value>> {
    let mut current = schema;
    let mut seen = HashSet::new();
    while let Some(reference) = extract_schema_reference(current) {
        let pointer = normalize_reference(reference);
        if !seen.insert(pointer.clone()) {
            return None;
        }
        current = root.pointer(&pointer)?;
    }
    current.as_object()
}

/// Runs `resolver` inside a resolution frame for `maybe_reference`.
///
/// Falls back when the depth limit is hit or when the reference is already
/// being resolved further up the stack.
pub fn with_resolution_frame<T, FResolver, FFallback>(
    context: &mut SchemaResolutionContext,
    maybe_reference: Option<&str>,
    fallback: FFallback,
    resolver: FResolver,
) -> T
where
    FResolver: FnOnce(&mut SchemaResolutionContext) -> T,
    FFallback: FnOnce() -> T,
{
    if context.depth >= MAX_SCHEMA_RESOLUTION_DEPTH {
        return fallback();
    }

    let normalized_reference = maybe_reference.map(normalize_reference);
    if let Some(reference) = normalized_reference.as_ref()
        && !context.visited_references.insert(reference.clone())
    {
        return fallback();
    }

    context.depth += 1;
    let result = resolver(context);
    context.depth -= 1;

    if let Some(reference) = normalized_reference {
        context.visited_references.remove(&reference);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_chained_references() {
        let root = json!({
            "$defs": {
                "Alias": { "$ref": "#/$defs/Address" },
                "Address": { "type": "object", "properties": { "city": { "type": "string" } } }
            }
        });
        let node = json!({ "$ref": "#/$defs/Alias" });
        let map = resolve_schema_map(&node, &root).expect("address resolves");
        assert_eq!(map.get("type"), Some(&json!("object")));
    }

    #[test]
    fn reference_cycles_resolve_to_none() {
        let root = json!({ "$defs": { "Loop": { "$ref": "#/$defs/Loop" } } });
        let node = json!({ "$ref": "#/$defs/Loop" });
        assert!(resolve_schema_map(&node, &root).is_none());
    }

    #[test]
    fn frame_refuses_reentrant_reference() {
        let mut context = SchemaResolutionContext::default();
        let nested = with_resolution_frame(
            &mut context,
            Some("#/$defs/Node"),
            || "fallback",
            |context| with_resolution_frame(context, Some("#/$defs/Node"), || "fallback", |_| "resolved"),
        );
        assert_eq!(nested, "fallback");
        assert_eq!(context.depth(), 0);
    }
}

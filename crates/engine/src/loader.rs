//! Reading schemas, form data and error lists from disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;

/// Loads a JSON or YAML document.
///
/// The extension picks the parser; unknown extensions try JSON first and
/// then YAML.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => serde_json::from_str(&content).with_context(|| format!("parse JSON {}", path.display())),
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).with_context(|| format!("parse YAML {}", path.display()))
        }
        _ => match serde_json::from_str(&content) {
            Ok(value) => Ok(value),
            Err(_) => serde_yaml::from_str(&content).with_context(|| format!("parse {} as JSON or YAML", path.display())),
        },
    }
}

/// Loads a list of validation error strings.
///
/// Accepts an array of strings or of `{ "path", "message" }` objects; the
/// latter are rendered as `path: message`.
pub fn load_error_list(path: &Path) -> Result<Vec<String>> {
    let document = load_document(path)?;
    error_list_from_value(&document).with_context(|| format!("read error list from {}", path.display()))
}

pub fn error_list_from_value(document: &Value) -> Result<Vec<String>> {
    let Some(entries) = document.as_array() else {
        bail!("expected an array of error messages");
    };
    let mut errors = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Value::String(text) => errors.push(text.clone()),
            Value::Object(map) => {
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .context("error object is missing 'message'")?;
                match map.get("path").and_then(Value::as_str).filter(|path| !path.is_empty()) {
                    Some(path) => errors.push(format!("{path}: {message}")),
                    None => errors.push(message.to_string()),
                }
            }
            other => bail!("unsupported error entry: {other}"),
        }
    }
    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_json_and_yaml_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let json_path = dir.path().join("schema.json");
        fs::write(&json_path, r#"{ "name": { "type": "string" } }"#).expect("write json");
        let yaml_path = dir.path().join("schema.yaml");
        fs::write(&yaml_path, "name:\n  type: string\n").expect("write yaml");

        assert_eq!(load_document(&json_path).expect("json"), json!({ "name": { "type": "string" } }));
        assert_eq!(load_document(&yaml_path).expect("yaml"), json!({ "name": { "type": "string" } }));
    }

    #[test]
    fn unknown_extension_falls_back_to_yaml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.txt");
        fs::write(&path, "count: 3\n").expect("write");
        assert_eq!(load_document(&path).expect("load"), json!({ "count": 3 }));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = load_document(Path::new("/definitely/not/here.json")).expect_err("missing");
        assert!(error.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn error_objects_render_with_path_prefix() {
        let errors = error_list_from_value(&json!([
            "name is required",
            { "path": "materialList[0].share", "message": "must be less than or equal to 100" },
            { "message": "Backend unavailable" }
        ]))
        .expect("errors");
        assert_eq!(
            errors,
            vec![
                "name is required".to_string(),
                "materialList[0].share: must be less than or equal to 100".to_string(),
                "Backend unavailable".to_string(),
            ]
        );
        assert!(error_list_from_value(&json!({ "oops": true })).is_err());
    }
}

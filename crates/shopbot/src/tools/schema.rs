//! Parameter schemas: reduction to Gemini's declaration subset, argument
//! validation, and call logging.

use serde_json::{Map, Value};
use tracing::{debug, info, trace};

/// Keywords Gemini accepts inside a function declaration's `parameters`.
const DECLARATION_KEYWORDS: [&str; 6] = ["type", "description", "properties", "required", "items", "enum"];

/// Reduce a full JSON Schema (as produced by
/// [`json_schema_for`](crate::json_schema_for)) to the OpenAPI subset Gemini
/// accepts in `functionDeclarations`.
///
/// Unsupported keywords (`$schema`, `title`, `format`, `minimum`,
/// `default`, ...) are dropped. A `type` array such as `["string", "null"]`
/// becomes `"type": "string", "nullable": true`. The root description is
/// removed; the declaration carries its own.
pub fn declaration_schema(full: &Value) -> Value {
    let mut out = sanitize(full);
    if let Value::Object(map) = &mut out {
        map.remove("description");
        if map.get("type").and_then(Value::as_str) == Some("object") {
            map.entry("properties").or_insert_with(|| Value::Object(Map::new()));
        }
    }
    out
}

fn sanitize(schema: &Value) -> Value {
    let Value::Object(src) = schema else {
        return schema.clone();
    };
    let mut out = Map::new();
    for key in DECLARATION_KEYWORDS {
        let Some(value) = src.get(key) else {
            continue;
        };
        match (key, value) {
            ("type", Value::Array(types)) => {
                let mut nullable = false;
                let mut first = None;
                for t in types.iter().filter_map(Value::as_str) {
                    if t == "null" {
                        nullable = true;
                    } else if first.is_none() {
                        first = Some(t);
                    }
                }
                if let Some(t) = first {
                    out.insert("type".into(), Value::String(t.to_string()));
                }
                if nullable {
                    out.insert("nullable".into(), Value::Bool(true));
                }
            }
            ("properties", Value::Object(props)) => {
                let props = props
                    .iter()
                    .map(|(name, s)| (name.clone(), sanitize(s)))
                    .collect();
                out.insert("properties".into(), Value::Object(props));
            }
            ("items", items) => {
                out.insert("items".into(), sanitize(items));
            }
            _ => {
                out.insert(key.into(), value.clone());
            }
        }
    }
    out.into()
}

/// Validate `args` against a tool's full parameter schema.
///
/// Returns a message listing every violation, suitable for returning to the
/// model so it can correct the call. An invalid schema skips validation.
pub fn validate_arguments(tool: &str, schema: &Value, args: &Value) -> Result<(), String> {
    let Ok(validator) = jsonschema::validator_for(schema) else {
        return Ok(());
    };

    let errors: Vec<String> = validator
        .iter_errors(args)
        .map(|e| format!("  - {}: {e}", e.instance_path()))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "argument validation failed for tool '{tool}':\n{}",
            errors.join("\n")
        ))
    }
}

/// Log a tool call at INFO level with a truncated preview of its arguments.
pub fn log_tool_call(name: &str, args: &Value) {
    let arguments = args.to_string();
    let args_preview: String = arguments.chars().take(120).collect();
    info!(
        "[tool] {}({args_preview}{})",
        name,
        if arguments.chars().count() > 120 { "..." } else { "" }
    );
    debug!("[tool] {name} full args ({} bytes)", arguments.len());
    trace!("[tool] {name} arguments: {arguments}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_unsupported_keywords() {
        let full = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "Args",
            "description": "root doc",
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {"type": "string", "description": "The search query."},
                "max_results": {"type": "integer", "format": "uint32", "minimum": 0.0, "default": 5},
                "category": {"type": ["string", "null"], "description": "Filter."}
            }
        });
        let decl = declaration_schema(&full);
        assert_eq!(
            decl,
            json!({
                "type": "object",
                "required": ["query"],
                "properties": {
                    "query": {"type": "string", "description": "The search query."},
                    "max_results": {"type": "integer"},
                    "category": {"type": "string", "nullable": true, "description": "Filter."}
                }
            })
        );
    }

    #[test]
    fn nested_items_sanitized() {
        let full = json!({"type": "array", "items": {"type": "string", "maxLength": 3}});
        assert_eq!(
            declaration_schema(&full),
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn empty_object_gets_properties() {
        let decl = declaration_schema(&json!({"type": "object"}));
        assert_eq!(decl, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn validation_reports_violations() {
        let schema = json!({
            "type": "object",
            "required": ["order_id"],
            "properties": {"order_id": {"type": "string"}}
        });
        assert!(validate_arguments("get_order_status", &schema, &json!({"order_id": "A1"})).is_ok());
        let err = validate_arguments("get_order_status", &schema, &json!({"order_id": 7})).unwrap_err();
        assert!(err.contains("get_order_status"));
        assert!(err.contains("/order_id"));
        assert!(validate_arguments("get_order_status", &schema, &json!({})).is_err());
    }
}

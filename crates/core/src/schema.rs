//! Canonical JSON-Schema object nodes and fragment classification.

use serde_json::{Map, Value};

/// Build the canonical object node every transformer layer emits.
///
/// `properties == None` means "no schema provided": `required` and
/// `properties` are left out. `Some(empty)` still emits both, empty.
pub fn create_schema_object(
    title: Option<&str>,
    properties: Option<Map<String, Value>>,
) -> Map<String, Value> {
    let mut node = Map::new();
    if let Some(title) = title {
        node.insert("title".to_string(), Value::String(title.to_string()));
    }
    node.insert("type".to_string(), Value::String("object".to_string()));
    if let Some(properties) = properties {
        let required = properties
            .keys()
            .map(|key| Value::String(key.clone()))
            .collect();
        node.insert("required".to_string(), Value::Array(required));
        node.insert("properties".to_string(), Value::Object(properties));
    }
    node.insert("additionalProperties".to_string(), Value::Bool(false));
    node
}

/// A schema fragment, classified before any transformation touches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Points at a schema defined elsewhere (`{ "$ref": ... }`).
    Reference(Map<String, Value>),
    /// Declares its shape in place.
    Inline(Map<String, Value>),
    /// Boolean schemas and anything that is not an object.
    Opaque(Value),
}

impl Fragment {
    /// Sort a raw value into its variant.
    pub fn classify(value: Value) -> Fragment {
        match value {
            Value::Object(map) if map.contains_key("$ref") => Fragment::Reference(map),
            Value::Object(map) => Fragment::Inline(map),
            other => Fragment::Opaque(other),
        }
    }

    /// The fragment's own `title`, when it has a string one.
    pub fn title(&self) -> Option<&str> {
        match self {
            Fragment::Reference(map) | Fragment::Inline(map) => {
                map.get("title").and_then(Value::as_str)
            }
            Fragment::Opaque(_) => None,
        }
    }

    /// The raw value back.
    pub fn into_value(self) -> Value {
        match self {
            Fragment::Reference(map) | Fragment::Inline(map) => Value::Object(map),
            Fragment::Opaque(value) => value,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn properties() -> Map<String, Value> {
        json!({ "id": { "type": "string" }, "label": { "type": "string" } })
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_empty_arguments() {
        assert_eq!(
            Value::Object(create_schema_object(None, None)),
            json!({ "type": "object", "additionalProperties": false })
        );
    }

    #[test]
    fn test_title_only() {
        assert_eq!(
            Value::Object(create_schema_object(Some("Test"), None)),
            json!({ "type": "object", "title": "Test", "additionalProperties": false })
        );
    }

    #[test]
    fn test_empty_properties_are_kept() {
        assert_eq!(
            Value::Object(create_schema_object(Some("Test"), Some(Map::new()))),
            json!({
                "type": "object",
                "title": "Test",
                "required": [],
                "properties": {},
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn test_required_matches_property_keys() {
        let node = create_schema_object(Some("Test"), Some(properties()));
        assert_eq!(node["required"], json!(["id", "label"]));
        assert_eq!(node["properties"], Value::Object(properties()));
    }

    #[test]
    fn test_classify() {
        let reference = Fragment::classify(json!({ "$ref": "enums#/properties/mode" }));
        assert!(matches!(reference, Fragment::Reference(_)));

        let inline = Fragment::classify(json!({ "title": "Item", "type": "object" }));
        assert_eq!(inline.title(), Some("Item"));

        let opaque = Fragment::classify(json!(true));
        assert_eq!(opaque.title(), None);
        assert_eq!(opaque.into_value(), json!(true));
    }
}

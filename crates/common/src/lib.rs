//! Shared types for routetypes
//!
//! This crate contains the route data model used by both the generator
//! library (`routetypes-core`) and the `routetypes` CLI: the HTTP method and
//! schema slot tables, route records, and the route input file.

pub mod method;
pub mod route;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

// Re-export commonly used types
pub use method::{Method, SLOTS, SLOTS_WITH_BODY, Slot};
pub use route::{
    Definitions, MethodSpec, Route, RouteOptions, RouteSchema, Routes, collect_definitions,
    group_routes,
};

/// Which boilerplate an output file receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputTarget {
    /// Types plus the server-side import boilerplate.
    ServerTypes,
    /// Types only.
    #[default]
    ClientTypes,
}

/// Contents of a route input file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteSet {
    /// Route records, one per registered route.
    #[serde(default)]
    pub routes: Vec<RouteOptions>,
    /// Shared schema documents, each carrying a `$id`.
    #[serde(default)]
    pub schemas: Vec<Value>,
}

impl RouteSet {
    /// Read a route set from a JSON or YAML file (chosen by extension).
    pub fn read(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read route file {}: {err}", path.display()))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");

        if is_yaml {
            Self::from_yaml(&contents)
                .map_err(|err| format!("Failed to parse route file {}: {err}", path.display()))
        } else {
            serde_json::from_str(&contents)
                .map_err(|err| format!("Failed to parse route file {}: {err}", path.display()))
        }
    }

    /// Parse a YAML route set. Scalar mapping keys (e.g. `200:`) become strings.
    pub fn from_yaml(contents: &str) -> Result<Self, String> {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(contents).map_err(|err| err.to_string())?;
        let json = yaml_to_json(yaml)?;
        serde_json::from_value(json).map_err(|err| err.to_string())
    }

    /// Split into the grouped routes and the `$id`-keyed definitions.
    pub fn into_parts(self) -> Result<(Routes, Definitions), String> {
        let definitions = collect_definitions(self.schemas)?;
        Ok((group_routes(self.routes), definitions))
    }
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, String> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("Unsupported number: {n}"))?
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = serde_json::Map::new();
            for (key, value) in mapping {
                let key = match key {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("Unsupported mapping key: {other:?}")),
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => {
            let tagged = *tagged;
            yaml_to_json(tagged.value)?
        }
    })
}

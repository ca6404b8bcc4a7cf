//! Route definitions as registered by the host application.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::method::{Method, Slot};

/// JSON-Schema fragments attached to one route record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSchema {
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Query string parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub querystring: Option<Value>,
    /// Path parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Request headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
    /// Status key (`"200"`, `"4xx"`, `"default"`) to schema fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Map<String, Value>>,
    /// Free-form route description, carried but not typed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    /// Keys this tool does not interpret (tags, summary, security, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteSchema {
    /// Fragment stored in a request slot. Always `None` for [`Slot::Response`],
    /// which is a status map rather than a single fragment.
    pub fn fragment(&self, slot: Slot) -> Option<&Value> {
        match slot {
            Slot::Body => self.body.as_ref(),
            Slot::Querystring => self.querystring.as_ref(),
            Slot::Params => self.params.as_ref(),
            Slot::Headers => self.headers.as_ref(),
            Slot::Response => None,
        }
    }
}

/// A record may declare one method or several sharing the same schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MethodSpec {
    /// `"GET"`
    One(String),
    /// `["GET", "HEAD"]`
    Many(Vec<String>),
}

impl MethodSpec {
    /// Declared method names, unvalidated.
    pub fn names(&self) -> Vec<&str> {
        match self {
            MethodSpec::One(name) => vec![name.as_str()],
            MethodSpec::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl From<Method> for MethodSpec {
    fn from(method: Method) -> Self {
        MethodSpec::One(method.uppercase().to_string())
    }
}

impl From<&str> for MethodSpec {
    fn from(name: &str) -> Self {
        MethodSpec::One(name.to_string())
    }
}

/// One per-method configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOptions {
    /// URL pattern, e.g. `/items/:id`.
    pub url: String,
    /// Method or methods the record applies to.
    pub method: MethodSpec,
    /// Schemas of the record, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<RouteSchema>,
}

impl RouteOptions {
    /// A record without schemas.
    pub fn new(url: impl Into<String>, method: impl Into<MethodSpec>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            schema: None,
        }
    }

    /// Attach `schema` to the record.
    pub fn with_schema(mut self, schema: RouteSchema) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// All records registered under one path, in registration order.
pub type Route = Vec<RouteOptions>;

/// Path to route, ordered by path.
pub type Routes = BTreeMap<String, Route>;

/// Schema id to schema document, as registered with the host.
pub type Definitions = Map<String, Value>;

/// Group flat records by their `url`, keeping registration order per path.
pub fn group_routes(records: impl IntoIterator<Item = RouteOptions>) -> Routes {
    let mut routes = Routes::new();
    for record in records {
        routes.entry(record.url.clone()).or_default().push(record);
    }
    routes
}

/// Index schema documents by their `$id`.
pub fn collect_definitions(
    schemas: impl IntoIterator<Item = Value>,
) -> Result<Definitions, String> {
    let mut definitions = Definitions::new();
    for (index, schema) in schemas.into_iter().enumerate() {
        let Some(id) = schema.get("$id").and_then(Value::as_str) else {
            return Err(format!("Schema at index {index} is missing a string `$id`"));
        };
        if definitions.contains_key(id) {
            return Err(format!("Schema with `$id` '{id}' already present"));
        }
        definitions.insert(id.to_string(), schema);
    }
    Ok(definitions)
}

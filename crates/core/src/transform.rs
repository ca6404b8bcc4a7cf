//! The schema reducer: route -> method -> slot -> response status.
//!
//! Each level folds its input, in input order, into an ordered JSON object
//! and hands the result to [`create_schema_object`] for the level above.

use routetypes_common::{Method, Route, RouteSchema, Slot};
use serde_json::{Map, Value};
use tracing::debug;

use crate::names::{NameRegistry, normalize_title};
use crate::schema::{Fragment, create_schema_object};

/// Give every inline response variant a unique title.
///
/// References pass through untouched so they still resolve.
pub fn transform_response(title: &str, responses: &Map<String, Value>) -> Vec<Value> {
    responses
        .iter()
        .map(|(status, fragment)| match Fragment::classify(fragment.clone()) {
            Fragment::Inline(mut map) => {
                let suffix = match own_title(&map) {
                    Some(own) => normalize_title(own),
                    None => status.clone(),
                };
                map.insert(
                    "title".to_string(),
                    Value::String(format!("{title}Status{suffix}")),
                );
                Value::Object(map)
            }
            other => other.into_value(),
        })
        .collect()
}

/// Map one route-method schema onto the Body/Querystring/Params/Headers/Reply
/// record.
///
/// Returns `None` when none of `slots` is present in `schema`.
pub fn transform_schema_level(
    title: &str,
    schema: &RouteSchema,
    slots: &[Slot],
) -> Option<Map<String, Value>> {
    let mut result = Map::new();

    for &slot in slots {
        let effective_title = format!("{title}{}", slot.capitalized());

        let value = if slot == Slot::Response {
            let Some(responses) = schema.response.as_ref() else {
                continue;
            };
            transform_reply(effective_title, responses)
        } else {
            let Some(fragment) = schema.fragment(slot) else {
                continue;
            };
            match Fragment::classify(fragment.clone()) {
                Fragment::Reference(mut map) | Fragment::Inline(mut map) => {
                    if own_title(&map).is_none() {
                        map.insert("title".to_string(), Value::String(effective_title));
                    }
                    Value::Object(map)
                }
                Fragment::Opaque(value) => value,
            }
        };

        result.insert(slot.capitalized().to_string(), value);
    }

    if result.is_empty() { None } else { Some(result) }
}

fn transform_reply(effective_title: String, responses: &Map<String, Value>) -> Value {
    // A string `title` entry names the reply itself rather than a status.
    let reply_title = own_title(responses).map_or(effective_title, str::to_string);

    let statuses: Map<String, Value> = responses
        .iter()
        .filter(|(key, value)| !(key.as_str() == "title" && value.is_string()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let mut reply = create_schema_object(Some(&reply_title), None);
    reply.insert(
        "oneOf".to_string(),
        Value::Array(transform_response(&reply_title, &statuses)),
    );
    Value::Object(reply)
}

fn own_title(map: &Map<String, Value>) -> Option<&str> {
    map.get("title")
        .and_then(Value::as_str)
        .filter(|title| !title.is_empty())
}

/// Build the per-method schemas of one route, keyed by uppercase method.
///
/// A method declared by two records keeps the later record's schema.
pub fn transform_method_level(title: &str, route: &Route, ignore_head: bool) -> Map<String, Value> {
    let empty = RouteSchema::default();
    let mut methods = Map::new();

    for record in route {
        let schema = record.schema.as_ref().unwrap_or(&empty);

        for name in record.method.names() {
            let Some(method) = Method::parse(name) else {
                debug!(url = %record.url, method = name, "Skipping unknown method.");
                continue;
            };
            if ignore_head && method == Method::Head {
                continue;
            }

            let method_title = format!("{title}{}", method.capitalized());
            let slots = transform_schema_level(&method_title, schema, method.slots());

            let mut node = create_schema_object(Some(&method_title), slots);
            // Carried for documentation generators reading the schema.
            if let Some(description) = &schema.description {
                node.insert("description".to_string(), description.clone());
            }

            methods.insert(method.uppercase().to_string(), Value::Object(node));
        }
    }

    methods
}

/// Build the per-route tree, keyed by raw path.
///
/// Endpoint names are drawn from `registry` in iteration order, so the
/// caller decides which route gets the unsuffixed name.
pub fn transform_root_level<'a>(
    routes: impl IntoIterator<Item = (&'a str, &'a Route)>,
    ignore_head: bool,
    registry: &mut NameRegistry,
) -> Map<String, Value> {
    let mut root = Map::new();

    for (path, route) in routes {
        let title = registry.generate_endpoint_name(path);
        debug!(path, title = %title, records = route.len(), "Transforming route.");

        let methods = transform_method_level(&title, route, ignore_head);
        root.insert(
            path.to_string(),
            Value::Object(create_schema_object(None, Some(methods))),
        );
    }

    root
}

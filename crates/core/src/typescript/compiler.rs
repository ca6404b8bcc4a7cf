//! Schema walking: JSON Schema nodes to TypeScript declarations.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::debug;

use super::emit::Emit;
use super::types::{TsLiteral, TsObject, TsPrimitive, TsProp, TsType, TsTypeDef};
use super::utils::to_safe_type_name;
use crate::error::{Error, Result};
use crate::options::CompilerOptions;

/// Compile `schema` into exported TypeScript declarations.
///
/// The root is declared under `name`; every titled subschema and every
/// `$ref` target gets its own declaration. Type aliases come first, then
/// interfaces, each declaration on its own lines with no blank line in
/// between.
pub fn compile_schema(schema: &Value, name: &str, options: &CompilerOptions) -> Result<String> {
    let mut compiler = Compiler::new(schema, options);
    compiler.compile_root(name)?;
    if options.unreachable_definitions {
        compiler.declare_definitions()?;
    }

    let body = compiler.finish();
    match options.banner_comment.as_deref() {
        Some(banner) if !banner.is_empty() => Ok(format!("{banner}\n\n{body}")),
        _ => Ok(body),
    }
}

struct Compiler<'a> {
    root: &'a Value,
    options: &'a CompilerOptions,
    cwd: String,
    /// Declaration names handed out so far.
    names: HashSet<String>,
    /// Canonical `url#pointer` -> type, filled before the target compiles
    /// so recursive references terminate.
    refs: HashMap<String, TsType>,
    /// External documents by URL.
    documents: HashMap<String, Value>,
    /// Slots are reserved in discovery order and filled once compiled.
    declarations: Vec<Option<TsTypeDef>>,
    /// URLs of the external documents currently being compiled.
    bases: Vec<String>,
}

impl<'a> Compiler<'a> {
    fn new(root: &'a Value, options: &'a CompilerOptions) -> Self {
        let cwd = options.resolved_cwd().trim_end_matches('/').to_string();
        Self {
            root,
            options,
            cwd,
            names: HashSet::new(),
            refs: HashMap::new(),
            documents: HashMap::new(),
            declarations: Vec::new(),
            bases: Vec::new(),
        }
    }

    fn compile_root(&mut self, name: &str) -> Result<()> {
        let name = self.unique_name(name);
        self.refs.insert("#".to_string(), TsType::Ref(name.clone()));
        let root = self.root;
        self.declare(name, root)?;
        Ok(())
    }

    fn declare_definitions(&mut self) -> Result<()> {
        let root = self.root;
        let Some(Value::Object(definitions)) = root.get("definitions") else {
            return Ok(());
        };
        for key in definitions.keys() {
            self.resolve_ref(&format!("#/definitions/{}", escape_pointer(key)))?;
        }
        Ok(())
    }

    fn finish(self) -> String {
        let (interfaces, aliases): (Vec<_>, Vec<_>) = self
            .declarations
            .into_iter()
            .flatten()
            .partition(TsTypeDef::is_interface);

        aliases
            .iter()
            .chain(&interfaces)
            .map(Emit::emit)
            .collect()
    }

    fn unique_name(&mut self, hint: &str) -> String {
        let base = to_safe_type_name(hint);
        let mut candidate = base.clone();
        let mut counter = 0;
        while !self.names.insert(candidate.clone()) {
            counter += 1;
            candidate = format!("{base}{counter}");
        }
        candidate
    }

    fn declare(&mut self, name: String, schema: &Value) -> Result<TsType> {
        let slot = self.declarations.len();
        self.declarations.push(None);

        let ty = self.compile_body(schema)?;
        self.declarations[slot] = Some(TsTypeDef::new(name.clone(), description(schema), ty));
        Ok(TsType::Ref(name))
    }

    /// Type of a schema in a type position: references and titled
    /// schemas become named types, anything else is inlined.
    fn type_of(&mut self, schema: &Value) -> Result<TsType> {
        if let Value::Object(map) = schema {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                return self.resolve_ref(reference);
            }
            if let Some(title) = map.get("title").and_then(Value::as_str) {
                let name = self.unique_name(title);
                return self.declare(name, schema);
            }
        }
        self.compile_body(schema)
    }

    fn compile_body(&mut self, schema: &Value) -> Result<TsType> {
        let map = match schema {
            Value::Object(map) => map,
            Value::Bool(false) => return Ok(TsType::Primitive(TsPrimitive::Never)),
            _ => return Ok(TsType::unknown()),
        };

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            return self.resolve_ref(reference);
        }
        if let Some(value) = map.get("const") {
            return Ok(literal_type(value));
        }
        if let Some(Value::Array(values)) = map.get("enum") {
            return Ok(TsType::union(values.iter().map(literal_type).collect()));
        }
        if let Some(Value::Array(schemas)) = map.get("oneOf").or_else(|| map.get("anyOf")) {
            let types = schemas
                .iter()
                .map(|schema| self.type_of(schema))
                .collect::<Result<Vec<_>>>()?;
            return Ok(TsType::union(types));
        }
        if let Some(Value::Array(schemas)) = map.get("allOf") {
            let types = schemas
                .iter()
                .map(|schema| self.type_of(schema))
                .collect::<Result<Vec<_>>>()?;
            return Ok(TsType::intersection(types));
        }

        match map.get("type") {
            Some(Value::String(name)) => self.named_type(name, map),
            Some(Value::Array(names)) => {
                let types = names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|name| self.named_type(name, map))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TsType::union(types))
            }
            _ if map.contains_key("properties") || map.contains_key("additionalProperties") => {
                self.object_type(map)
            }
            _ if map.contains_key("items") => self.array_type(map),
            _ => Ok(TsType::unknown()),
        }
    }

    fn named_type(&mut self, name: &str, map: &Map<String, Value>) -> Result<TsType> {
        match name {
            "string" => Ok(TsType::Primitive(TsPrimitive::String)),
            "number" | "integer" => Ok(TsType::Primitive(TsPrimitive::Number)),
            "boolean" => Ok(TsType::Primitive(TsPrimitive::Boolean)),
            "null" => Ok(TsType::Primitive(TsPrimitive::Null)),
            "array" => self.array_type(map),
            "object" => self.object_type(map),
            _ => Ok(TsType::unknown()),
        }
    }

    fn array_type(&mut self, map: &Map<String, Value>) -> Result<TsType> {
        match map.get("items") {
            Some(Value::Array(items)) => {
                let types = items
                    .iter()
                    .map(|item| self.type_of(item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TsType::Tuple(types))
            }
            Some(items) => Ok(TsType::Array(Box::new(self.type_of(items)?))),
            None => Ok(TsType::Array(Box::new(TsType::unknown()))),
        }
    }

    fn object_type(&mut self, map: &Map<String, Value>) -> Result<TsType> {
        let required: HashSet<&str> = map
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut properties = Vec::new();
        if let Some(Value::Object(props)) = map.get("properties") {
            for (name, schema) in props {
                properties.push(TsProp {
                    name: name.clone(),
                    ty: self.type_of(schema)?,
                    optional: !required.contains(name.as_str()),
                    description: property_description(schema),
                });
            }
        }

        let index = match map.get("additionalProperties") {
            None => self.options.additional_properties().then(TsType::unknown),
            Some(Value::Bool(allowed)) => allowed.then(TsType::unknown),
            Some(schema) => Some(self.type_of(schema)?),
        };
        let index = index.map(|ty| {
            if self.options.strict_index_signatures {
                TsType::union(vec![ty, TsType::Primitive(TsPrimitive::Undefined)])
            } else {
                ty
            }
        });

        Ok(TsType::Object(TsObject {
            properties,
            index: index.map(Box::new),
        }))
    }

    fn resolve_ref(&mut self, reference: &str) -> Result<TsType> {
        let (document, pointer) = reference.split_once('#').unwrap_or((reference, ""));
        let base = if document.is_empty() {
            self.bases.last().cloned().unwrap_or_default()
        } else {
            self.document_url(document)
        };

        let key = format!("{base}#{pointer}");
        let alias = self.alias_key(&base, pointer);
        if let Some(ty) = self.refs.get(&key) {
            return Ok(ty.clone());
        }
        if let Some(ty) = alias.as_ref().and_then(|alias| self.refs.get(alias)) {
            return Ok(ty.clone());
        }

        let target = self.lookup(&base, pointer)?;
        let hint = target
            .get("title")
            .and_then(Value::as_str)
            .or_else(|| last_segment(pointer))
            .or_else(|| last_segment(&base))
            .unwrap_or("Ref")
            .to_string();

        let name = self.unique_name(&hint);
        let ty = TsType::Ref(name.clone());
        self.refs.insert(key, ty.clone());
        if let Some(alias) = alias {
            self.refs.insert(alias, ty.clone());
        }
        debug!(reference, name = %name, "Resolved reference.");

        if base.is_empty() {
            return self.declare(name, &target);
        }
        if !self.options.declare_externally_referenced() {
            return Ok(ty);
        }

        self.bases.push(base);
        let declared = self.declare(name, &target);
        self.bases.pop();
        declared
    }

    /// Second key for a root definition, which is reachable both as
    /// `#/definitions/<id>` and as the external document `<id>#`.
    fn alias_key(&self, base: &str, pointer: &str) -> Option<String> {
        let Some(Value::Object(definitions)) = self.root.get("definitions") else {
            return None;
        };

        if base.is_empty() {
            let escaped = pointer.strip_prefix("/definitions/")?;
            let id = escaped.replace("~1", "/").replace("~0", "~");
            if escaped.contains('/') || !definitions.contains_key(&id) {
                return None;
            }
            return Some(format!("{}#", self.document_url(&id)));
        }
        if !pointer.is_empty() {
            return None;
        }

        definitions
            .keys()
            .find(|id| self.document_url(id) == base)
            .map(|id| format!("#/definitions/{}", escape_pointer(id)))
    }

    fn document_url(&self, id: &str) -> String {
        if id.starts_with("http://") || id.starts_with("https://") {
            id.to_string()
        } else if id.starts_with('/') {
            format!("{}{id}", self.cwd)
        } else {
            format!("{}/{id}", self.cwd)
        }
    }

    fn lookup(&mut self, base: &str, pointer: &str) -> Result<Value> {
        let document: &Value = if base.is_empty() {
            self.root
        } else {
            match self.documents.entry(base.to_string()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    debug!(url = base, "Reading external schema.");
                    entry.insert(self.options.ref_options.resolve(base)?)
                }
            }
        };

        document
            .pointer(pointer)
            .cloned()
            .ok_or_else(|| Error::InvalidPointer {
                pointer: pointer.to_string(),
                document: if base.is_empty() { "#".to_string() } else { base.to_string() },
            })
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn last_segment(path: &str) -> Option<&str> {
    path.rsplit('/').find(|segment| !segment.is_empty())
}

fn description(schema: &Value) -> Option<String> {
    schema
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Titled and referenced property schemas carry their description on
/// their own declaration.
fn property_description(schema: &Value) -> Option<String> {
    if schema.get("$ref").is_some() || schema.get("title").is_some() {
        return None;
    }
    description(schema)
}

fn literal_type(value: &Value) -> TsType {
    match value {
        Value::Null => TsType::Literal(TsLiteral::Null),
        Value::Bool(b) => TsType::Literal(TsLiteral::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => TsType::Literal(TsLiteral::Int(i)),
            None => TsType::Literal(TsLiteral::Number(n.as_f64().unwrap_or(0.0))),
        },
        Value::String(s) => TsType::Literal(TsLiteral::String(s.clone())),
        _ => TsType::unknown(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::options::{DefinitionsResolver, FILE_RESOLVER, RefOptions};
    use serde_json::json;

    fn options() -> CompilerOptions {
        CompilerOptions {
            cwd: Some("/app".into()),
            ..CompilerOptions::default()
        }
    }

    fn compile(schema: Value) -> String {
        compile_schema(&schema, "Root", &options()).unwrap()
    }

    #[test]
    fn test_object_properties() {
        let text = compile(json!({
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": { "type": "integer" },
                "tags": { "type": "array", "items": { "type": "string" } },
                "pair": { "type": "array", "items": [{ "type": "string" }, { "type": "number" }] }
            }
        }));
        assert_eq!(
            text,
            "export interface Root {\n  id: number;\n  tags?: string[];\n  pair?: [string, number];\n  [k: string]: unknown;\n}\n"
        );
    }

    #[test]
    fn test_closed_object_without_index_signature() {
        let text = compile(json!({
            "type": "object",
            "properties": { "name": { "type": ["string", "null"] } },
            "additionalProperties": false
        }));
        assert_eq!(text, "export interface Root {\n  name?: string | null;\n}\n");
    }

    #[test]
    fn test_additional_properties_option() {
        let options = CompilerOptions {
            additional_properties: Some(false),
            ..options()
        };
        let text = compile_schema(&json!({ "type": "object" }), "Root", &options).unwrap();
        assert_eq!(text, "export interface Root {}\n");
    }

    #[test]
    fn test_strict_index_signatures() {
        let options = CompilerOptions {
            strict_index_signatures: true,
            ..options()
        };
        let schema = json!({ "type": "object", "additionalProperties": { "type": "number" } });
        let text = compile_schema(&schema, "Root", &options).unwrap();
        assert_eq!(text, "export interface Root {\n  [k: string]: number | undefined;\n}\n");
    }

    #[test]
    fn test_aliases_come_before_interfaces() {
        let text = compile(json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["reply"],
            "properties": {
                "reply": {
                    "title": "Reply",
                    "oneOf": [
                        { "title": "Ok", "type": "string" },
                        { "title": "Failure", "type": "object", "additionalProperties": false,
                          "properties": { "code": { "const": 42 } } }
                    ]
                },
                "mode": { "enum": ["a", "b"] }
            }
        }));
        assert_eq!(
            text,
            "export type Reply = Ok | Failure;\n\
             export type Ok = string;\n\
             export interface Root {\n  reply: Reply;\n  mode?: \"a\" | \"b\";\n}\n\
             export interface Failure {\n  code?: 42;\n}\n"
        );
    }

    #[test]
    fn test_duplicate_titles_are_numbered() {
        let text = compile(json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "a": { "title": "Mode", "type": "string" },
                "b": { "title": "Mode", "type": "number" }
            }
        }));
        assert!(text.contains("export type Mode = string;\n"));
        assert!(text.contains("export type Mode1 = number;\n"));
        assert!(text.contains("  a?: Mode;\n  b?: Mode1;\n"));
    }

    #[test]
    fn test_local_reference_is_declared_once() {
        let text = compile(json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "a": { "$ref": "#/definitions/mode" },
                "b": { "$ref": "#/definitions/mode", "title": "Ignored" }
            },
            "definitions": { "mode": { "enum": ["on", "off"] } }
        }));
        assert_eq!(
            text,
            "export type Mode = \"on\" | \"off\";\n\
             export interface Root {\n  a?: Mode;\n  b?: Mode;\n}\n"
        );
    }

    #[test]
    fn test_recursive_reference_terminates() {
        let text = compile(json!({
            "type": "object",
            "additionalProperties": false,
            "properties": { "children": { "type": "array", "items": { "$ref": "#" } } }
        }));
        assert_eq!(text, "export interface Root {\n  children?: Root[];\n}\n");
    }

    #[test]
    fn test_external_reference_goes_through_resolver() {
        let definitions = json!({
            "enums": {
                "$id": "enums",
                "type": "object",
                "properties": {
                    "mode": { "title": "MODE", "enum": ["production", "test"] },
                    "level": { "$ref": "#/properties/mode" }
                }
            }
        });
        let resolver = DefinitionsResolver::new("/app", Arc::new(definitions.as_object().cloned().unwrap()));
        let options = CompilerOptions {
            ref_options: RefOptions::new().with_resolver(FILE_RESOLVER, Arc::new(resolver)),
            ..options()
        };

        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "mode": { "$ref": "enums#/properties/mode" },
                "level": { "$ref": "enums#/properties/level" }
            }
        });
        let text = compile_schema(&schema, "Root", &options).unwrap();
        assert_eq!(
            text,
            "export type MODE = \"production\" | \"test\";\n\
             export type Level = MODE;\n\
             export interface Root {\n  mode?: MODE;\n  level?: Level;\n}\n"
        );
    }

    #[test]
    fn test_externally_referenced_types_can_stay_undeclared() {
        let definitions = json!({ "enums": { "type": "string" } });
        let resolver = DefinitionsResolver::new("/app", Arc::new(definitions.as_object().cloned().unwrap()));
        let options = CompilerOptions {
            declare_externally_referenced: Some(false),
            ref_options: RefOptions::new().with_resolver(FILE_RESOLVER, Arc::new(resolver)),
            ..options()
        };
        let schema = json!({ "type": "array", "items": { "$ref": "enums#" } });
        let text = compile_schema(&schema, "Root", &options).unwrap();
        assert_eq!(text, "export type Root = Enums[];\n");
    }

    #[test]
    fn test_unresolved_reference() {
        let schema = json!({ "$ref": "missing#" });
        let error = compile_schema(&schema, "Root", &options()).unwrap_err();
        assert!(matches!(error, Error::NoResolver { .. }));

        let schema = json!({ "$ref": "#/definitions/nope" });
        let error = compile_schema(&schema, "Root", &options()).unwrap_err();
        assert_eq!(
            error.to_string(),
            "JSON pointer '/definitions/nope' does not exist in #"
        );
    }

    #[test]
    fn test_unreachable_definitions() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "definitions": { "extra": { "type": "boolean" } }
        });
        assert_eq!(compile(schema.clone()), "export interface Root {}\n");

        let options = CompilerOptions {
            unreachable_definitions: true,
            ..options()
        };
        let text = compile_schema(&schema, "Root", &options).unwrap();
        assert_eq!(text, "export type Extra = boolean;\nexport interface Root {}\n");
    }

    #[test]
    fn test_definition_reached_by_id_is_declared_once() {
        let definitions = json!({ "enums": { "type": "string" } });
        let resolver = DefinitionsResolver::new("/app", Arc::new(definitions.as_object().cloned().unwrap()));
        let options = CompilerOptions {
            unreachable_definitions: true,
            ref_options: RefOptions::new().with_resolver(FILE_RESOLVER, Arc::new(resolver)),
            ..options()
        };
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": { "mode": { "$ref": "enums#" } },
            "definitions": definitions
        });
        let text = compile_schema(&schema, "Root", &options).unwrap();
        assert_eq!(
            text,
            "export type Enums = string;\nexport interface Root {\n  mode?: Enums;\n}\n"
        );

        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "local": { "$ref": "#/definitions/enums" },
                "external": { "$ref": "enums#" }
            },
            "definitions": definitions
        });
        let text = compile_schema(&schema, "Root", &options).unwrap();
        assert!(!text.contains("Enums1"));
        assert!(text.contains("  local?: Enums;\n  external?: Enums;\n"));
    }

    #[test]
    fn test_literals_and_keys_stay_on_one_line() {
        let text = compile(json!({ "enum": ["a\nb", "x\u{2028}y", "say \"hi\""] }));
        assert_eq!(
            text,
            "export type Root = \"a\\nb\" | \"x\\u2028y\" | \"say \\\"hi\\\"\";\n"
        );

        let text = compile(json!({
            "type": "object",
            "additionalProperties": false,
            "properties": { "two\nlines": { "const": "tab\there" } }
        }));
        assert_eq!(
            text,
            "export interface Root {\n  \"two\\nlines\"?: \"tab\\there\";\n}\n"
        );
    }

    #[test]
    fn test_descriptions_and_banner() {
        let options = CompilerOptions {
            banner_comment: Some("/* generated */".into()),
            ..options()
        };
        let schema = json!({
            "description": "The API",
            "type": "object",
            "additionalProperties": false,
            "properties": { "id": { "type": "string", "description": "Identifier" } }
        });
        let text = compile_schema(&schema, "Root", &options).unwrap();
        assert_eq!(
            text,
            "/* generated */\n\n/**\n * The API\n */\nexport interface Root {\n  /**\n   * Identifier\n   */\n  id?: string;\n}\n"
        );
    }

    #[test]
    fn test_boolean_and_empty_schemas() {
        let text = compile(json!({
            "type": "object",
            "additionalProperties": false,
            "properties": { "any": {}, "none": false, "all": true }
        }));
        assert_eq!(
            text,
            "export interface Root {\n  any?: unknown;\n  none?: never;\n  all?: unknown;\n}\n"
        );
    }
}

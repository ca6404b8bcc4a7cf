//! Routes and definitions in, consolidated schema and TypeScript out.

use routetypes_common::{Definitions, Route, Routes};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::names::NameRegistry;
use crate::options::{CompilerOptions, patch_compiler_options};
use crate::schema::create_schema_object;
use crate::transform::transform_root_level;
use crate::typescript::compile_schema;

/// Name of the root interface in the generated output.
pub const ROOT_NAME: &str = "API";

/// Result of one compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    /// TypeScript declarations, without banner and unformatted.
    pub text: String,
    /// The consolidated schema document the text was generated from.
    pub schema: Value,
}

/// Compile with a fresh [`NameRegistry`].
///
/// Two calls over the same input yield the same text.
pub fn compile(
    routes: &Routes,
    definitions: &Definitions,
    ignore_head: bool,
    options: &CompilerOptions,
) -> Result<Compiled> {
    compile_with_registry(routes, definitions, ignore_head, options, &mut NameRegistry::new())
}

/// Compile, drawing endpoint names from `registry`.
pub fn compile_with_registry(
    routes: &Routes,
    definitions: &Definitions,
    ignore_head: bool,
    options: &CompilerOptions,
    registry: &mut NameRegistry,
) -> Result<Compiled> {
    let schema = build_schema(routes, definitions, ignore_head, registry);
    let options = patch_compiler_options(options, definitions);

    let text = compile_schema(&schema, ROOT_NAME, &options)?;
    debug!(routes = routes.len(), bytes = text.len(), "Compiled route types.");

    Ok(Compiled {
        text: separate_declarations(&text),
        schema,
    })
}

/// Build the consolidated document: one property per route path, in path
/// order, with the registered definitions attached.
pub fn build_schema(
    routes: &Routes,
    definitions: &Definitions,
    ignore_head: bool,
    registry: &mut NameRegistry,
) -> Value {
    let sorted: Vec<(&str, &Route)> = routes
        .iter()
        .map(|(path, route)| (path.as_str(), route))
        .collect();

    let properties = transform_root_level(sorted, ignore_head, registry);
    let mut schema = create_schema_object(Some(ROOT_NAME), Some(properties));
    schema.insert(
        "definitions".to_string(),
        Value::Object(definitions.clone()),
    );
    Value::Object(schema)
}

/// Put a blank line between declarations and before every type alias.
fn separate_declarations(text: &str) -> String {
    text.replace("}\n/", "}\n\n/")
        .replace("}\nexport ", "}\n\nexport ")
        .replace("export type", "\nexport type")
}

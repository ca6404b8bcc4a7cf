//! Options forwarded to the TypeScript compiler, and the `$ref` resolvers
//! that let it see registered definitions.

use std::fmt;
use std::sync::Arc;

use routetypes_common::Definitions;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::prettify::Style;

/// Name under which the definitions resolver is registered.
pub const FILE_RESOLVER: &str = "file";

/// Reads the schema behind an external `$ref` URL.
pub trait ResolveRef: Send + Sync {
    /// Whether this resolver handles `url` at all.
    fn can_read(&self, url: &str) -> bool;

    /// Fetch the whole document behind `url`.
    fn read(&self, url: &str) -> Result<Value>;
}

/// Named resolvers, consulted in registration order.
#[derive(Clone, Default)]
pub struct RefOptions {
    resolvers: Vec<(String, Arc<dyn ResolveRef>)>,
}

impl fmt::Debug for RefOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.resolvers.iter().map(|(name, _)| name))
            .finish()
    }
}

impl RefOptions {
    /// No resolvers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RefOptions::insert`].
    pub fn with_resolver(mut self, name: impl Into<String>, resolver: Arc<dyn ResolveRef>) -> Self {
        self.insert(name, resolver);
        self
    }

    /// Register `resolver` under `name`, replacing an existing one in place.
    pub fn insert(&mut self, name: impl Into<String>, resolver: Arc<dyn ResolveRef>) {
        let name = name.into();
        match self.resolvers.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = resolver,
            None => self.resolvers.push((name, resolver)),
        }
    }

    /// Resolver registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ResolveRef>> {
        self.resolvers
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, resolver)| resolver)
    }

    /// Registered names in consultation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resolvers.iter().map(|(name, _)| name.as_str())
    }

    /// Read `url` with the first resolver that accepts it.
    pub fn resolve(&self, url: &str) -> Result<Value> {
        let (_, resolver) = self
            .resolvers
            .iter()
            .find(|(_, resolver)| resolver.can_read(url))
            .ok_or_else(|| Error::NoResolver {
                url: url.to_string(),
            })?;
        resolver.read(url)
    }
}

/// Compiler settings. Every field is optional in configuration files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Text put above the declarations, followed by a blank line.
    pub banner_comment: Option<String>,
    /// `Some(false)` disables output formatting.
    pub format: Option<bool>,
    /// Explicit style, skipping repository config lookup.
    pub style: Option<Style>,
    /// Base against which external `$ref` ids are resolved.
    pub cwd: Option<String>,
    /// Declare every entry of the root `definitions`, reachable or not.
    pub unreachable_definitions: bool,
    /// Default for objects without `additionalProperties`. Defaults to true.
    pub additional_properties: Option<bool>,
    /// Add `| undefined` to index signature value types.
    pub strict_index_signatures: bool,
    /// Declare types found behind external references. Defaults to true.
    pub declare_externally_referenced: Option<bool>,
    /// Resolvers for external references. Code only.
    #[serde(skip)]
    pub ref_options: RefOptions,
}

impl CompilerOptions {
    /// Effective `additional_properties`.
    pub fn additional_properties(&self) -> bool {
        self.additional_properties.unwrap_or(true)
    }

    /// Effective `declare_externally_referenced`.
    pub fn declare_externally_referenced(&self) -> bool {
        self.declare_externally_referenced.unwrap_or(true)
    }

    /// Whether the output gets formatted.
    pub fn formatting_enabled(&self) -> bool {
        self.format != Some(false)
    }

    /// The configured cwd, or the process working directory.
    pub fn resolved_cwd(&self) -> String {
        match &self.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Serves external references out of the registered definitions.
///
/// A URL is mapped back to a key by stripping `cwd`; the key is looked up
/// as is and then without its leading `/`.
#[derive(Debug, Clone)]
pub struct DefinitionsResolver {
    cwd: String,
    definitions: Arc<Definitions>,
}

impl DefinitionsResolver {
    /// Resolver for URLs under `cwd`.
    pub fn new(cwd: impl Into<String>, definitions: Arc<Definitions>) -> Self {
        Self {
            cwd: cwd.into(),
            definitions,
        }
    }
}

impl ResolveRef for DefinitionsResolver {
    fn can_read(&self, url: &str) -> bool {
        !(url.starts_with("http://") || url.starts_with("https://"))
    }

    fn read(&self, url: &str) -> Result<Value> {
        let key = url.replacen(&self.cwd, "", 1);
        self.definitions
            .get(&key)
            .or_else(|| key.strip_prefix('/').and_then(|key| self.definitions.get(key)))
            .cloned()
            .ok_or_else(|| Error::UnresolvedRef {
                url: url.to_string(),
            })
    }
}

/// Prepare caller options for an internal compile.
///
/// Banner and formatting are handled later by the extract pipeline, so
/// both are switched off here. The definitions resolver is registered as
/// `"file"` before the caller's resolvers, which may replace it.
pub fn patch_compiler_options(options: &CompilerOptions, definitions: &Definitions) -> CompilerOptions {
    let cwd = options.resolved_cwd();

    let mut ref_options = RefOptions::new().with_resolver(
        FILE_RESOLVER,
        Arc::new(DefinitionsResolver::new(
            cwd.clone(),
            Arc::new(definitions.clone()),
        )),
    );
    for (name, resolver) in &options.ref_options.resolvers {
        ref_options.insert(name.clone(), Arc::clone(resolver));
    }

    CompilerOptions {
        banner_comment: Some(String::new()),
        format: Some(false),
        cwd: Some(cwd),
        ref_options,
        ..options.clone()
    }
}

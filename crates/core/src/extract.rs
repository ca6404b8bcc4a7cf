//! The full run: compile, format and save every configured output.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::future::try_join_all;
use routetypes_common::{Definitions, OutputTarget, Routes};
use serde_json::Value;
use tracing::debug;

use crate::compile::{Compiled, compile};
use crate::error::{Error, Result};
use crate::options::CompilerOptions;
use crate::prettify::prettify;
use crate::save::{SaveOutcome, save};

/// Banner used when the compiler options carry none.
pub const BANNER_COMMENT: &str = "/* tslint:disable */
/**
 * This file was automatically generated by routetypes.
 * DO NOT MODIFY IT BY HAND. Instead, modify the route schemas
 * and re-run the generator to regenerate this file.
 */
";

/// Appended to the banner of server outputs.
pub const SERVER_IMPORTS: &str = "
import {
  ContextConfigDefault,
  RawReplyDefaultExpression,
  RawRequestDefaultExpression,
  RawServerDefault,
  RouteHandlerMethod
} from 'fastify';
import {RouteGenericInterface} from 'fastify/types/route';

export type Handler<
  RouteGeneric extends RouteGenericInterface = RouteGenericInterface,
  ContextConfig = ContextConfigDefault
> = RouteHandlerMethod<
  RawServerDefault,
  RawRequestDefaultExpression,
  RawReplyDefaultExpression,
  RouteGeneric,
  ContextConfig
>;
";

/// Called with the consolidated schema before anything is written.
pub type SchemaHook = Arc<dyn Fn(&Value) -> std::result::Result<(), String> + Send + Sync>;

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Destination, relative to the process working directory.
    pub path: PathBuf,
    /// Boilerplate placed above the types.
    pub target: OutputTarget,
}

impl Output {
    /// Output of `target` kind at `path`.
    pub fn new(path: impl Into<PathBuf>, target: OutputTarget) -> Self {
        Self {
            path: path.into(),
            target,
        }
    }
}

/// Settings of one [`extract`] run.
#[derive(Clone, Default)]
pub struct ExtractorOptions {
    /// Nothing happens unless set.
    pub enabled: bool,
    /// Leave `HEAD` methods out of the schema.
    pub ignore_head: bool,
    /// Files to generate, all from the same declarations.
    pub outputs: Vec<Output>,
    /// Forwarded to the compiler and the formatter.
    pub compiler_options: CompilerOptions,
    /// Sees the consolidated schema before any file is written.
    pub on_schema_ready: Option<SchemaHook>,
}

impl fmt::Debug for ExtractorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorOptions")
            .field("enabled", &self.enabled)
            .field("ignore_head", &self.ignore_head)
            .field("outputs", &self.outputs)
            .field("compiler_options", &self.compiler_options)
            .field("on_schema_ready", &self.on_schema_ready.is_some())
            .finish()
    }
}

/// Paths touched by one run, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Files created or replaced.
    pub written: Vec<PathBuf>,
    /// Files that already held the generated text.
    pub unchanged: Vec<PathBuf>,
}

/// Banner for `target`: the caller's banner or [`BANNER_COMMENT`], plus
/// [`SERVER_IMPORTS`] for server outputs.
pub fn banner_for(options: &CompilerOptions, target: OutputTarget) -> String {
    let base = options
        .banner_comment
        .as_deref()
        .filter(|banner| !banner.is_empty())
        .unwrap_or(BANNER_COMMENT);
    match target {
        OutputTarget::ServerTypes => format!("{base}{SERVER_IMPORTS}"),
        OutputTarget::ClientTypes => base.to_string(),
    }
}

/// Render the final content of every output without touching the disk.
pub async fn render(
    routes: &Routes,
    definitions: &Definitions,
    options: &ExtractorOptions,
) -> Result<(Compiled, Vec<(Output, String)>)> {
    let (compiled, formatter) = tokio::join!(
        async { compile(routes, definitions, options.ignore_head, &options.compiler_options) },
        prettify(&options.compiler_options),
    );
    let compiled = compiled?;

    let rendered = options
        .outputs
        .iter()
        .map(|output| {
            let banner = banner_for(&options.compiler_options, output.target);
            let text = formatter.format(&format!("{banner}{}", compiled.text));
            (output.clone(), text)
        })
        .collect();
    Ok((compiled, rendered))
}

/// Generate and save every output in `options`.
///
/// The first failure aborts the run; outputs already saved stay on disk.
pub async fn extract(
    routes: &Routes,
    definitions: &Definitions,
    options: &ExtractorOptions,
) -> Result<ExtractReport> {
    if !options.enabled {
        debug!("Extraction disabled, skipping");
        return Ok(ExtractReport::default());
    }

    let (compiled, rendered) = render(routes, definitions, options).await?;
    if let Some(hook) = &options.on_schema_ready {
        hook(&compiled.schema).map_err(Error::Hook)?;
    }

    let saves = rendered.into_iter().map(|(output, text)| async move {
        debug!("Saving {:?} output to {}", output.target, output.path.display());
        let outcome = save(&text, &output.path).await?;
        Ok::<_, Error>((output.path, outcome))
    });

    let mut report = ExtractReport::default();
    for (path, outcome) in try_join_all(saves).await? {
        match outcome {
            SaveOutcome::Written => report.written.push(path),
            SaveOutcome::Unchanged => report.unchanged.push(path),
        }
    }
    Ok(report)
}

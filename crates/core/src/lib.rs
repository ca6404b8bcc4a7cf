//! Route schemas in, TypeScript route types out.
//!
//! The pipeline:
//! 1. [`transform`]: fold route records into one JSON Schema document with a
//!    unique title on every request slot and response variant
//! 2. [`compile`]: turn that document into TypeScript declarations
//! 3. [`extract`]: format the declarations and write every output file,
//!    skipping files whose content is already current
//!
//! ```no_run
//! use routetypes_core::{ExtractorOptions, Output, extract};
//! use routetypes_common::{OutputTarget, RouteSet};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let (routes, definitions) = RouteSet::read("routes.json".as_ref())?.into_parts()?;
//! let options = ExtractorOptions {
//!     enabled: true,
//!     outputs: vec![Output::new("src/types.ts", OutputTarget::ServerTypes)],
//!     ..ExtractorOptions::default()
//! };
//! extract(&routes, &definitions, &options).await?;
//! # Ok(())
//! # }
//! ```

pub mod compile;
pub mod error;
pub mod extract;
pub mod names;
pub mod options;
pub mod prettify;
pub mod save;
pub mod schema;
pub mod transform;
pub mod typescript;

pub use compile::{Compiled, ROOT_NAME, build_schema, compile, compile_with_registry};
pub use error::{Error, Result};
pub use extract::{ExtractReport, ExtractorOptions, Output, SchemaHook, extract, render};
pub use names::{NameRegistry, normalize_title};
pub use options::{CompilerOptions, DefinitionsResolver, RefOptions, ResolveRef, patch_compiler_options};
pub use prettify::{Formatter, Style, prettify};
pub use save::{FileSystem, SaveOutcome, TokioFs, save, save_with};
pub use schema::{Fragment, create_schema_object};

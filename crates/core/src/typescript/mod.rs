//! JSON Schema to TypeScript declarations.
//!
//! `compiler` walks a schema document, resolves `$ref`s and collects
//! declarations (`types`); `emit` renders them. Naming and ordering are
//! decided in `compiler`, so the emitter never looks at JSON.

mod compiler;
mod emit;
mod types;
pub mod utils;

pub use compiler::compile_schema;
pub use emit::Emit;
pub use types::{TsLiteral, TsObject, TsPrimitive, TsProp, TsType, TsTypeDef, TypeDefKind};

//! Rendering of declaration nodes as TypeScript source.
//!
//! Nested object types are laid out one member per line, two spaces per
//! level; the formatter re-indents later.

use super::types::{TsLiteral, TsObject, TsPrimitive, TsProp, TsType, TsTypeDef, TypeDefKind};
use super::utils::{doc_comment, escape_js_string, quote_if_needed};

/// Anything that renders as TypeScript source.
pub trait Emit {
    /// Source text at the top indentation level.
    fn emit(&self) -> String;
}

impl TsPrimitive {
    /// The TypeScript keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Undefined => "undefined",
            TsPrimitive::Unknown => "unknown",
            TsPrimitive::Never => "never",
        }
    }
}

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        self.keyword().to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Number(n) => n.to_string(),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => TsPrimitive::Null.emit(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        self.emit_at(0)
    }
}

impl TsType {
    /// Emit with `indent` levels for the lines of nested object types.
    pub fn emit_at(&self, indent: usize) -> String {
        match self {
            TsType::Primitive(primitive) => primitive.emit(),
            TsType::Array(element) => {
                format!("{}[]", parenthesize(element, indent, element.is_compound()))
            }
            TsType::Tuple(items) => format!("[{}]", join(items, indent, ", ", |_| false)),
            TsType::Union(members) => join(members, indent, " | ", |_| false),
            TsType::Intersection(members) => join(members, indent, " & ", |member| {
                matches!(member, TsType::Union(_))
            }),
            TsType::Object(object) => object.emit_at(indent),
            TsType::Literal(literal) => literal.emit(),
            TsType::Ref(name) => name.clone(),
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, TsType::Union(_) | TsType::Intersection(_))
    }
}

fn join(types: &[TsType], indent: usize, separator: &str, grouped: fn(&TsType) -> bool) -> String {
    types
        .iter()
        .map(|member| parenthesize(member, indent, grouped(member)))
        .collect::<Vec<_>>()
        .join(separator)
}

fn parenthesize(ty: &TsType, indent: usize, grouped: bool) -> String {
    let text = ty.emit_at(indent);
    if grouped { format!("({text})") } else { text }
}

impl Emit for TsObject {
    fn emit(&self) -> String {
        self.emit_at(0)
    }
}

impl TsObject {
    /// Emit the braces with members one level deeper than `indent`.
    pub fn emit_at(&self, indent: usize) -> String {
        if self.is_empty() {
            return "{}".to_string();
        }

        let prefix = "  ".repeat(indent + 1);
        let mut output = "{\n".to_string();
        for prop in &self.properties {
            if let Some(description) = &prop.description {
                output.push_str(&doc_comment(description, &prefix));
            }
            output.push_str(&format!("{prefix}{};\n", prop.emit_at(indent + 1)));
        }
        if let Some(index) = &self.index {
            output.push_str(&format!("{prefix}[k: string]: {};\n", index.emit_at(indent + 1)));
        }
        output.push_str(&"  ".repeat(indent));
        output.push('}');
        output
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        self.emit_at(0)
    }
}

impl TsProp {
    fn emit_at(&self, indent: usize) -> String {
        let marker = if self.optional { "?" } else { "" };
        format!("{}{marker}: {}", quote_if_needed(&self.name), self.ty.emit_at(indent))
    }
}

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let mut output = self
            .description
            .as_deref()
            .map(|description| doc_comment(description, ""))
            .unwrap_or_default();

        match &self.kind {
            TypeDefKind::Interface(object) => {
                output.push_str(&format!(
                    "export interface {} {}\n",
                    self.name,
                    object.emit_at(0)
                ));
            }
            TypeDefKind::TypeAlias { ty } => {
                output.push_str(&format!("export type {} = {};\n", self.name, ty.emit_at(0)));
            }
        }
        output
    }
}

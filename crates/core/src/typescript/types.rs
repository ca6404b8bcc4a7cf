//! Declarations as the compiler builds them, before any text exists.

/// A type in any position: property, alias target, array element.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// A keyword type.
    Primitive(TsPrimitive),
    /// `T[]`
    Array(Box<TsType>),
    /// `[A, B]`, from an `items` array.
    Tuple(Vec<TsType>),
    /// From `oneOf`, `anyOf`, `enum` and `type` arrays.
    Union(Vec<TsType>),
    /// From `allOf`.
    Intersection(Vec<TsType>),
    /// An inline object type.
    Object(TsObject),
    /// From `const` and `enum` members.
    Literal(TsLiteral),
    /// Name of another declaration.
    Ref(String),
}

impl TsType {
    /// `unknown`, the type of any unconstrained schema.
    pub fn unknown() -> Self {
        TsType::Primitive(TsPrimitive::Unknown)
    }

    /// Build a union, flattening nested unions and collapsing single members.
    pub fn union(types: Vec<TsType>) -> Self {
        let mut members = Vec::with_capacity(types.len());
        for ty in types {
            match ty {
                TsType::Union(nested) => members.extend(nested),
                other => members.push(other),
            }
        }
        match members.len() {
            0 => TsType::Primitive(TsPrimitive::Never),
            1 => members.remove(0),
            _ => TsType::Union(members),
        }
    }

    /// Build an intersection, collapsing single members.
    pub fn intersection(mut types: Vec<TsType>) -> Self {
        match types.len() {
            0 => TsType::unknown(),
            1 => types.remove(0),
            _ => TsType::Intersection(types),
        }
    }
}

/// Keyword types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// `string`
    String,
    /// `number`, for both `number` and `integer` schemas.
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `unknown`
    Unknown,
    /// `never`, from a `false` schema.
    Never,
}

/// Object body: named properties plus an optional `[k: string]` signature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsObject {
    /// Properties in schema order.
    pub properties: Vec<TsProp>,
    /// Value type of the index signature, if any.
    pub index: Option<Box<TsType>>,
}

impl TsObject {
    /// Renders as `{}`.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.index.is_none()
    }
}

/// One object member.
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    /// Property key, quoted on output when needed.
    pub name: String,
    /// Member type.
    pub ty: TsType,
    /// Not listed in `required`.
    pub optional: bool,
    /// Rendered as a doc comment above the member.
    pub description: Option<String>,
}

/// A literal type.
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    /// `"text"`
    String(String),
    /// A non-integral number.
    Number(f64),
    /// An integral number.
    Int(i64),
    /// `true` or `false`
    Bool(bool),
    /// `null`
    Null,
}

/// Shape of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// `export interface Name { ... }`
    Interface(TsObject),
    /// `export type Name = ...;`
    TypeAlias {
        /// Aliased type.
        ty: TsType,
    },
}

/// One `export interface` or `export type` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    /// Exported name, unique within one output.
    pub name: String,
    /// Doc comment text.
    pub description: Option<String>,
    /// Interface or alias.
    pub kind: TypeDefKind,
}

impl TsTypeDef {
    /// Object types become interfaces, everything else a type alias.
    pub fn new(name: String, description: Option<String>, ty: TsType) -> Self {
        let kind = match ty {
            TsType::Object(object) => TypeDefKind::Interface(object),
            ty => TypeDefKind::TypeAlias { ty },
        };
        Self {
            name,
            description,
            kind,
        }
    }

    /// Interfaces are emitted after every alias.
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeDefKind::Interface(_))
    }
}

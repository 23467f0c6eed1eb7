use std::fmt;

/// Primitive types of the emission target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Text,
    Number,
    BigInt,
    Boolean,
    Bytes,
    Any,
    Never,
    Void,
    Null,
}

impl Primitive {
    /// The target-surface spelling of the primitive
    pub fn spelling(self) -> &'static str {
        match self {
            Primitive::Text => "string",
            Primitive::Number => "number",
            Primitive::BigInt => "bigint",
            Primitive::Boolean => "boolean",
            Primitive::Bytes => "Uint8Array",
            Primitive::Any => "any",
            Primitive::Never => "never",
            Primitive::Void => "void",
            Primitive::Null => "null",
        }
    }
}

/// One member of a literal union (declared enumeration)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Rendered as a quoted literal
    Str(String),
    /// Rendered as a bare numeric literal
    Int(i64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write!(f, "'{}'", s),
            Literal::Int(i) => write!(f, "{}", i),
        }
    }
}

/// One resolved property of an inline object type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineField {
    /// Canonical (possibly renamed) camelCase name
    pub name: String,
    pub ty: TypeExpr,
    pub optional: bool,
}

/// Index-signature value type of an inline object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdditionalProps {
    /// `additionalProperties: true` — values are unconstrained
    Unconstrained,
    /// `additionalProperties: <schema>` — values have a resolved type
    Schema(Box<TypeExpr>),
}

/// A resolved type expression
///
/// Produced fresh on every resolution call; no node is shared or mutated
/// after construction. Unions are order-preserving and de-duplicated, so two
/// resolutions of the same schema are structurally equal. Rendering to the
/// target surface is a separate step ([`fmt::Display`]); dependency
/// extraction walks this tree structurally instead of scanning rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(Primitive),
    /// A nominal reference to a named model
    Reference(String),
    Array(Box<TypeExpr>),
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
    InlineObject {
        fields: Vec<InlineField>,
        additional: Option<AdditionalProps>,
    },
    LiteralUnion(Vec<Literal>),
}

impl TypeExpr {
    /// Build a union: flattens nested unions, drops structural duplicates
    /// (first-seen order wins), collapses a single member to itself, and
    /// resolves an empty member list to `never`.
    pub fn union(members: Vec<TypeExpr>) -> TypeExpr {
        let mut flat: Vec<TypeExpr> = Vec::with_capacity(members.len());
        for member in members {
            match member {
                TypeExpr::Union(inner) => {
                    for m in inner {
                        if !flat.contains(&m) {
                            flat.push(m);
                        }
                    }
                }
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }
        match flat.len() {
            0 => TypeExpr::Primitive(Primitive::Never),
            1 => flat.remove(0),
            _ => TypeExpr::Union(flat),
        }
    }

    /// Build an intersection: members resolved to `any` are absorbed when
    /// other members remain; an all-`any` list collapses to `any`; an empty
    /// member list is the unsatisfiable `never`.
    pub fn intersection(members: Vec<TypeExpr>) -> TypeExpr {
        if members.is_empty() {
            return TypeExpr::Primitive(Primitive::Never);
        }
        let mut parts: Vec<TypeExpr> = members
            .into_iter()
            .filter(|m| *m != TypeExpr::Primitive(Primitive::Any))
            .collect();
        match parts.len() {
            0 => TypeExpr::Primitive(Primitive::Any),
            1 => parts.remove(0),
            _ => TypeExpr::Intersection(parts),
        }
    }

    /// Union the expression with `null`
    pub fn nullable(self) -> TypeExpr {
        TypeExpr::union(vec![self, TypeExpr::Primitive(Primitive::Null)])
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(p) => write!(f, "{}", p.spelling()),
            TypeExpr::Reference(name) => write!(f, "{}", name),
            TypeExpr::Array(inner) => {
                // Union and intersection members need grouping inside `[]`.
                if matches!(
                    inner.as_ref(),
                    TypeExpr::Union(_) | TypeExpr::Intersection(_) | TypeExpr::LiteralUnion(_)
                ) {
                    write!(f, "({})[]", inner)
                } else {
                    write!(f, "{}[]", inner)
                }
            }
            TypeExpr::Union(members) => {
                let rendered: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "{}", rendered.join(" | "))
            }
            TypeExpr::Intersection(members) => {
                let rendered: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "{}", rendered.join(" & "))
            }
            TypeExpr::InlineObject { fields, additional } => {
                if fields.is_empty() && additional.is_none() {
                    return write!(f, "Record<string, unknown>");
                }
                let mut parts: Vec<String> = fields
                    .iter()
                    .map(|field| {
                        let opt = if field.optional { "?" } else { "" };
                        format!("{}{}: {};", field.name, opt, field.ty)
                    })
                    .collect();
                match additional {
                    Some(AdditionalProps::Unconstrained) => {
                        parts.push("[key: string]: unknown;".to_string());
                    }
                    Some(AdditionalProps::Schema(ty)) => {
                        parts.push(format!("[key: string]: {};", ty));
                    }
                    None => {}
                }
                write!(f, "{{ {} }}", parts.join(" "))
            }
            TypeExpr::LiteralUnion(values) => {
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", rendered.join(" | "))
            }
        }
    }
}

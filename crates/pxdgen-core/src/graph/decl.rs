//! Declaration node kinds.
//!
//! A node represents one C declaration or type in the declaration graph.
//! Composite nodes refer to other nodes by [`DeclId`] and never own them,
//! except that aggregates own their field lists and enums own their values.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DeclId;
use crate::error::GraphError;
use crate::fundamental::FundamentalType;
use crate::tree::Location;

/// The kind of declaration a node represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Fundamental(FundamentalType),
    Pointer { target: DeclId },
    Array { target: DeclId, dim: Option<u64> },
    Struct(Container),
    Union(Container),
    Enum(Enumeration),
    Typedef(Typedef),
    Function(Function),
    Variable(Variable),
}

impl Decl {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Decl::Fundamental(_) => "fundamental",
            Decl::Pointer { .. } => "pointer",
            Decl::Array { .. } => "array",
            Decl::Struct(_) => "struct",
            Decl::Union(_) => "union",
            Decl::Enum(_) => "enum",
            Decl::Typedef(_) => "typedef",
            Decl::Function(_) => "function",
            Decl::Variable(_) => "variable",
        }
    }

    /// Struct, union or enum.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Decl::Struct(_) | Decl::Union(_) | Decl::Enum(_))
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Decl::Struct(c) | Decl::Union(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match self {
            Decl::Struct(c) | Decl::Union(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_typedef(&self) -> Option<&Typedef> {
        match self {
            Decl::Typedef(td) => Some(td),
            _ => None,
        }
    }

    /// The tag of a struct, union or enum.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Decl::Struct(c) | Decl::Union(c) => c.tag.as_deref(),
            Decl::Enum(e) => e.tag.as_deref(),
            _ => None,
        }
    }

    /// Rename a struct, union or enum.
    pub fn set_tag(&mut self, tag: String) -> bool {
        match self {
            Decl::Struct(c) | Decl::Union(c) => c.tag = Some(tag),
            Decl::Enum(e) => e.tag = Some(tag),
            _ => return false,
        }
        true
    }

    /// An aggregate with no body. Always false for non-aggregates.
    pub fn is_opaque(&self) -> bool {
        match self {
            Decl::Struct(c) | Decl::Union(c) => c.is_opaque(),
            Decl::Enum(e) => e.is_opaque(),
            _ => false,
        }
    }

    /// An aggregate carrying a body (fields or values).
    pub fn has_body(&self) -> bool {
        self.is_aggregate() && !self.is_opaque()
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Decl::Struct(c) | Decl::Union(c) => c.location.as_ref(),
            Decl::Enum(e) => e.location.as_ref(),
            Decl::Typedef(td) => td.location.as_ref(),
            Decl::Function(f) => f.location.as_ref(),
            Decl::Variable(v) => v.location.as_ref(),
            _ => None,
        }
    }
}

/// Access mode of a struct field, consumed by accessor generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldMode {
    Read,
    Write,
    #[default]
    ReadWrite,
}

impl fmt::Display for FieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldMode::Read => write!(f, "r"),
            FieldMode::Write => write!(f, "w"),
            FieldMode::ReadWrite => write!(f, "rw"),
        }
    }
}

/// A struct or union member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub identifier: String,
    /// Non-owning reference to the field's type.
    pub ty: DeclId,
    pub mode: FieldMode,
    /// The member declaration defined `ty` in place (`struct { .. } pos;`).
    pub inline: bool,
}

impl Field {
    pub fn new(identifier: impl Into<String>, ty: DeclId) -> Self {
        Self {
            identifier: identifier.into(),
            ty,
            mode: FieldMode::default(),
            inline: false,
        }
    }

    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }
}

/// Body of a struct or union.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Container {
    pub tag: Option<String>,
    pub fields: Vec<Field>,
    pub location: Option<Location>,
}

impl Container {
    pub fn new(tag: Option<String>, location: Option<Location>) -> Self {
        Self {
            tag,
            fields: Vec::new(),
            location,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub identifier: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Enumeration {
    pub tag: Option<String>,
    pub values: Vec<EnumValue>,
    pub location: Option<Location>,
}

impl Enumeration {
    pub fn new(tag: Option<String>, location: Option<Location>) -> Self {
        Self {
            tag,
            values: Vec::new(),
            location,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.values.is_empty()
    }
}

/// `typedef <target> <identifier>`; the target is assigned exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typedef {
    pub identifier: String,
    target: Option<DeclId>,
    pub location: Option<Location>,
}

impl Typedef {
    pub fn new(identifier: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            identifier: identifier.into(),
            target: None,
            location,
        }
    }

    /// A typedef whose target is known up front.
    pub fn with_target(identifier: impl Into<String>, target: DeclId) -> Self {
        Self {
            identifier: identifier.into(),
            target: Some(target),
            location: None,
        }
    }

    pub fn target(&self) -> Option<DeclId> {
        self.target
    }

    pub fn assign_target(&mut self, target: DeclId) -> Result<(), GraphError> {
        if self.target.is_some() {
            return Err(GraphError::DuplicateTypedefAssignment {
                name: self.identifier.clone(),
            });
        }
        self.target = Some(target);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub identifier: Option<String>,
    pub ty: DeclId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub identifier: String,
    pub return_type: DeclId,
    pub arguments: Vec<Argument>,
    pub variadic: bool,
    pub location: Option<Location>,
}

/// A top-level object declaration (`extern int errno;`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub identifier: String,
    pub ty: DeclId,
    pub location: Option<Location>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typedef_target_assigned_once() {
        let mut td = Typedef::new("Foo", None);
        assert!(td.target().is_none());
        td.assign_target(DeclId::from_index(0)).unwrap();
        let err = td.assign_target(DeclId::from_index(1)).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateTypedefAssignment { ref name } if name == "Foo"));
        assert_eq!(td.target(), Some(DeclId::from_index(0)));
    }

    #[test]
    fn opaque_is_derived() {
        let mut c = Container::new(Some("Foo".into()), None);
        assert!(Decl::Struct(c.clone()).is_opaque());
        c.fields.push(Field::new("x", DeclId::from_index(0)));
        assert!(!Decl::Struct(c).is_opaque());
        assert!(Decl::Enum(Enumeration::default()).is_opaque());
        assert!(!Decl::Pointer { target: DeclId::from_index(0) }.is_opaque());
    }

    #[test]
    fn field_mode_defaults_to_read_write() {
        let field = Field::new("x", DeclId::from_index(0));
        assert_eq!(field.mode, FieldMode::ReadWrite);
        assert_eq!(FieldMode::Write.to_string(), "w");
    }
}

//! External parse-tree vocabulary.
//!
//! A C front end (pycparser, libclang, gccxml, ...) produces one
//! [`TranslationUnit`] per preprocessed header. The tree is serialized as JSON
//! with every enum tagged by a `"kind"` field, e.g.
//!
//! ```json
//! { "file": "point.h", "children": [
//!   { "kind": "Typedef", "name": "Point_t",
//!     "ty": { "kind": "Struct", "name": "Point", "members": [
//!       { "kind": "Declaration", "name": "x",
//!         "ty": { "kind": "Identifier", "names": ["int"] } } ] } } ] }
//! ```
//!
//! Declaration-level nodes carry a source [`Location`]; type references do not.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// A `(file, line)` source position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// The root `File` node: every top-level item of one header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// Header path as the front end saw it.
    pub file: String,
    #[serde(default)]
    pub children: Vec<Item>,
}

impl TranslationUnit {
    pub fn new(file: impl Into<String>, children: Vec<Item>) -> Self {
        Self {
            file: file.into(),
            children,
        }
    }

    /// Parse a unit from its JSON encoding.
    pub fn from_json(input: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a unit from a JSON file.
    pub fn load(path: &Path) -> Result<Self, TreeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A top-level item of a translation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Item {
    Typedef(TypedefDecl),
    Struct(AggregateDecl),
    Union(AggregateDecl),
    Enum(EnumDecl),
    Declaration(Declaration),
    /// A construct the core does not model (C++ methods, templates, ...).
    Ignored(IgnoredDecl),
}

/// A member of a struct or union body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Member {
    Declaration(Declaration),
    Ignored(IgnoredDecl),
}

/// `typedef <ty> <name>;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedefDecl {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub location: Option<Location>,
}

/// A struct or union, either a reference by tag (`members: None`) or a body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateDecl {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub members: Option<Vec<Member>>,
    #[serde(default)]
    pub location: Option<Location>,
}

/// An enum, either a reference by tag (`enumerators: None`) or a body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnumDecl {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub enumerators: Option<Vec<Enumerator>>,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: String,
    #[serde(default)]
    pub value: Option<ConstExpr>,
    #[serde(default)]
    pub location: Option<Location>,
}

/// A named (or, for parameters and anonymous members, unnamed) declarator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(default)]
    pub name: Option<String>,
    pub ty: TypeRef,
    #[serde(default)]
    pub location: Option<Location>,
}

/// A function type: return type plus parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclarator {
    pub return_type: Box<TypeRef>,
    #[serde(default)]
    pub params: Vec<Declaration>,
    #[serde(default)]
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoredDecl {
    pub name: String,
    #[serde(default)]
    pub location: Option<Location>,
}

/// A type reference in declarator position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeRef {
    Pointer {
        target: Box<TypeRef>,
    },
    Array {
        target: Box<TypeRef>,
        #[serde(default)]
        dim: Option<u64>,
    },
    /// Specifier tokens (`["unsigned", "long"]`) or a single typedef name.
    Identifier {
        names: Vec<String>,
    },
    Struct(AggregateDecl),
    Union(AggregateDecl),
    Enum(EnumDecl),
    Function(FunctionDeclarator),
}

/// A constant expression, as found in enumerator initializers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ConstExpr {
    Int {
        text: String,
    },
    Float {
        text: String,
    },
    Char {
        text: String,
    },
    String {
        text: String,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ConstExpr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<ConstExpr>,
        rhs: Box<ConstExpr>,
    },
    Identifier {
        name: String,
    },
    /// Anything else the front end could not classify (casts, sizeof, ...).
    Unsupported {
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "~")]
    BitNot,
    #[serde(rename = "!")]
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
    #[serde(rename = "<<")]
    Shl,
    #[serde(rename = ">>")]
    Shr,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "^")]
    BitXor,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "!",
        };
        f.write_str(sym)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
        };
        f.write_str(sym)
    }
}

// Construction helpers, mostly for front ends written in Rust and for tests.

impl TypeRef {
    /// A single-token identifier (`int`, `size_t`, a typedef name).
    pub fn ident(name: &str) -> Self {
        TypeRef::Identifier {
            names: vec![name.to_string()],
        }
    }

    /// A multi-token specifier list (`["unsigned", "long"]`).
    pub fn names(names: &[&str]) -> Self {
        TypeRef::Identifier {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn pointer(target: TypeRef) -> Self {
        TypeRef::Pointer {
            target: Box::new(target),
        }
    }

    pub fn array(target: TypeRef, dim: Option<u64>) -> Self {
        TypeRef::Array {
            target: Box::new(target),
            dim,
        }
    }

    pub fn function(return_type: TypeRef, params: Vec<Declaration>) -> Self {
        TypeRef::Function(FunctionDeclarator {
            return_type: Box::new(return_type),
            params,
            variadic: false,
        })
    }
}

impl Declaration {
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            name: Some(name.to_string()),
            ty,
            location: None,
        }
    }

    pub fn anonymous(ty: TypeRef) -> Self {
        Self {
            name: None,
            ty,
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl AggregateDecl {
    /// A tag reference or forward declaration (`struct Foo`).
    pub fn reference(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// A body with the given member declarations.
    pub fn body(name: Option<&str>, members: Vec<Declaration>) -> Self {
        Self {
            name: name.map(str::to_string),
            members: Some(members.into_iter().map(Member::Declaration).collect()),
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl EnumDecl {
    pub fn body(name: Option<&str>, enumerators: Vec<Enumerator>) -> Self {
        Self {
            name: name.map(str::to_string),
            enumerators: Some(enumerators),
            location: None,
        }
    }
}

impl Enumerator {
    pub fn new(name: &str, value: Option<ConstExpr>) -> Self {
        Self {
            name: name.to_string(),
            value,
            location: None,
        }
    }
}

impl TypedefDecl {
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            ty,
            location: None,
        }
    }
}

impl ConstExpr {
    pub fn int(text: &str) -> Self {
        ConstExpr::Int {
            text: text.to_string(),
        }
    }

    pub fn unary(op: UnaryOp, operand: ConstExpr) -> Self {
        ConstExpr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, lhs: ConstExpr, rhs: ConstExpr) -> Self {
        ConstExpr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_typedef_struct_json() {
        let json = r#"
{
  "file": "point.h",
  "children": [
    {
      "kind": "Typedef",
      "name": "Point_t",
      "location": { "file": "point.h", "line": 3 },
      "ty": {
        "kind": "Struct",
        "name": "Point",
        "members": [
          { "kind": "Declaration", "name": "x", "ty": { "kind": "Identifier", "names": ["int"] } },
          { "kind": "Declaration", "name": "y", "ty": { "kind": "Identifier", "names": ["int"] } }
        ]
      }
    }
  ]
}
"#;
        let unit = TranslationUnit::from_json(json).unwrap();
        assert_eq!(unit.file, "point.h");
        assert_eq!(unit.children.len(), 1);
        match &unit.children[0] {
            Item::Typedef(td) => {
                assert_eq!(td.name, "Point_t");
                assert_eq!(td.location, Some(Location::new("point.h", 3)));
                match &td.ty {
                    TypeRef::Struct(agg) => {
                        assert_eq!(agg.name.as_deref(), Some("Point"));
                        assert_eq!(agg.members.as_ref().map(Vec::len), Some(2));
                    }
                    other => panic!("expected struct, got {other:?}"),
                }
            }
            other => panic!("expected typedef, got {other:?}"),
        }
    }

    #[test]
    fn parse_enum_with_expressions() {
        let json = r#"
{
  "file": "flags.h",
  "children": [
    { "kind": "Enum", "name": "Flags", "enumerators": [
      { "name": "A" },
      { "name": "B", "value": { "kind": "Binary", "op": "<<",
          "lhs": { "kind": "Int", "text": "1" }, "rhs": { "kind": "Int", "text": "4" } } },
      { "name": "C", "value": { "kind": "Unary", "op": "~", "operand": { "kind": "Int", "text": "0" } } }
    ] }
  ]
}
"#;
        let unit = TranslationUnit::from_json(json).unwrap();
        let Item::Enum(decl) = &unit.children[0] else {
            panic!("expected enum");
        };
        let values = decl.enumerators.as_ref().unwrap();
        assert!(values[0].value.is_none());
        assert_eq!(
            values[1].value,
            Some(ConstExpr::binary(
                BinaryOp::Shl,
                ConstExpr::int("1"),
                ConstExpr::int("4")
            ))
        );
        assert_eq!(
            values[2].value,
            Some(ConstExpr::unary(UnaryOp::BitNot, ConstExpr::int("0")))
        );
    }

    #[test]
    fn json_round_trip_preserves_tree() {
        let unit = TranslationUnit::new(
            "fn.h",
            vec![Item::Declaration(Declaration::new(
                "foo",
                TypeRef::function(
                    TypeRef::pointer(TypeRef::ident("int")),
                    vec![Declaration::new("t", TypeRef::ident("double"))],
                ),
            ))],
        );
        let json = unit.to_json().unwrap();
        assert_eq!(TranslationUnit::from_json(&json).unwrap(), unit);
    }

    #[test]
    fn malformed_json_rejected() {
        let err = TranslationUnit::from_json(r#"{ "file": "x.h", "children": [ { "kind": "Nope" } ] }"#);
        assert!(matches!(err, Err(TreeError::Json(_))));
    }
}

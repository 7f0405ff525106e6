//! C declarator formatting.
//!
//! Cython accepts C declarator syntax, so a declaration is built inside out:
//! starting from the declared name, pointers prepend `*`, arrays append
//! `[n]`, functions append the argument list, and parentheses are added
//! where a pointer binds to an array or function.

use std::collections::HashMap;

use pxdgen_core::{Decl, DeclGraph, DeclId, Function};

/// Formats declarators against a graph and the names aggregates were
/// declared under.
pub struct Declarator<'g> {
    graph: &'g DeclGraph,
    names: &'g HashMap<DeclId, String>,
}

impl<'g> Declarator<'g> {
    pub fn new(graph: &'g DeclGraph, names: &'g HashMap<DeclId, String>) -> Self {
        Self { graph, names }
    }

    /// `ty` declared as `name`; an empty name gives an abstract declarator.
    pub fn declare(&self, ty: DeclId, name: &str) -> String {
        self.build(ty, name.to_string())
    }

    fn build(&self, ty: DeclId, inner: String) -> String {
        match &self.graph[ty] {
            Decl::Pointer { target } => {
                let inner = if binds_tighter(&self.graph[*target]) {
                    format!("(*{inner})")
                } else {
                    format!("*{inner}")
                };
                self.build(*target, inner)
            }
            Decl::Array { target, dim } => {
                let dim = dim.map(|d| d.to_string()).unwrap_or_default();
                self.build(*target, format!("{inner}[{dim}]"))
            }
            Decl::Function(function) => {
                let args = self.arguments(function);
                self.build(function.return_type, format!("{inner}({args})"))
            }
            _ => {
                let base = self.type_name(ty);
                if inner.is_empty() {
                    base
                } else {
                    format!("{base} {inner}")
                }
            }
        }
    }

    /// The argument list of a function, without parentheses.
    pub fn arguments(&self, function: &Function) -> String {
        let mut args: Vec<String> = function
            .arguments
            .iter()
            .map(|arg| self.declare(arg.ty, arg.identifier.as_deref().unwrap_or_default()))
            .collect();
        if function.variadic {
            args.push("...".to_string());
        }
        args.join(", ")
    }

    /// The name a non-derived type is referred to by.
    pub fn type_name(&self, ty: DeclId) -> String {
        if let Some(name) = self.names.get(&ty) {
            return name.clone();
        }
        let decl = &self.graph[ty];
        match decl {
            Decl::Fundamental(fundamental) => fundamental.c_name().to_string(),
            Decl::Typedef(td) => td.identifier.clone(),
            Decl::Function(function) => function.identifier.clone(),
            Decl::Variable(variable) => variable.identifier.clone(),
            _ => match decl.tag() {
                Some(tag) => tag.to_string(),
                None => format!("<anonymous {}>", decl.kind_name()),
            },
        }
    }
}

/// Array and function declarators bind tighter than `*`.
fn binds_tighter(decl: &Decl) -> bool {
    matches!(decl, Decl::Array { .. } | Decl::Function(_))
}

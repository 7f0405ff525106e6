//! Parse tree to declaration graph translation.
//!
//! A [`Translator`] walks a [`TranslationUnit`] once, depth first, and builds
//! a [`DeclGraph`]. Tag and typedef names are resolved through per-run name
//! tables so that forward declarations, later definitions and
//! self-referential types all land on one node.

use std::collections::{HashMap, HashSet};

use pxdgen_core::tree::{
    AggregateDecl, Declaration, EnumDecl, Enumerator, FunctionDeclarator, Item, Location, Member,
    TranslationUnit, TypeRef, TypedefDecl,
};
use pxdgen_core::{
    is_specifier_sequence, Argument, Container, Decl, DeclGraph, DeclId, EnumValue, Enumeration,
    Field, Function, Typedef, Variable,
};
use tracing::{debug, trace};

use crate::error::{Result, TranslateError};
use crate::eval::evaluate_integral;

/// Translate a whole unit with a fresh translator.
pub fn translate(unit: &TranslationUnit) -> Result<DeclGraph> {
    let mut translator = Translator::new();
    translator.translate_unit(unit)?;
    Ok(translator.finish())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AggregateKind {
    Struct,
    Union,
}

impl AggregateKind {
    fn wrap(self, container: Container) -> Decl {
        match self {
            AggregateKind::Struct => Decl::Struct(container),
            AggregateKind::Union => Decl::Union(container),
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            AggregateKind::Struct => "struct",
            AggregateKind::Union => "union",
        }
    }
}

/// Where a type reference sits relative to its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// The direct type of a struct or union member.
    Member,
    /// The direct target of a typedef.
    DirectTypedef,
    /// Anywhere else: variables, arguments, under pointers and arrays.
    Nested,
}

#[derive(Debug, Clone, Copy)]
struct Scope<'a> {
    /// Name of the nearest enclosing declaration.
    name: Option<&'a str>,
    /// Tag or function the declaration belongs to, if any.
    owner: Option<&'a str>,
    location: Option<&'a Location>,
    position: Position,
}

impl Scope<'_> {
    fn nested(self) -> Self {
        Scope {
            position: Position::Nested,
            ..self
        }
    }
}

/// Single-run translator state. Not shared between runs.
#[derive(Debug, Default)]
pub struct Translator {
    graph: DeclGraph,
    typedefs: HashMap<String, DeclId>,
    structs: HashMap<String, DeclId>,
    unions: HashMap<String, DeclId>,
    enums: HashMap<String, DeclId>,
    functions: HashMap<String, DeclId>,
    /// Tags invented for anonymous nested definitions.
    synthesized: HashSet<String>,
    /// Definitions found in nested positions, emitted before the current item.
    hoisted: Vec<DeclId>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate every item of `unit` into the graph, in order.
    ///
    /// The first error aborts the run; the graph is then incomplete and must
    /// not be rendered.
    pub fn translate_unit(&mut self, unit: &TranslationUnit) -> Result<()> {
        debug!(file = %unit.file, items = unit.children.len(), "translating unit");
        for item in &unit.children {
            self.item(item)?;
        }
        debug!(
            file = %unit.file,
            decls = self.graph.len(),
            items = self.graph.module().len(),
            "translation finished"
        );
        Ok(())
    }

    pub fn finish(self) -> DeclGraph {
        self.graph
    }

    fn item(&mut self, item: &Item) -> Result<()> {
        match item {
            Item::Typedef(td) => {
                let id = self.typedef(td)?;
                self.place_item(id);
            }
            Item::Struct(decl) => self.aggregate_item(AggregateKind::Struct, decl)?,
            Item::Union(decl) => self.aggregate_item(AggregateKind::Union, decl)?,
            Item::Enum(decl) => {
                let id = self.enumeration(decl, None)?;
                if decl.enumerators.is_some() {
                    self.graph.module_mut().remove(id);
                }
                self.place_item(id);
            }
            Item::Declaration(decl) => self.declaration_item(decl)?,
            Item::Ignored(ignored) => {
                debug!(name = %ignored.name, "dropping ignored declaration");
            }
        }
        Ok(())
    }

    /// Append `id` to the module, preceded by anything hoisted while walking it.
    fn place_item(&mut self, id: DeclId) {
        let hoisted = std::mem::take(&mut self.hoisted);
        let module = self.graph.module_mut();
        for h in hoisted.into_iter().filter(|&h| h != id) {
            module.push(h);
        }
        module.push(id);
    }

    fn hoist(&mut self, id: DeclId) {
        if !self.hoisted.contains(&id) {
            debug!(decl = %id, "hoisting nested definition");
            self.hoisted.push(id);
        }
    }

    fn aggregate_item(&mut self, kind: AggregateKind, decl: &AggregateDecl) -> Result<()> {
        let id = self.aggregate(kind, decl, None)?;
        // a definition moves a prior forward declaration to this position
        if decl.members.is_some() {
            self.graph.module_mut().remove(id);
        }
        self.place_item(id);
        Ok(())
    }

    fn declaration_item(&mut self, decl: &Declaration) -> Result<()> {
        let Some(name) = decl.name.as_deref() else {
            debug!("skipping unnamed top-level declaration");
            return Ok(());
        };
        let location = decl.location.as_ref();

        let id = match &decl.ty {
            TypeRef::Function(fd) => {
                if self.functions.contains_key(name) {
                    trace!(name, "function already declared");
                    return Ok(());
                }
                let id = self.function(name, fd, location)?;
                trace!(name, "registered function");
                self.functions.insert(name.to_string(), id);
                id
            }
            ty => {
                let scope = Scope {
                    name: Some(name),
                    owner: None,
                    location,
                    position: Position::Nested,
                };
                let ty = self.resolve(ty, scope)?;
                self.graph.add(Decl::Variable(Variable {
                    identifier: name.to_string(),
                    ty,
                    location: decl.location.clone(),
                }))
            }
        };
        self.place_item(id);
        Ok(())
    }

    fn typedef(&mut self, td: &TypedefDecl) -> Result<DeclId> {
        if let Some(&id) = self.typedefs.get(&td.name) {
            return Ok(id);
        }
        // registered before the target is walked so self references resolve
        let id = self
            .graph
            .add(Decl::Typedef(Typedef::new(td.name.clone(), td.location.clone())));
        self.typedefs.insert(td.name.clone(), id);
        trace!(name = %td.name, "registered typedef");

        let scope = Scope {
            name: Some(&td.name),
            owner: None,
            location: td.location.as_ref(),
            position: Position::DirectTypedef,
        };
        let target = self.resolve(&td.ty, scope)?;
        self.graph.assign_typedef_target(id, target)?;
        Ok(id)
    }

    fn resolve(&mut self, ty: &TypeRef, scope: Scope<'_>) -> Result<DeclId> {
        match ty {
            TypeRef::Pointer { target } => {
                let target = self.resolve(target, scope.nested())?;
                Ok(self.graph.pointer_to(target))
            }
            TypeRef::Array { target, dim } => {
                let target = self.resolve(target, scope.nested())?;
                Ok(self.graph.array_of(target, *dim))
            }
            TypeRef::Identifier { names } => self.identifier(names, scope.location),
            TypeRef::Struct(decl) => self.inline_aggregate(AggregateKind::Struct, decl, scope),
            TypeRef::Union(decl) => self.inline_aggregate(AggregateKind::Union, decl, scope),
            TypeRef::Enum(decl) => {
                let defines = decl.enumerators.is_some();
                let fallback = self.fallback_tag(defines && decl.name.is_none(), scope);
                let id = self.enumeration(decl, fallback)?;
                if defines && scope.position == Position::Nested {
                    self.hoist(id);
                }
                Ok(id)
            }
            TypeRef::Function(fd) => {
                let name = scope.name.unwrap_or_default();
                self.function(name, fd, scope.location)
            }
        }
    }

    fn identifier(&mut self, names: &[String], location: Option<&Location>) -> Result<DeclId> {
        if let [name] = names {
            if let Some(&id) = self.typedefs.get(name) {
                return Ok(id);
            }
        }
        if is_specifier_sequence(names) {
            return Ok(self.graph.fundamental(names));
        }
        Err(TranslateError::UnknownTypeReference {
            name: names.join(" "),
            location: location.cloned(),
        })
    }

    fn inline_aggregate(
        &mut self,
        kind: AggregateKind,
        decl: &AggregateDecl,
        scope: Scope<'_>,
    ) -> Result<DeclId> {
        let defines = decl.members.is_some();
        let fallback = self.fallback_tag(defines && decl.name.is_none(), scope);
        let id = self.aggregate(kind, decl, fallback)?;
        if defines && scope.position == Position::Nested {
            self.hoist(id);
        }
        Ok(id)
    }

    fn aggregate(
        &mut self,
        kind: AggregateKind,
        decl: &AggregateDecl,
        fallback_tag: Option<String>,
    ) -> Result<DeclId> {
        let existing = decl
            .name
            .as_ref()
            .and_then(|name| self.aggregate_table(kind).get(name).copied());
        let id = match existing {
            Some(id) => id,
            None => {
                let tag = decl.name.clone().or(fallback_tag);
                let id = self
                    .graph
                    .add(kind.wrap(Container::new(tag, decl.location.clone())));
                if let Some(name) = &decl.name {
                    trace!(kind = kind.keyword(), name = %name, "registered tag");
                    self.aggregate_table(kind).insert(name.clone(), id);
                }
                id
            }
        };

        if let Some(members) = &decl.members {
            let fields = self.fields(id, members)?;
            let container = self.graph.container_mut(id)?;
            container.fields = fields;
            if decl.location.is_some() {
                container.location = decl.location.clone();
            }
        }
        Ok(id)
    }

    fn aggregate_table(&mut self, kind: AggregateKind) -> &mut HashMap<String, DeclId> {
        match kind {
            AggregateKind::Struct => &mut self.structs,
            AggregateKind::Union => &mut self.unions,
        }
    }

    fn fields(&mut self, container: DeclId, members: &[Member]) -> Result<Vec<Field>> {
        let owner = self.graph.get(container).and_then(Decl::tag).map(str::to_string);
        let mut fields = Vec::with_capacity(members.len());
        for member in members {
            let decl = match member {
                Member::Declaration(decl) => decl,
                Member::Ignored(ignored) => {
                    debug!(name = %ignored.name, "dropping ignored member");
                    continue;
                }
            };

            let Some(name) = decl.name.as_deref() else {
                self.unnamed_member(decl, &mut fields)?;
                continue;
            };

            let scope = Scope {
                name: Some(name),
                owner: owner.as_deref(),
                location: decl.location.as_ref(),
                position: Position::Member,
            };
            let ty = match self.resolve(&decl.ty, scope) {
                Ok(ty) => ty,
                Err(err @ TranslateError::UnknownTypeReference { .. }) => {
                    return Err(TranslateError::MalformedContainer {
                        container: self.container_name(container),
                        field: name.to_string(),
                        source: Box::new(err),
                    });
                }
                Err(err) => return Err(err),
            };
            let mut field = Field::new(name, ty);
            field.inline = defines_aggregate(&decl.ty);
            fields.push(field);
        }
        Ok(fields)
    }

    fn unnamed_member(&mut self, decl: &Declaration, fields: &mut Vec<Field>) -> Result<()> {
        let scope = Scope {
            name: None,
            owner: None,
            location: decl.location.as_ref(),
            position: Position::Nested,
        };
        match &decl.ty {
            // C11 anonymous struct or union member: its fields belong to the parent
            TypeRef::Struct(inner) | TypeRef::Union(inner)
                if inner.name.is_none() && inner.members.is_some() =>
            {
                let kind = match &decl.ty {
                    TypeRef::Union(_) => AggregateKind::Union,
                    _ => AggregateKind::Struct,
                };
                let id = self.aggregate(kind, inner, None)?;
                if let Some(anonymous) = self.graph.container(id) {
                    fields.extend(anonymous.fields.iter().cloned());
                }
            }
            // a tag declared inside a member list still has file scope
            TypeRef::Struct(_) | TypeRef::Union(_) | TypeRef::Enum(_) => {
                self.resolve(&decl.ty, scope)?;
            }
            _ => debug!("skipping unnamed member"),
        }
        Ok(())
    }

    fn container_name(&self, id: DeclId) -> String {
        match self.graph.get(id) {
            Some(decl) => match decl.tag() {
                Some(tag) => tag.to_string(),
                None => format!("<anonymous {}>", decl.kind_name()),
            },
            None => id.to_string(),
        }
    }

    fn enumeration(&mut self, decl: &EnumDecl, fallback_tag: Option<String>) -> Result<DeclId> {
        let existing = decl
            .name
            .as_ref()
            .and_then(|name| self.enums.get(name).copied());
        let id = match existing {
            Some(id) => id,
            None => {
                let tag = decl.name.clone().or(fallback_tag);
                let id = self
                    .graph
                    .add(Decl::Enum(Enumeration::new(tag, decl.location.clone())));
                if let Some(name) = &decl.name {
                    trace!(kind = "enum", name = %name, "registered tag");
                    self.enums.insert(name.clone(), id);
                }
                id
            }
        };

        if let Some(enumerators) = &decl.enumerators {
            let values = enum_values(enumerators)?;
            if let Some(Decl::Enum(enumeration)) = self.graph.get_mut(id) {
                enumeration.values = values;
                if decl.location.is_some() {
                    enumeration.location = decl.location.clone();
                }
            }
        }
        Ok(id)
    }

    fn function(
        &mut self,
        name: &str,
        fd: &FunctionDeclarator,
        location: Option<&Location>,
    ) -> Result<DeclId> {
        let scope = Scope {
            name: Some(name),
            owner: None,
            location,
            position: Position::Nested,
        };
        let return_type = self.resolve(&fd.return_type, scope)?;

        let mut arguments = Vec::with_capacity(fd.params.len());
        for param in &fd.params {
            let param_scope = Scope {
                name: param.name.as_deref().or(Some(name)),
                owner: param.name.as_ref().map(|_| name),
                location: param.location.as_ref().or(location),
                position: Position::Nested,
            };
            let ty = self.resolve(&param.ty, param_scope)?;
            arguments.push(Argument {
                identifier: param.name.clone(),
                ty,
            });
        }

        Ok(self.graph.add(Decl::Function(Function {
            identifier: name.to_string(),
            return_type,
            arguments,
            variadic: fd.variadic,
            location: location.cloned(),
        })))
    }

    /// Tag given to an anonymous definition hoisted out of a nested position:
    /// `__<owner>_<declName>`, or `__<declName>` at file scope, suffixed with
    /// a counter when the tag is already taken.
    fn fallback_tag(&mut self, anonymous_definition: bool, scope: Scope<'_>) -> Option<String> {
        if !anonymous_definition || scope.position != Position::Nested {
            return None;
        }
        let base = match (scope.owner, scope.name?) {
            (Some(owner), name) => format!("__{owner}_{name}"),
            (None, name) => format!("__{name}"),
        };
        let mut tag = base.clone();
        let mut n = 2;
        while self.tag_taken(&tag) {
            tag = format!("{base}_{n}");
            n += 1;
        }
        self.synthesized.insert(tag.clone());
        Some(tag)
    }

    fn tag_taken(&self, tag: &str) -> bool {
        self.synthesized.contains(tag)
            || self.structs.contains_key(tag)
            || self.unions.contains_key(tag)
            || self.enums.contains_key(tag)
    }
}

/// Whether a member's type reference also defines its aggregate in place.
fn defines_aggregate(ty: &TypeRef) -> bool {
    match ty {
        TypeRef::Struct(decl) | TypeRef::Union(decl) => decl.members.is_some(),
        TypeRef::Enum(decl) => decl.enumerators.is_some(),
        _ => false,
    }
}

/// Evaluate enumerator values; an absent value is the previous one plus one.
fn enum_values(enumerators: &[Enumerator]) -> Result<Vec<EnumValue>> {
    let mut previous: i64 = -1;
    let mut values = Vec::with_capacity(enumerators.len());
    for enumerator in enumerators {
        let value = match &enumerator.value {
            Some(expr) => {
                evaluate_integral(expr).map_err(|source| TranslateError::ConstantEvaluation {
                    enumerator: enumerator.name.clone(),
                    source,
                })?
            }
            None => previous.wrapping_add(1),
        };
        previous = value;
        values.push(EnumValue {
            identifier: enumerator.name.clone(),
            value,
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pxdgen_core::tree::{ConstExpr, IgnoredDecl};
    use pxdgen_core::FundamentalType;

    fn unit(children: Vec<Item>) -> TranslationUnit {
        TranslationUnit::new("test.h", children)
    }

    fn field(name: &str, ty: TypeRef) -> Declaration {
        Declaration::new(name, ty)
    }

    fn struct_ref(name: &str) -> TypeRef {
        TypeRef::Struct(AggregateDecl::reference(name))
    }

    #[test]
    fn forward_declaration_then_definition_is_one_node() {
        let graph = translate(&unit(vec![
            Item::Struct(AggregateDecl::reference("Foo")),
            Item::Struct(AggregateDecl::body(
                Some("Foo"),
                vec![field("x", TypeRef::ident("int"))],
            )),
        ]))
        .unwrap();

        let structs: Vec<_> = graph
            .iter()
            .filter(|(_, d)| matches!(d, Decl::Struct(_)))
            .collect();
        assert_eq!(structs.len(), 1);
        let (id, decl) = structs[0];
        assert!(!decl.is_opaque());
        assert_eq!(graph.container(id).unwrap().fields.len(), 1);
        assert_eq!(graph.module().items(), &[id]);
    }

    #[test]
    fn definition_moves_forward_declared_item() {
        let graph = translate(&unit(vec![
            Item::Struct(AggregateDecl::reference("Foo")),
            Item::Typedef(TypedefDecl::new("LLong", TypeRef::names(&["long", "long"]))),
            Item::Struct(AggregateDecl::body(
                Some("Foo"),
                vec![field("b", TypeRef::ident("LLong"))],
            )),
        ]))
        .unwrap();
        let kinds: Vec<_> = graph.items().map(|(_, d)| d.kind_name()).collect();
        assert_eq!(kinds, ["typedef", "struct"]);
    }

    #[test]
    fn enum_default_sequencing() {
        let graph = translate(&unit(vec![Item::Enum(EnumDecl::body(
            None,
            vec![
                Enumerator::new("A", None),
                Enumerator::new("B", None),
                Enumerator::new("C", Some(ConstExpr::int("5"))),
                Enumerator::new("D", None),
            ],
        ))]))
        .unwrap();
        let (_, decl) = graph.items().next().unwrap();
        let Decl::Enum(enumeration) = decl else {
            panic!("expected enum, got {}", decl.kind_name());
        };
        let values: Vec<_> = enumeration
            .values
            .iter()
            .map(|v| (v.identifier.as_str(), v.value))
            .collect();
        assert_eq!(values, [("A", 0), ("B", 1), ("C", 5), ("D", 6)]);
    }

    #[test]
    fn enum_evaluation_failure_aborts() {
        let err = translate(&unit(vec![Item::Enum(EnumDecl::body(
            Some("E"),
            vec![Enumerator::new(
                "TWO",
                Some(ConstExpr::Identifier {
                    name: "CONST".into(),
                }),
            )],
        ))]))
        .unwrap_err();
        assert!(
            matches!(err, TranslateError::ConstantEvaluation { ref enumerator, .. } if enumerator == "TWO")
        );
    }

    #[test]
    fn unknown_identifier_fails() {
        let err = translate(&unit(vec![Item::Declaration(
            field("x", TypeRef::ident("size_t")).at(Location::new("test.h", 3)),
        )]))
        .unwrap_err();
        match err {
            TranslateError::UnknownTypeReference { name, location } => {
                assert_eq!(name, "size_t");
                assert_eq!(location, Some(Location::new("test.h", 3)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_field_type_is_malformed_container() {
        let err = translate(&unit(vec![Item::Struct(AggregateDecl::body(
            Some("Foo"),
            vec![field("a", TypeRef::ident("int")), field("b", TypeRef::ident("Missing"))],
        ))]))
        .unwrap_err();
        match err {
            TranslateError::MalformedContainer {
                container,
                field,
                source,
            } => {
                assert_eq!(container, "Foo");
                assert_eq!(field, "b");
                assert!(matches!(*source, TranslateError::UnknownTypeReference { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_referential_typedef() {
        let graph = translate(&unit(vec![
            Item::Typedef(TypedefDecl::new("Node", struct_ref("Node"))),
            Item::Struct(AggregateDecl::body(
                Some("Node"),
                vec![field("next", TypeRef::pointer(TypeRef::ident("Node")))],
            )),
        ]))
        .unwrap();

        let items = graph.module().items();
        assert_eq!(items.len(), 2);
        let td = graph[items[0]].as_typedef().unwrap();
        let node = td.target().unwrap();
        assert_eq!(items[1], node);
        let next = &graph.container(node).unwrap().fields[0];
        assert_eq!(graph[next.ty], Decl::Pointer { target: items[0] });
    }

    #[test]
    fn typedef_registered_once() {
        let graph = translate(&unit(vec![
            Item::Typedef(TypedefDecl::new("LLong", TypeRef::names(&["long", "long"]))),
            Item::Typedef(TypedefDecl::new("LLong", TypeRef::names(&["long", "long"]))),
        ]))
        .unwrap();
        assert_eq!(graph.module().len(), 1);
    }

    #[test]
    fn specifier_spellings_share_a_node() {
        let graph = translate(&unit(vec![Item::Struct(AggregateDecl::body(
            Some("S"),
            vec![
                field("a", TypeRef::names(&["unsigned", "long"])),
                field("b", TypeRef::names(&["long", "unsigned", "int"])),
                field("c", TypeRef::ident("__int128")),
            ],
        ))]))
        .unwrap();
        let (id, _) = graph.items().next().unwrap();
        let fields = &graph.container(id).unwrap().fields;
        assert_eq!(fields[0].ty, fields[1].ty);
        assert_eq!(graph[fields[0].ty], Decl::Fundamental(FundamentalType::UnsignedLong));
        assert_eq!(
            graph[fields[2].ty],
            Decl::Fundamental(FundamentalType::Extension("__int128".into()))
        );
    }

    #[test]
    fn functions_resolved_once_per_name() {
        let mut proto = FunctionDeclarator {
            return_type: Box::new(TypeRef::ident("int")),
            params: vec![Declaration::new("fmt", TypeRef::pointer(TypeRef::ident("char")))],
            variadic: true,
        };
        let first = Item::Declaration(field("log", TypeRef::Function(proto.clone())));
        proto.params.clear();
        let second = Item::Declaration(field("log", TypeRef::Function(proto)));

        let graph = translate(&unit(vec![first, second])).unwrap();
        assert_eq!(graph.module().len(), 1);
        let (_, decl) = graph.items().next().unwrap();
        let Decl::Function(function) = decl else {
            panic!("expected function");
        };
        assert_eq!(function.identifier, "log");
        assert_eq!(function.arguments.len(), 1);
        assert!(function.variadic);
    }

    #[test]
    fn function_pointer_typedef_names_function() {
        let graph = translate(&unit(vec![Item::Typedef(TypedefDecl::new(
            "callback",
            TypeRef::pointer(TypeRef::function(
                TypeRef::ident("void"),
                vec![Declaration::anonymous(TypeRef::pointer(TypeRef::ident("void")))],
            )),
        ))]))
        .unwrap();
        let (_, decl) = graph.items().next().unwrap();
        let target = decl.as_typedef().unwrap().target().unwrap();
        let Decl::Pointer { target: function } = graph[target] else {
            panic!("expected pointer");
        };
        let Decl::Function(function) = &graph[function] else {
            panic!("expected function");
        };
        assert_eq!(function.identifier, "callback");
        assert_eq!(function.arguments[0].identifier, None);
    }

    #[test]
    fn top_level_variable() {
        let graph = translate(&unit(vec![Item::Declaration(field(
            "errno_value",
            TypeRef::ident("int"),
        ))]))
        .unwrap();
        let (_, decl) = graph.items().next().unwrap();
        assert!(matches!(decl, Decl::Variable(v) if v.identifier == "errno_value"));
    }

    #[test]
    fn anonymous_member_fields_are_spliced() {
        let graph = translate(&unit(vec![Item::Struct(AggregateDecl::body(
            Some("Value"),
            vec![
                field("tag", TypeRef::ident("int")),
                Declaration::anonymous(TypeRef::Union(AggregateDecl::body(
                    None,
                    vec![
                        field("i", TypeRef::ident("int")),
                        field("d", TypeRef::ident("double")),
                    ],
                ))),
            ],
        ))]))
        .unwrap();
        let (id, _) = graph.items().next().unwrap();
        let names: Vec<_> = graph
            .container(id)
            .unwrap()
            .fields
            .iter()
            .map(|f| f.identifier.as_str())
            .collect();
        assert_eq!(names, ["tag", "i", "d"]);
    }

    #[test]
    fn ignored_nodes_dropped() {
        let ignored = IgnoredDecl {
            name: "std::vector".into(),
            location: None,
        };
        let graph = translate(&unit(vec![
            Item::Ignored(ignored.clone()),
            Item::Struct(AggregateDecl {
                name: Some("S".into()),
                members: Some(vec![
                    Member::Ignored(ignored),
                    Member::Declaration(field("x", TypeRef::ident("int"))),
                ]),
                location: None,
            }),
        ]))
        .unwrap();
        assert_eq!(graph.module().len(), 1);
        let (id, _) = graph.items().next().unwrap();
        assert_eq!(graph.container(id).unwrap().fields.len(), 1);
    }

    #[test]
    fn member_definition_is_inline() {
        let graph = translate(&unit(vec![Item::Struct(AggregateDecl::body(
            Some("Outer"),
            vec![
                field(
                    "pos",
                    TypeRef::Struct(AggregateDecl::body(None, vec![field("x", TypeRef::ident("int"))])),
                ),
                field("other", TypeRef::pointer(struct_ref("Outer"))),
            ],
        ))]))
        .unwrap();
        let (id, _) = graph.items().next().unwrap();
        let fields = &graph.container(id).unwrap().fields;
        assert!(fields[0].inline);
        assert!(!fields[1].inline);
        // inline members stay out of the module until flattening
        assert_eq!(graph.module().len(), 1);
    }

    #[test]
    fn nested_definition_hoisted_before_declaration() {
        let graph = translate(&unit(vec![Item::Declaration(field(
            "p",
            TypeRef::pointer(TypeRef::Struct(AggregateDecl::body(
                None,
                vec![field("x", TypeRef::ident("int"))],
            ))),
        ))]))
        .unwrap();
        let items: Vec<_> = graph.items().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].1.tag(), Some("__p"));
        assert!(matches!(items[1].1, Decl::Variable(_)));
    }

    fn anonymous_struct_ptr(ty: &str, name: &str) -> TypeRef {
        TypeRef::pointer(TypeRef::Struct(AggregateDecl::body(
            None,
            vec![field(name, TypeRef::ident(ty))],
        )))
    }

    #[test]
    fn hoisted_member_tags_include_container() {
        let graph = translate(&unit(vec![
            Item::Struct(AggregateDecl::body(
                Some("A"),
                vec![field("p", anonymous_struct_ptr("int", "a"))],
            )),
            Item::Struct(AggregateDecl::body(
                Some("B"),
                vec![field("p", anonymous_struct_ptr("double", "b"))],
            )),
        ]))
        .unwrap();
        let tags: Vec<_> = graph.items().map(|(_, decl)| decl.tag()).collect();
        assert_eq!(tags, [Some("__A_p"), Some("A"), Some("__B_p"), Some("B")]);
    }

    #[test]
    fn hoisted_argument_tags_include_function() {
        let graph = translate(&unit(vec![
            Item::Declaration(field(
                "f",
                TypeRef::function(
                    TypeRef::ident("void"),
                    vec![field("arg", anonymous_struct_ptr("int", "a"))],
                ),
            )),
            Item::Declaration(field(
                "g",
                TypeRef::function(
                    TypeRef::ident("void"),
                    vec![field("arg", anonymous_struct_ptr("double", "b"))],
                ),
            )),
        ]))
        .unwrap();
        let tags: Vec<_> = graph.items().filter_map(|(_, decl)| decl.tag()).collect();
        assert_eq!(tags, ["__f_arg", "__g_arg"]);
    }

    #[test]
    fn hoisted_tag_avoids_declared_tags() {
        let graph = translate(&unit(vec![
            Item::Struct(AggregateDecl::reference("__A_p")),
            Item::Struct(AggregateDecl::body(
                Some("A"),
                vec![field("p", anonymous_struct_ptr("int", "a"))],
            )),
        ]))
        .unwrap();
        let tags: Vec<_> = graph.items().map(|(_, decl)| decl.tag()).collect();
        assert_eq!(tags, [Some("__A_p"), Some("__A_p_2"), Some("A")]);
    }

    #[test]
    fn translates_json_tree() {
        let json = r#"{
            "file": "point.h",
            "children": [
                {"kind": "Typedef", "name": "Point_t", "ty": {"kind": "Struct", "name": "Point",
                  "members": [
                    {"kind": "Declaration", "name": "x", "ty": {"kind": "Identifier", "names": ["int"]}},
                    {"kind": "Declaration", "name": "y", "ty": {"kind": "Identifier", "names": ["int"]}}
                  ]}}
            ]
        }"#;
        let unit = TranslationUnit::from_json(json).unwrap();
        let graph = translate(&unit).unwrap();
        let (_, decl) = graph.items().next().unwrap();
        let target = decl.as_typedef().unwrap().target().unwrap();
        assert_eq!(graph[target].tag(), Some("Point"));
        assert_eq!(graph.container(target).unwrap().fields.len(), 2);
    }
}

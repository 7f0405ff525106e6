//! Declaration graph to Cython `.pxd` text.
//!
//! The renderer emits one block per module item, in module order, so a block
//! may refer to any name declared by an earlier block. It expects a fully
//! translated and flattened graph.

use std::collections::{HashMap, HashSet};

use pxdgen_core::{Container, Decl, DeclGraph, DeclId, Enumeration, Typedef};
use tracing::debug;

use crate::code::CodeWriter;
use crate::declarator::Declarator;

/// Options that narrow what gets rendered.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Only render items located in a file ending with this name. Items
    /// without a location are always rendered.
    pub header_filter: Option<String>,
}

impl RenderOptions {
    fn includes(&self, decl: &Decl) -> bool {
        match (&self.header_filter, decl.location()) {
            (Some(header), Some(location)) => location.file.ends_with(header.as_str()),
            _ => true,
        }
    }
}

/// Render every module item.
pub fn render(graph: &DeclGraph) -> Vec<String> {
    render_with(graph, &RenderOptions::default())
}

pub fn render_with(graph: &DeclGraph, options: &RenderOptions) -> Vec<String> {
    let mut renderer = Renderer::new(graph);
    for (id, decl) in graph.items() {
        if options.includes(decl) {
            renderer.item(id);
        } else {
            debug!(decl = %id, "item outside header filter");
        }
    }
    let mut writer = CodeWriter::new();
    writer.blocks(&renderer.blocks);
    writer.into_lines()
}

/// Render the graph inside a `cdef extern from "<header>":` block.
pub fn render_extern(graph: &DeclGraph, header: &str) -> Vec<String> {
    render_extern_with(graph, header, &RenderOptions::default())
}

pub fn render_extern_with(graph: &DeclGraph, header: &str, options: &RenderOptions) -> Vec<String> {
    wrap_extern(header, render_with(graph, options))
}

/// Indent `lines` one level under a `cdef extern from` line.
pub fn wrap_extern(header: &str, lines: Vec<String>) -> Vec<String> {
    let mut writer = CodeWriter::new();
    writer.line(format!("cdef extern from \"{header}\":"));
    writer.indented(|w| {
        if lines.is_empty() {
            w.line("pass");
        }
        for line in &lines {
            w.line(line);
        }
    });
    writer.into_lines()
}

/// `NAME = value` for every enumerator, in item order.
///
/// Enums reached as the direct target of a typedef item are included.
pub fn render_enum_constants(graph: &DeclGraph) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut lines = Vec::new();
    for (id, decl) in graph.items() {
        let enum_id = match decl {
            Decl::Enum(_) => id,
            Decl::Typedef(td) => match td.target() {
                Some(target) if matches!(graph[target], Decl::Enum(_)) => target,
                _ => continue,
            },
            _ => continue,
        };
        if !seen.insert(enum_id) {
            continue;
        }
        if let Decl::Enum(enumeration) = &graph[enum_id] {
            lines.extend(
                enumeration
                    .values
                    .iter()
                    .map(|v| format!("{} = {}", v.identifier, v.value)),
            );
        }
    }
    lines
}

struct Renderer<'g> {
    graph: &'g DeclGraph,
    /// Name each aggregate is referred to by once declared.
    names: HashMap<DeclId, String>,
    /// Aggregates whose full declaration has been emitted.
    defined: HashSet<DeclId>,
    forwarded: HashSet<DeclId>,
    blocks: Vec<Vec<String>>,
}

impl<'g> Renderer<'g> {
    fn new(graph: &'g DeclGraph) -> Self {
        Self {
            graph,
            names: HashMap::new(),
            defined: HashSet::new(),
            forwarded: HashSet::new(),
            blocks: Vec::new(),
        }
    }

    fn item(&mut self, id: DeclId) {
        let graph = self.graph;
        match &graph[id] {
            Decl::Struct(c) | Decl::Union(c) => {
                let Some(tag) = c.tag.clone() else {
                    debug!(decl = %id, "skipping anonymous top-level {}", graph[id].kind_name());
                    return;
                };
                self.declare(id, tag.clone());
                self.forward_declarations(&field_types(c), id);
                let block = self.container_block("cdef", keyword(&graph[id]), &tag, c);
                self.push(block);
            }
            Decl::Enum(e) => {
                if e.tag.is_none() && e.is_opaque() {
                    return;
                }
                if let Some(tag) = &e.tag {
                    self.declare(id, tag.clone());
                }
                self.push(enum_block("cdef", e.tag.as_deref(), e));
            }
            Decl::Typedef(td) => self.typedef(id, td),
            Decl::Function(f) => {
                let mut refs = vec![f.return_type];
                refs.extend(f.arguments.iter().map(|a| a.ty));
                self.forward_declarations(&refs, id);
                let line = self.declarator().declare(id, &f.identifier);
                self.push(vec![line]);
            }
            Decl::Variable(v) => {
                self.forward_declarations(&[v.ty], id);
                let line = self.declarator().declare(v.ty, &v.identifier);
                self.push(vec![line]);
            }
            other => debug!(decl = %id, "{} is not a top-level declaration", other.kind_name()),
        }
    }

    fn typedef(&mut self, id: DeclId, td: &Typedef) {
        let graph = self.graph;
        let Some(target) = td.target() else {
            debug!(name = %td.identifier, "skipping typedef without target");
            return;
        };
        let name = td.identifier.as_str();
        let target_decl = &graph[target];

        let owns_definition =
            target_decl.is_aggregate() && !graph.is_item(target) && !self.defined.contains(&target);
        if owns_definition {
            let tag = target_decl.tag();
            self.declare(target, tag.unwrap_or(name).to_string());
            let kw = keyword(target_decl);
            let (intro, declared) = match tag {
                Some(tag) => ("cdef", tag),
                None => ("ctypedef", name),
            };
            let block = match target_decl {
                Decl::Enum(e) => enum_block(intro, Some(declared), e),
                Decl::Struct(c) | Decl::Union(c) => {
                    self.forward_declarations(&field_types(c), target);
                    self.container_block(intro, kw, declared, c)
                }
                _ => return,
            };
            self.push(block);
            if declared != name {
                self.push(vec![format!("ctypedef {declared} {name}")]);
            }
            return;
        }

        self.forward_declarations(&[target], id);
        let declarator = self.declarator();
        if target_decl.is_aggregate() && declarator.type_name(target) == name {
            return;
        }
        let line = format!("ctypedef {}", declarator.declare(target, name));
        self.push(vec![line]);
    }

    fn declarator(&self) -> Declarator<'_> {
        Declarator::new(self.graph, &self.names)
    }

    fn declare(&mut self, id: DeclId, name: String) {
        self.names.insert(id, name);
        self.defined.insert(id);
    }

    fn push(&mut self, block: Vec<String>) {
        if !block.is_empty() {
            self.blocks.push(block);
        }
    }

    /// Emit bare declarations for tagged aggregates referenced from `roots`
    /// that are not declared yet. `owner` is the node being declared.
    fn forward_declarations(&mut self, roots: &[DeclId], owner: DeclId) {
        let mut referenced = Vec::new();
        for &root in roots {
            collect_aggregates(self.graph, root, &mut referenced);
        }
        for id in referenced {
            if id == owner || self.defined.contains(&id) || self.forwarded.contains(&id) {
                continue;
            }
            let decl = &self.graph[id];
            let Some(tag) = decl.tag() else {
                continue;
            };
            self.names.insert(id, tag.to_string());
            self.forwarded.insert(id);
            self.push(vec![format!("cdef {} {tag}", keyword(decl))]);
        }
    }

    fn container_block(&self, intro: &str, kw: &str, name: &str, c: &Container) -> Vec<String> {
        let mut writer = CodeWriter::new();
        if c.is_opaque() {
            writer.line(format!("{intro} {kw} {name}"));
            return writer.into_lines();
        }
        writer.line(format!("{intro} {kw} {name}:"));
        let declarator = self.declarator();
        writer.indented(|w| {
            for field in &c.fields {
                w.line(declarator.declare(field.ty, &field.identifier));
            }
        });
        writer.into_lines()
    }
}

fn enum_block(intro: &str, name: Option<&str>, e: &Enumeration) -> Vec<String> {
    let mut writer = CodeWriter::new();
    let head = match name {
        Some(name) => format!("{intro} enum {name}"),
        None => format!("{intro} enum"),
    };
    if e.is_opaque() {
        writer.line(head);
        return writer.into_lines();
    }
    writer.line(format!("{head}:"));
    writer.indented(|w| {
        for value in &e.values {
            w.line(&value.identifier);
        }
    });
    writer.into_lines()
}

fn keyword(decl: &Decl) -> &'static str {
    match decl {
        Decl::Union(_) => "union",
        Decl::Enum(_) => "enum",
        _ => "struct",
    }
}

fn field_types(c: &Container) -> Vec<DeclId> {
    c.fields.iter().map(|f| f.ty).collect()
}

/// Aggregates reachable from `ty` through pointers, arrays and function
/// types. Typedefs are not followed.
fn collect_aggregates(graph: &DeclGraph, ty: DeclId, out: &mut Vec<DeclId>) {
    match &graph[ty] {
        Decl::Pointer { target } | Decl::Array { target, .. } => {
            collect_aggregates(graph, *target, out)
        }
        Decl::Function(f) => {
            collect_aggregates(graph, f.return_type, out);
            for arg in &f.arguments {
                collect_aggregates(graph, arg.ty, out);
            }
        }
        decl if decl.is_aggregate() => {
            if !out.contains(&ty) {
                out.push(ty);
            }
        }
        _ => {}
    }
}

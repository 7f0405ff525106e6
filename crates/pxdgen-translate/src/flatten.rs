//! Nested aggregate flattening.
//!
//! Cython cannot declare a struct body inside another struct body, so every
//! member that defines its aggregate in place is hoisted to the top level:
//! the inner node is renamed `__<outer>_<inner>`, placed before the item that
//! contains it together with a `<mangled>_t` typedef, and the member is
//! rewritten to refer to that typedef.

use pxdgen_core::{Decl, DeclGraph, DeclId, Typedef};
use tracing::debug;

/// Statistics about the flattening pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenStats {
    /// Inner structs, unions and enums moved to the top level.
    pub containers_extracted: usize,
    /// `<mangled>_t` typedefs synthesized for them.
    pub typedefs_created: usize,
}

/// Flatten every nested aggregate in `graph`, in place.
///
/// Running the pass on an already flat graph changes nothing.
pub fn flatten(graph: &mut DeclGraph) -> FlattenStats {
    let mut stats = FlattenStats::default();
    let mut index = 0;

    while let Some(&item) = graph.module().items().get(index) {
        let mut extracted = Vec::new();
        if let Some((root, outer_name)) = root_of(graph, item) {
            flatten_container(graph, root, &outer_name, &mut extracted, &mut stats);
        }
        if !extracted.is_empty() {
            graph.module_mut().splice_before(item, &extracted);
        }
        index = match graph.module().position(item) {
            Some(pos) => pos + 1,
            None => index + 1,
        };
    }

    stats
}

/// The container flattened for a module item, with the name used as the
/// mangling prefix.
fn root_of(graph: &DeclGraph, item: DeclId) -> Option<(DeclId, String)> {
    match &graph[item] {
        Decl::Struct(c) | Decl::Union(c) => c.tag.clone().map(|tag| (item, tag)),
        Decl::Typedef(td) => {
            let target = td.target()?;
            let container = graph.container(target)?;
            let name = container
                .tag
                .clone()
                .unwrap_or_else(|| td.identifier.clone());
            Some((target, name))
        }
        _ => None,
    }
}

fn flatten_container(
    graph: &mut DeclGraph,
    container: DeclId,
    outer_name: &str,
    extracted: &mut Vec<DeclId>,
    stats: &mut FlattenStats,
) {
    let field_count = graph.container(container).map_or(0, |c| c.fields.len());

    for index in 0..field_count {
        let Some(field) = graph.container(container).map(|c| &c.fields[index]) else {
            continue;
        };
        let inner = field.ty;
        if !field.inline || !graph[inner].has_body() {
            continue;
        }
        let inner_name = graph[inner]
            .tag()
            .unwrap_or(field.identifier.as_str())
            .to_string();

        let mangled = format!("__{outer_name}_{inner_name}");
        graph[inner].set_tag(mangled.clone());
        if graph.container(inner).is_some() {
            flatten_container(graph, inner, &mangled, extracted, stats);
        }

        let typedef_name = format!("{mangled}_t");
        debug!(outer = outer_name, inner = %mangled, "extracting nested {}", graph[inner].kind_name());
        let typedef = graph.add(Decl::Typedef(Typedef::with_target(
            typedef_name,
            inner,
        )));
        extracted.push(inner);
        extracted.push(typedef);
        stats.containers_extracted += 1;
        stats.typedefs_created += 1;

        if let Ok(outer) = graph.container_mut(container) {
            let field = &mut outer.fields[index];
            field.ty = typedef;
            field.inline = false;
        }
    }
}

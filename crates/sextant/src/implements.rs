//! Interface-implementation resolution.
//!
//! Pairs every project struct type with every project interface type and
//! tests method-set inclusion. Pointer-receiver methods belong only to the
//! pointer method set, and the value set is always contained in the pointer
//! set, so checking the pointer set alone decides "implements by value or
//! by pointer" in one pass and naturally yields at most one edge per pair.

use std::collections::BTreeSet;

use sextant_ir::{PackageId, Program, TypeId, TypeShape};
use tracing::debug;

use crate::methodset::{MethodMap, MethodSets};
use crate::model::ImplementsEdge;
use crate::naming::{self, Namespace};

/// Compute implementation edges between project structs and interfaces.
///
/// Interfaces with no methods are skipped: everything satisfies them, so
/// edges to them carry no information.
#[must_use]
pub fn resolve(program: &Program, ns: &Namespace, sets: &MethodSets) -> BTreeSet<ImplementsEdge> {
    let mut structs: Vec<TypeId> = Vec::new();
    let mut interfaces: Vec<TypeId> = Vec::new();
    for (id, ty) in program.types() {
        if !in_scope(program, ns, ty.package) {
            continue;
        }
        match &ty.shape {
            TypeShape::Struct { .. } => structs.push(id),
            TypeShape::Interface { .. } => {
                if !sets.interface_methods(id).is_empty() {
                    interfaces.push(id);
                }
            }
            TypeShape::Opaque => {}
        }
    }

    let mut edges = BTreeSet::new();
    for &s in &structs {
        for &i in &interfaces {
            if satisfies(sets.pointer_set(s), sets.interface_methods(i)) {
                edges.insert(ImplementsEdge {
                    struct_key: key_of(program, s),
                    interface_key: key_of(program, i),
                });
            }
        }
    }
    debug!(
        structs = structs.len(),
        interfaces = interfaces.len(),
        edges = edges.len(),
        "implementation resolution complete"
    );
    edges
}

/// Whether every interface method is present with a matching signature.
fn satisfies(impl_set: &MethodMap, iface_set: &MethodMap) -> bool {
    iface_set
        .iter()
        .all(|(name, want)| impl_set.get(name).is_some_and(|got| got.sig == want.sig))
}

fn in_scope(program: &Program, ns: &Namespace, id: PackageId) -> bool {
    let pkg = program.package(id);
    ns.contains(&pkg.import_path) && !pkg.has_errors
}

fn key_of(program: &Program, ty: TypeId) -> String {
    let ty = program.named_type(ty);
    naming::type_key(&program.package(ty.package).import_path, &ty.name)
}

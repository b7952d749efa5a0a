//! Entity extraction.
//!
//! Walks a type-checked program and produces the node-level view of the
//! project: packages, struct types, interface types, and functions. Methods
//! are discovered twice, once from declarations and once from each concrete
//! type's resolved method-set view. The second pass surfaces promoted
//! methods that no declaration scan finds; both passes write through the
//! same key, so a method seen by both is recorded once and merely enriched.
//!
//! Packages outside the project namespace are not extracted, and packages
//! the front end could not type-check are skipped and counted rather than
//! failing the run.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use sextant_ir::{Function, PackageId, Pos, Program, TypeShape};
use tracing::warn;

use crate::methodset::MethodSets;
use crate::model::{FuncNode, InterfaceNode, PackageNode, StructNode};
use crate::naming::{self, Namespace};

/// The extracted entity model, keyed the way the sink stores it.
///
/// Owned by the extraction stage and handed to the orchestrator; later
/// stages read it but record their own discoveries separately.
#[derive(Debug, Default)]
pub struct SourceModel {
    /// Project packages by import path.
    pub packages: BTreeMap<String, PackageNode>,
    /// Struct nodes by key.
    pub structs: BTreeMap<String, StructNode>,
    /// Interface nodes by key.
    pub interfaces: BTreeMap<String, InterfaceNode>,
    /// Function nodes by full name, both discovery passes merged.
    pub functions: BTreeMap<String, FuncNode>,
    /// Project packages skipped because they failed to type-check.
    pub skipped_packages: usize,
}

impl SourceModel {
    /// Insert a function sighting, enriching the existing record when the
    /// key is already present.
    pub(crate) fn upsert_func(&mut self, node: FuncNode) {
        match self.functions.entry(node.full_name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(node);
            }
            Entry::Occupied(mut slot) => slot.get_mut().enrich_from(node),
        }
    }
}

/// Extract the entity model of every project package in `program`.
#[must_use]
pub fn extract(program: &Program, ns: &Namespace, sets: &MethodSets) -> SourceModel {
    let mut model = SourceModel::default();

    for (_, pkg) in program.packages() {
        if !ns.contains(&pkg.import_path) {
            continue;
        }
        if pkg.has_errors {
            warn!(package = %pkg.import_path, "skipping package that failed type-checking");
            model.skipped_packages += 1;
            continue;
        }
        model.packages.insert(
            pkg.import_path.clone(),
            PackageNode {
                import_path: pkg.import_path.clone(),
                name: pkg.name.clone(),
                dir: ns.rel_dir(&pkg.import_path),
            },
        );
    }

    for (id, ty) in program.types() {
        if !in_scope(program, ns, ty.package) {
            continue;
        }
        let import_path = &program.package(ty.package).import_path;
        let key = naming::type_key(import_path, &ty.name);
        let (file, line) = position(&ty.pos);
        match &ty.shape {
            TypeShape::Struct { fields } => {
                model.structs.insert(
                    key.clone(),
                    StructNode {
                        key,
                        name: ty.name.clone(),
                        package: import_path.clone(),
                        file,
                        line,
                        exported: ty.exported,
                        field_count: fields.len(),
                    },
                );
            }
            TypeShape::Interface { .. } => {
                model.interfaces.insert(
                    key.clone(),
                    InterfaceNode {
                        key,
                        name: ty.name.clone(),
                        package: import_path.clone(),
                        file,
                        line,
                        exported: ty.exported,
                        method_count: sets.interface_methods(id).len(),
                    },
                );
            }
            TypeShape::Opaque => {}
        }
    }

    // First discovery pass: declarations.
    for (_, func) in program.functions() {
        if !in_scope(program, ns, func.package) {
            continue;
        }
        model.upsert_func(declared_node(program, func));
    }

    // Second discovery pass: the resolved method-set view of each concrete
    // named type, which includes promoted methods.
    for (id, ty) in program.types() {
        if !in_scope(program, ns, ty.package) {
            continue;
        }
        if matches!(ty.shape, TypeShape::Interface { .. }) {
            continue;
        }
        let import_path = &program.package(ty.package).import_path;
        for (name, entry) in sets.pointer_set(id) {
            let (file, line) = position(&entry.pos);
            model.upsert_func(FuncNode {
                full_name: naming::method_key(import_path, &ty.name, name),
                name: name.clone(),
                package: import_path.clone(),
                file,
                line,
                exported: entry.exported,
                receiver: Some(ty.name.clone()),
                is_method: true,
            });
        }
    }

    model
}

/// Whether a package both belongs to the project and type-checked cleanly.
fn in_scope(program: &Program, ns: &Namespace, id: PackageId) -> bool {
    let pkg = program.package(id);
    ns.contains(&pkg.import_path) && !pkg.has_errors
}

fn position(pos: &Option<Pos>) -> (Option<String>, Option<u32>) {
    match pos {
        Some(p) => (Some(p.file.clone()), Some(p.line)),
        None => (None, None),
    }
}

fn declared_node(program: &Program, func: &Function) -> FuncNode {
    let (file, line) = position(&func.pos);
    let receiver = func
        .receiver
        .map(|r| program.named_type(r.type_id).name.clone());
    FuncNode {
        full_name: naming::declared_key(program, func),
        name: func.name.clone(),
        package: program.package(func.package).import_path.clone(),
        file,
        line,
        exported: func.exported,
        is_method: receiver.is_some(),
        receiver,
    }
}

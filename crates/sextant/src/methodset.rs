//! Method-set computation.
//!
//! Resolves, for every named type, the full set of methods callable on a
//! value of the type and on a pointer to it, including methods promoted
//! through embedded fields. Pointer-receiver methods land only in the
//! pointer set; value-receiver methods land in both. Promotion follows the
//! usual shallowest-depth rule: a name found at a shallower embedding depth
//! shadows deeper ones, and a name reachable more than once at its
//! shallowest depth is ambiguous and dropped from the set.
//!
//! Three stages consume these sets: entity extraction (a type's resolved
//! method-set view, which surfaces promoted methods that no declaration scan
//! finds), the implementation resolver (superset tests against interface
//! method sets), and the call-graph builder (dynamic dispatch candidates).

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use sextant_ir::{FuncId, Pos, Program, TypeId, TypeRef, TypeShape};

/// A method's signature, receiver excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    /// Parameter types.
    pub params: Vec<TypeRef>,
    /// Result types.
    pub results: Vec<TypeRef>,
}

/// One entry of a resolved method set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    /// The declared function backing this entry. `None` when the method was
    /// promoted from an embedded interface and has no body anywhere.
    pub func: Option<FuncId>,
    /// Whether the method name is exported.
    pub exported: bool,
    /// Declaration position of the backing method, when known.
    pub pos: Option<Pos>,
    /// Signature, receiver excluded.
    pub sig: MethodSig,
}

/// A resolved method set, keyed by method name.
pub type MethodMap = BTreeMap<String, MethodEntry>;

/// Resolved method sets for every named type of a program.
///
/// Built once per run; lookups are by [`TypeId`].
#[derive(Debug)]
pub struct MethodSets {
    value: Vec<MethodMap>,
    pointer: Vec<MethodMap>,
    iface: Vec<MethodMap>,
}

/// An embedded type reached during the breadth-first walk. `pointer` records
/// whether pointer-receiver methods promote along this path; `multiples`
/// marks types reachable through more than one path at the same depth, whose
/// methods are therefore ambiguous.
#[derive(Debug, Clone, Copy)]
struct EmbeddedType {
    ty: TypeId,
    pointer: bool,
    multiples: bool,
}

impl MethodSets {
    /// Compute method sets for every named type in `program`.
    #[must_use]
    pub fn new(program: &Program) -> Self {
        let builder = Builder::new(program);
        builder.build()
    }

    /// Methods callable on a value of `ty`.
    #[must_use]
    pub fn value_set(&self, ty: TypeId) -> &MethodMap {
        &self.value[ty.index()]
    }

    /// Methods callable on a pointer to `ty`. Always a superset of the
    /// value set.
    #[must_use]
    pub fn pointer_set(&self, ty: TypeId) -> &MethodMap {
        &self.pointer[ty.index()]
    }

    /// Full method set of an interface type, declared and embedded methods
    /// flattened. Empty for non-interface types.
    #[must_use]
    pub fn interface_methods(&self, ty: TypeId) -> &MethodMap {
        &self.iface[ty.index()]
    }
}

struct Builder<'p> {
    program: &'p Program,
    /// Directly declared methods per receiver type.
    declared: Vec<Vec<FuncId>>,
    /// Memoized full interface method sets.
    iface: Vec<Option<MethodMap>>,
}

impl<'p> Builder<'p> {
    fn new(program: &'p Program) -> Self {
        let mut declared = vec![Vec::new(); program.type_count()];
        for (id, func) in program.functions() {
            if let Some(recv) = func.receiver {
                declared[recv.type_id.index()].push(id);
            }
        }
        Self {
            program,
            declared,
            iface: vec![None; program.type_count()],
        }
    }

    fn build(mut self) -> MethodSets {
        let program = self.program;
        let count = program.type_count();

        let mut iface = Vec::with_capacity(count);
        for (id, ty) in program.types() {
            if matches!(ty.shape, TypeShape::Interface { .. }) {
                let mut in_progress = BTreeSet::new();
                iface.push(self.interface_set(id, &mut in_progress));
            } else {
                iface.push(MethodMap::new());
            }
        }

        let mut value = Vec::with_capacity(count);
        let mut pointer = Vec::with_capacity(count);
        for (id, ty) in program.types() {
            if matches!(ty.shape, TypeShape::Interface { .. }) {
                // The method set of an interface type is its own method set.
                value.push(iface[id.index()].clone());
                pointer.push(iface[id.index()].clone());
            } else {
                value.push(self.concrete_set(id, false, &iface));
                pointer.push(self.concrete_set(id, true, &iface));
            }
        }

        MethodSets {
            value,
            pointer,
            iface,
        }
    }

    /// Full method set of an interface: declared methods plus embedded
    /// interfaces, flattened transitively. Cycles contribute nothing on the
    /// second visit.
    fn interface_set(&mut self, ty: TypeId, in_progress: &mut BTreeSet<TypeId>) -> MethodMap {
        if let Some(cached) = &self.iface[ty.index()] {
            return cached.clone();
        }
        if !in_progress.insert(ty) {
            return MethodMap::new();
        }

        let program = self.program;
        let mut set = MethodMap::new();
        if let TypeShape::Interface { methods, embeds } = &program.named_type(ty).shape {
            for m in methods {
                set.insert(
                    m.name.clone(),
                    MethodEntry {
                        func: None,
                        exported: m.exported,
                        pos: None,
                        sig: MethodSig {
                            params: m.params.clone(),
                            results: m.results.clone(),
                        },
                    },
                );
            }
            for &embed in embeds {
                for (name, entry) in self.interface_set(embed, in_progress) {
                    set.entry(name).or_insert(entry);
                }
            }
        }

        in_progress.remove(&ty);
        self.iface[ty.index()] = Some(set.clone());
        set
    }

    /// Method set of a concrete (struct or opaque) named type, promoted
    /// methods included. `pointer` selects the pointer method set.
    fn concrete_set(&self, ty: TypeId, pointer: bool, iface: &[MethodMap]) -> MethodMap {
        let mut set = MethodMap::new();
        let mut dead: BTreeSet<String> = BTreeSet::new();
        let mut visited: BTreeSet<(TypeId, bool)> = BTreeSet::new();
        let mut frontier = vec![EmbeddedType {
            ty,
            pointer,
            multiples: false,
        }];

        while !frontier.is_empty() {
            let level = Self::consolidate(
                frontier
                    .drain(..)
                    .filter(|e| !visited.contains(&(e.ty, e.pointer)))
                    .collect(),
            );
            if level.is_empty() {
                break;
            }

            // Gather this depth's candidates. A name offered by exactly one
            // unambiguous entry binds; anything else at its shallowest depth
            // is dropped for good.
            let mut candidates: BTreeMap<String, (usize, MethodEntry, bool)> = BTreeMap::new();
            for embedded in &level {
                for (name, entry) in self.methods_at(embedded, iface) {
                    candidates
                        .entry(name)
                        .and_modify(|(n, _, _)| *n += 1)
                        .or_insert((1, entry, embedded.multiples));
                }
            }
            for (name, (count, entry, ambiguous)) in candidates {
                if set.contains_key(&name) || dead.contains(&name) {
                    continue;
                }
                if count == 1 && !ambiguous {
                    set.insert(name, entry);
                } else {
                    dead.insert(name);
                }
            }

            // Expand embedded fields into the next depth.
            for embedded in &level {
                visited.insert((embedded.ty, embedded.pointer));
            }
            for embedded in &level {
                if let TypeShape::Struct { fields } = &self.program.named_type(embedded.ty).shape {
                    for field in fields.iter().filter(|f| f.embedded) {
                        let next = match field.ty {
                            TypeRef::Named(inner) => EmbeddedType {
                                ty: inner,
                                pointer: embedded.pointer,
                                multiples: embedded.multiples,
                            },
                            TypeRef::Pointer(inner) => EmbeddedType {
                                ty: inner,
                                pointer: true,
                                multiples: embedded.multiples,
                            },
                            TypeRef::Opaque => continue,
                        };
                        frontier.push(next);
                    }
                }
            }
        }

        set
    }

    /// Methods contributed by one embedded type at the current depth.
    fn methods_at(&self, embedded: &EmbeddedType, iface: &[MethodMap]) -> Vec<(String, MethodEntry)> {
        let shape = &self.program.named_type(embedded.ty).shape;
        if matches!(shape, TypeShape::Interface { .. }) {
            // Methods of an embedded interface are callable on the value,
            // so they promote into both method sets.
            return iface[embedded.ty.index()]
                .iter()
                .map(|(name, entry)| (name.clone(), entry.clone()))
                .collect();
        }

        let mut out = Vec::new();
        for &fid in &self.declared[embedded.ty.index()] {
            let func = self.program.function(fid);
            let Some(recv) = func.receiver else { continue };
            if recv.pointer && !embedded.pointer {
                continue;
            }
            out.push((
                func.name.clone(),
                MethodEntry {
                    func: Some(fid),
                    exported: func.exported,
                    pos: func.pos.clone(),
                    sig: MethodSig {
                        params: func.params.get(1..).map(<[TypeRef]>::to_vec).unwrap_or_default(),
                        results: func.results.clone(),
                    },
                },
            ));
        }
        out
    }

    /// Merge same-type entries within one depth, keeping the ambiguity mark:
    /// a type reached through two different embedding paths at the same
    /// depth makes everything found through it ambiguous.
    fn consolidate(level: Vec<EmbeddedType>) -> Vec<EmbeddedType> {
        let mut seen: BTreeMap<(TypeId, bool), usize> = BTreeMap::new();
        let mut out: Vec<EmbeddedType> = Vec::new();
        for embedded in level {
            match seen.entry((embedded.ty, embedded.pointer)) {
                std::collections::btree_map::Entry::Vacant(e) => {
                    e.insert(out.len());
                    out.push(embedded);
                }
                std::collections::btree_map::Entry::Occupied(e) => {
                    out[*e.get()].multiples = true;
                }
            }
        }
        out
    }
}

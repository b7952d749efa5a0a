//! Whole-program call-graph construction.
//!
//! Static calls are syntactically resolved and always produce an edge.
//! Dynamic calls dispatch through an interface-typed value, so their
//! targets are bounded by a type-flow analysis: every project function body
//! contributes "may flow to" edges and concrete-type origins to a value
//! graph, types are propagated to a fixpoint, and each dynamic site then
//! takes as candidates every type reaching its receiver whose method set
//! provides the invoked name. Resolving a candidate wires the site's
//! receiver, arguments, and results into the target's flow nodes, which can
//! carry types further, so propagation and resolution alternate until
//! neither makes progress.
//!
//! The result over-approximates: an edge that can occur at runtime is never
//! omitted, while some reported edges may be impossible. Bodies of packages
//! outside the project namespace, and of packages that failed to
//! type-check, are not analyzed; their functions participate as callees
//! only.

// Flow-node and result indexes are exchanged with the u32-based id types of
// the program arena; bodies are validated against u32 slot counts already.
#![allow(clippy::cast_possible_truncation)]

mod graph;

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use sextant_ir::{Callee, FuncId, Function, Instr, Pos, Program, TypeId};
use tracing::debug;

use crate::extract::SourceModel;
use crate::methodset::{MethodEntry, MethodSets};
use crate::model::{CallEdge, FuncNode};
use crate::naming::{self, Namespace};

use graph::{FlowGraph, FlowKey};

/// The call-graph stage's owned output.
#[derive(Debug, Default)]
pub struct CallGraph {
    /// Resolved call edges, deduplicated.
    pub calls: BTreeSet<CallEdge>,
    /// Minimal records for edge endpoints the extraction pass did not
    /// produce, keyed by full name. No file or line is known for these.
    pub discovered: BTreeMap<String, FuncNode>,
}

/// Flow facts contributed by one analyzed function body.
#[derive(Debug, Default)]
struct Contribution {
    /// May-flow edges.
    flows: Vec<(FlowKey, FlowKey)>,
    /// Concrete-type origins.
    seeds: Vec<(FlowKey, TypeId)>,
    /// Statically resolved call sites.
    statics: Vec<(FuncId, Pos)>,
    /// Interface-dispatched call sites, resolved during the fixpoint.
    dynamics: Vec<DynamicSite>,
}

#[derive(Debug)]
struct DynamicSite {
    caller: FuncId,
    recv: FlowKey,
    method: String,
    site: Pos,
    args: Vec<FlowKey>,
    results: Vec<FlowKey>,
}

/// One end of a call edge, with enough identity to backfill a minimal node.
struct Endpoint {
    key: String,
    name: String,
    package: String,
    exported: bool,
}

/// Build the project call graph.
///
/// `model` is consulted only to decide which edge endpoints already have a
/// full record; endpoints it lacks are returned in
/// [`CallGraph::discovered`].
#[must_use]
pub fn build(
    program: &Program,
    ns: &Namespace,
    sets: &MethodSets,
    model: &SourceModel,
) -> CallGraph {
    let analyzed: Vec<(FuncId, &Function)> = program
        .functions()
        .filter(|(_, f)| {
            let pkg = program.package(f.package);
            ns.contains(&pkg.import_path) && !pkg.has_errors && f.body.is_some()
        })
        .collect();
    debug!(functions = analyzed.len(), "collecting flow contributions");

    let contributions: Vec<(FuncId, Contribution)> = analyzed
        .par_iter()
        .map(|&(id, func)| (id, contribution(id, func)))
        .collect();

    let mut flow = FlowGraph::new();
    let mut statics: Vec<(FuncId, FuncId, Pos)> = Vec::new();
    let mut sites: Vec<DynamicSite> = Vec::new();
    for (caller, c) in contributions {
        for (from, to) in c.flows {
            let from = flow.node(from);
            let to = flow.node(to);
            flow.add_edge(from, to);
        }
        for (key, ty) in c.seeds {
            let node = flow.node(key);
            flow.seed(node, ty);
        }
        for (callee, site) in c.statics {
            statics.push((caller, callee, site));
        }
        sites.extend(c.dynamics);
    }

    // Alternate propagation and dynamic-site resolution until neither makes
    // progress. `wired` remembers, per site, the candidate types already
    // handled, so each (site, type) pair is resolved exactly once.
    let mut wired: Vec<BTreeSet<TypeId>> = vec![BTreeSet::new(); sites.len()];
    let mut resolutions: Vec<(usize, TypeId)> = Vec::new();
    let mut rounds = 0usize;
    loop {
        rounds += 1;
        flow.propagate();

        let mut changed = false;
        for (i, site) in sites.iter().enumerate() {
            let recv = flow.node(site.recv.clone());
            let reaching: Vec<TypeId> = flow.types(recv).iter().copied().collect();
            for ty in reaching {
                if !wired[i].insert(ty) {
                    continue;
                }
                let Some(entry) = sets.pointer_set(ty).get(&site.method) else {
                    continue;
                };
                changed = true;
                resolutions.push((i, ty));
                if let Some(target) = entry.func {
                    let recv = flow.node(site.recv.clone());
                    let recv_param = flow.node(FlowKey::Param(target, 0));
                    flow.add_edge(recv, recv_param);
                    for (k, arg) in site.args.iter().enumerate() {
                        let from = flow.node(arg.clone());
                        let to = flow.node(FlowKey::Param(target, k as u32 + 1));
                        flow.add_edge(from, to);
                    }
                    for (j, dst) in site.results.iter().enumerate() {
                        let from = flow.node(FlowKey::Result(target, j as u32));
                        let to = flow.node(dst.clone());
                        flow.add_edge(from, to);
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
    debug!(
        rounds,
        static_sites = statics.len(),
        dynamic_sites = sites.len(),
        resolved = resolutions.len(),
        "type-flow fixpoint complete"
    );

    let mut out = CallGraph::default();
    for (caller, callee, site) in &statics {
        emit(
            &mut out,
            model,
            function_endpoint(program, *caller),
            function_endpoint(program, *callee),
            site,
            false,
        );
    }
    for (i, ty) in &resolutions {
        let site = &sites[*i];
        let Some(entry) = sets.pointer_set(*ty).get(&site.method) else {
            continue;
        };
        emit(
            &mut out,
            model,
            function_endpoint(program, site.caller),
            candidate_endpoint(program, *ty, &site.method, entry),
            &site.site,
            true,
        );
    }
    out
}

/// Walk one body and record its flow facts.
fn contribution(func: FuncId, decl: &Function) -> Contribution {
    let mut c = Contribution::default();
    let Some(body) = &decl.body else {
        return c;
    };

    // Local slot i binds parameter i on entry.
    for i in 0..decl.params.len() as u32 {
        c.flows
            .push((FlowKey::Param(func, i), FlowKey::Local(func, i)));
    }

    for instr in &body.instrs {
        match instr {
            Instr::Alloc { dst, ty } => {
                c.seeds.push((FlowKey::Local(func, dst.0), *ty));
            }
            Instr::Assign { dst, src } => {
                c.flows
                    .push((FlowKey::Local(func, src.0), FlowKey::Local(func, dst.0)));
            }
            Instr::Call {
                site,
                callee,
                args,
                results,
            } => match callee {
                Callee::Static(target) => {
                    c.statics.push((*target, site.clone()));
                    for (i, arg) in args.iter().enumerate() {
                        c.flows.push((
                            FlowKey::Local(func, arg.0),
                            FlowKey::Param(*target, i as u32),
                        ));
                    }
                    for (j, dst) in results.iter().enumerate() {
                        c.flows.push((
                            FlowKey::Result(*target, j as u32),
                            FlowKey::Local(func, dst.0),
                        ));
                    }
                }
                Callee::Dynamic { recv, method } => {
                    c.dynamics.push(DynamicSite {
                        caller: func,
                        recv: FlowKey::Local(func, recv.0),
                        method: method.clone(),
                        site: site.clone(),
                        args: args.iter().map(|a| FlowKey::Local(func, a.0)).collect(),
                        results: results.iter().map(|r| FlowKey::Local(func, r.0)).collect(),
                    });
                }
            },
            Instr::Return { values } => {
                for (j, src) in values.iter().enumerate() {
                    c.flows.push((
                        FlowKey::Local(func, src.0),
                        FlowKey::Result(func, j as u32),
                    ));
                }
            }
            Instr::StoreField { obj, field, src } => {
                c.flows.push((
                    FlowKey::Local(func, src.0),
                    FlowKey::Field(*obj, field.clone()),
                ));
            }
            Instr::LoadField { obj, field, dst } => {
                c.flows.push((
                    FlowKey::Field(*obj, field.clone()),
                    FlowKey::Local(func, dst.0),
                ));
            }
            Instr::StoreGlobal { global, src } => {
                c.flows
                    .push((FlowKey::Local(func, src.0), FlowKey::Global(*global)));
            }
            Instr::LoadGlobal { global, dst } => {
                c.flows
                    .push((FlowKey::Global(*global), FlowKey::Local(func, dst.0)));
            }
        }
    }
    c
}

fn function_endpoint(program: &Program, id: FuncId) -> Endpoint {
    let func = program.function(id);
    Endpoint {
        key: naming::declared_key(program, func),
        name: func.name.clone(),
        package: program.package(func.package).import_path.clone(),
        exported: func.exported,
    }
}

/// Endpoint for a dynamic candidate: the method as seen on the receiver's
/// concrete type, which for a promoted method is the embedding type, not
/// the declaring one.
fn candidate_endpoint(
    program: &Program,
    ty: TypeId,
    method: &str,
    entry: &MethodEntry,
) -> Endpoint {
    let owner = program.named_type(ty);
    let import_path = &program.package(owner.package).import_path;
    Endpoint {
        key: naming::method_key(import_path, &owner.name, method),
        name: method.to_string(),
        package: import_path.clone(),
        exported: entry.exported,
    }
}

/// Record one call edge, backfilling a minimal node for any endpoint the
/// extraction pass does not already know.
fn emit(
    out: &mut CallGraph,
    model: &SourceModel,
    caller: Endpoint,
    callee: Endpoint,
    site: &Pos,
    is_dynamic: bool,
) {
    for ep in [&caller, &callee] {
        if !model.functions.contains_key(&ep.key) && !out.discovered.contains_key(&ep.key) {
            out.discovered.insert(
                ep.key.clone(),
                FuncNode {
                    full_name: ep.key.clone(),
                    name: ep.name.clone(),
                    package: ep.package.clone(),
                    file: None,
                    line: None,
                    exported: ep.exported,
                    receiver: None,
                    is_method: false,
                },
            );
        }
    }
    out.calls.insert(CallEdge {
        caller: caller.key,
        callee: callee.key,
        site: format!("{}:{}", site.file, site.line),
        is_dynamic,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use sextant_ir::{
        Body, Field, Global, IfaceMethod, Local, PackageId, ProgramBuilder, Receiver, TypeRef,
        TypeShape,
    };

    fn namespace() -> Namespace {
        Namespace::new("example.com/proj").unwrap()
    }

    fn empty_struct(b: &mut ProgramBuilder, pkg: PackageId, name: &str) -> TypeId {
        let id = b.declare_type(pkg, name, None, true);
        b.define_type(id, TypeShape::Struct { fields: vec![] });
        id
    }

    fn iface(b: &mut ProgramBuilder, pkg: PackageId, name: &str, methods: &[&str]) -> TypeId {
        let id = b.declare_type(pkg, name, None, true);
        b.define_type(
            id,
            TypeShape::Interface {
                methods: methods
                    .iter()
                    .map(|m| IfaceMethod {
                        name: (*m).to_string(),
                        exported: true,
                        params: vec![],
                        results: vec![],
                    })
                    .collect(),
                embeds: vec![],
            },
        );
        id
    }

    fn method(
        b: &mut ProgramBuilder,
        pkg: PackageId,
        recv: TypeId,
        name: &str,
        body: Option<Body>,
    ) -> FuncId {
        b.add_function(Function {
            package: pkg,
            name: name.to_string(),
            pos: Some(Pos::new("types.go", 1)),
            exported: true,
            receiver: Some(Receiver {
                type_id: recv,
                pointer: false,
            }),
            params: vec![TypeRef::Named(recv)],
            results: vec![],
            body,
        })
    }

    fn free_func(
        b: &mut ProgramBuilder,
        pkg: PackageId,
        name: &str,
        params: Vec<TypeRef>,
        results: Vec<TypeRef>,
        body: Option<Body>,
    ) -> FuncId {
        b.add_function(Function {
            package: pkg,
            name: name.to_string(),
            pos: Some(Pos::new("funcs.go", 1)),
            exported: false,
            receiver: None,
            params,
            results,
            body,
        })
    }

    fn graph_of(b: ProgramBuilder) -> CallGraph {
        let program = b.finish().unwrap();
        let ns = namespace();
        let sets = MethodSets::new(&program);
        let model = extract(&program, &ns, &sets);
        build(&program, &ns, &sets, &model)
    }

    fn edges(graph: &CallGraph) -> Vec<(&str, &str, bool)> {
        graph
            .calls
            .iter()
            .map(|e| (e.caller.as_str(), e.callee.as_str(), e.is_dynamic))
            .collect()
    }

    #[test]
    fn static_call_produces_one_edge() {
        let mut b = ProgramBuilder::new();
        let app = b.add_package("example.com/proj/app", "app", false);
        let helper = free_func(&mut b, app, "helper", vec![], vec![], None);
        free_func(
            &mut b,
            app,
            "main",
            vec![],
            vec![],
            Some(Body {
                locals: 0,
                instrs: vec![Instr::Call {
                    site: Pos::new("main.go", 5),
                    callee: Callee::Static(helper),
                    args: vec![],
                    results: vec![],
                }],
            }),
        );
        let graph = graph_of(b);

        assert_eq!(
            edges(&graph),
            vec![(
                "example.com/proj/app.main",
                "example.com/proj/app.helper",
                false
            )]
        );
        let edge = graph.calls.iter().next().unwrap();
        assert_eq!(edge.site, "main.go:5");
        assert!(graph.discovered.is_empty());
    }

    #[test]
    fn dynamic_call_reports_every_type_reaching_the_receiver() {
        let mut b = ProgramBuilder::new();
        let app = b.add_package("example.com/proj/app", "app", false);
        let a = empty_struct(&mut b, app, "A");
        let bee = empty_struct(&mut b, app, "B");
        iface(&mut b, app, "Handler", &["Handle"]);
        method(&mut b, app, a, "Handle", None);
        method(&mut b, app, bee, "Handle", None);
        free_func(
            &mut b,
            app,
            "main",
            vec![],
            vec![],
            Some(Body {
                locals: 3,
                instrs: vec![
                    Instr::Alloc { dst: Local(0), ty: a },
                    Instr::Alloc { dst: Local(1), ty: bee },
                    Instr::Assign { dst: Local(2), src: Local(0) },
                    Instr::Assign { dst: Local(2), src: Local(1) },
                    Instr::Call {
                        site: Pos::new("main.go", 9),
                        callee: Callee::Dynamic {
                            recv: Local(2),
                            method: "Handle".to_string(),
                        },
                        args: vec![],
                        results: vec![],
                    },
                ],
            }),
        );
        let graph = graph_of(b);

        let got = edges(&graph);
        assert!(got.contains(&(
            "example.com/proj/app.main",
            "example.com/proj/app.A.Handle",
            true
        )));
        assert!(got.contains(&(
            "example.com/proj/app.main",
            "example.com/proj/app.B.Handle",
            true
        )));
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn unrelated_same_named_methods_resolve_to_the_flowing_type_only() {
        let mut b = ProgramBuilder::new();
        let app = b.add_package("example.com/proj/app", "app", false);
        let a = empty_struct(&mut b, app, "A");
        let bee = empty_struct(&mut b, app, "B");
        method(&mut b, app, a, "Run", None);
        method(&mut b, app, bee, "Run", None);
        free_func(
            &mut b,
            app,
            "main",
            vec![],
            vec![],
            Some(Body {
                locals: 1,
                instrs: vec![
                    Instr::Alloc { dst: Local(0), ty: a },
                    Instr::Call {
                        site: Pos::new("main.go", 4),
                        callee: Callee::Dynamic {
                            recv: Local(0),
                            method: "Run".to_string(),
                        },
                        args: vec![],
                        results: vec![],
                    },
                ],
            }),
        );
        let graph = graph_of(b);

        assert_eq!(
            edges(&graph),
            vec![(
                "example.com/proj/app.main",
                "example.com/proj/app.A.Run",
                true
            )]
        );
    }

    #[test]
    fn types_flow_through_static_call_results() {
        let mut b = ProgramBuilder::new();
        let app = b.add_package("example.com/proj/app", "app", false);
        let server = empty_struct(&mut b, app, "Server");
        method(&mut b, app, server, "Handle", None);
        let new_server = free_func(
            &mut b,
            app,
            "newServer",
            vec![],
            vec![TypeRef::Pointer(server)],
            Some(Body {
                locals: 1,
                instrs: vec![
                    Instr::Alloc {
                        dst: Local(0),
                        ty: server,
                    },
                    Instr::Return {
                        values: vec![Local(0)],
                    },
                ],
            }),
        );
        free_func(
            &mut b,
            app,
            "main",
            vec![],
            vec![],
            Some(Body {
                locals: 1,
                instrs: vec![
                    Instr::Call {
                        site: Pos::new("main.go", 3),
                        callee: Callee::Static(new_server),
                        args: vec![],
                        results: vec![Local(0)],
                    },
                    Instr::Call {
                        site: Pos::new("main.go", 4),
                        callee: Callee::Dynamic {
                            recv: Local(0),
                            method: "Handle".to_string(),
                        },
                        args: vec![],
                        results: vec![],
                    },
                ],
            }),
        );
        let graph = graph_of(b);

        let got = edges(&graph);
        assert!(got.contains(&(
            "example.com/proj/app.main",
            "example.com/proj/app.newServer",
            false
        )));
        assert!(got.contains(&(
            "example.com/proj/app.main",
            "example.com/proj/app.Server.Handle",
            true
        )));
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn receiver_flows_into_the_callee_parameter() {
        let mut b = ProgramBuilder::new();
        let app = b.add_package("example.com/proj/app", "app", false);
        let a = empty_struct(&mut b, app, "A");
        method(
            &mut b,
            app,
            a,
            "Run",
            Some(Body {
                locals: 1,
                instrs: vec![Instr::Call {
                    site: Pos::new("a.go", 8),
                    callee: Callee::Dynamic {
                        recv: Local(0),
                        method: "Clone".to_string(),
                    },
                    args: vec![],
                    results: vec![],
                }],
            }),
        );
        method(&mut b, app, a, "Clone", None);
        free_func(
            &mut b,
            app,
            "main",
            vec![],
            vec![],
            Some(Body {
                locals: 2,
                instrs: vec![
                    Instr::Alloc { dst: Local(0), ty: a },
                    Instr::Assign {
                        dst: Local(1),
                        src: Local(0),
                    },
                    Instr::Call {
                        site: Pos::new("main.go", 2),
                        callee: Callee::Dynamic {
                            recv: Local(1),
                            method: "Run".to_string(),
                        },
                        args: vec![],
                        results: vec![],
                    },
                ],
            }),
        );
        let graph = graph_of(b);

        let got = edges(&graph);
        assert!(got.contains(&(
            "example.com/proj/app.main",
            "example.com/proj/app.A.Run",
            true
        )));
        // The receiver's types reach A.Run's receiver parameter, so the
        // nested dispatch resolves too.
        assert!(got.contains(&(
            "example.com/proj/app.A.Run",
            "example.com/proj/app.A.Clone",
            true
        )));
    }

    #[test]
    fn argument_types_reach_static_callee_parameters() {
        let mut b = ProgramBuilder::new();
        let app = b.add_package("example.com/proj/app", "app", false);
        let a = empty_struct(&mut b, app, "A");
        method(&mut b, app, a, "Handle", None);
        let handle = free_func(
            &mut b,
            app,
            "handle",
            vec![TypeRef::Opaque],
            vec![],
            Some(Body {
                locals: 1,
                instrs: vec![Instr::Call {
                    site: Pos::new("funcs.go", 12),
                    callee: Callee::Dynamic {
                        recv: Local(0),
                        method: "Handle".to_string(),
                    },
                    args: vec![],
                    results: vec![],
                }],
            }),
        );
        free_func(
            &mut b,
            app,
            "main",
            vec![],
            vec![],
            Some(Body {
                locals: 1,
                instrs: vec![
                    Instr::Alloc { dst: Local(0), ty: a },
                    Instr::Call {
                        site: Pos::new("main.go", 3),
                        callee: Callee::Static(handle),
                        args: vec![Local(0)],
                        results: vec![],
                    },
                ],
            }),
        );
        let graph = graph_of(b);

        let got = edges(&graph);
        assert!(got.contains(&(
            "example.com/proj/app.handle",
            "example.com/proj/app.A.Handle",
            true
        )));
    }

    #[test]
    fn types_flow_through_field_cells() {
        let mut b = ProgramBuilder::new();
        let app = b.add_package("example.com/proj/app", "app", false);
        let a = empty_struct(&mut b, app, "A");
        method(&mut b, app, a, "Handle", None);
        let holder = b.declare_type(app, "Holder", None, true);
        b.define_type(
            holder,
            TypeShape::Struct {
                fields: vec![Field {
                    name: "h".to_string(),
                    ty: TypeRef::Opaque,
                    embedded: false,
                }],
            },
        );
        free_func(
            &mut b,
            app,
            "store",
            vec![],
            vec![],
            Some(Body {
                locals: 1,
                instrs: vec![
                    Instr::Alloc { dst: Local(0), ty: a },
                    Instr::StoreField {
                        obj: holder,
                        field: "h".to_string(),
                        src: Local(0),
                    },
                ],
            }),
        );
        free_func(
            &mut b,
            app,
            "dispatch",
            vec![],
            vec![],
            Some(Body {
                locals: 1,
                instrs: vec![
                    Instr::LoadField {
                        obj: holder,
                        field: "h".to_string(),
                        dst: Local(0),
                    },
                    Instr::Call {
                        site: Pos::new("funcs.go", 20),
                        callee: Callee::Dynamic {
                            recv: Local(0),
                            method: "Handle".to_string(),
                        },
                        args: vec![],
                        results: vec![],
                    },
                ],
            }),
        );
        let graph = graph_of(b);

        assert!(edges(&graph).contains(&(
            "example.com/proj/app.dispatch",
            "example.com/proj/app.A.Handle",
            true
        )));
    }

    #[test]
    fn types_flow_through_globals() {
        let mut b = ProgramBuilder::new();
        let app = b.add_package("example.com/proj/app", "app", false);
        let a = empty_struct(&mut b, app, "A");
        method(&mut b, app, a, "Handle", None);
        let default_handler = b.add_global(Global {
            package: app,
            name: "defaultHandler".to_string(),
            ty: TypeRef::Opaque,
        });
        free_func(
            &mut b,
            app,
            "init",
            vec![],
            vec![],
            Some(Body {
                locals: 1,
                instrs: vec![
                    Instr::Alloc { dst: Local(0), ty: a },
                    Instr::StoreGlobal {
                        global: default_handler,
                        src: Local(0),
                    },
                ],
            }),
        );
        free_func(
            &mut b,
            app,
            "main",
            vec![],
            vec![],
            Some(Body {
                locals: 1,
                instrs: vec![
                    Instr::LoadGlobal {
                        global: default_handler,
                        dst: Local(0),
                    },
                    Instr::Call {
                        site: Pos::new("main.go", 7),
                        callee: Callee::Dynamic {
                            recv: Local(0),
                            method: "Handle".to_string(),
                        },
                        args: vec![],
                        results: vec![],
                    },
                ],
            }),
        );
        let graph = graph_of(b);

        assert!(edges(&graph).contains(&(
            "example.com/proj/app.main",
            "example.com/proj/app.A.Handle",
            true
        )));
    }

    #[test]
    fn non_project_callee_is_backfilled_minimally() {
        let mut b = ProgramBuilder::new();
        let app = b.add_package("example.com/proj/app", "app", false);
        let pq = b.add_package("github.com/lib/pq", "pq", false);
        let connect = b.add_function(Function {
            package: pq,
            name: "Connect".to_string(),
            pos: None,
            exported: true,
            receiver: None,
            params: vec![],
            results: vec![],
            body: None,
        });
        // A third-party body is never analyzed, so this call contributes
        // nothing.
        let inner = free_func(&mut b, pq, "retry", vec![], vec![], None);
        b.add_function(Function {
            package: pq,
            name: "connectLoop".to_string(),
            pos: None,
            exported: false,
            receiver: None,
            params: vec![],
            results: vec![],
            body: Some(Body {
                locals: 0,
                instrs: vec![Instr::Call {
                    site: Pos::new("pq.go", 40),
                    callee: Callee::Static(inner),
                    args: vec![],
                    results: vec![],
                }],
            }),
        });
        free_func(
            &mut b,
            app,
            "main",
            vec![],
            vec![],
            Some(Body {
                locals: 0,
                instrs: vec![Instr::Call {
                    site: Pos::new("main.go", 11),
                    callee: Callee::Static(connect),
                    args: vec![],
                    results: vec![],
                }],
            }),
        );
        let graph = graph_of(b);

        assert_eq!(
            edges(&graph),
            vec![(
                "example.com/proj/app.main",
                "github.com/lib/pq.Connect",
                false
            )]
        );
        let minimal = &graph.discovered["github.com/lib/pq.Connect"];
        assert_eq!(minimal.file, None);
        assert_eq!(minimal.line, None);
        assert!(minimal.exported);
        assert!(!minimal.is_method);
    }

    #[test]
    fn erroring_package_bodies_are_skipped_but_reachable_as_callees() {
        let mut b = ProgramBuilder::new();
        let app = b.add_package("example.com/proj/app", "app", false);
        let broken = b.add_package("example.com/proj/broken", "broken", true);
        let helper = free_func(&mut b, broken, "helper", vec![], vec![], None);
        let main = free_func(
            &mut b,
            app,
            "main",
            vec![],
            vec![],
            Some(Body {
                locals: 0,
                instrs: vec![Instr::Call {
                    site: Pos::new("main.go", 2),
                    callee: Callee::Static(helper),
                    args: vec![],
                    results: vec![],
                }],
            }),
        );
        // This body lives in the erroring package and must not contribute.
        b.add_function(Function {
            package: broken,
            name: "loop".to_string(),
            pos: None,
            exported: false,
            receiver: None,
            params: vec![],
            results: vec![],
            body: Some(Body {
                locals: 0,
                instrs: vec![Instr::Call {
                    site: Pos::new("broken.go", 1),
                    callee: Callee::Static(main),
                    args: vec![],
                    results: vec![],
                }],
            }),
        });
        let graph = graph_of(b);

        assert_eq!(
            edges(&graph),
            vec![(
                "example.com/proj/app.main",
                "example.com/proj/broken.helper",
                false
            )]
        );
        // The callee was not extracted (its package was skipped), so it is
        // backfilled here.
        assert!(graph.discovered.contains_key("example.com/proj/broken.helper"));
    }

    #[test]
    fn promoted_method_dispatch_targets_the_embedding_type() {
        let mut b = ProgramBuilder::new();
        let app = b.add_package("example.com/proj/app", "app", false);
        let inner = empty_struct(&mut b, app, "Inner");
        method(&mut b, app, inner, "Refresh", None);
        let outer = b.declare_type(app, "Outer", None, true);
        b.define_type(
            outer,
            TypeShape::Struct {
                fields: vec![Field {
                    name: "Inner".to_string(),
                    ty: TypeRef::Named(inner),
                    embedded: true,
                }],
            },
        );
        free_func(
            &mut b,
            app,
            "main",
            vec![],
            vec![],
            Some(Body {
                locals: 1,
                instrs: vec![
                    Instr::Alloc {
                        dst: Local(0),
                        ty: outer,
                    },
                    Instr::Call {
                        site: Pos::new("main.go", 6),
                        callee: Callee::Dynamic {
                            recv: Local(0),
                            method: "Refresh".to_string(),
                        },
                        args: vec![],
                        results: vec![],
                    },
                ],
            }),
        );
        let graph = graph_of(b);

        // The edge names the method on the receiver's type, which the
        // extraction pass also produced, so nothing is backfilled.
        assert_eq!(
            edges(&graph),
            vec![(
                "example.com/proj/app.main",
                "example.com/proj/app.Outer.Refresh",
                true
            )]
        );
        assert!(graph.discovered.is_empty());
    }
}

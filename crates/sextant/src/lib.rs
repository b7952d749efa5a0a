//! # Sextant: Type-Resolved Call Graph Extraction
//!
//! Sextant turns a type-checked program model into a queryable code graph:
//! package, struct, interface, and function nodes, interface-implementation
//! edges, and a call graph whose interface-dispatch edges are bounded by
//! type-flow analysis instead of name matching.
//!
//! ## Design Philosophy
//!
//! - **Sound over precise** - a call that can happen at runtime is never missing;
//!   some reported edges may be impossible
//! - **Project-scoped** - a namespace prefix separates your code from third-party
//!   code, which participates only as call targets
//! - **Deterministic** - the same program produces byte-identical output, so
//!   graph diffs mean code changes
//! - **Embeddable** - library first, CLI second; the store is a trait with
//!   `SQLite` and in-memory implementations
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use sextant::store::SqliteSink;
//!
//! let program = sextant::load_program(Path::new("program.json"))?;
//! let analysis = sextant::analyze(&program, "example.com/myproject")?;
//! println!(
//!     "{} functions, {} calls, {} implements",
//!     analysis.stats.functions, analysis.stats.calls, analysis.stats.implements
//! );
//!
//! let mut sink = SqliteSink::open(Path::new(".sextant/graph.db"))?;
//! sextant::load(&analysis, &mut sink, true)?;
//! # Ok::<(), sextant::Error>(())
//! ```

mod error;
mod extract;
mod implements;
mod methodset;
mod model;
mod naming;
mod pipeline;
mod typeflow;

pub mod store;

pub use error::{Error, Result};
pub use model::{
    Analysis, AnalysisStats, CallEdge, FuncNode, ImplementsEdge, InterfaceNode, PackageNode,
    StructNode,
};
pub use naming::Namespace;
pub use pipeline::{analyze, load, load_program};

//! Typed-program intermediate representation for the sextant analyzer.
//!
//! A [`Program`] is the hand-off format between a language front end (which
//! loads and type-checks real source) and the analysis stages. It carries
//! packages, named types, function signatures and bodies, and package-level
//! globals, with every cross-reference expressed as an arena id. Bodies are
//! reduced to the handful of instructions the type-flow analysis observes:
//! allocations, assignments, calls, returns, and field/global loads and
//! stores.
//!
//! Programs serialize to JSON so front ends can be written in any language.
//! [`Program::from_json`] validates every id on the way in; [`ProgramBuilder`]
//! does the same for programs constructed in-process.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod error;
pub mod ids;
pub mod program;

pub use builder::ProgramBuilder;
pub use error::{Error, Result};
pub use ids::{FuncId, GlobalId, Local, PackageId, TypeId};
pub use program::{
    Body, Callee, Field, Function, Global, IfaceMethod, Instr, NamedType, Package, Pos, Program,
    Receiver, TypeRef, TypeShape,
};

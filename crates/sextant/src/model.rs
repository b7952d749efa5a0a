//! Entity and edge records produced by the analysis.
//!
//! These are the six record shapes handed to a [`crate::store::GraphSink`]:
//! package, struct, interface, and function nodes, plus call and implements
//! edges. Node records are keyed (import path for packages, `pkg.Name` for
//! types, the full name for functions) and upserted; edge records are merged
//! by their endpoint keys. The analysis deduplicates every batch before
//! handoff, so sinks only need idempotent writes.

use serde::{Deserialize, Serialize};

/// A project package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageNode {
    /// Unique import path.
    pub import_path: String,
    /// Short package name.
    pub name: String,
    /// Directory relative to the project root (`"."` for the root package).
    pub dir: String,
}

/// A struct type declared in a project package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructNode {
    /// `<package-import-path>.<name>`, unique.
    pub key: String,
    /// Declared name.
    pub name: String,
    /// Owning package import path.
    pub package: String,
    /// Declaring file, project-relative.
    pub file: Option<String>,
    /// Declaration line.
    pub line: Option<u32>,
    /// Whether the name is exported.
    pub exported: bool,
    /// Count of directly declared fields; an embedded field counts as one.
    pub field_count: usize,
}

/// An interface type declared in a project package.
///
/// Empty interfaces (zero methods) are still recorded as nodes; the
/// implementation resolver just never targets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceNode {
    /// `<package-import-path>.<name>`, unique.
    pub key: String,
    /// Declared name.
    pub name: String,
    /// Owning package import path.
    pub package: String,
    /// Declaring file, project-relative.
    pub file: Option<String>,
    /// Declaration line.
    pub line: Option<u32>,
    /// Whether the name is exported.
    pub exported: bool,
    /// Full method set size, embedded interfaces included.
    pub method_count: usize,
}

/// A function or method.
///
/// Functions discovered only during call-graph construction are recorded
/// with no file or line; a later pass over the same key may fill those in
/// but never changes the identity fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncNode {
    /// `<pkg>.<name>` for free functions, `<pkg>.<receiver>.<name>` for
    /// methods. Unique.
    pub full_name: String,
    /// Declared name, receiver not included.
    pub name: String,
    /// Owning package import path.
    pub package: String,
    /// Declaring file, project-relative.
    pub file: Option<String>,
    /// Declaration line.
    pub line: Option<u32>,
    /// Whether the name is exported.
    pub exported: bool,
    /// Receiver type name, pointer indirection stripped. `None` for free
    /// functions.
    pub receiver: Option<String>,
    /// Whether this is a method.
    pub is_method: bool,
}

impl FuncNode {
    /// Merge a second sighting of the same function into this record.
    ///
    /// Later sightings may fill in fields an earlier discovery lacked (a
    /// call-graph-discovered function has no position until the extraction
    /// pass supplies one) but never replace identity.
    pub(crate) fn enrich_from(&mut self, other: FuncNode) {
        debug_assert_eq!(self.full_name, other.full_name);
        if self.file.is_none() {
            self.file = other.file;
        }
        if self.line.is_none() {
            self.line = other.line;
        }
        if self.receiver.is_none() {
            self.receiver = other.receiver;
        }
        self.is_method = self.is_method || other.is_method;
    }
}

/// A resolved call.
///
/// Not unique per (caller, callee): the same pair may appear once per
/// distinct call site.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallEdge {
    /// Caller's full name.
    pub caller: String,
    /// Callee's full name.
    pub callee: String,
    /// Call site as project-relative `file:line`.
    pub site: String,
    /// True when resolution required type-flow propagation (interface
    /// dispatch); false for syntactically resolved calls.
    pub is_dynamic: bool,
}

/// A struct satisfying an interface, by value or pointer method set.
///
/// At most one edge per (struct, interface) pair regardless of which method
/// set satisfied the check.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImplementsEdge {
    /// Implementing struct's key.
    #[serde(rename = "struct")]
    pub struct_key: String,
    /// Implemented interface's key.
    #[serde(rename = "interface")]
    pub interface_key: String,
}

/// The finished, deduplicated output of a pipeline run.
///
/// Collections are ordered by key, so two runs over an unchanged program
/// produce identical output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Project packages.
    pub packages: Vec<PackageNode>,
    /// Struct nodes.
    pub structs: Vec<StructNode>,
    /// Interface nodes.
    pub interfaces: Vec<InterfaceNode>,
    /// Function nodes, extraction and call-graph discoveries merged.
    pub functions: Vec<FuncNode>,
    /// Resolved call edges.
    pub calls: Vec<CallEdge>,
    /// Implementation edges.
    pub implements: Vec<ImplementsEdge>,
    /// Run statistics.
    pub stats: AnalysisStats,
}

/// Counts of what a run produced and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Project packages recorded.
    pub packages: usize,
    /// Struct nodes recorded.
    pub structs: usize,
    /// Interface nodes recorded.
    pub interfaces: usize,
    /// Function nodes recorded.
    pub functions: usize,
    /// Call edges recorded.
    pub calls: usize,
    /// Implements edges recorded.
    pub implements: usize,
    /// Project packages skipped because the front end reported type-check
    /// errors. Non-fatal; the run proceeds over the remaining packages.
    pub packages_with_errors: usize,
}

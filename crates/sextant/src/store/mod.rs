//! Graph persistence.
//!
//! The pipeline hands its six finished batches to a [`GraphSink`]. The
//! bundled implementation stores them in `SQLite` ([`SqliteSink`]); an
//! in-memory sink ([`MemorySink`]) serves tests and dry runs. Every write
//! is a keyed upsert or a create-if-absent merge, so loading the same
//! analysis twice leaves the store unchanged, and the recovery path for a
//! failed load is simply re-running the pipeline.

mod memory;
mod schema;
mod sqlite;

pub use memory::MemorySink;
pub use sqlite::SqliteSink;

use crate::error::Result;
use crate::model::{CallEdge, FuncNode, ImplementsEdge, InterfaceNode, PackageNode, StructNode};

/// An ordered batch consumer for analysis output.
///
/// Node batches upsert by key. Relationship rows merge by their endpoint
/// keys: package membership and struct-to-method ownership are derived
/// while nodes load, implements and calls load from their own batches.
/// [`GraphSink::clean`] removes exactly the four node collections and four
/// relationship collections and nothing else; it is an explicit opt-in step
/// run before loading, never implied.
pub trait GraphSink {
    /// Remove all analyzer-owned nodes and relationships.
    fn clean(&mut self) -> Result<()>;

    /// Create lookup indexes. Idempotent.
    fn ensure_indexes(&mut self) -> Result<()>;

    /// Upsert package nodes.
    fn load_packages(&mut self, packages: &[PackageNode]) -> Result<()>;

    /// Upsert struct nodes and their package membership.
    fn load_structs(&mut self, structs: &[StructNode]) -> Result<()>;

    /// Upsert interface nodes and their package membership.
    fn load_interfaces(&mut self, interfaces: &[InterfaceNode]) -> Result<()>;

    /// Upsert function nodes, their package membership, and struct-to-method
    /// ownership for methods whose struct node exists.
    fn load_functions(&mut self, functions: &[FuncNode]) -> Result<()>;

    /// Merge call edges by (caller, callee); a later site for the same pair
    /// replaces the stored one.
    fn load_calls(&mut self, calls: &[CallEdge]) -> Result<()>;

    /// Merge implementation edges whose endpoint nodes both exist.
    fn load_implements(&mut self, implements: &[ImplementsEdge]) -> Result<()>;
}

/// Row counts per stored collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Package nodes.
    pub packages: usize,
    /// Struct nodes.
    pub structs: usize,
    /// Interface nodes.
    pub interfaces: usize,
    /// Function nodes.
    pub functions: usize,
    /// Call edges.
    pub calls: usize,
    /// Implementation edges.
    pub implements: usize,
    /// Struct-to-method ownership edges.
    pub methods: usize,
    /// Package membership edges.
    pub memberships: usize,
}

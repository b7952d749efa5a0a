//! In-memory sink, mostly for tests and dry runs.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::model::{CallEdge, FuncNode, ImplementsEdge, InterfaceNode, PackageNode, StructNode};

use super::GraphSink;

/// A sink that keeps everything handed to it in ordered collections.
///
/// Nodes are keyed the way the real store keys them, calls by their
/// (caller, callee) pair, so repeated loads collapse exactly as they would
/// in a database.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Packages by import path.
    pub packages: BTreeMap<String, PackageNode>,
    /// Structs by key.
    pub structs: BTreeMap<String, StructNode>,
    /// Interfaces by key.
    pub interfaces: BTreeMap<String, InterfaceNode>,
    /// Functions by full name.
    pub functions: BTreeMap<String, FuncNode>,
    /// Calls by (caller, callee); a later load for the pair replaces the
    /// earlier one.
    pub calls: BTreeMap<(String, String), CallEdge>,
    /// Implementation edges.
    pub implements: BTreeSet<ImplementsEdge>,
    /// How many times [`GraphSink::clean`] ran.
    pub cleaned: usize,
}

impl MemorySink {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphSink for MemorySink {
    fn clean(&mut self) -> Result<()> {
        self.packages.clear();
        self.structs.clear();
        self.interfaces.clear();
        self.functions.clear();
        self.calls.clear();
        self.implements.clear();
        self.cleaned += 1;
        Ok(())
    }

    fn ensure_indexes(&mut self) -> Result<()> {
        Ok(())
    }

    fn load_packages(&mut self, packages: &[PackageNode]) -> Result<()> {
        for pkg in packages {
            self.packages.insert(pkg.import_path.clone(), pkg.clone());
        }
        Ok(())
    }

    fn load_structs(&mut self, structs: &[StructNode]) -> Result<()> {
        for s in structs {
            self.structs.insert(s.key.clone(), s.clone());
        }
        Ok(())
    }

    fn load_interfaces(&mut self, interfaces: &[InterfaceNode]) -> Result<()> {
        for i in interfaces {
            self.interfaces.insert(i.key.clone(), i.clone());
        }
        Ok(())
    }

    fn load_functions(&mut self, functions: &[FuncNode]) -> Result<()> {
        for f in functions {
            self.functions.insert(f.full_name.clone(), f.clone());
        }
        Ok(())
    }

    fn load_calls(&mut self, calls: &[CallEdge]) -> Result<()> {
        for call in calls {
            self.calls
                .insert((call.caller.clone(), call.callee.clone()), call.clone());
        }
        Ok(())
    }

    fn load_implements(&mut self, implements: &[ImplementsEdge]) -> Result<()> {
        for imp in implements {
            self.implements.insert(imp.clone());
        }
        Ok(())
    }
}

//! Pipeline orchestration.
//!
//! A run has two halves. [`analyze`] executes the read-only stages over a
//! validated program: method-set resolution, entity extraction, call-graph
//! construction, and implementation resolution, then merges their outputs
//! into one deduplicated, ordered [`Analysis`]. [`load`] hands a finished
//! analysis to a [`GraphSink`] batch by batch. Keeping the halves separate
//! means the expensive analysis can be inspected or serialized without a
//! store, and a store can be reloaded without re-analyzing.

use std::fs;
use std::path::Path;

use sextant_ir::Program;
use tracing::info;

use crate::error::Result;
use crate::extract;
use crate::implements;
use crate::methodset::MethodSets;
use crate::model::{Analysis, AnalysisStats};
use crate::naming::Namespace;
use crate::store::GraphSink;
use crate::typeflow;

/// Read and validate a program from its JSON file.
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if the file cannot be read and
/// [`crate::Error::Program`] if it fails decoding or id validation.
pub fn load_program(path: &Path) -> Result<Program> {
    let json = fs::read_to_string(path)?;
    Ok(Program::from_json(&json)?)
}

/// Run every analysis stage over `program`.
///
/// `project` is the import-path prefix separating project packages from
/// third-party code. Functions the call graph discovered outside the
/// extracted model (third-party callees, callees in skipped packages) are
/// merged in with minimal records so every edge endpoint has a node.
///
/// # Errors
///
/// Returns [`crate::Error::Config`] for an empty project prefix. Packages
/// that failed to type-check do not error; they are skipped and counted in
/// [`AnalysisStats::packages_with_errors`].
pub fn analyze(program: &Program, project: &str) -> Result<Analysis> {
    let ns = Namespace::new(project)?;
    let sets = MethodSets::new(program);

    let mut model = extract::extract(program, &ns, &sets);
    let graph = typeflow::build(program, &ns, &sets, &model);
    let implements = implements::resolve(program, &ns, &sets);

    for (_, node) in graph.discovered {
        model.upsert_func(node);
    }

    let stats = AnalysisStats {
        packages: model.packages.len(),
        structs: model.structs.len(),
        interfaces: model.interfaces.len(),
        functions: model.functions.len(),
        calls: graph.calls.len(),
        implements: implements.len(),
        packages_with_errors: model.skipped_packages,
    };
    info!(
        packages = stats.packages,
        functions = stats.functions,
        calls = stats.calls,
        implements = stats.implements,
        skipped = stats.packages_with_errors,
        "analysis complete"
    );

    Ok(Analysis {
        packages: model.packages.into_values().collect(),
        structs: model.structs.into_values().collect(),
        interfaces: model.interfaces.into_values().collect(),
        functions: model.functions.into_values().collect(),
        calls: graph.calls.into_iter().collect(),
        implements: implements.into_iter().collect(),
        stats,
    })
}

/// Load a finished analysis into a sink.
///
/// With `clean` set, existing graph contents are removed first. Nodes load
/// before the edges that reference them, so an edge merge never runs ahead
/// of its endpoints.
///
/// # Errors
///
/// Returns the first sink error; loads are idempotent, so a failed run is
/// repaired by loading again.
pub fn load(analysis: &Analysis, sink: &mut impl GraphSink, clean: bool) -> Result<()> {
    if clean {
        sink.clean()?;
    }
    sink.ensure_indexes()?;
    sink.load_packages(&analysis.packages)?;
    sink.load_structs(&analysis.structs)?;
    sink.load_interfaces(&analysis.interfaces)?;
    sink.load_functions(&analysis.functions)?;
    sink.load_calls(&analysis.calls)?;
    sink.load_implements(&analysis.implements)?;
    info!(
        packages = analysis.packages.len(),
        functions = analysis.functions.len(),
        calls = analysis.calls.len(),
        "graph load complete"
    );
    Ok(())
}

//! Integration tests for the graph store implementations.

mod common;

use common::shop_program;
use sextant::Analysis;
use sextant::store::{MemorySink, SqliteSink};
use tempfile::TempDir;

fn temp_sink() -> (TempDir, SqliteSink) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let sink = SqliteSink::open(&dir.path().join("graph.db")).expect("failed to open database");
    (dir, sink)
}

#[test]
fn memory_and_sqlite_sinks_agree_on_counts() {
    let program = shop_program();
    let analysis = sextant::analyze(&program, "example.com/shop").expect("analyze failed");

    let mut memory = MemorySink::new();
    sextant::load(&analysis, &mut memory, true).expect("memory load failed");

    let (_dir, mut sqlite) = temp_sink();
    sextant::load(&analysis, &mut sqlite, true).expect("sqlite load failed");
    let stats = sqlite.stats().expect("stats failed");

    assert_eq!(memory.packages.len(), stats.packages);
    assert_eq!(memory.structs.len(), stats.structs);
    assert_eq!(memory.interfaces.len(), stats.interfaces);
    assert_eq!(memory.functions.len(), stats.functions);
    assert_eq!(memory.calls.len(), stats.calls);
    assert_eq!(memory.implements.len(), stats.implements);
}

#[test]
fn memory_sink_keys_batches_the_way_the_store_does() {
    let program = shop_program();
    let analysis = sextant::analyze(&program, "example.com/shop").expect("analyze failed");

    let mut sink = MemorySink::new();
    sextant::load(&analysis, &mut sink, false).expect("load failed");

    assert!(sink.packages.contains_key("example.com/shop/app"));
    assert!(sink.structs.contains_key("example.com/shop/app.Server"));
    assert!(sink.interfaces.contains_key("example.com/shop/app.Handler"));
    assert!(sink.functions.contains_key("example.com/shop/app.main"));
    assert!(sink.functions.contains_key("fmt.Println"));
    assert!(sink.calls.contains_key(&(
        "example.com/shop/app.main".to_string(),
        "example.com/shop/app.Server.Handle".to_string(),
    )));
}

#[test]
fn analysis_round_trips_through_json() {
    let program = shop_program();
    let analysis = sextant::analyze(&program, "example.com/shop").expect("analyze failed");

    let json = serde_json::to_string(&analysis).expect("serialize failed");
    let decoded: Analysis = serde_json::from_str(&json).expect("deserialize failed");

    assert_eq!(analysis, decoded);
}

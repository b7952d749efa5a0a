//! Database schema definition for the graph store.

/// Database schema definition.
///
/// Node tables are keyed exactly as the pipeline keys its batches, so every
/// load is an upsert by primary key. Relationship tables reference node
/// keys without foreign-key constraints: call endpoints may name functions
/// outside the project that exist only as minimal records, or not at all.
pub(crate) const SCHEMA: &str = r"
-- Project packages
CREATE TABLE IF NOT EXISTS packages (
    import_path TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    dir TEXT NOT NULL
);

-- Struct types
CREATE TABLE IF NOT EXISTS structs (
    key TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    package TEXT NOT NULL,
    file TEXT,
    line INTEGER,
    exported INTEGER NOT NULL,
    field_count INTEGER NOT NULL
);

-- Interface types
CREATE TABLE IF NOT EXISTS interfaces (
    key TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    package TEXT NOT NULL,
    file TEXT,
    line INTEGER,
    exported INTEGER NOT NULL,
    method_count INTEGER NOT NULL
);

-- Functions and methods. Rows discovered only through the call graph have
-- no file or line.
CREATE TABLE IF NOT EXISTS functions (
    full_name TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    package TEXT NOT NULL,
    file TEXT,
    line INTEGER,
    exported INTEGER NOT NULL,
    receiver TEXT,
    is_method INTEGER NOT NULL DEFAULT 0
);

-- Package membership, derived while loading nodes
CREATE TABLE IF NOT EXISTS in_package (
    node_kind TEXT NOT NULL,
    node_key TEXT NOT NULL,
    import_path TEXT NOT NULL,
    PRIMARY KEY (node_kind, node_key)
);

-- Struct-to-method ownership, derived while loading functions
CREATE TABLE IF NOT EXISTS has_method (
    struct_key TEXT NOT NULL,
    func_full_name TEXT NOT NULL,
    PRIMARY KEY (struct_key, func_full_name)
);

-- Interface satisfaction
CREATE TABLE IF NOT EXISTS implements (
    struct_key TEXT NOT NULL,
    interface_key TEXT NOT NULL,
    PRIMARY KEY (struct_key, interface_key)
);

-- Resolved calls, one row per (caller, callee) pair; the stored site is the
-- last one loaded
CREATE TABLE IF NOT EXISTS calls (
    caller TEXT NOT NULL,
    callee TEXT NOT NULL,
    is_dynamic INTEGER NOT NULL,
    site TEXT NOT NULL,
    PRIMARY KEY (caller, callee)
);
";

/// Lookup indexes, applied separately from the schema as an explicit
/// idempotent step. Key lookups ride the primary keys; these serve the
/// reverse direction and grouping queries.
pub(crate) const INDEXES: &str = r"
CREATE INDEX IF NOT EXISTS idx_structs_package ON structs(package);
CREATE INDEX IF NOT EXISTS idx_interfaces_package ON interfaces(package);
CREATE INDEX IF NOT EXISTS idx_functions_package ON functions(package);
CREATE INDEX IF NOT EXISTS idx_functions_name ON functions(name);
CREATE INDEX IF NOT EXISTS idx_calls_callee ON calls(callee);
CREATE INDEX IF NOT EXISTS idx_implements_interface ON implements(interface_key);
CREATE INDEX IF NOT EXISTS idx_in_package_path ON in_package(import_path);
";

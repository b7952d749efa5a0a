//! `SQLite` implementation of the graph sink.
//!
//! One table per node collection, keyed like the batches, plus four
//! relationship tables. Package membership and struct-to-method ownership
//! are derived here while nodes load; a membership or ownership row is only
//! written when the referenced node exists, mirroring how a graph merge
//! against a missing endpoint matches nothing and moves on.

// SQLite stores all integers as i64; field and method counts stay far below
// that range.
#![allow(clippy::cast_possible_wrap)]

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, params};
use tracing::{debug, trace};

use super::schema::{INDEXES, SCHEMA};
use super::{GraphSink, StoreStats};
use crate::error::{Error, Result};
use crate::model::{CallEdge, FuncNode, ImplementsEdge, InterfaceNode, PackageNode, StructNode};
use crate::naming;

/// Graph store backed by a `SQLite` database file.
///
/// The connection is wrapped in a `Mutex` so the sink can be shared with
/// read-side consumers while staying thread safe.
pub struct SqliteSink {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteSink {
    /// Open or create the graph database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the parent directory cannot be created and
    /// [`Error::Store`] if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        })
    }

    /// The database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the connection lock.
    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            Error::Internal(format!(
                "database connection mutex poisoned (a thread panicked while holding the lock): {e}"
            ))
        })
    }

    /// Row counts for every stored collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if a count query fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.connection()?;
        let count = |table: &str| -> Result<usize> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .map_err(Into::into)
        };
        Ok(StoreStats {
            packages: count("packages")?,
            structs: count("structs")?,
            interfaces: count("interfaces")?,
            functions: count("functions")?,
            calls: count("calls")?,
            implements: count("implements")?,
            methods: count("has_method")?,
            memberships: count("in_package")?,
        })
    }
}

/// Merge a membership row when the package node exists.
const MEMBER_SQL: &str = "INSERT OR IGNORE INTO in_package (node_kind, node_key, import_path)
     SELECT ?1, ?2, ?3 WHERE EXISTS (SELECT 1 FROM packages WHERE import_path = ?3)";

impl GraphSink for SqliteSink {
    fn clean(&mut self) -> Result<()> {
        debug!("cleaning graph store");
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM calls;
             DELETE FROM implements;
             DELETE FROM has_method;
             DELETE FROM in_package;
             DELETE FROM functions;
             DELETE FROM interfaces;
             DELETE FROM structs;
             DELETE FROM packages;",
        )?;
        tx.commit()?;
        Ok(())
    }

    fn ensure_indexes(&mut self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(INDEXES)?;
        Ok(())
    }

    fn load_packages(&mut self, packages: &[PackageNode]) -> Result<()> {
        trace!(count = packages.len(), "loading packages");
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        {
            let mut node = tx.prepare(
                "INSERT INTO packages (import_path, name, dir) VALUES (?1, ?2, ?3)
                 ON CONFLICT(import_path) DO UPDATE SET
                     name = excluded.name, dir = excluded.dir",
            )?;
            for pkg in packages {
                node.execute(params![pkg.import_path, pkg.name, pkg.dir])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_structs(&mut self, structs: &[StructNode]) -> Result<()> {
        trace!(count = structs.len(), "loading structs");
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        {
            let mut node = tx.prepare(
                "INSERT INTO structs (key, name, package, file, line, exported, field_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(key) DO UPDATE SET
                     name = excluded.name, package = excluded.package,
                     file = excluded.file, line = excluded.line,
                     exported = excluded.exported, field_count = excluded.field_count",
            )?;
            let mut member = tx.prepare(MEMBER_SQL)?;
            for s in structs {
                node.execute(params![
                    s.key,
                    s.name,
                    s.package,
                    s.file,
                    s.line,
                    s.exported,
                    s.field_count as i64
                ])?;
                member.execute(params!["struct", s.key, s.package])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_interfaces(&mut self, interfaces: &[InterfaceNode]) -> Result<()> {
        trace!(count = interfaces.len(), "loading interfaces");
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        {
            let mut node = tx.prepare(
                "INSERT INTO interfaces (key, name, package, file, line, exported, method_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(key) DO UPDATE SET
                     name = excluded.name, package = excluded.package,
                     file = excluded.file, line = excluded.line,
                     exported = excluded.exported, method_count = excluded.method_count",
            )?;
            let mut member = tx.prepare(MEMBER_SQL)?;
            for i in interfaces {
                node.execute(params![
                    i.key,
                    i.name,
                    i.package,
                    i.file,
                    i.line,
                    i.exported,
                    i.method_count as i64
                ])?;
                member.execute(params!["interface", i.key, i.package])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_functions(&mut self, functions: &[FuncNode]) -> Result<()> {
        trace!(count = functions.len(), "loading functions");
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        {
            let mut node = tx.prepare(
                "INSERT INTO functions
                     (full_name, name, package, file, line, exported, receiver, is_method)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(full_name) DO UPDATE SET
                     name = excluded.name, package = excluded.package,
                     file = excluded.file, line = excluded.line,
                     exported = excluded.exported, receiver = excluded.receiver,
                     is_method = excluded.is_method",
            )?;
            let mut member = tx.prepare(MEMBER_SQL)?;
            let mut owner = tx.prepare(
                "INSERT OR IGNORE INTO has_method (struct_key, func_full_name)
                 SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM structs WHERE key = ?1)",
            )?;
            for f in functions {
                node.execute(params![
                    f.full_name,
                    f.name,
                    f.package,
                    f.file,
                    f.line,
                    f.exported,
                    f.receiver,
                    f.is_method
                ])?;
                member.execute(params!["function", f.full_name, f.package])?;
                if let Some(receiver) = f.receiver.as_deref().filter(|_| f.is_method) {
                    let struct_key = naming::type_key(&f.package, receiver);
                    owner.execute(params![struct_key, f.full_name])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_calls(&mut self, calls: &[CallEdge]) -> Result<()> {
        trace!(count = calls.len(), "loading calls");
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        {
            let mut edge = tx.prepare(
                "INSERT INTO calls (caller, callee, is_dynamic, site)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(caller, callee) DO UPDATE SET
                     is_dynamic = excluded.is_dynamic, site = excluded.site",
            )?;
            for call in calls {
                edge.execute(params![call.caller, call.callee, call.is_dynamic, call.site])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_implements(&mut self, implements: &[ImplementsEdge]) -> Result<()> {
        trace!(count = implements.len(), "loading implements");
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        {
            let mut edge = tx.prepare(
                "INSERT OR IGNORE INTO implements (struct_key, interface_key)
                 SELECT ?1, ?2
                 WHERE EXISTS (SELECT 1 FROM structs WHERE key = ?1)
                   AND EXISTS (SELECT 1 FROM interfaces WHERE key = ?2)",
            )?;
            for imp in implements {
                edge.execute(params![imp.struct_key, imp.interface_key])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

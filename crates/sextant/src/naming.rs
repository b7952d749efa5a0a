//! Entity naming and project-namespace membership.
//!
//! Every stage that names a function goes through [`func_key`] /
//! [`method_key`], so keys computed during entity extraction and keys
//! computed during call-graph construction always agree. A function or
//! method discovered twice lands on the same key and is merged, never
//! duplicated.

use sextant_ir::{Function, Program};

/// The import-path prefix separating analyzed-project packages from
/// third-party code.
///
/// Membership is an exact path-prefix test: `foo` contains `foo` and
/// `foo/bar`, but not `foobar`. Non-project packages stay visible to the
/// analysis for their type signatures but are never materialized as nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    /// Create a namespace from a project import-path prefix.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] for an empty prefix; analyzing with
    /// an empty namespace would claim every package, third-party included.
    pub fn new(prefix: &str) -> crate::Result<Self> {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return Err(crate::Error::Config(
                "project namespace must not be empty".to_string(),
            ));
        }
        Ok(Self {
            prefix: prefix.to_string(),
        })
    }

    /// The prefix this namespace was built from.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `import_path` belongs to the project.
    #[must_use]
    pub fn contains(&self, import_path: &str) -> bool {
        import_path == self.prefix
            || (import_path.starts_with(&self.prefix)
                && import_path[self.prefix.len()..].starts_with('/'))
    }

    /// Project-relative directory for a project import path.
    ///
    /// The namespace root itself maps to `"."`. Paths outside the project
    /// are returned unchanged.
    #[must_use]
    pub fn rel_dir(&self, import_path: &str) -> String {
        if import_path == self.prefix {
            ".".to_string()
        } else if self.contains(import_path) {
            import_path[self.prefix.len() + 1..].to_string()
        } else {
            import_path.to_string()
        }
    }
}

/// Key for a free function: `<package-import-path>.<name>`.
#[must_use]
pub fn func_key(import_path: &str, name: &str) -> String {
    format!("{import_path}.{name}")
}

/// Key for a method: `<package-import-path>.<receiver-type-name>.<name>`,
/// with pointer indirection already stripped from the receiver.
#[must_use]
pub fn method_key(import_path: &str, receiver: &str, name: &str) -> String {
    format!("{import_path}.{receiver}.{name}")
}

/// Key for a function as declared, deriving the receiver type name from the
/// program when the function is a method.
#[must_use]
pub fn declared_key(program: &Program, function: &Function) -> String {
    let pkg = &program.package(function.package).import_path;
    match function.receiver {
        Some(recv) => method_key(
            pkg,
            &program.named_type(recv.type_id).name,
            &function.name,
        ),
        None => func_key(pkg, &function.name),
    }
}

/// Key for a named type: `<package-import-path>.<name>`.
#[must_use]
pub fn type_key(import_path: &str, name: &str) -> String {
    format!("{import_path}.{name}")
}

//! Incremental program construction.
//!
//! Front ends (and test fixtures) assemble a [`Program`] through
//! [`ProgramBuilder`]. Types and functions are declared first and defined
//! later, so mutually recursive shapes (a struct holding a pointer to itself,
//! two functions calling each other) can be expressed without forward
//! references to ids that do not exist yet.

// Arena indices are stored as u32; see program.rs.
#![allow(clippy::cast_possible_truncation)]

use crate::error::Result;
use crate::ids::{FuncId, GlobalId, PackageId, TypeId};
use crate::program::{Body, Function, Global, NamedType, Package, Pos, Program, TypeShape};

/// Builder for [`Program`].
///
/// Ids returned by the `add_*`/`declare_*` methods are only meaningful for
/// the builder that issued them. [`ProgramBuilder::finish`] validates every
/// cross-reference before handing out the program.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    packages: Vec<Package>,
    types: Vec<NamedType>,
    functions: Vec<Function>,
    globals: Vec<Global>,
}

impl ProgramBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package.
    pub fn add_package(
        &mut self,
        import_path: impl Into<String>,
        name: impl Into<String>,
        has_errors: bool,
    ) -> PackageId {
        let id = PackageId::new(self.packages.len() as u32);
        self.packages.push(Package {
            import_path: import_path.into(),
            name: name.into(),
            has_errors,
        });
        id
    }

    /// Declare a named type with an [`TypeShape::Opaque`] placeholder shape.
    ///
    /// Call [`ProgramBuilder::define_type`] once the referenced ids exist.
    /// Types that stay opaque need no definition.
    pub fn declare_type(
        &mut self,
        package: PackageId,
        name: impl Into<String>,
        pos: Option<Pos>,
        exported: bool,
    ) -> TypeId {
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(NamedType {
            package,
            name: name.into(),
            pos,
            exported,
            shape: TypeShape::Opaque,
        });
        id
    }

    /// Attach a shape to a previously declared type.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by this builder's
    /// [`ProgramBuilder::declare_type`].
    pub fn define_type(&mut self, id: TypeId, shape: TypeShape) {
        assert!(
            id.index() < self.types.len(),
            "define_type: undeclared type id {}",
            id.index()
        );
        self.types[id.index()].shape = shape;
    }

    /// Add a function. The body may be attached now or later through
    /// [`ProgramBuilder::set_body`].
    pub fn add_function(&mut self, function: Function) -> FuncId {
        let id = FuncId::new(self.functions.len() as u32);
        self.functions.push(function);
        id
    }

    /// Attach a body to a previously added function.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by this builder's
    /// [`ProgramBuilder::add_function`].
    pub fn set_body(&mut self, id: FuncId, body: Body) {
        assert!(
            id.index() < self.functions.len(),
            "set_body: unknown function id {}",
            id.index()
        );
        self.functions[id.index()].body = Some(body);
    }

    /// Add a package-level variable.
    pub fn add_global(&mut self, global: Global) -> GlobalId {
        let id = GlobalId::new(self.globals.len() as u32);
        self.globals.push(global);
        id
    }

    /// Validate and produce the program.
    ///
    /// # Errors
    ///
    /// Returns an error for duplicate package import paths, dangling ids, or
    /// body instructions referencing out-of-range locals.
    pub fn finish(self) -> Result<Program> {
        let program = Program::from_parts(self.packages, self.types, self.functions, self.globals);
        program.validate()?;
        Ok(program)
    }
}

//! The typed-program model.
//!
//! The shapes here mirror what a type-checked source tree gives a front end:
//! packages identified by import path, named types with struct or interface
//! structure, functions with optional receivers and optional bodies, and
//! package-level globals. Everything a body does that the flow analysis does
//! not observe (arithmetic, control flow, branching) is absent; a front end
//! lowers each function to the instructions in [`Instr`] and nothing else.

// Arena indices are stored as u32; no realistic program approaches four
// billion packages, types, functions, or globals.
#![allow(clippy::cast_possible_truncation)]

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::{FuncId, GlobalId, Local, PackageId, TypeId};

/// A source position, project-relative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    /// Path of the declaring file, relative to the project root.
    pub file: String,
    /// 1-indexed line number.
    pub line: u32,
}

impl Pos {
    /// Create a position.
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// A package of the loaded program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Unique import path (e.g. `example.com/app/store`).
    pub import_path: String,
    /// Short package name (the last path segment, usually).
    pub name: String,
    /// True when the front end could not fully type-check this package.
    /// Bodies from such packages are absent; the analyzer skips the package
    /// and reports it in its partial-analysis count.
    pub has_errors: bool,
}

/// A reference to a type as it appears in a signature, field, or global.
///
/// The analysis only distinguishes named types, pointers to named types, and
/// everything else. Slices, maps, channels, primitives, and unnamed composites
/// are all `Opaque`: values of those types never carry method sets the
/// analysis dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    /// A named type.
    Named(TypeId),
    /// A pointer to a named type.
    Pointer(TypeId),
    /// Any other type.
    Opaque,
}

/// A declared struct field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name. For embedded fields this is the embedded type's name.
    pub name: String,
    /// Field type.
    pub ty: TypeRef,
    /// True for embedded (anonymous) fields, whose methods promote.
    pub embedded: bool,
}

/// A method declared directly on an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfaceMethod {
    /// Method name.
    pub name: String,
    /// Whether the method name is exported.
    pub exported: bool,
    /// Parameter types, receiver excluded.
    pub params: Vec<TypeRef>,
    /// Result types.
    pub results: Vec<TypeRef>,
}

/// The structure behind a named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeShape {
    /// A struct with its directly declared fields, embedded fields included.
    Struct {
        /// Declared fields in declaration order.
        fields: Vec<Field>,
    },
    /// An interface with its directly declared methods and embedded
    /// interfaces. The full method set (declared plus embedded, transitively)
    /// is computed by the analyzer, not stored.
    Interface {
        /// Directly declared methods.
        methods: Vec<IfaceMethod>,
        /// Embedded interface types.
        embeds: Vec<TypeId>,
    },
    /// A named type whose structure the analysis never inspects.
    Opaque,
}

/// A named type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    /// Owning package.
    pub package: PackageId,
    /// Declared name.
    pub name: String,
    /// Declaration position, when known.
    pub pos: Option<Pos>,
    /// Whether the name is exported.
    pub exported: bool,
    /// Underlying structure.
    pub shape: TypeShape,
}

/// A method receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    /// The receiver's named type, pointer indirection stripped.
    pub type_id: TypeId,
    /// True for pointer receivers.
    pub pointer: bool,
}

/// A function or method.
///
/// For methods, the receiver is also parameter 0 of `params`, and local slot
/// 0 of the body binds it on entry; explicit parameters follow. Functions
/// without a body (signature-only, from packages outside the analyzed
/// project) still participate in method sets and call resolution by
/// signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Owning package.
    pub package: PackageId,
    /// Declared name, receiver not included.
    pub name: String,
    /// Declaration position, when known.
    pub pos: Option<Pos>,
    /// Whether the name is exported.
    pub exported: bool,
    /// Receiver, for methods.
    pub receiver: Option<Receiver>,
    /// Parameter types. For methods, slot 0 is the receiver.
    pub params: Vec<TypeRef>,
    /// Result types.
    pub results: Vec<TypeRef>,
    /// Lowered body, absent for signature-only functions.
    pub body: Option<Body>,
}

/// A package-level variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Global {
    /// Owning package.
    pub package: PackageId,
    /// Declared name.
    pub name: String,
    /// Declared type.
    pub ty: TypeRef,
}

/// A lowered function body.
///
/// Local slot `i` for `i < params.len()` is bound to parameter `i` on entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    /// Number of local value slots.
    pub locals: u32,
    /// Instructions in source order. Order does not affect the analysis,
    /// which is flow-insensitive.
    pub instrs: Vec<Instr>,
}

/// The target of a call instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Callee {
    /// Syntactically resolved target.
    Static(FuncId),
    /// Interface dispatch: the concrete target depends on what `recv` holds.
    Dynamic {
        /// Local holding the interface-typed receiver value.
        recv: Local,
        /// Invoked method name.
        method: String,
    },
}

/// A flow-relevant instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instr {
    /// A value of concrete type `ty` is created into `dst` (composite
    /// literal, address-of, `new`/`make` of a named type).
    Alloc {
        /// Destination slot.
        dst: Local,
        /// Concrete type of the created value.
        ty: TypeId,
    },
    /// Value flows from one slot to another (assignment, conversion that
    /// preserves the dynamic type, interface upcast).
    Assign {
        /// Destination slot.
        dst: Local,
        /// Source slot.
        src: Local,
    },
    /// A call.
    Call {
        /// Call site position.
        site: Pos,
        /// Call target.
        callee: Callee,
        /// Argument slots. For statically resolved method calls the receiver
        /// is argument 0; for dynamic calls the receiver slot is carried by
        /// the callee and `args` holds only the remaining arguments.
        args: Vec<Local>,
        /// Slots receiving the call's results.
        results: Vec<Local>,
    },
    /// Return from the enclosing function.
    Return {
        /// Returned slots, one per declared result.
        values: Vec<Local>,
    },
    /// Store into a field of some value of type `obj`.
    ///
    /// Field flow is keyed by (type, field name): one cell per field
    /// declaration, not per object instance.
    StoreField {
        /// Type owning the field.
        obj: TypeId,
        /// Field name.
        field: String,
        /// Stored slot.
        src: Local,
    },
    /// Load from a field of some value of type `obj`.
    LoadField {
        /// Type owning the field.
        obj: TypeId,
        /// Field name.
        field: String,
        /// Destination slot.
        dst: Local,
    },
    /// Store into a package-level variable.
    StoreGlobal {
        /// Target global.
        global: GlobalId,
        /// Stored slot.
        src: Local,
    },
    /// Load from a package-level variable.
    LoadGlobal {
        /// Source global.
        global: GlobalId,
        /// Destination slot.
        dst: Local,
    },
}

/// A complete, validated, type-checked program.
///
/// Construct one with [`crate::ProgramBuilder`] or decode one with
/// [`Program::from_json`]; both validate every cross-reference, so accessors
/// taking ids index directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Program {
    packages: Vec<Package>,
    types: Vec<NamedType>,
    functions: Vec<Function>,
    globals: Vec<Global>,
}

impl Program {
    pub(crate) fn from_parts(
        packages: Vec<Package>,
        types: Vec<NamedType>,
        functions: Vec<Function>,
        globals: Vec<Global>,
    ) -> Self {
        Self {
            packages,
            types,
            functions,
            globals,
        }
    }

    /// Decode and validate a program from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed JSON and a validation error for
    /// any dangling id or malformed body.
    pub fn from_json(json: &str) -> Result<Self> {
        let program: Self = serde_json::from_str(json)?;
        program.validate()?;
        Ok(program)
    }

    /// Encode the program as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Iterate packages with their ids.
    pub fn packages(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages
            .iter()
            .enumerate()
            .map(|(i, p)| (PackageId::new(i as u32), p))
    }

    /// Iterate named types with their ids.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &NamedType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (TypeId::new(i as u32), t))
    }

    /// Iterate functions with their ids.
    pub fn functions(&self) -> impl Iterator<Item = (FuncId, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FuncId::new(i as u32), f))
    }

    /// Iterate globals with their ids.
    pub fn globals(&self) -> impl Iterator<Item = (GlobalId, &Global)> {
        self.globals
            .iter()
            .enumerate()
            .map(|(i, g)| (GlobalId::new(i as u32), g))
    }

    /// Look up a package by id.
    #[must_use]
    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.index()]
    }

    /// Look up a named type by id.
    #[must_use]
    pub fn named_type(&self, id: TypeId) -> &NamedType {
        &self.types[id.index()]
    }

    /// Look up a function by id.
    #[must_use]
    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.index()]
    }

    /// Look up a global by id.
    #[must_use]
    pub fn global(&self, id: GlobalId) -> &Global {
        &self.globals[id.index()]
    }

    /// Find a package by its import path.
    #[must_use]
    pub fn package_by_path(&self, import_path: &str) -> Option<PackageId> {
        self.packages()
            .find(|(_, p)| p.import_path == import_path)
            .map(|(id, _)| id)
    }

    /// Number of functions, across all packages.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Number of named types, across all packages.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let mut paths = BTreeSet::new();
        for pkg in &self.packages {
            if !paths.insert(pkg.import_path.as_str()) {
                return Err(Error::DuplicatePackage(pkg.import_path.clone()));
            }
        }

        for ty in &self.types {
            self.check_package(&ty.name, ty.package)?;
            match &ty.shape {
                TypeShape::Struct { fields } => {
                    for field in fields {
                        self.check_type_ref(&ty.name, field.ty)?;
                    }
                }
                TypeShape::Interface { methods, embeds } => {
                    for m in methods {
                        for r in m.params.iter().chain(&m.results) {
                            self.check_type_ref(&ty.name, *r)?;
                        }
                    }
                    for embed in embeds {
                        self.check_type_id(&ty.name, *embed)?;
                    }
                }
                TypeShape::Opaque => {}
            }
        }

        for func in &self.functions {
            self.check_package(&func.name, func.package)?;
            if let Some(recv) = func.receiver {
                self.check_type_id(&func.name, recv.type_id)?;
            }
            for r in func.params.iter().chain(&func.results) {
                self.check_type_ref(&func.name, *r)?;
            }
            if let Some(body) = &func.body {
                self.check_body(func, body)?;
            }
        }

        for global in &self.globals {
            self.check_package(&global.name, global.package)?;
            self.check_type_ref(&global.name, global.ty)?;
        }

        Ok(())
    }

    fn check_body(&self, func: &Function, body: &Body) -> Result<()> {
        if (body.locals as usize) < func.params.len() {
            return Err(Error::TooFewLocals {
                func: func.name.clone(),
                params: func.params.len(),
                locals: body.locals,
            });
        }
        let check_local = |local: Local| {
            if local.0 < body.locals {
                Ok(())
            } else {
                Err(Error::LocalOutOfRange {
                    func: func.name.clone(),
                    local: local.0,
                    locals: body.locals,
                })
            }
        };
        for instr in &body.instrs {
            match instr {
                Instr::Alloc { dst, ty } => {
                    check_local(*dst)?;
                    self.check_type_id(&func.name, *ty)?;
                }
                Instr::Assign { dst, src } => {
                    check_local(*dst)?;
                    check_local(*src)?;
                }
                Instr::Call {
                    callee,
                    args,
                    results,
                    ..
                } => {
                    match callee {
                        Callee::Static(target) => {
                            if target.index() >= self.functions.len() {
                                return Err(Error::DanglingId {
                                    context: func.name.clone(),
                                    kind: "function",
                                    index: target.index(),
                                });
                            }
                        }
                        Callee::Dynamic { recv, .. } => check_local(*recv)?,
                    }
                    for local in args.iter().chain(results) {
                        check_local(*local)?;
                    }
                }
                Instr::Return { values } => {
                    for local in values {
                        check_local(*local)?;
                    }
                }
                Instr::StoreField { obj, src, .. } => {
                    self.check_type_id(&func.name, *obj)?;
                    check_local(*src)?;
                }
                Instr::LoadField { obj, dst, .. } => {
                    self.check_type_id(&func.name, *obj)?;
                    check_local(*dst)?;
                }
                Instr::StoreGlobal { global, src } => {
                    self.check_global(&func.name, *global)?;
                    check_local(*src)?;
                }
                Instr::LoadGlobal { global, dst } => {
                    self.check_global(&func.name, *global)?;
                    check_local(*dst)?;
                }
            }
        }
        Ok(())
    }

    fn check_package(&self, context: &str, id: PackageId) -> Result<()> {
        if id.index() < self.packages.len() {
            Ok(())
        } else {
            Err(Error::DanglingId {
                context: context.to_string(),
                kind: "package",
                index: id.index(),
            })
        }
    }

    fn check_type_id(&self, context: &str, id: TypeId) -> Result<()> {
        if id.index() < self.types.len() {
            Ok(())
        } else {
            Err(Error::DanglingId {
                context: context.to_string(),
                kind: "type",
                index: id.index(),
            })
        }
    }

    fn check_type_ref(&self, context: &str, r: TypeRef) -> Result<()> {
        match r {
            TypeRef::Named(id) | TypeRef::Pointer(id) => self.check_type_id(context, id),
            TypeRef::Opaque => Ok(()),
        }
    }

    fn check_global(&self, context: &str, id: GlobalId) -> Result<()> {
        if id.index() < self.globals.len() {
            Ok(())
        } else {
            Err(Error::DanglingId {
                context: context.to_string(),
                kind: "global",
                index: id.index(),
            })
        }
    }
}

//! Arena identifiers.
//!
//! Every cross-reference inside a [`crate::Program`] is an index into one of
//! its arenas, wrapped in a newtype so a package id cannot be mistaken for a
//! type id. Ids are assigned densely in declaration order, which also makes
//! them a stable iteration order for deterministic analysis output.

use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a raw arena index.
            #[must_use]
            pub fn new(index: u32) -> Self {
                Self(index)
            }

            /// The raw arena index.
            #[must_use]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id! {
    /// Identifies a [`crate::Package`].
    PackageId
}

arena_id! {
    /// Identifies a [`crate::NamedType`].
    TypeId
}

arena_id! {
    /// Identifies a [`crate::Function`].
    FuncId
}

arena_id! {
    /// Identifies a [`crate::Global`].
    GlobalId
}

/// A local value slot inside a function body.
///
/// Slots are function-scoped: slot `i` for `i < params.len()` is bound to
/// parameter `i` on entry (for methods, the receiver is parameter 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Local(pub u32);

impl Local {
    /// The raw slot index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

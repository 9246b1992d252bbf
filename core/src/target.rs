//! Target capabilities and the opaque type descriptor.
//!
//! A rule's target must provide at least one of three recognized contracts:
//! it is a handler, a handler factory, or a nested rule module. The
//! descriptor is deliberately opaque — the resolver only ever asks it for a
//! diagnostic name and whether it provides a capability; actual
//! instantiation belongs to the [`Instantiator`](crate::Instantiator)
//! collaborator.

use std::fmt;

/// The three recognized target contracts, in registry declaration order.
///
/// Variant auto-selection scans capabilities in this order and picks the
/// first one the target provides, so a target providing several resolves
/// deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The target is itself a ready-to-instantiate handler.
    Handler,
    /// The target is a handler factory with a support check.
    Factory,
    /// The target is a nested rule module.
    Module,
}

impl Capability {
    /// Scan order for variant auto-selection.
    pub const ALL: [Capability; 3] = [Capability::Handler, Capability::Factory, Capability::Module];

    /// Stable name used in configuration diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Handler => "handler",
            Self::Factory => "handler-factory",
            Self::Module => "route-module",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque identifier of a rule's target type.
///
/// Implementations live in the embedding domain; the resolver only reads
/// the name (diagnostics) and the provided capabilities (variant
/// selection).
///
/// # Thread Safety
///
/// Descriptors are shared across rules and across concurrent resolutions,
/// so implementations must be `Send + Sync`.
pub trait TypeDescriptor: Send + Sync {
    /// Human-readable type name, used in rule descriptions and errors.
    fn name(&self) -> &str;

    /// Returns `true` if the target type provides the given contract.
    fn provides(&self, capability: Capability) -> bool;
}

impl fmt::Debug for dyn TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self.name())
    }
}

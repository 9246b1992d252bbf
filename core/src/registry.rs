//! Process-wide registry of rule variants.
//!
//! Maps each recognized [`Capability`] to the constructor for the rule
//! variant handling targets with that capability. The registry is built
//! exactly once per process behind a `OnceLock`; concurrent first access
//! still yields a single instance with no duplicate entries. The init
//! function itself is pure, so tests can exercise it without touching the
//! static.
//!
//! Entry order is the auto-selection scan order: handler first, then
//! handler-factory, then route-module.

use std::sync::{Arc, OnceLock};

use crate::rule::Rule;
use crate::{Capability, RoutePattern, TypeDescriptor};

/// One registry entry: a capability and the constructor for its variant.
pub(crate) struct VariantEntry {
    pub(crate) capability: Capability,
    pub(crate) construct: fn(RoutePattern, Arc<dyn TypeDescriptor>) -> Rule,
}

/// Build the built-in variant list. Pure and idempotent.
pub(crate) fn builtin_variants() -> Vec<VariantEntry> {
    vec![
        VariantEntry {
            capability: Capability::Handler,
            construct: Rule::handler_variant,
        },
        VariantEntry {
            capability: Capability::Factory,
            construct: Rule::factory_variant,
        },
        VariantEntry {
            capability: Capability::Module,
            construct: Rule::module_variant,
        },
    ]
}

static VARIANTS: OnceLock<Vec<VariantEntry>> = OnceLock::new();

/// The process-wide registry, built on first access.
pub(crate) fn variant_registry() -> &'static [VariantEntry] {
    VARIANTS.get_or_init(builtin_variants)
}

/// Capability names recognized by the registry, in scan order. Used to make
/// configuration errors self-correcting.
pub(crate) fn recognized_capabilities() -> Vec<&'static str> {
    variant_registry()
        .iter()
        .map(|entry| entry.capability.name())
        .collect()
}

/// Select the variant for `target`: an explicit hint picks its entry
/// directly; otherwise the first capability the target provides wins.
pub(crate) fn select(
    target: &dyn TypeDescriptor,
    hint: Option<Capability>,
) -> Option<&'static VariantEntry> {
    variant_registry().iter().find(|entry| match hint {
        Some(capability) => entry.capability == capability,
        None => target.provides(entry.capability),
    })
}

//! The rule-set loader boundary.
//!
//! Module rules delegate to this collaborator: given a module type
//! descriptor, produce the module's descriptor and its ordered rule
//! collection. Where declarations come from — code, files, a registry —
//! is the loader's concern, as is the match ordering policy. The resolver
//! only guarantees that resolution is deterministic for a fixed ordered
//! input.

use std::sync::Arc;

use crate::{RouteError, Rule, TypeDescriptor};

/// A module's loaded rule collection plus its descriptor.
#[derive(Debug)]
pub struct LoadedModule {
    /// Descriptor of the loaded module, kept for dispatch diagnostics.
    pub module: Arc<dyn TypeDescriptor>,
    /// The module's rules, in declaration order (before [`sort`]).
    ///
    /// [`sort`]: RuleSetLoader::sort
    pub rules: Vec<Rule>,
}

/// Loads and orders nested rule collections for module rules.
pub trait RuleSetLoader: Send + Sync {
    /// Load the rule collection declared by `module`.
    fn load(&self, module: &Arc<dyn TypeDescriptor>) -> Result<LoadedModule, RouteError>;

    /// Normalize match order after loading.
    ///
    /// The default puts longer literals first (stable, so equal lengths keep
    /// declaration order) — more specific prefixes win over catch-alls.
    /// Loaders owning a different policy override this.
    fn sort(&self, rules: &mut Vec<Rule>) {
        rules.sort_by(|a, b| {
            b.pattern()
                .literal()
                .len()
                .cmp(&a.pattern().literal().len())
        });
    }
}

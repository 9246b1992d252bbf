//! `Router` — the resolution entry point.
//!
//! Bundles the two external collaborators every resolution needs — the
//! [`Instantiator`] and the [`RuleSetLoader`] — and owns the per-call
//! [`DispatchContext`] lifecycle. Rule objects are read-mostly and shared;
//! each in-flight resolution gets its own context, so concurrent calls
//! never share mutable state.

use std::fmt;
use std::sync::Arc;

use crate::context::DispatchContext;
use crate::{Handler, Instantiator, RouteError, RuleSet, RuleSetLoader};

/// Resolves request paths against rule sets.
///
/// # Example
///
/// See the [crate-level example](crate) for a complete setup with an
/// instantiator and a loader.
pub struct Router {
    instantiator: Arc<dyn Instantiator>,
    loader: Arc<dyn RuleSetLoader>,
}

impl Router {
    /// Create a router over the given collaborators.
    pub fn new(instantiator: Arc<dyn Instantiator>, loader: Arc<dyn RuleSetLoader>) -> Self {
        Self {
            instantiator,
            loader,
        }
    }

    /// The instantiation collaborator.
    #[must_use]
    pub fn instantiator(&self) -> &Arc<dyn Instantiator> {
        &self.instantiator
    }

    /// The rule-set loader.
    #[must_use]
    pub fn loader(&self) -> &Arc<dyn RuleSetLoader> {
        &self.loader
    }

    /// Resolve `path` against `rules` with a fresh dispatch context.
    ///
    /// Probes the rules in order; the first rule producing a handler wins.
    /// `Ok(None)` is the not-found outcome.
    ///
    /// # Errors
    ///
    /// Collaborator failures (instantiation, module load, factory) propagate
    /// after the resolver's own bookkeeping has been unwound.
    pub fn resolve(
        &self,
        rules: &RuleSet,
        path: &str,
    ) -> Result<Option<Box<dyn Handler>>, RouteError> {
        let mut ctx = DispatchContext::new(path);
        self.resolve_with(rules, &mut ctx)
    }

    /// Resolve against a caller-built context.
    ///
    /// The context carries the path and collects the committed entry stack,
    /// so callers can inspect it afterwards for diagnostics — including
    /// after an error, when the stack is guaranteed consistent.
    pub fn resolve_with(
        &self,
        rules: &RuleSet,
        ctx: &mut DispatchContext,
    ) -> Result<Option<Box<dyn Handler>>, RouteError> {
        let span = tracing::debug_span!("resolve", path = ctx.original_path());
        let _enter = span.enter();
        rules.resolve(ctx, self)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

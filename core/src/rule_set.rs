//! `RuleSet` — an ordered rule collection with first-match-wins probing.
//!
//! Order is significant and is a property of the collection, not of the
//! resolver: the loader that built the set owns the ordering policy. Given
//! a fixed ordered input, resolution is deterministic.

use std::fmt;

use crate::context::DispatchContext;
use crate::router::Router;
use crate::{Handler, RouteError, Rule, RuleDecl};

/// An ordered collection of rules probed in order; the first rule whose
/// resolution yields a handler wins.
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Wrap an already-ordered rule collection.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Build a set from declarations, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the first construction error; configuration errors are fatal
    /// at build time, never deferred to resolution.
    pub fn from_decls(decls: impl IntoIterator<Item = RuleDecl>) -> Result<Self, RouteError> {
        let rules = decls
            .into_iter()
            .map(Rule::create)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate the rules in probe order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Probe each rule in order against the context's remaining path.
    ///
    /// `Ok(None)` is the not-found outcome; errors from collaborators
    /// propagate with the context already unwound by the failing rule.
    pub(crate) fn resolve(
        &self,
        ctx: &mut DispatchContext,
        router: &Router,
    ) -> Result<Option<Box<dyn Handler>>, RouteError> {
        for rule in &self.rules {
            if let Some(handler) = rule.resolve(ctx, router)? {
                tracing::debug!(rule = %rule, "resolved");
                return Ok(Some(handler));
            }
        }
        tracing::debug!(path = ctx.remaining_path(), "no rule matched");
        Ok(None)
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.rules)
            .finish()
    }
}

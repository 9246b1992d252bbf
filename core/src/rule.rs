//! `Rule` — a pattern bound to a target, in one of three variants.
//!
//! All variants share the same [`RoutePattern`] match policy and the same
//! `resolve` entry point; they differ in what happens after a match:
//!
//! - **Handler**: instantiate the target as a handler and return it.
//! - **Factory**: lazily build a [`HandlerFactory`], commit a factory entry
//!   *before* asking it whether it supports the remaining path, then let it
//!   create the handler. Every no-handler exit — unsupported, nothing
//!   created, or an error — rolls the factory entry back.
//! - **Module**: lazily load a nested rule set through the
//!   [`RuleSetLoader`](crate::RuleSetLoader), commit a module entry, and
//!   recurse against the remaining path. Modules are transparent relays:
//!   the eventual handler entry belongs to whichever leaf rule matched.
//!
//! The factory instance and the nested rule set are built at most once per
//! rule and cached for its lifetime; see [`LazySlot`] for the guarantee.

use std::fmt;
use std::sync::Arc;

use crate::context::DispatchContext;
use crate::lazy::LazySlot;
use crate::registry;
use crate::router::Router;
use crate::rule_set::RuleSet;
use crate::{
    Capability, Handler, HandlerFactory, RouteError, RoutePattern, TypeDescriptor,
    MAX_MODULE_DEPTH,
};

/// Explicit construction function for a factory rule's factory instance,
/// used instead of the instantiation collaborator when supplied.
pub type FactoryCtor = Arc<dyn Fn() -> Arc<dyn HandlerFactory> + Send + Sync>;

/// A loader-facing rule declaration.
///
/// Declarations may be incomplete — [`Rule::create`] rejects a missing
/// pattern or target with a configuration error before any capability scan.
///
/// # Example
///
/// ```ignore
/// let rule = Rule::create(
///     RuleDecl::new("/blog/", blog_module).with_variant(Capability::Module),
/// )?;
/// ```
#[derive(Clone)]
pub struct RuleDecl {
    pattern: Option<String>,
    target: Option<Arc<dyn TypeDescriptor>>,
    variant: Option<Capability>,
    factory: Option<FactoryCtor>,
}

impl RuleDecl {
    /// Declare a rule for `pattern` targeting `target`; the variant is
    /// auto-selected from the target's capabilities.
    pub fn new(pattern: impl Into<String>, target: Arc<dyn TypeDescriptor>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            target: Some(target),
            variant: None,
            factory: None,
        }
    }

    /// Assemble a declaration from possibly-missing parts, as loaders
    /// reading external configuration do.
    pub fn from_parts(pattern: Option<String>, target: Option<Arc<dyn TypeDescriptor>>) -> Self {
        Self {
            pattern,
            target,
            variant: None,
            factory: None,
        }
    }

    /// Pin the rule variant instead of auto-selecting it.
    #[must_use]
    pub fn with_variant(mut self, capability: Capability) -> Self {
        self.variant = Some(capability);
        self
    }

    /// Supply an explicit factory construction function. Implies the
    /// factory variant.
    #[must_use]
    pub fn with_factory_ctor(
        mut self,
        ctor: impl Fn() -> Arc<dyn HandlerFactory> + Send + Sync + 'static,
    ) -> Self {
        self.factory = Some(Arc::new(ctor));
        self.variant = Some(Capability::Factory);
        self
    }

    /// The declared pattern, if any.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }
}

impl fmt::Debug for RuleDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDecl")
            .field("pattern", &self.pattern)
            .field("target", &self.target)
            .field("variant", &self.variant)
            .field("has_factory_ctor", &self.factory.is_some())
            .finish()
    }
}

/// A pattern bound to a target type, resolved polymorphically by variant.
///
/// Immutable after construction except for the lazily-initialized derived
/// state (factory instance, nested rule set), each created at most once.
pub struct Rule {
    pattern: RoutePattern,
    target: Arc<dyn TypeDescriptor>,
    kind: RuleKind,
}

enum RuleKind {
    Handler,
    Factory {
        ctor: Option<FactoryCtor>,
        slot: LazySlot<Arc<dyn HandlerFactory>>,
    },
    Module {
        slot: LazySlot<ModuleRules>,
    },
}

/// A module rule's cached nested rule set with its module descriptor.
struct ModuleRules {
    module: Arc<dyn TypeDescriptor>,
    rules: RuleSet,
}

impl Rule {
    pub(crate) fn handler_variant(pattern: RoutePattern, target: Arc<dyn TypeDescriptor>) -> Self {
        Self {
            pattern,
            target,
            kind: RuleKind::Handler,
        }
    }

    pub(crate) fn factory_variant(pattern: RoutePattern, target: Arc<dyn TypeDescriptor>) -> Self {
        Self {
            pattern,
            target,
            kind: RuleKind::Factory {
                ctor: None,
                slot: LazySlot::new(),
            },
        }
    }

    pub(crate) fn module_variant(pattern: RoutePattern, target: Arc<dyn TypeDescriptor>) -> Self {
        Self {
            pattern,
            target,
            kind: RuleKind::Module {
                slot: LazySlot::new(),
            },
        }
    }

    /// Build a rule from a declaration.
    ///
    /// An explicit variant hint picks that variant directly; otherwise the
    /// process-wide registry scans the target's capabilities in declaration
    /// order (handler, handler-factory, route-module) and the first one the
    /// target provides wins.
    ///
    /// # Errors
    ///
    /// - [`RouteError::MissingPattern`] / [`RouteError::MissingTarget`] —
    ///   incomplete declaration, rejected before any capability scan
    /// - [`RouteError::UnsupportedTarget`] — the target provides none of the
    ///   recognized capabilities; the error lists what is recognized
    pub fn create(decl: RuleDecl) -> Result<Self, RouteError> {
        let RuleDecl {
            pattern,
            target,
            variant,
            factory,
        } = decl;

        let Some(pattern) = pattern else {
            return Err(RouteError::MissingPattern);
        };
        let Some(target) = target else {
            return Err(RouteError::MissingTarget { pattern });
        };

        let Some(entry) = registry::select(target.as_ref(), variant) else {
            return Err(RouteError::UnsupportedTarget {
                target: target.name().to_owned(),
                recognized: registry::recognized_capabilities(),
            });
        };

        let mut rule = (entry.construct)(RoutePattern::new(pattern), target);
        if let (Some(supplied), RuleKind::Factory { ctor, .. }) = (factory, &mut rule.kind) {
            *ctor = Some(supplied);
        }
        Ok(rule)
    }

    /// The rule's pattern.
    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Descriptor of the rule's target type.
    #[must_use]
    pub fn target(&self) -> &Arc<dyn TypeDescriptor> {
        &self.target
    }

    /// Which variant this rule was constructed as.
    #[must_use]
    pub fn variant(&self) -> Capability {
        match self.kind {
            RuleKind::Handler => Capability::Handler,
            RuleKind::Factory { .. } => Capability::Factory,
            RuleKind::Module { .. } => Capability::Module,
        }
    }

    /// Diagnostic rendering: variant, pattern, and target.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Resolve `ctx`'s remaining path against this rule.
    ///
    /// `Ok(None)` is a miss — the caller probes the next rule. A returned
    /// handler has already pushed its entries onto `ctx`.
    pub(crate) fn resolve(
        &self,
        ctx: &mut DispatchContext,
        router: &Router,
    ) -> Result<Option<Box<dyn Handler>>, RouteError> {
        let Some(matched) = self.pattern.try_match(ctx.remaining_path()) else {
            return Ok(None);
        };
        let matched = matched.to_owned();

        match &self.kind {
            RuleKind::Handler => self.resolve_handler(ctx, router, &matched),
            RuleKind::Factory { ctor, slot } => {
                self.resolve_factory(ctx, router, &matched, ctor, slot)
            }
            RuleKind::Module { slot } => self.resolve_module(ctx, router, &matched, slot),
        }
    }

    fn resolve_handler(
        &self,
        ctx: &mut DispatchContext,
        router: &Router,
        matched: &str,
    ) -> Result<Option<Box<dyn Handler>>, RouteError> {
        let Some(handler) = router.instantiator().handler(self.target.as_ref())? else {
            // Nothing was committed, so nothing to roll back.
            tracing::debug!(rule = %self, "target produced no handler");
            return Ok(None);
        };
        ctx.enter_handler(self.pattern.raw(), matched, &self.target);
        Ok(Some(handler))
    }

    fn resolve_factory(
        &self,
        ctx: &mut DispatchContext,
        router: &Router,
        matched: &str,
        ctor: &Option<FactoryCtor>,
        slot: &LazySlot<Arc<dyn HandlerFactory>>,
    ) -> Result<Option<Box<dyn Handler>>, RouteError> {
        // Commit before the support check; the frame guarantees the entry
        // is popped on every no-handler exit, error paths included.
        let mut frame = ctx.enter_factory(self.pattern.raw(), matched, &self.target);

        let factory = slot
            .get_or_try_init(|| match ctor {
                Some(make) => Ok(make()),
                None => router
                    .instantiator()
                    .factory(self.target.as_ref())?
                    .ok_or_else(|| RouteError::Instantiation {
                        target: self.target.name().to_owned(),
                        reason: "target does not yield a handler factory".into(),
                    }),
            })?
            .clone();

        if !factory.supports(frame.remaining_path())? {
            return Ok(None);
        }
        let Some(handler) = factory.create()? else {
            return Ok(None);
        };

        frame
            .context()
            .enter_handler(self.pattern.raw(), matched, &self.target);
        frame.commit();
        Ok(Some(handler))
    }

    fn resolve_module(
        &self,
        ctx: &mut DispatchContext,
        router: &Router,
        matched: &str,
        slot: &LazySlot<ModuleRules>,
    ) -> Result<Option<Box<dyn Handler>>, RouteError> {
        // Load before entering, so a load failure surfaces with no entry to
        // roll back.
        let nested = slot.get_or_try_init(|| {
            let mut loaded = router.loader().load(&self.target)?;
            router.loader().sort(&mut loaded.rules);
            tracing::debug!(
                module = loaded.module.name(),
                rules = loaded.rules.len(),
                "loaded nested rule set"
            );
            Ok(ModuleRules {
                module: loaded.module,
                rules: RuleSet::new(loaded.rules),
            })
        })?;

        let depth = ctx.module_depth();
        if depth >= MAX_MODULE_DEPTH {
            return Err(RouteError::DepthExceeded {
                depth: depth + 1,
                max: MAX_MODULE_DEPTH,
            });
        }

        let mut frame = ctx.enter_module(self.pattern.raw(), matched, &nested.module);
        match nested.rules.resolve(frame.context(), router)? {
            Some(handler) => {
                // Transparent relay: the module entry stays; the handler
                // entry was pushed by the nested leaf rule.
                frame.commit();
                Ok(Some(handler))
            }
            None => Ok(None),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            RuleKind::Handler => "HandlerRule",
            RuleKind::Factory { .. } => "FactoryRule",
            RuleKind::Module { .. } => "ModuleRule",
        };
        write!(f, "{label} {} -> {}", self.pattern, self.target.name())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("variant", &self.variant())
            .field("pattern", &self.pattern)
            .field("target", &self.target)
            .finish()
    }
}

//! ruteo - rule-based request path resolver
//!
//! A resolver that maps an incoming request path to a handler by probing an
//! ordered collection of routing rules, first-match-wins. Rules come in three
//! variants, selected automatically from the capabilities a target type
//! provides:
//!
//! - **Handler rule** — the target is itself a ready-to-instantiate handler.
//! - **Factory rule** — the target is a handler factory; creation and
//!   support-checking are delegated to a lazily-built factory instance.
//! - **Module rule** — the target is a nested rule module; resolution recurses
//!   into a lazily-loaded nested rule set against the remaining path.
//!
//! # Architecture
//!
//! - [`RoutePattern`] — Prefix/exact match policy, shared by every variant
//! - [`Capability`] + [`TypeDescriptor`] — The three recognized target
//!   contracts and the opaque descriptor that reports which ones a target
//!   provides
//! - [`Rule`] — One type, three variant payloads, a single `resolve` entry
//!   point
//! - [`DispatchContext`] — Per-resolution stack of committed entries with
//!   remaining-path accounting and rollback frames
//! - [`RuleSet`] + [`Router`] — Ordered probing plus the bundle of external
//!   collaborators ([`Instantiator`], [`RuleSetLoader`])
//!
//! # Key Design Insights
//!
//! 1. **Match policy is shared, never duplicated**: all three rule variants
//!    go through the same [`RoutePattern::try_match`].
//!
//! 2. **Commit before you ask**: a factory rule enters the dispatch context
//!    *before* running the factory's support check, so diagnostics always see
//!    "we are inside factory X" — and a rollback frame guarantees the entry
//!    is popped on every exit path, including error propagation.
//!
//! 3. **Lazy singletons stay invisible**: factory instances, nested rule
//!    sets, and the variant registry are built at most once, and warming them
//!    up never changes an observable resolution outcome.
//!
//! # Example
//!
//! ```
//! use std::any::Any;
//! use std::sync::Arc;
//! use ruteo::prelude::*;
//!
//! // A terminal handler for the demo.
//! #[derive(Debug)]
//! struct Hello;
//!
//! impl Handler for Hello {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! // A target type providing the plain handler capability.
//! #[derive(Debug)]
//! struct HelloTarget;
//!
//! impl TypeDescriptor for HelloTarget {
//!     fn name(&self) -> &str {
//!         "HelloTarget"
//!     }
//!     fn provides(&self, capability: Capability) -> bool {
//!         capability == Capability::Handler
//!     }
//! }
//!
//! // Instantiation collaborator: produces handlers for recognized targets.
//! struct Demo;
//!
//! impl Instantiator for Demo {
//!     fn handler(
//!         &self,
//!         target: &dyn TypeDescriptor,
//!     ) -> Result<Option<Box<dyn Handler>>, RouteError> {
//!         Ok((target.name() == "HelloTarget").then(|| Box::new(Hello) as Box<dyn Handler>))
//!     }
//!     fn factory(
//!         &self,
//!         _target: &dyn TypeDescriptor,
//!     ) -> Result<Option<Arc<dyn HandlerFactory>>, RouteError> {
//!         Ok(None)
//!     }
//! }
//!
//! // This demo has no nested modules.
//! struct NoModules;
//!
//! impl RuleSetLoader for NoModules {
//!     fn load(&self, module: &Arc<dyn TypeDescriptor>) -> Result<LoadedModule, RouteError> {
//!         Err(RouteError::ModuleLoad {
//!             module: module.name().to_owned(),
//!             reason: "no modules in this demo".into(),
//!         })
//!     }
//! }
//!
//! let rules = RuleSet::from_decls([RuleDecl::new("/hello$", Arc::new(HelloTarget))])?;
//! let router = Router::new(Arc::new(Demo), Arc::new(NoModules));
//!
//! // "$" marks exact mode: "/hello" resolves, "/hello/x" does not.
//! assert!(router.resolve(&rules, "/hello")?.is_some());
//! assert!(router.resolve(&rules, "/hello/x")?.is_none());
//! # Ok::<(), ruteo::RouteError>(())
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod context;
mod handler;
mod instantiator;
mod lazy;
mod loader;
mod pattern;
mod registry;
mod router;
mod rule;
mod rule_set;
mod target;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use context::{ContextFrame, DispatchContext, EntryKind, EntrySnapshot, RouteEntry};
pub use handler::{Handler, HandlerFactory};
pub use instantiator::Instantiator;
pub use loader::{LoadedModule, RuleSetLoader};
pub use pattern::RoutePattern;
pub use router::Router;
pub use rule::{FactoryCtor, Rule, RuleDecl};
pub use rule_set::RuleSet;
pub use target::{Capability, TypeDescriptor};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use ruteo::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Capability,
        ContextFrame,
        DispatchContext,
        EntryKind,
        EntrySnapshot,
        FactoryCtor,
        Handler,
        HandlerFactory,
        Instantiator,
        LoadedModule,
        RouteEntry,
        RouteError,
        RoutePattern,
        Router,
        Rule,
        RuleDecl,
        RuleSet,
        RuleSetLoader,
        TypeDescriptor,
        MAX_MODULE_DEPTH,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed depth for nested module resolution.
///
/// Module rule sets load lazily, so there is no up-front tree to validate;
/// the limit is enforced when a module rule commits to a match. It turns a
/// cyclic module graph into a [`RouteError::DepthExceeded`] instead of a
/// stack overflow.
pub const MAX_MODULE_DEPTH: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from rule construction and resolution.
///
/// Configuration errors (`MissingPattern`, `MissingTarget`,
/// `UnsupportedTarget`) surface at rule-construction time and are never
/// retried. External collaborators report their failures through the
/// carrier variants (`Instantiation`, `ModuleLoad`, `Factory`); the resolver
/// unwinds its dispatch-context bookkeeping before any of them propagate.
///
/// A path that simply matches no rule is **not** an error — resolution
/// returns `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A rule declaration carries no path pattern.
    MissingPattern,
    /// A rule declaration carries no target type.
    MissingTarget {
        /// The declared pattern, for locating the offending rule.
        pattern: String,
    },
    /// The target type provides none of the recognized capabilities.
    UnsupportedTarget {
        /// Name of the rejected target type.
        target: String,
        /// Capability names that ARE recognized (for self-correcting
        /// error messages).
        recognized: Vec<&'static str>,
    },
    /// Module nesting exceeds [`MAX_MODULE_DEPTH`].
    DepthExceeded {
        /// Nesting depth the resolution attempted to reach.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
    /// The instantiation collaborator failed to produce an instance.
    Instantiation {
        /// Name of the target type being instantiated.
        target: String,
        /// The underlying failure message.
        reason: String,
    },
    /// The rule-set loader failed to load a module's rules.
    ModuleLoad {
        /// Name of the module type being loaded.
        module: String,
        /// The underlying failure message.
        reason: String,
    },
    /// A handler factory failed during its support check or creation step.
    Factory {
        /// Pattern of the factory rule, for locating the failure.
        pattern: String,
        /// The underlying failure message.
        reason: String,
    },
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPattern => {
                write!(f, "rule declaration has no path pattern")
            }
            Self::MissingTarget { pattern } => {
                write!(f, "rule \"{pattern}\" has no target type")
            }
            Self::UnsupportedTarget { target, recognized } => {
                write!(
                    f,
                    "target type \"{target}\" provides none of the recognized \
                     capabilities — expected one of: {}",
                    recognized.join(", ")
                )
            }
            Self::DepthExceeded { depth, max } => {
                write!(
                    f,
                    "module nesting depth is {depth}, but maximum allowed is {max} \
                     — check module rule sets for cycles"
                )
            }
            Self::Instantiation { target, reason } => {
                write!(f, "instantiating \"{target}\" failed: {reason}")
            }
            Self::ModuleLoad { module, reason } => {
                write!(f, "loading rule set for module \"{module}\" failed: {reason}")
            }
            Self::Factory { pattern, reason } => {
                write!(f, "factory for rule \"{pattern}\" failed: {reason}")
            }
        }
    }
}

impl std::error::Error for RouteError {}

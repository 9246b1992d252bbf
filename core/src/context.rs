//! `DispatchContext` — per-resolution stack of committed rule entries.
//!
//! One context lives for exactly one top-level resolution call. Every rule
//! variant that commits to a match pushes an entry record; the remaining
//! path handed to nested factories and modules is the original path minus
//! the cumulative matched segments of everything currently on the stack.
//!
//! # Rollback protocol
//!
//! Factory and module entries are provisional until their rule produces a
//! handler. [`enter_factory`](DispatchContext::enter_factory) and
//! [`enter_module`](DispatchContext::enter_module) return a
//! [`ContextFrame`] guard: dropping it un-committed truncates the stack
//! back to the frame's base depth, so the pop happens on *every* exit path
//! — early returns, `?` propagation, all of it. Calling
//! [`commit`](ContextFrame::commit) keeps the entry.
//!
//! Handler entries have no exit operation: a committed handler is never
//! rolled back.

use std::fmt;
use std::sync::Arc;

use crate::TypeDescriptor;

/// What kind of rule committed a [`RouteEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EntryKind {
    /// A plain handler rule produced its handler.
    Handler,
    /// A factory rule committed to its factory.
    Factory,
    /// A module rule delegated into its nested rule set.
    Module,
}

impl EntryKind {
    /// Stable label for logging and diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Handler => "handler",
            Self::Factory => "factory",
            Self::Module => "module",
        }
    }
}

/// One committed match on the dispatch stack.
#[derive(Debug)]
pub struct RouteEntry {
    kind: EntryKind,
    pattern: String,
    matched: String,
    path: String,
    target: Arc<dyn TypeDescriptor>,
}

impl RouteEntry {
    /// The kind of rule that pushed this entry.
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// The rule's declared pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The segment the pattern matched.
    #[must_use]
    pub fn matched(&self) -> &str {
        &self.matched
    }

    /// The path as this rule saw it (remaining path at entry time).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Descriptor of the rule's target type.
    #[must_use]
    pub fn target(&self) -> &Arc<dyn TypeDescriptor> {
        &self.target
    }
}

/// A serializable copy of one stack entry, for diagnostics export.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EntrySnapshot {
    /// Kind of the committed rule.
    pub kind: EntryKind,
    /// The rule's declared pattern.
    pub pattern: String,
    /// The segment the pattern matched.
    pub matched: String,
    /// The path as the rule saw it.
    pub path: String,
    /// Name of the rule's target type.
    pub target: String,
}

/// Request-scoped stack of committed rule matches.
///
/// Created once per top-level resolution, owned exclusively by that call,
/// discarded when it returns. Never shared across concurrent resolutions.
pub struct DispatchContext {
    path: String,
    entries: Vec<RouteEntry>,
}

impl DispatchContext {
    /// Create a context for resolving `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// The full path this resolution started with.
    #[must_use]
    pub fn original_path(&self) -> &str {
        &self.path
    }

    /// The path still to be matched: the original minus the cumulative
    /// matched segments of all entries currently on the stack.
    #[must_use]
    pub fn remaining_path(&self) -> &str {
        let consumed: usize = self.entries.iter().map(|e| e.matched.len()).sum();
        self.path.get(consumed..).unwrap_or("")
    }

    /// Number of entries currently on the stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of module entries currently on the stack.
    #[must_use]
    pub fn module_depth(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Module)
            .count()
    }

    /// The committed entries, bottom of the stack first.
    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Snapshot the stack for diagnostics export.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        self.entries
            .iter()
            .map(|e| EntrySnapshot {
                kind: e.kind,
                pattern: e.pattern.clone(),
                matched: e.matched.clone(),
                path: e.path.clone(),
                target: e.target.name().to_owned(),
            })
            .collect()
    }

    /// Record a produced handler. Committed handlers are never rolled back,
    /// so there is no matching exit.
    pub fn enter_handler(&mut self, pattern: &str, matched: &str, target: &Arc<dyn TypeDescriptor>) {
        self.push(EntryKind::Handler, pattern, matched, target);
    }

    /// Commit to a factory before its support check runs. Dropping the
    /// returned frame without [`commit`](ContextFrame::commit) rolls the
    /// entry back.
    pub fn enter_factory(
        &mut self,
        pattern: &str,
        matched: &str,
        target: &Arc<dyn TypeDescriptor>,
    ) -> ContextFrame<'_> {
        let base = self.entries.len();
        self.push(EntryKind::Factory, pattern, matched, target);
        ContextFrame {
            ctx: self,
            base,
            committed: false,
        }
    }

    /// Commit to a module before its nested resolution runs. Dropping the
    /// returned frame without [`commit`](ContextFrame::commit) rolls the
    /// entry back.
    pub fn enter_module(
        &mut self,
        pattern: &str,
        matched: &str,
        target: &Arc<dyn TypeDescriptor>,
    ) -> ContextFrame<'_> {
        let base = self.entries.len();
        self.push(EntryKind::Module, pattern, matched, target);
        ContextFrame {
            ctx: self,
            base,
            committed: false,
        }
    }

    fn push(&mut self, kind: EntryKind, pattern: &str, matched: &str, target: &Arc<dyn TypeDescriptor>) {
        let path = self.remaining_path().to_owned();
        tracing::debug!(
            kind = kind.label(),
            pattern,
            matched,
            path = %path,
            target = target.name(),
            "entered rule"
        );
        self.entries.push(RouteEntry {
            kind,
            pattern: pattern.to_owned(),
            matched: matched.to_owned(),
            path,
            target: Arc::clone(target),
        });
    }

    fn unwind_to(&mut self, depth: usize) {
        while self.entries.len() > depth {
            // pop() cannot return None while len() > depth >= 0
            if let Some(entry) = self.entries.pop() {
                tracing::debug!(
                    kind = entry.kind.label(),
                    pattern = %entry.pattern,
                    "exited rule without a handler"
                );
            }
        }
    }
}

impl fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchContext")
            .field("path", &self.path)
            .field("remaining", &self.remaining_path())
            .field("entries", &self.entries)
            .finish()
    }
}

/// Rollback guard for a provisional factory or module entry.
///
/// Holds the context mutably for the duration of the committed-but-unproven
/// phase. Drop without [`commit`](Self::commit) truncates the stack back to
/// where it was before the entry was pushed — including any stray entries
/// above it.
pub struct ContextFrame<'c> {
    ctx: &'c mut DispatchContext,
    base: usize,
    committed: bool,
}

impl ContextFrame<'_> {
    /// Access the underlying context (for nested resolution and for
    /// pushing the eventual handler entry).
    pub fn context(&mut self) -> &mut DispatchContext {
        self.ctx
    }

    /// The path remaining after this frame's entry consumed its segment.
    #[must_use]
    pub fn remaining_path(&self) -> &str {
        self.ctx.remaining_path()
    }

    /// Keep the entry: the rule produced a handler.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for ContextFrame<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.ctx.unwind_to(self.base);
        }
    }
}

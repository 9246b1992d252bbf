//! Handler and handler-factory contracts.
//!
//! A [`Handler`] is the terminal object a resolved path maps to. The
//! resolver never calls into it — defining request execution is the
//! embedding application's business — so the trait is deliberately minimal:
//! just a downcast hook for callers that need the concrete type back.

use std::any::Any;
use std::sync::Arc;

use crate::RouteError;

/// The terminal object a resolved path maps to.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use ruteo::Handler;
///
/// #[derive(Debug)]
/// struct Static {
///     body: &'static str,
/// }
///
/// impl Handler for Static {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let handler: Box<dyn Handler> = Box::new(Static { body: "ok" });
/// let concrete = handler.as_any().downcast_ref::<Static>().unwrap();
/// assert_eq!(concrete.body, "ok");
/// ```
pub trait Handler: Send + std::fmt::Debug {
    /// Returns a reference to `self` as `&dyn Any`.
    ///
    /// Enables downcasting once resolution hands the handler back:
    ///
    /// ```ignore
    /// if let Some(s) = handler.as_any().downcast_ref::<Static>() {
    ///     // use s.body
    /// }
    /// ```
    fn as_any(&self) -> &dyn Any;
}

/// A collaborator that conditionally produces handlers.
///
/// A factory rule asks `supports` with the path remaining *after* its own
/// matched segment; only a supported path proceeds to `create`. Both steps
/// may fail — the resolver unwinds its dispatch-context entry before the
/// error crosses the boundary.
///
/// # Thread Safety
///
/// One factory instance is lazily built per factory rule and shared by all
/// concurrent resolutions for that rule's lifetime, so implementations must
/// be `Send + Sync`.
pub trait HandlerFactory: Send + Sync {
    /// Returns `true` if this factory can produce a handler for `path`.
    fn supports(&self, path: &str) -> Result<bool, RouteError>;

    /// Produce a handler. `Ok(None)` means "nothing usable" and is treated
    /// as a quiet miss, not an error.
    fn create(&self) -> Result<Option<Box<dyn Handler>>, RouteError>;
}

impl<F: HandlerFactory + ?Sized> HandlerFactory for Arc<F> {
    fn supports(&self, path: &str) -> Result<bool, RouteError> {
        (**self).supports(path)
    }

    fn create(&self) -> Result<Option<Box<dyn Handler>>, RouteError> {
        (**self).create()
    }
}

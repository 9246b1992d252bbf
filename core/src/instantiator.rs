//! The instantiation collaborator boundary.
//!
//! Turning a resolved target type into a live object is out of scope for
//! the resolver — reflection, dependency injection, object pools, whatever
//! the embedding application uses. The resolver only relies on this
//! contract: `Ok(None)` is "no instance produced" (a quiet miss), `Err`
//! propagates after the dispatch context has been unwound.

use std::sync::Arc;

use crate::{Handler, HandlerFactory, RouteError, TypeDescriptor};

/// Creates live instances from target type descriptors.
///
/// One instantiator serves every rule in a router, so implementations must
/// be `Send + Sync`. No retry logic belongs here or in the resolver — a
/// failed instantiation is terminal for that resolution.
pub trait Instantiator: Send + Sync {
    /// Instantiate the target as a handler.
    fn handler(&self, target: &dyn TypeDescriptor)
        -> Result<Option<Box<dyn Handler>>, RouteError>;

    /// Instantiate the target as a handler factory.
    fn factory(
        &self,
        target: &dyn TypeDescriptor,
    ) -> Result<Option<Arc<dyn HandlerFactory>>, RouteError>;
}

//! ruteo-test: test domain for ruteo conformance testing
//!
//! Provides the doubles the resolver's boundary contracts need in tests:
//! capability-tagged target descriptors, a probe handler whose tag survives
//! the trip through `Box<dyn Handler>`, counting factories, an in-memory
//! rule-set loader, and a map-backed instantiator.
//!
//! The conformance suites under `tests/` exercise the resolver end-to-end
//! through these fixtures.


pub use fixture::{
    tag_of, EmptyFactory, FaultyFactory, FixtureInstantiator, FixtureTarget, PrefixFactory,
    StaticLoader, TextHandler,
};

//! Concurrency conformance: shared rule objects, exclusive contexts, and
//! at-most-once lazy construction under contention.

use std::sync::Arc;
use std::thread;

use ruteo::prelude::*;
use ruteo_test::{tag_of, FixtureInstantiator, FixtureTarget, PrefixFactory, StaticLoader};

const THREADS: usize = 8;

#[test]
fn concurrent_resolutions_build_one_factory() {
    let factory = PrefixFactory::new("", "file");
    let instantiator = Arc::new(
        FixtureInstantiator::new().with_factory("FilesFactory", factory),
    );
    let loader = Arc::new(StaticLoader::new());
    let router = Arc::new(Router::new(instantiator.clone(), loader));
    let rules = Arc::new(
        RuleSet::from_decls([RuleDecl::new("/files/", FixtureTarget::factory("FilesFactory"))])
            .unwrap(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let router = Arc::clone(&router);
            let rules = Arc::clone(&rules);
            thread::spawn(move || {
                let handler = router.resolve(&rules, "/files/a").unwrap().unwrap();
                tag_of(handler.as_ref()).to_owned()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "file");
    }
    assert_eq!(
        instantiator.factory_calls(),
        1,
        "concurrent first use still builds exactly one factory"
    );
}

#[test]
fn concurrent_resolutions_load_the_module_once() {
    let instantiator = Arc::new(FixtureInstantiator::new().with_handler("OrderHandler", "orders"));
    let loader = Arc::new(StaticLoader::new().with_module(
        "ApiModule",
        vec![RuleDecl::new("orders", FixtureTarget::handler("OrderHandler"))],
    ));
    let router = Arc::new(Router::new(instantiator, loader.clone()));
    let rules = Arc::new(
        RuleSet::from_decls([RuleDecl::new("/api/", FixtureTarget::module("ApiModule"))]).unwrap(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let router = Arc::clone(&router);
            let rules = Arc::clone(&rules);
            thread::spawn(move || {
                let handler = router.resolve(&rules, "/api/orders").unwrap().unwrap();
                tag_of(handler.as_ref()).to_owned()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "orders");
    }
    assert_eq!(loader.load_count(), 1, "nested rule set is loaded exactly once");
}

#[test]
fn concurrent_variant_selection_is_deterministic() {
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            thread::spawn(|| {
                let rule = Rule::create(RuleDecl::new("/m/", FixtureTarget::module("OnlyModule")))
                    .unwrap();
                rule.variant()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Capability::Module);
    }
}

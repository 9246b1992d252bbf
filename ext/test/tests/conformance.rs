//! End-to-end conformance for the resolver: match semantics, dispatch
//! delegation, and the commit/rollback protocol, driven through the
//! fixture doubles.

use std::sync::Arc;

use ruteo::prelude::*;
use ruteo_test::{
    tag_of, EmptyFactory, FaultyFactory, FixtureInstantiator, FixtureTarget, PrefixFactory,
    StaticLoader,
};

/// The scenario from the routing contract: an exact user rule listed ahead
/// of an API module rule.
fn api_rules() -> RuleSet {
    RuleSet::from_decls([
        RuleDecl::new("/api/users$", FixtureTarget::handler("UserHandler")),
        RuleDecl::new("/api/", FixtureTarget::module("ApiModule")),
    ])
    .unwrap()
}

fn api_router() -> (Arc<FixtureInstantiator>, Arc<StaticLoader>, Router) {
    let instantiator = Arc::new(
        FixtureInstantiator::new()
            .with_handler("UserHandler", "users")
            .with_handler("OrderHandler", "orders"),
    );
    let loader = Arc::new(StaticLoader::new().with_module(
        "ApiModule",
        vec![RuleDecl::new("orders", FixtureTarget::handler("OrderHandler"))],
    ));
    let router = Router::new(instantiator.clone(), loader.clone());
    (instantiator, loader, router)
}

#[test]
fn exact_rule_wins_when_listed_first() {
    let (_, _, router) = api_router();
    let rules = api_rules();

    let handler = router.resolve(&rules, "/api/users").unwrap().unwrap();
    assert_eq!(tag_of(handler.as_ref()), "users");
}

#[test]
fn module_rule_recurses_on_remaining_path() {
    let (_, _, router) = api_router();
    let rules = api_rules();

    let mut ctx = DispatchContext::new("/api/orders");
    let handler = router.resolve_with(&rules, &mut ctx).unwrap().unwrap();
    assert_eq!(tag_of(handler.as_ref()), "orders");

    // Module entries are transparent relays: the module entry stays, the
    // handler entry belongs to the nested leaf rule that matched "orders".
    let kinds: Vec<_> = ctx.entries().iter().map(RouteEntry::kind).collect();
    assert_eq!(kinds, [EntryKind::Module, EntryKind::Handler]);
    assert_eq!(ctx.entries()[1].path(), "orders");
    assert_eq!(ctx.entries()[1].matched(), "orders");
}

#[test]
fn matching_is_case_insensitive_end_to_end() {
    let (_, _, router) = api_router();
    let rules = api_rules();

    let handler = router.resolve(&rules, "/API/USERS").unwrap().unwrap();
    assert_eq!(tag_of(handler.as_ref()), "users");
}

#[test]
fn no_rule_matching_is_a_quiet_not_found() {
    let (_, _, router) = api_router();
    let rules = api_rules();

    assert!(router.resolve(&rules, "/static/logo.png").unwrap().is_none());
}

#[test]
fn module_miss_pops_the_module_entry() {
    let (_, loader, router) = api_router();
    let rules = api_rules();

    let mut ctx = DispatchContext::new("/api/unknown");
    let outcome = router.resolve_with(&rules, &mut ctx).unwrap();

    assert!(outcome.is_none());
    assert!(ctx.is_empty(), "module entry must be rolled back on a miss");
    // The nested set was still loaded (and is now cached).
    assert_eq!(loader.load_count(), 1);
}

#[test]
fn nested_rule_set_loads_once_and_resolution_is_idempotent() {
    let (_, loader, router) = api_router();
    let rules = api_rules();

    for _ in 0..3 {
        let handler = router.resolve(&rules, "/api/orders").unwrap().unwrap();
        assert_eq!(tag_of(handler.as_ref()), "orders");
    }
    assert_eq!(loader.load_count(), 1, "nested rule set is built once");
}

#[test]
fn loader_default_sort_puts_longer_literals_first() {
    let instantiator = Arc::new(
        FixtureInstantiator::new()
            .with_handler("Short", "short")
            .with_handler("Long", "long"),
    );
    // Declared shortest-first; the default sort must flip them so the more
    // specific prefix wins.
    let loader = Arc::new(StaticLoader::new().with_module(
        "M",
        vec![
            RuleDecl::new("o", FixtureTarget::handler("Short")),
            RuleDecl::new("orders", FixtureTarget::handler("Long")),
        ],
    ));
    let router = Router::new(instantiator, loader);
    let rules =
        RuleSet::from_decls([RuleDecl::new("/api/", FixtureTarget::module("M"))]).unwrap();

    let handler = router.resolve(&rules, "/api/orders").unwrap().unwrap();
    assert_eq!(tag_of(handler.as_ref()), "long");
}

// ─── Factory rules ──────────────────────────────────────────────────────────

fn factory_router(factory: Arc<dyn HandlerFactory>) -> (Arc<FixtureInstantiator>, Router) {
    let instantiator =
        Arc::new(FixtureInstantiator::new().with_factory("FilesFactory", factory));
    let loader = Arc::new(StaticLoader::new());
    let router = Router::new(instantiator.clone(), loader);
    (instantiator, router)
}

fn factory_rules() -> RuleSet {
    RuleSet::from_decls([RuleDecl::new("/files/", FixtureTarget::factory("FilesFactory"))])
        .unwrap()
}

#[test]
fn unsupported_path_leaves_the_stack_empty() {
    let factory = PrefixFactory::new("docs/", "file");
    let (_, router) = factory_router(factory.clone());
    let rules = factory_rules();

    let mut ctx = DispatchContext::new("/files/secret/x");
    let outcome = router.resolve_with(&rules, &mut ctx).unwrap();

    assert!(outcome.is_none());
    assert!(ctx.is_empty(), "factory entry must be rolled back");
    // The support check really ran — with the factory's matched segment
    // already consumed from the path it sees.
    assert_eq!(factory.supports_calls(), 1);
    assert_eq!(factory.create_calls(), 0);
}

#[test]
fn supported_path_records_factory_then_handler() {
    let factory = PrefixFactory::new("docs/", "file");
    let (_, router) = factory_router(factory.clone());
    let rules = factory_rules();

    let mut ctx = DispatchContext::new("/files/docs/a.txt");
    let handler = router.resolve_with(&rules, &mut ctx).unwrap().unwrap();

    assert_eq!(tag_of(handler.as_ref()), "file");
    let kinds: Vec<_> = ctx.entries().iter().map(RouteEntry::kind).collect();
    assert_eq!(kinds, [EntryKind::Factory, EntryKind::Handler]);
    assert_eq!(factory.create_calls(), 1);
}

#[test]
fn factory_creating_nothing_rolls_back() {
    let (_, router) = factory_router(Arc::new(EmptyFactory));
    let rules = factory_rules();

    let mut ctx = DispatchContext::new("/files/x");
    let outcome = router.resolve_with(&rules, &mut ctx).unwrap();

    assert!(outcome.is_none());
    assert!(ctx.is_empty());
}

#[test]
fn factory_failure_in_support_unwinds_before_propagating() {
    let (_, router) = factory_router(FaultyFactory::in_support());
    let rules = factory_rules();

    let mut ctx = DispatchContext::new("/files/x");
    let err = router.resolve_with(&rules, &mut ctx).unwrap_err();

    assert!(matches!(err, RouteError::Factory { .. }));
    assert!(ctx.is_empty(), "stack must be consistent after the error");
}

#[test]
fn factory_failure_in_create_unwinds_before_propagating() {
    let (_, router) = factory_router(FaultyFactory::in_create());
    let rules = factory_rules();

    let mut ctx = DispatchContext::new("/files/x");
    let err = router.resolve_with(&rules, &mut ctx).unwrap_err();

    assert!(matches!(err, RouteError::Factory { .. }));
    assert!(ctx.is_empty());
}

#[test]
fn factory_instance_is_built_once_via_the_instantiator() {
    let factory = PrefixFactory::new("", "file");
    let (instantiator, router) = factory_router(factory);
    let rules = factory_rules();

    for _ in 0..3 {
        assert!(router.resolve(&rules, "/files/a").unwrap().is_some());
    }
    assert_eq!(instantiator.factory_calls(), 1, "factory is built once");
}

#[test]
fn explicit_factory_ctor_bypasses_the_instantiator() {
    let instantiator = Arc::new(FixtureInstantiator::new());
    let loader = Arc::new(StaticLoader::new());
    let router = Router::new(instantiator.clone(), loader);

    let rules = RuleSet::from_decls([RuleDecl::new(
        "/files/",
        FixtureTarget::factory("FilesFactory"),
    )
    .with_factory_ctor(|| PrefixFactory::new("", "direct") as Arc<dyn HandlerFactory>)])
    .unwrap();

    let handler = router.resolve(&rules, "/files/a").unwrap().unwrap();
    assert_eq!(tag_of(handler.as_ref()), "direct");
    assert_eq!(instantiator.factory_calls(), 0);
}

// ─── Misconfiguration and limits ────────────────────────────────────────────

#[test]
fn target_without_capabilities_is_a_configuration_error() {
    let err = RuleSet::from_decls([RuleDecl::new(
        "/x",
        FixtureTarget::with_capabilities("Opaque", &[]),
    )])
    .unwrap_err();

    match err {
        RouteError::UnsupportedTarget { target, recognized } => {
            assert_eq!(target, "Opaque");
            assert_eq!(recognized, vec!["handler", "handler-factory", "route-module"]);
        }
        other => panic!("expected UnsupportedTarget, got {other:?}"),
    }
}

#[test]
fn cyclic_module_graph_hits_the_depth_limit() {
    let instantiator = Arc::new(FixtureInstantiator::new());
    // "Loop" delegates straight back to itself with a zero-length pattern,
    // so nothing ever consumes the path.
    let loader = Arc::new(StaticLoader::new().with_module(
        "Loop",
        vec![RuleDecl::new("", FixtureTarget::module("Loop"))],
    ));
    let router = Router::new(instantiator, loader);
    let rules =
        RuleSet::from_decls([RuleDecl::new("/", FixtureTarget::module("Loop"))]).unwrap();

    let mut ctx = DispatchContext::new("/spin");
    let err = router.resolve_with(&rules, &mut ctx).unwrap_err();

    assert!(
        matches!(err, RouteError::DepthExceeded { max, .. } if max == MAX_MODULE_DEPTH),
        "got {err:?}"
    );
    assert!(ctx.is_empty(), "every module frame must be unwound");
}

#[test]
fn rule_descriptions_name_variant_pattern_and_target() {
    let rules = api_rules();
    let descriptions: Vec<_> = rules.iter().map(Rule::describe).collect();
    assert_eq!(
        descriptions,
        [
            "HandlerRule /api/users$ -> UserHandler",
            "ModuleRule /api/ -> ApiModule",
        ]
    );
}

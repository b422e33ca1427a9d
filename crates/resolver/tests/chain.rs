//! Resolver chain semantics: ordering, first-match-wins, error isolation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use testbed_codec::{Envelope, PropertyEntries, PropertyMap, SCOPE_PROPERTY};
use testbed_resolver::{
    FALLBACK_ORDER, ResolveContext, Resolver, ResolverChain, ResolverError, ResolverResult,
    SPECIFIC_ORDER, StaticResolver,
};
use testbed_resource::{ResourceCache, ScopeId};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Answer {
    Value(&'static str),
    Nothing,
    Fail,
    Decline,
}

struct Probe {
    id: &'static str,
    order: i32,
    names: Vec<String>,
    answer: Answer,
    calls: Arc<AtomicU32>,
    seen_scope: Arc<Mutex<Option<ScopeId>>>,
}

impl Probe {
    fn new(id: &'static str, order: i32, answer: Answer) -> Self {
        Self {
            id,
            order,
            names: Vec::new(),
            answer,
            calls: Arc::new(AtomicU32::new(0)),
            seen_scope: Arc::new(Mutex::new(None)),
        }
    }

    fn names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(ToString::to_string).collect();
        self
    }
}

#[async_trait]
impl Resolver for Probe {
    fn id(&self) -> &str {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn resolvable_property_names(&self, _: &PropertyEntries, _: &PropertyMap) -> Vec<String> {
        self.names.clone()
    }

    fn required_property_entries(&self) -> Vec<String> {
        self.names.iter().map(|n| format!("{n}.entries")).collect()
    }

    fn should_answer(&self, _: &str, _: &PropertyMap) -> bool {
        !matches!(self.answer, Answer::Decline)
    }

    async fn resolve(
        &self,
        _: &str,
        _: &PropertyMap,
        _: &PropertyMap,
        ctx: &ResolveContext<'_>,
    ) -> ResolverResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_scope.lock() = Some(ctx.scope().clone());
        match self.answer {
            Answer::Value(v) => Ok(Some(v.to_string())),
            Answer::Nothing | Answer::Decline => Ok(None),
            Answer::Fail => Err(ResolverError::Failed(format!("{} exploded", self.id))),
        }
    }
}

/// Resolver that needs `required-property` before it can answer.
struct WithRequirements;

#[async_trait]
impl Resolver for WithRequirements {
    fn id(&self) -> &str {
        "with-requirements"
    }

    fn resolvable_property_names(&self, _: &PropertyEntries, _: &PropertyMap) -> Vec<String> {
        vec!["property-with-requirements".into()]
    }

    fn required_properties(&self, expression: &str) -> Vec<String> {
        if expression == "property-with-requirements" {
            vec!["required-property".into()]
        } else {
            Vec::new()
        }
    }

    async fn resolve(
        &self,
        name: &str,
        properties: &PropertyMap,
        _: &PropertyMap,
        _: &ResolveContext<'_>,
    ) -> ResolverResult<Option<String>> {
        if name != "property-with-requirements" {
            return Ok(None);
        }
        Ok(properties
            .get("required-property")
            .and_then(|v| v.as_str())
            .map(|v| format!("supplied by test resources with requirements: {v}")))
    }
}

async fn resolve(chain: &ResolverChain, name: &str, properties: &PropertyMap) -> Envelope<String> {
    chain
        .resolve(name, properties, &PropertyMap::new(), &ResourceCache::new())
        .await
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn order_then_registration_sequence() {
    let chain = ResolverChain::new()
        .with(Probe::new("a", 0, Answer::Nothing))
        .with(Probe::new("fallback", FALLBACK_ORDER, Answer::Nothing))
        .with(Probe::new("b", SPECIFIC_ORDER, Answer::Nothing))
        .with(Probe::new("c", 0, Answer::Nothing))
        .with(Probe::new("d", SPECIFIC_ORDER, Answer::Nothing));

    assert_eq!(chain.ids(), vec!["b", "d", "a", "c", "fallback"]);
    assert_eq!(chain.len(), 5);
}

#[tokio::test]
async fn lower_order_answers_first() {
    let chain = ResolverChain::new()
        .with(StaticResolver::new("generic").with_property("db.url", "generic"))
        .with(
            StaticResolver::new("specific")
                .with_property("db.url", "specific")
                .with_order(SPECIFIC_ORDER),
        );

    assert_eq!(
        resolve(&chain, "db.url", &PropertyMap::new()).await,
        Envelope::Value("specific".to_string())
    );
}

// ---------------------------------------------------------------------------
// First match wins
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_value_stops_the_walk() {
    let first = Probe::new("first", 0, Answer::Nothing);
    let second = Probe::new("second", 1, Answer::Value("two"));
    let third = Probe::new("third", 2, Answer::Value("three"));
    let (first_calls, third_calls) = (Arc::clone(&first.calls), Arc::clone(&third.calls));

    let chain = ResolverChain::new().with(first).with(second).with(third);

    assert_eq!(
        resolve(&chain, "x", &PropertyMap::new()).await,
        Envelope::Value("two".to_string())
    );
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(third_calls.load(Ordering::SeqCst), 0, "third must not run");
}

#[tokio::test]
async fn declining_resolver_is_not_invoked() {
    let declining = Probe::new("declining", 0, Answer::Decline);
    let calls = Arc::clone(&declining.calls);
    let chain = ResolverChain::new()
        .with(declining)
        .with(Probe::new("answering", 1, Answer::Value("v")));

    assert_eq!(
        resolve(&chain, "x", &PropertyMap::new()).await,
        Envelope::Value("v".to_string())
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn nobody_answers_is_empty() {
    let chain = ResolverChain::new()
        .with(Probe::new("a", 0, Answer::Nothing))
        .with(Probe::new("b", 0, Answer::Decline));
    assert_eq!(resolve(&chain, "x", &PropertyMap::new()).await, Envelope::Empty);
    assert_eq!(resolve(&ResolverChain::new(), "x", &PropertyMap::new()).await, Envelope::Empty);
}

// ---------------------------------------------------------------------------
// Error isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failing_resolver_yields_error_envelope() {
    let later = Probe::new("later", 1, Answer::Value("never"));
    let later_calls = Arc::clone(&later.calls);
    let chain = ResolverChain::new()
        .with(Probe::new("broken", 0, Answer::Fail))
        .with(later);

    let envelope = resolve(&chain, "x", &PropertyMap::new()).await;
    assert_eq!(envelope, Envelope::Error("broken exploded".to_string()));
    assert_eq!(later_calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Fan-out queries
// ---------------------------------------------------------------------------

#[test]
fn resolvable_names_union_in_chain_order() {
    let chain = ResolverChain::new()
        .with(Probe::new("late", 10, Answer::Nothing).names(&["c", "a"]))
        .with(Probe::new("early", 0, Answer::Nothing).names(&["a", "b"]));

    assert_eq!(
        chain.list_resolvable_names(&PropertyEntries::new(), &PropertyMap::new()),
        vec!["a", "b", "c"]
    );
    assert_eq!(
        chain.required_property_entries(),
        vec!["a.entries", "b.entries", "c.entries"]
    );
}

#[tokio::test]
async fn requirements_gate_resolution() {
    let chain = ResolverChain::new()
        .with(Probe::new("other", -1, Answer::Nothing))
        .with(WithRequirements);

    assert_eq!(
        chain.required_properties("property-with-requirements"),
        vec!["required-property"]
    );
    assert!(chain.required_properties("first-property").is_empty());

    assert_eq!(
        resolve(&chain, "property-with-requirements", &PropertyMap::new()).await,
        Envelope::Empty
    );

    let mut props = PropertyMap::new();
    props.insert("required-property".into(), "hello".into());
    assert_eq!(
        resolve(&chain, "property-with-requirements", &props).await,
        Envelope::Value("supplied by test resources with requirements: hello".to_string())
    );
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scope_taken_from_properties() {
    let probe = Probe::new("probe", 0, Answer::Nothing);
    let seen = Arc::clone(&probe.seen_scope);
    let chain = ResolverChain::new().with(probe);

    let mut props = PropertyMap::new();
    props.insert(SCOPE_PROPERTY.into(), "run-7".into());
    resolve(&chain, "x", &props).await;
    assert_eq!(seen.lock().clone(), Some(ScopeId::new("run-7").unwrap()));

    resolve(&chain, "x", &PropertyMap::new()).await;
    assert_eq!(seen.lock().clone(), Some(ScopeId::default()));
}

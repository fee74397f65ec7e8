//! Queries the prover cannot certify must reach the store, even when every
//! ingredient looks individually safe

use crate::common::*;
use serde_json::json;

#[tokio::test]
async fn test_or_is_never_cache_served() {
    let store = site_store();
    let optimizer = optimizer(&store);
    let criteria = Criteria::or(vec![
        Criteria::eq("slug", "/"),
        Criteria::eq("slug", "/about"),
    ]);
    warm(&optimizer, "/", std::slice::from_ref(&criteria)).await;

    let mut ctx = optimizer.begin_request("/").await;
    // both branches were remembered and prefetched, yet the disjunction
    // still goes to the store
    assert!(ctx.cached_count() >= 3);
    let calls_before = store.find_calls();
    let served = optimizer
        .find(&mut ctx, &criteria, &FindOptions::new())
        .await
        .unwrap();
    assert_eq!(store.find_calls() - calls_before, 1);
    assert_eq!(served, store.find(&criteria, &FindOptions::new()).await.unwrap());
    assert_eq!(optimizer.stats().cache_serves, 0);
}

#[tokio::test]
async fn test_unknown_operator_parses_closed() {
    let store = site_store();
    let optimizer = optimizer(&store);
    let criteria = Criteria::parse(&json!({"level": {"$gt": 0}}));
    assert!(matches!(criteria, Criteria::Unsupported(_)));

    let mut ctx = optimizer.begin_request("/").await;
    // the reference store refuses what it cannot evaluate
    let err = optimizer
        .find(&mut ctx, &criteria, &FindOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperator(_)));
}

#[tokio::test]
async fn test_unsupported_projection_falls_back() {
    let store = site_store();
    let optimizer = optimizer(&store);
    let criteria = Criteria::eq("slug", "/about");
    warm(&optimizer, "/about", std::slice::from_ref(&criteria)).await;

    let mut ctx = optimizer.begin_request("/about").await;
    let options = FindOptions::new()
        .projection(Projection::parse(&json!({"title": {"$meta": "textScore"}})));
    let calls_before = store.find_calls();
    let docs = optimizer.find(&mut ctx, &criteria, &options).await.unwrap();
    assert_eq!(store.find_calls() - calls_before, 1);
    assert_eq!(ids(&docs), ["about"]);
}

#[tokio::test]
async fn test_non_memory_field_is_never_proven() {
    let store = site_store();
    let optimizer = optimizer(&store);
    let criteria = Criteria::eq("title", "About");
    warm(&optimizer, "/", std::slice::from_ref(&criteria)).await;

    let mut ctx = optimizer.begin_request("/").await;
    let calls_before = store.find_calls();
    optimizer
        .find(&mut ctx, &criteria, &FindOptions::new())
        .await
        .unwrap();
    assert_eq!(store.find_calls() - calls_before, 1);
    assert_eq!(optimizer.stats().cache_serves, 0);
}

#[tokio::test]
async fn test_partially_remembered_in_falls_back() {
    let store = site_store();
    let optimizer = optimizer(&store);
    warm(&optimizer, "/", &[Criteria::eq("slug", "/about")]).await;

    // one remembered value, one not: no subset, no proof
    let mut ctx = optimizer.begin_request("/").await;
    let calls_before = store.find_calls();
    let docs = optimizer
        .find(
            &mut ctx,
            &Criteria::is_in("slug", vec![json!("/about"), json!("/blog")]),
            &FindOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(ids(&docs), ["about", "blog"]);
    assert_eq!(store.find_calls() - calls_before, 1);
}

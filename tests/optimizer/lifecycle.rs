//! Two-cycle lifecycle: learn on the first visit, serve from one batched
//! query on the second, identical results throughout

use crate::common::*;
use serde_json::json;

#[tokio::test]
async fn test_first_visit_never_prefetches() {
    let store = site_store();
    let optimizer = optimizer(&store);
    let calls_before = store.find_calls();
    let ctx = optimizer.begin_request("/").await;
    assert_eq!(store.find_calls(), calls_before);
    assert_eq!(ctx.cached_count(), 0);
}

#[tokio::test]
async fn test_second_visit_is_served_from_one_batched_query() {
    let store = site_store();
    let optimizer = optimizer(&store);
    let queries = [
        Criteria::eq("slug", "/about"),
        Criteria::eq("_id", "global"),
        Criteria::is_in("path", vec![json!("/"), json!("/about")]),
    ];
    warm(&optimizer, "/about", &queries).await;

    let mut expected = Vec::new();
    for criteria in &queries {
        expected.push(store.find(criteria, &FindOptions::new()).await.unwrap());
    }

    let calls_before = store.find_calls();
    let mut ctx = optimizer.begin_request("/about").await;
    // the prefetch is the only store round trip
    assert_eq!(store.find_calls() - calls_before, 1);

    for (criteria, direct) in queries.iter().zip(&expected) {
        let served = optimizer
            .find(&mut ctx, criteria, &FindOptions::new())
            .await
            .unwrap();
        assert_eq!(&served, direct);
    }
    assert_eq!(store.find_calls() - calls_before, 1);
    optimizer.end_request(ctx);

    let stats = optimizer.stats();
    assert_eq!(stats.cache_serves, queries.len() as u64);
    assert_eq!(stats.prefetches, 1);
}

#[tokio::test]
async fn test_unremembered_query_falls_back() {
    let store = site_store();
    let optimizer = optimizer(&store);
    warm(&optimizer, "/", &[Criteria::eq("slug", "/about")]).await;

    let mut ctx = optimizer.begin_request("/").await;
    let calls_before = store.find_calls();
    let docs = optimizer
        .find(&mut ctx, &Criteria::eq("slug", "/blog"), &FindOptions::new())
        .await
        .unwrap();
    assert_eq!(ids(&docs), ["blog"]);
    assert_eq!(store.find_calls() - calls_before, 1);
}

#[tokio::test]
async fn test_routes_learn_independently() {
    let store = site_store();
    let optimizer = optimizer(&store);
    warm(&optimizer, "/", &[Criteria::eq("slug", "/")]).await;
    warm(&optimizer, "/about", &[Criteria::eq("slug", "/about")]).await;

    // "/about" never learned the home lookup
    let mut ctx = optimizer.begin_request("/about").await;
    let calls_before = store.find_calls();
    optimizer
        .find(&mut ctx, &Criteria::eq("slug", "/"), &FindOptions::new())
        .await
        .unwrap();
    assert_eq!(store.find_calls() - calls_before, 1);
}

#[tokio::test]
async fn test_cache_serves_deep_clones() {
    let store = site_store();
    let optimizer = optimizer(&store);
    let criteria = Criteria::eq("slug", "/about");
    warm(&optimizer, "/about", std::slice::from_ref(&criteria)).await;

    let mut ctx = optimizer.begin_request("/about").await;
    let mut first = optimizer
        .find(&mut ctx, &criteria, &FindOptions::new())
        .await
        .unwrap();
    first[0].set_field("title", json!("DEFACED"));

    let second = optimizer
        .find(&mut ctx, &criteria, &FindOptions::new())
        .await
        .unwrap();
    assert_eq!(second[0].get_field("title"), Some(&json!("About")));
}

#[tokio::test]
async fn test_find_one_from_cache() {
    let store = site_store();
    let optimizer = optimizer(&store);
    let criteria = Criteria::eq("slug", "global");
    warm(&optimizer, "/", std::slice::from_ref(&criteria)).await;

    let mut ctx = optimizer.begin_request("/").await;
    let calls_before = store.find_calls();
    let doc = optimizer
        .find_one(&mut ctx, &criteria, &FindOptions::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.id(), Some("global".into()));
    assert_eq!(store.find_calls(), calls_before);
}

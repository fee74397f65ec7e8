//! Writes invalidate before they are acknowledged: a later read in the
//! same request can never see a stale cached copy or miss a fresh one

use crate::common::*;
use serde_json::json;

#[tokio::test]
async fn test_update_is_visible_within_the_request() {
    let store = site_store();
    let optimizer = optimizer(&store);
    let criteria = Criteria::eq("slug", "/about");
    warm(&optimizer, "/about", std::slice::from_ref(&criteria)).await;

    let mut ctx = optimizer.begin_request("/about").await;
    assert!(ctx.is_cached(&"about".into()));

    let updated = Document::from_value(json!({
        "_id": "about", "slug": "/about", "title": "About v2"
    }))
    .unwrap();
    optimizer.update(&mut ctx, &updated).await.unwrap();
    assert!(!ctx.is_cached(&"about".into()));

    let doc = optimizer
        .find_one(&mut ctx, &criteria, &FindOptions::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.get_field("title"), Some(&json!("About v2")));
}

#[tokio::test]
async fn test_inserted_match_is_not_missed() {
    let store = site_store();
    let optimizer = optimizer(&store);
    let criteria = Criteria::eq("slug", "/about");
    warm(&optimizer, "/about", std::slice::from_ref(&criteria)).await;

    // the new page matches a remembered lookup but was never prefetched
    let mut ctx = optimizer.begin_request("/about").await;
    let extra = Document::from_value(json!({"_id": "about-2", "slug": "/about"})).unwrap();
    optimizer.insert(&mut ctx, &extra).await.unwrap();

    let docs = optimizer
        .find(&mut ctx, &criteria, &FindOptions::new())
        .await
        .unwrap();
    assert_eq!(ids(&docs), ["about", "about-2"]);
}

#[tokio::test]
async fn test_unrelated_write_keeps_cache_hot() {
    let store = site_store();
    let optimizer = optimizer(&store);
    let criteria = Criteria::eq("slug", "/about");
    warm(&optimizer, "/about", std::slice::from_ref(&criteria)).await;

    let mut ctx = optimizer.begin_request("/about").await;
    let misc = Document::from_value(json!({"_id": "misc", "slug": "/misc"})).unwrap();
    optimizer.insert(&mut ctx, &misc).await.unwrap();

    let calls_before = store.find_calls();
    let docs = optimizer
        .find(&mut ctx, &criteria, &FindOptions::new())
        .await
        .unwrap();
    assert_eq!(ids(&docs), ["about"]);
    assert_eq!(store.find_calls(), calls_before);
    assert_eq!(optimizer.stats().writes, 1);
}

#[tokio::test]
async fn test_next_cycle_relearns_after_write() {
    let store = site_store();
    let optimizer = optimizer(&store);
    let criteria = Criteria::eq("slug", "/about");
    warm(&optimizer, "/about", std::slice::from_ref(&criteria)).await;

    let mut ctx = optimizer.begin_request("/about").await;
    let extra = Document::from_value(json!({"_id": "about-2", "slug": "/about"})).unwrap();
    optimizer.insert(&mut ctx, &extra).await.unwrap();
    optimizer
        .find(&mut ctx, &criteria, &FindOptions::new())
        .await
        .unwrap();
    optimizer.end_request(ctx);

    // the third visit prefetches both matches and proves the query again
    let mut ctx = optimizer.begin_request("/about").await;
    let calls_before = store.find_calls();
    let docs = optimizer
        .find(&mut ctx, &criteria, &FindOptions::new())
        .await
        .unwrap();
    assert_eq!(ids(&docs), ["about", "about-2"]);
    assert_eq!(store.find_calls(), calls_before);
}

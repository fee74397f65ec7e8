//! The cache path and the store must be observationally identical for any
//! provable query, whatever its options

use crate::common::*;
use serde_json::json;

async fn assert_equivalent(criteria: Criteria, options: FindOptions) {
    let store = site_store();
    let optimizer = optimizer(&store);
    warm(&optimizer, "/page", std::slice::from_ref(&criteria)).await;

    let mut ctx = optimizer.begin_request("/page").await;
    let calls_before = store.find_calls();
    let served = optimizer.find(&mut ctx, &criteria, &options).await.unwrap();
    assert_eq!(
        store.find_calls(),
        calls_before,
        "query was not cache-served: {criteria:?}"
    );
    let direct = store.find(&criteria, &options).await.unwrap();
    assert_eq!(served, direct, "cache diverged from store: {criteria:?}");
}

#[tokio::test]
async fn test_unsorted_order_matches_store() {
    assert_equivalent(Criteria::eq("slug", "/"), FindOptions::new()).await;
}

#[tokio::test]
async fn test_single_key_sort() {
    assert_equivalent(
        Criteria::eq("slug", "/"),
        FindOptions::new().sort(SortSpec::by("title", SortOrder::Asc)),
    )
    .await;
}

#[tokio::test]
async fn test_compound_sort() {
    assert_equivalent(
        Criteria::is_in(
            "path",
            vec![json!("/"), json!("/about"), json!("/about/team")],
        ),
        FindOptions::new().sort(SortSpec::from_pairs(&[("level", -1), ("title", 1)])),
    )
    .await;
}

#[tokio::test]
async fn test_skip_and_limit_after_filter_and_sort() {
    assert_equivalent(
        Criteria::is_in(
            "path",
            vec![json!("/"), json!("/about"), json!("/about/team")],
        ),
        FindOptions::new()
            .sort(SortSpec::by("path", SortOrder::Asc))
            .skip(1)
            .limit(2),
    )
    .await;
}

#[tokio::test]
async fn test_inclusion_projection() {
    assert_equivalent(
        Criteria::eq("slug", "/about"),
        FindOptions::new().projection(Projection::include(&["title"])),
    )
    .await;
}

#[tokio::test]
async fn test_exclusion_projection() {
    assert_equivalent(
        Criteria::eq("slug", "/about"),
        FindOptions::new().projection(Projection::exclude(&["tags"])),
    )
    .await;
}

#[tokio::test]
async fn test_conjunction_with_unprovable_conjunct() {
    // one safe conjunct certifies the whole conjunction; the extra filter
    // still applies inside the cache
    assert_equivalent(
        Criteria::and(vec![
            Criteria::is_in("slug", vec![json!("/"), json!("/about")]),
            Criteria::eq("published", true),
        ]),
        FindOptions::new(),
    )
    .await;
}

#[tokio::test]
async fn test_exists_filter_inside_proven_conjunction() {
    assert_equivalent(
        Criteria::and(vec![
            Criteria::eq("slug", "/"),
            Criteria::exists("workflowLocale", false),
        ]),
        FindOptions::new(),
    )
    .await;
}

#[tokio::test]
async fn test_limit_beyond_result_size() {
    assert_equivalent(
        Criteria::eq("_id", "global"),
        FindOptions::new().limit(5),
    )
    .await;
}

#[tokio::test]
async fn test_sort_over_mixed_and_missing_types() {
    // published is bool on some docs and absent on others
    assert_equivalent(
        Criteria::is_in("slug", vec![json!("/"), json!("/blog"), json!("global")]),
        FindOptions::new().sort(SortSpec::from_pairs(&[("published", 1), ("_id", 1)])),
    )
    .await;
}

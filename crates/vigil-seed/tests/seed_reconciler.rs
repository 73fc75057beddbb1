//! Seed Reconciler behavior against a real store
//!
//! - Re-running a plan inserts nothing and duplicates nothing
//! - Existing records get their refreshable fields, and only those
//! - A store failure aborts mid-list, keeping what was already applied

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use vigil_seed::prelude::*;
use vigil_seed::SeedError;
use vigil_store::{DocumentStore, Fields, InMemoryStore, StoreError};
use vigil_test_utils::{fields, store_with_slug_indexes, FaultyStore, StoreOp};

fn commune(slug: &str) -> SeedEntry {
    SeedEntry::new(slug, Fields::new())
        .with_field("name", slug.to_uppercase())
        .with_field("seo_title", format!("Sécurité à {slug}"))
}

fn plan(slugs: &[&str]) -> SeedPlan {
    SeedPlan::new("communes", slugs.iter().map(|s| commune(s)).collect())
        .with_refresh(RefreshPolicy::new(["seo_title", "seo_description"]))
}

#[tokio::test]
async fn first_run_inserts_second_run_skips() {
    let store = store_with_slug_indexes(&["communes"]);
    let reconciler = SeedReconciler::new(&store);
    let plan = plan(&["a", "b", "c"]);

    let first = reconciler.reconcile(&plan).await.unwrap();
    assert_eq!(first, SeedReport { inserted: 3, skipped: 0, total: 3 });

    let second = reconciler.reconcile(&plan).await.unwrap();
    assert_eq!(second, SeedReport { inserted: 0, skipped: 3, total: 3 });

    assert_eq!(store.count("communes"), 3);
}

#[tokio::test]
async fn empty_plan_makes_no_store_calls() {
    let store = FaultyStore::new(store_with_slug_indexes(&["communes"]));

    let report = SeedReconciler::new(&store)
        .reconcile(&plan(&[]))
        .await
        .unwrap();

    assert_eq!(report, SeedReport::default());
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn refresh_overwrites_stale_values_and_keeps_admin_edits() {
    let store = store_with_slug_indexes(&["communes"]);
    let id = store
        .insert(
            "communes",
            fields(json!({
                "slug": "paris",
                "name": "Paris (edited in admin)",
                "description": "Hand-written copy",
                "seo_title": "stale title",
                "seo_description": "stale description"
            })),
        )
        .await
        .unwrap();

    let entry = SeedEntry::new("paris", Fields::new())
        .with_field("name", "Paris")
        .with_field("seo_title", "Agent de sécurité à Paris")
        .with_field("seo_description", "Fresh description");
    let plan = SeedPlan::new("communes", vec![entry])
        .with_refresh(RefreshPolicy::new(["seo_title", "seo_description"]));

    SeedReconciler::new(&store).reconcile(&plan).await.unwrap();

    let record = store.get(&id).await.unwrap().unwrap();
    assert_eq!(record.get("seo_title"), Some(&json!("Agent de sécurité à Paris")));
    assert_eq!(record.get("seo_description"), Some(&json!("Fresh description")));
    assert_eq!(record.get("name"), Some(&json!("Paris (edited in admin)")));
    assert_eq!(record.get("description"), Some(&json!("Hand-written copy")));
}

#[tokio::test]
async fn no_refresh_policy_means_no_patch_calls() {
    let store = FaultyStore::new(store_with_slug_indexes(&["communes"]));
    let plan = SeedPlan::new("communes", vec![commune("a"), commune("b")]);

    SeedReconciler::new(&store).reconcile(&plan).await.unwrap();
    SeedReconciler::new(&store).reconcile(&plan).await.unwrap();

    assert_eq!(store.count(StoreOp::Insert), 2);
    assert_eq!(store.count(StoreOp::Patch), 0);
    assert_eq!(store.count(StoreOp::FirstByIndex), 4);
}

#[tokio::test]
async fn store_failure_aborts_and_keeps_earlier_entries() {
    let store = FaultyStore::new(store_with_slug_indexes(&["communes"])).fail_on(StoreOp::Insert, 3);
    let plan = plan(&["a", "b", "c", "d"]);

    let err = SeedReconciler::new(&store).reconcile(&plan).await.unwrap_err();

    assert!(matches!(err, SeedError::Store(StoreError::Unavailable(_))));
    assert_eq!(store.inner().count("communes"), 2);
    // "d" is never looked up
    assert_eq!(store.count(StoreOp::FirstByIndex), 3);

    store.heal();
    let rerun = SeedReconciler::new(&store).reconcile(&plan).await.unwrap();
    assert_eq!(rerun, SeedReport { inserted: 2, skipped: 2, total: 4 });
    assert_eq!(store.inner().count("communes"), 4);
}

#[tokio::test]
async fn missing_index_is_a_store_error() {
    let store = InMemoryStore::new();
    let err = SeedReconciler::new(&store)
        .reconcile(&plan(&["a"]))
        .await
        .unwrap_err();

    assert!(matches!(err, SeedError::Store(StoreError::UnknownIndex { .. })));
    assert_eq!(store.count("communes"), 0);
}

#[tokio::test]
async fn configured_key_field_need_not_be_a_slug() {
    let config = VigilConfig::from_toml(
        r#"
        [seed.partners]
        index = "by_name"
        key_field = "name"
        "#,
    )
    .unwrap();
    let store = InMemoryStore::new();
    for spec in config.index_specs() {
        store.define_index(spec);
    }

    let entries = vigil_seed::catalog::entries_from_values(
        vec![json!({"name": "Acme Corp", "tier": "gold"})],
        "name",
    )
    .unwrap();
    let plan = vigil_seed::catalog::plan_for("partners", entries, &config);

    let reconciler = SeedReconciler::new(&store);
    let first = reconciler.reconcile(&plan).await.unwrap();
    assert_eq!(first, SeedReport { inserted: 1, skipped: 0, total: 1 });
    let second = reconciler.reconcile(&plan).await.unwrap();
    assert_eq!(second, SeedReport { inserted: 0, skipped: 1, total: 1 });

    let acme = store
        .first_by_index("partners", "by_name", &json!("Acme Corp"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(acme.get("tier"), Some(&json!("gold")));
    assert_eq!(store.count("partners"), 1);
}

#[tokio::test]
async fn canonical_catalog_is_idempotent() {
    let store = store_with_slug_indexes(&["communes", "services", "solutions"]);
    let config = VigilConfig::default();

    for target in SeedTarget::ALL {
        let plan = target.plan(&config);
        let first = SeedReconciler::new(&store).reconcile(&plan).await.unwrap();
        assert_eq!(first.inserted, plan.entries.len());

        let second = SeedReconciler::new(&store).reconcile(&plan).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(store.count(target.collection()), plan.entries.len());
    }
}

fn slug_lists() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,6}", 0..12)
}

proptest! {
    #[test]
    fn repeated_runs_never_duplicate(slugs in slug_lists(), runs in 1usize..4) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let store = store_with_slug_indexes(&["communes"]);
            let plan = SeedPlan::new(
                "communes",
                slugs.iter().map(|s| commune(s)).collect(),
            );
            let mut distinct = slugs.clone();
            distinct.sort();
            distinct.dedup();

            for run in 0..runs {
                let report = SeedReconciler::new(&store).reconcile(&plan).await.unwrap();
                prop_assert_eq!(report.total, slugs.len());
                prop_assert_eq!(report.inserted + report.skipped, report.total);
                if run == 0 {
                    prop_assert_eq!(report.inserted, distinct.len());
                } else {
                    prop_assert_eq!(report.inserted, 0);
                }
                prop_assert_eq!(store.count("communes"), distinct.len());
            }
            Ok(())
        })?;
    }
}

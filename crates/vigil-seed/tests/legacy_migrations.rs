//! Legacy-field migrations against a real store

use pretty_assertions::assert_eq;
use serde_json::json;
use vigil_seed::legacy::{INDUSTRIES, SITE_CONFIG, SOLUTIONS};
use vigil_seed::prelude::*;
use vigil_seed::{has_legacy_value, MigrationError};
use vigil_store::{DocumentStore, InMemoryStore, StoreError};
use vigil_test_utils::{fields, FaultyStore, StoreOp};

#[tokio::test]
async fn industries_record_loses_legacy_fields() {
    let store = InMemoryStore::new();
    let id = store
        .insert(
            INDUSTRIES,
            fields(json!({"slug": "x", "id": "legacy-1", "challenges": ["c1"], "name": "old"})),
        )
        .await
        .unwrap();

    let report = LegacyFieldMigrator::new(&store, LegacyFieldSet::industries())
        .run()
        .await
        .unwrap();

    assert_eq!(report, MigrationReport { migrated: 1, total: 1 });
    let record = store.get(&id).await.unwrap().unwrap();
    assert!(!record.contains("id"));
    assert!(!record.contains("challenges"));
    assert_eq!(record.slug(), Some("x"));
}

#[tokio::test]
async fn second_run_migrates_nothing() {
    let store = InMemoryStore::new();
    for body in [
        json!({"slug": "a", "meta_title": "t", "meta_description": "d"}),
        json!({"slug": "b", "solutions": ["s1"]}),
        json!({"slug": "c"}),
    ] {
        store.insert(INDUSTRIES, fields(body)).await.unwrap();
    }
    let migrator = LegacyFieldMigrator::new(&store, LegacyFieldSet::industries());

    let first = migrator.run().await.unwrap();
    assert_eq!(first, MigrationReport { migrated: 2, total: 3 });

    for record in store.collect(INDUSTRIES).await.unwrap() {
        for field in &LegacyFieldSet::industries().fields {
            assert!(!has_legacy_value(&record, field), "{} still has {}", record.id, field.label());
        }
    }

    let second = migrator.run().await.unwrap();
    assert_eq!(second, MigrationReport { migrated: 0, total: 3 });
}

#[tokio::test]
async fn navbar_paths_are_stripped_in_place() {
    let store = InMemoryStore::new();
    let id = store
        .insert(
            SITE_CONFIG,
            fields(json!({
                "site_name": "Vigil",
                "footer_config": {"columns": 3},
                "navbar_items": [
                    {"label": "Services", "href": "/services", "path": "/services", "children": []},
                    {"label": "Contact", "href": "/contact", "path": "/contact"}
                ]
            })),
        )
        .await
        .unwrap();

    let report = LegacyFieldMigrator::new(&store, LegacyFieldSet::site_config())
        .run()
        .await
        .unwrap();
    assert_eq!(report.migrated, 1);

    let record = store.get(&id).await.unwrap().unwrap();
    assert!(!record.contains("footer_config"));
    assert_eq!(record.get("site_name"), Some(&json!("Vigil")));
    assert_eq!(
        record.get("navbar_items"),
        Some(&json!([
            {"label": "Services", "href": "/services", "children": []},
            {"label": "Contact", "href": "/contact"}
        ]))
    );

    let again = LegacyFieldMigrator::new(&store, LegacyFieldSet::site_config())
        .run()
        .await
        .unwrap();
    assert_eq!(again.migrated, 0);
}

#[tokio::test]
async fn malformed_navbar_aborts_after_earlier_records() {
    let store = InMemoryStore::new();
    let clean_first = store
        .insert(SITE_CONFIG, fields(json!({"footer_config": {}})))
        .await
        .unwrap();
    store
        .insert(SITE_CONFIG, fields(json!({"navbar_items": {"path": "/"}})))
        .await
        .unwrap();
    let never_reached = store
        .insert(SITE_CONFIG, fields(json!({"footer_config": {}})))
        .await
        .unwrap();

    let err = LegacyFieldMigrator::new(&store, LegacyFieldSet::site_config())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, MigrationError::MalformedField { .. }));
    assert!(!store.get(&clean_first).await.unwrap().unwrap().contains("footer_config"));
    assert!(store.get(&never_reached).await.unwrap().unwrap().contains("footer_config"));
}

#[tokio::test]
async fn patch_failure_aborts_without_report() {
    let inner = InMemoryStore::new();
    for slug in ["a", "b", "c"] {
        inner
            .insert(SOLUTIONS, fields(json!({ "slug": slug, "name": slug })))
            .await
            .unwrap();
    }
    let store = FaultyStore::new(inner).fail_on(StoreOp::Patch, 2);

    let err = LegacyFieldMigrator::new(&store, LegacyFieldSet::solutions())
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::Store(StoreError::Unavailable(_))));

    let remaining: usize = store
        .inner()
        .collect(SOLUTIONS)
        .await
        .unwrap()
        .iter()
        .filter(|r| r.contains("name"))
        .count();
    assert_eq!(remaining, 2);

    store.heal();
    let retry = LegacyFieldMigrator::new(&store, LegacyFieldSet::solutions())
        .run()
        .await
        .unwrap();
    assert_eq!(retry, MigrationReport { migrated: 2, total: 3 });
}

#[tokio::test]
async fn batch_runs_in_order_and_stops_on_first_error() {
    let inner = InMemoryStore::new();
    inner
        .insert(INDUSTRIES, fields(json!({"slug": "retail", "id": "1"})))
        .await
        .unwrap();
    inner
        .insert(SITE_CONFIG, fields(json!({"footer_config": {}})))
        .await
        .unwrap();

    let store = FaultyStore::new(inner).fail_on(StoreOp::Collect, 2);
    let err = run_all_migrations(&store).await.unwrap_err();
    assert!(matches!(err, MigrationError::Store(_)));
    // industries ran, site_config was never reached
    assert_eq!(store.count(StoreOp::Collect), 2);
    assert!(store
        .inner()
        .collect(SITE_CONFIG)
        .await
        .unwrap()[0]
        .contains("footer_config"));

    store.heal();
    let report = run_all_migrations(&store).await.unwrap();
    assert_eq!(report.get(INDUSTRIES), Some(&MigrationReport { migrated: 0, total: 1 }));
    assert_eq!(report.get(SOLUTIONS), Some(&MigrationReport { migrated: 0, total: 0 }));
    assert_eq!(report.get(SITE_CONFIG), Some(&MigrationReport { migrated: 1, total: 1 }));
}

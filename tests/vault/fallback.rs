//! Backend failures during save and delete, and recovery to the primary store.

use luxe_archive::{
    ImagePayload, KeyValueStore, LegacyStore, NoticeTone, PrimaryStore, StorageMode, StoreError,
    VaultConfig,
};

use crate::support::{
    brand, brand_with_lore_image, ids, inline_image, model_with_variant, quota, unavailable, vault,
    FaultyKv, FaultyPrimary,
};

fn legacy_view(kv: &FaultyKv) -> LegacyStore<luxe_archive::InMemoryKeyValueStore> {
    LegacyStore::new(kv.inner().clone(), &VaultConfig::default())
}

#[test]
fn primary_failure_falls_back_to_legacy() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    let vault = vault(&primary, &kv);
    vault.initialize();
    vault.save_current(brand("first"), Vec::new());

    primary.faults(|f| f.upsert = Some(unavailable()));
    let notice = vault.save_current(brand("second"), Vec::new());

    assert_eq!(notice.tone, NoticeTone::Warning);
    assert_eq!(
        notice.message,
        "Primary archive unavailable. Saved to legacy storage; large images may be limited."
    );
    assert_eq!(vault.storage_mode(), Some(StorageMode::Legacy));
    assert_eq!(ids(&vault.records()), vec!["second", "first"]);

    // The whole list went to legacy, not just the new record.
    let stored = legacy_view(&kv).load_legacy_slots().unwrap();
    assert_eq!(ids(&stored.records), vec!["second", "first"]);

    // Subsequent saves go straight to legacy.
    primary.heal();
    let upserts = primary.upsert_calls();
    vault.save_current(brand("third"), Vec::new());
    assert_eq!(primary.upsert_calls(), upserts);
    assert_eq!(legacy_view(&kv).load_legacy_slots().unwrap().records.len(), 3);
}

#[test]
fn fallback_failure_changes_nothing() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    let vault = vault(&primary, &kv);
    vault.initialize();
    vault.save_current(brand("kept"), Vec::new());

    primary.faults(|f| f.upsert = Some(StoreError::TransactionFailed("aborted".into())));
    kv.fail_next_set(unavailable());
    let notice = vault.save_current(brand("lost"), Vec::new());

    assert_eq!(notice.tone, NoticeTone::Error);
    assert_eq!(notice.message, "Archive save failed. Storage unavailable.");
    assert_eq!(vault.storage_mode(), Some(StorageMode::Primary));
    assert_eq!(ids(&vault.records()), vec!["kept"]);
}

#[test]
fn serialization_failure_does_not_switch_mode() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    let vault = vault(&primary, &kv);
    vault.initialize();

    primary.faults(|f| f.upsert = Some(StoreError::Serde("bad float".into())));
    let notice = vault.save_current(brand("a"), Vec::new());
    assert_eq!(notice.tone, NoticeTone::Error);
    assert_eq!(vault.storage_mode(), Some(StorageMode::Primary));
    assert_eq!(kv.set_calls(), 0);
    assert!(vault.records().is_empty());
}

#[test]
fn capacity_fallback_end_to_end() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    primary.faults(|f| f.get_all = Some(unavailable()));
    let vault = vault(&primary, &kv);
    vault.initialize();
    assert_eq!(vault.storage_mode(), Some(StorageMode::Legacy));

    kv.fail_next_set(quota());
    let notice = vault.save_current(
        brand_with_lore_image("aurelian", 3_000),
        vec![model_with_variant("aurelian", inline_image(6_000))],
    );

    assert_eq!(notice.tone, NoticeTone::Warning);
    assert!(notice
        .message
        .starts_with("Legacy archived without visuals due to storage limits."));
    assert!(notice.message.contains("9000 bytes"));
    assert_eq!(kv.set_calls(), 2);

    let stored = legacy_view(&kv).load_legacy_slots().unwrap().records;
    assert_eq!(stored.len(), 1);
    let record = &stored[0];
    for entry in record.brand.lore.iter().flatten() {
        assert_eq!(entry.image_url, None);
    }
    for variant in record.models.iter().flat_map(|m| m.variants.iter()) {
        assert_eq!(ImagePayload::classify(&variant.image_url), ImagePayload::Empty);
    }
    // Everything else survived.
    assert_eq!(record.brand.lore.as_ref().unwrap().len(), 2);
    assert_eq!(record.models[0].hero_variant_id.as_deref(), Some("aurelian-v1"));
    assert_eq!(&vault.records(), &stored);
}

#[test]
fn real_quota_triggers_stripping() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::with_capacity(4_096);
    primary.faults(|f| f.get_all = Some(unavailable()));
    let vault = vault(&primary, &kv);
    vault.initialize();

    let notice = vault.save_current(
        brand_with_lore_image("heavy", 9_000),
        vec![model_with_variant("heavy", "https://cdn.example/heavy.png")],
    );
    assert_eq!(notice.tone, NoticeTone::Warning);
    assert!(kv.inner().used_bytes() <= 4_096);
    assert_eq!(vault.records()[0].models[0].variants[0].image_url, "");
}

#[test]
fn capacity_retry_failure_is_an_error() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    primary.faults(|f| f.get_all = Some(unavailable()));
    let vault = vault(&primary, &kv);
    vault.initialize();

    kv.fail_next_set(quota());
    kv.fail_next_set(quota());
    let notice = vault.save_current(brand_with_lore_image("a", 300), Vec::new());
    assert_eq!(notice.tone, NoticeTone::Error);
    assert_eq!(notice.message, "Archive failed. Local storage may be unavailable.");
    assert!(vault.records().is_empty());
    assert_eq!(kv.inner().get_item("luxeauto_saves_v2").unwrap(), None);
}

#[test]
fn non_capacity_legacy_failure_is_not_retried() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    primary.faults(|f| f.get_all = Some(unavailable()));
    let vault = vault(&primary, &kv);
    vault.initialize();

    kv.fail_next_set(unavailable());
    let notice = vault.save_current(brand("a"), Vec::new());
    assert_eq!(notice.tone, NoticeTone::Error);
    assert_eq!(kv.set_calls(), 1);
}

#[test]
fn delete_failure_leaves_state_unchanged() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    let vault = vault(&primary, &kv);
    vault.initialize();
    vault.save_current(brand("a"), Vec::new());
    vault.save_current(brand("b"), Vec::new());

    primary.faults(|f| f.delete = Some(StoreError::TransactionFailed("locked".into())));
    let notice = vault.delete("a");
    assert_eq!(notice.tone, NoticeTone::Error);
    assert_eq!(notice.message, "Unable to update archives. Storage may be locked.");
    assert_eq!(ids(&vault.records()), vec!["b", "a"]);
    assert_eq!(primary.inner().len(), 2);

    primary.heal();
    assert_eq!(vault.delete("a").message, "Legacy dissolved.");
    assert_eq!(ids(&vault.records()), vec!["b"]);
    assert_eq!(ids(&primary.inner().get_all().unwrap()), vec!["b"]);
}

#[test]
fn legacy_delete_rewrites_envelope() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    primary.faults(|f| f.get_all = Some(unavailable()));
    let vault = vault(&primary, &kv);
    vault.initialize();
    vault.save_current(brand("a"), Vec::new());
    vault.save_current(brand("b"), Vec::new());

    kv.fail_next_set(unavailable());
    assert_eq!(vault.delete("b").tone, NoticeTone::Error);
    assert_eq!(vault.records().len(), 2);

    assert_eq!(vault.delete("b").tone, NoticeTone::Success);
    assert_eq!(ids(&legacy_view(&kv).load_legacy_slots().unwrap().records), vec!["a"]);
}

#[test]
fn retry_primary_restores_mode_only_when_primary_works() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    let vault = vault(&primary, &kv);
    vault.initialize();
    primary.faults(|f| {
        f.upsert = Some(unavailable());
        f.get_all = Some(unavailable());
    });
    vault.save_current(brand("a"), Vec::new());
    assert_eq!(vault.storage_mode(), Some(StorageMode::Legacy));

    let notice = vault.retry_primary();
    assert_eq!(notice.tone, NoticeTone::Error);
    assert_eq!(vault.storage_mode(), Some(StorageMode::Legacy));

    primary.heal();
    primary.faults(|f| f.bulk_upsert = Some(unavailable()));
    assert_eq!(vault.retry_primary().tone, NoticeTone::Error);
    assert_eq!(vault.storage_mode(), Some(StorageMode::Legacy));

    primary.heal();
    assert_eq!(vault.retry_primary().tone, NoticeTone::Success);
    assert_eq!(vault.storage_mode(), Some(StorageMode::Primary));
    assert_eq!(ids(&primary.inner().get_all().unwrap()), vec!["a"]);
}

#[test]
fn retry_primary_keeps_newer_primary_revisions() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    let mut newer = luxe_archive::SaveRecord::new(brand("a"), Vec::new(), 10_000);
    newer.name = "Newer in primary".into();
    primary.inner().upsert(&newer).unwrap();
    kv.inner()
        .set_item(
            "luxeauto_saves_v1",
            &serde_json::json!([
                { "id": "a", "timestamp": 1, "brand": { "id": "a", "name": "Stale legacy" } },
                { "id": "b", "timestamp": 2, "brand": { "id": "b", "name": "Only legacy" } },
            ])
            .to_string(),
        )
        .unwrap();
    primary.faults(|f| f.get_all = Some(unavailable()));
    let vault = vault(&primary, &kv);
    vault.initialize();
    assert_eq!(vault.storage_mode(), Some(StorageMode::Legacy));

    primary.heal();
    assert_eq!(vault.retry_primary().tone, NoticeTone::Success);

    let stored = primary.inner().get_all().unwrap();
    assert_eq!(vault.records(), stored);
    let a = stored.iter().find(|record| record.id == "a").unwrap();
    assert_eq!(a.name, "Newer in primary");
    assert_eq!(a.timestamp, 10_000);
    assert!(stored.iter().any(|record| record.id == "b"));
}

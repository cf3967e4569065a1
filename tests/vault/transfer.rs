//! Export and import.

use luxe_archive::{ImportReport, NoticeTone, PrimaryStore, StorageMode, StoreError};
use serde_json::{json, Value};

use crate::support::{brand, ids, model_with_variant, unavailable, vault, FaultyKv, FaultyPrimary};

#[test]
fn export_import_round_trip() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    let source = vault(&primary, &kv);
    source.initialize();
    source.save_current(brand("aurelian"), vec![model_with_variant("aurelian", "")]);
    source.save_current(brand("vesper"), Vec::new());
    let before = source.records();

    let export = source.export();
    assert_eq!(export.notice.message, "Archives exported.");
    let artifact = export.artifact.unwrap();
    assert!(artifact.file_name.starts_with("luxeauto-archives-"));
    assert!(artifact.file_name.ends_with(".json"));

    // Re-importing into the same vault replaces every record with itself.
    let outcome = source.import(&artifact.contents);
    assert_eq!(
        outcome.report,
        Some(ImportReport {
            imported: 2,
            replaced: 2,
            dropped: 0
        })
    );
    assert_eq!(outcome.notice.message, "Imported 2 archives. 2 replaced.");
    assert_eq!(source.records(), before);

    // And into an empty vault it reproduces ids and timestamps.
    let fresh_primary = FaultyPrimary::new();
    let target = vault(&fresh_primary, &FaultyKv::new());
    target.initialize();
    target.import(&artifact.contents);
    let stamps = |records: &[luxe_archive::SaveRecord]| {
        records
            .iter()
            .map(|r| (r.id.clone(), r.timestamp))
            .collect::<Vec<_>>()
    };
    assert_eq!(stamps(&target.records()), stamps(&before));
}

#[test]
fn export_document_layout() {
    let primary = FaultyPrimary::new();
    let vault = vault(&primary, &FaultyKv::new());
    vault.initialize();
    vault.save_current(brand("a"), Vec::new());

    let contents = vault.export().artifact.unwrap().contents;
    let doc: Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(doc["version"], json!(1));
    assert!(doc["exportedAt"].as_str().unwrap().ends_with('Z'));
    assert_eq!(doc["slots"].as_array().unwrap().len(), 1);
    assert_eq!(doc["slots"][0]["brand"]["name"], json!("Maison a"));
}

#[test]
fn export_rereads_primary() {
    let primary = FaultyPrimary::new();
    let vault = vault(&primary, &FaultyKv::new());
    vault.initialize();
    // Written by another session after initialization.
    primary
        .inner()
        .upsert(&luxe_archive::SaveRecord::new(brand("elsewhere"), Vec::new(), 1))
        .unwrap();

    let contents = vault.export().artifact.unwrap().contents;
    assert!(contents.contains("elsewhere"));
}

#[test]
fn import_does_not_overwrite_newer_primary_revisions() {
    let primary = FaultyPrimary::new();
    let vault = vault(&primary, &FaultyKv::new());
    vault.initialize();
    // Written by another session after initialization.
    let mut newer = luxe_archive::SaveRecord::new(brand("a"), Vec::new(), 10_000);
    newer.name = "Newer in primary".into();
    primary.inner().upsert(&newer).unwrap();

    let text = json!([
        { "id": "a", "timestamp": 5, "brand": { "id": "a", "name": "Older import" } },
        { "id": "b", "timestamp": 6, "brand": { "id": "b", "name": "Fresh" } },
    ])
    .to_string();
    let outcome = vault.import(&text);
    assert_eq!(outcome.notice.tone, NoticeTone::Success);
    assert_eq!(outcome.report.unwrap().replaced, 1);

    let stored = primary.inner().get_all().unwrap();
    assert_eq!(stored.iter().find(|r| r.id == "a").unwrap().name, "Newer in primary");
    assert_eq!(ids(&stored), vec!["a", "b"]);
    assert_eq!(vault.records(), stored);
}

#[test]
fn export_failure_is_reported() {
    let primary = FaultyPrimary::new();
    let vault = vault(&primary, &FaultyKv::new());
    vault.initialize();
    vault.save_current(brand("a"), Vec::new());
    primary.faults(|f| f.get_all = Some(unavailable()));

    let outcome = vault.export();
    assert_eq!(outcome.notice.tone, NoticeTone::Error);
    assert_eq!(outcome.notice.message, "Export failed. Try again.");
    assert!(outcome.artifact.is_none());
}

#[test]
fn export_in_legacy_mode_uses_memory() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    primary.faults(|f| f.get_all = Some(unavailable()));
    let vault = vault(&primary, &kv);
    vault.initialize();
    assert_eq!(vault.export().notice.message, "No archives to export yet.");

    vault.save_current(brand("a"), Vec::new());
    assert_eq!(vault.export().notice.tone, NoticeTone::Success);
}

#[test]
fn partial_corruption_import() {
    let primary = FaultyPrimary::new();
    let vault = vault(&primary, &FaultyKv::new());
    vault.initialize();

    let file = json!({
        "version": 1,
        "exportedAt": "2024-05-01T10:00:00.000Z",
        "slots": [
            { "id": "valid", "name": "Valid", "timestamp": 42, "brand": { "id": "valid", "name": "Valid" } },
            { "id": "broken", "name": "Broken", "timestamp": 43 },
        ],
    })
    .to_string();
    let outcome = vault.import(&file);

    assert_eq!(outcome.notice.tone, NoticeTone::Success);
    assert_eq!(
        outcome.report,
        Some(ImportReport {
            imported: 1,
            replaced: 0,
            dropped: 1
        })
    );
    assert_eq!(outcome.notice.message, "Imported 1 archives. 1 invalid entries dropped.");
    assert_eq!(ids(&vault.records()), vec!["valid"]);
    assert_eq!(primary.inner().len(), 1);
}

#[test]
fn legacy_generation_one_file_imports() {
    let primary = FaultyPrimary::new();
    let vault = vault(&primary, &FaultyKv::new());
    vault.initialize();
    let file = json!([{ "brand": { "id": "bare", "name": "Bare" }, "timestamp": 7 }]).to_string();
    assert_eq!(vault.import(&file).report.unwrap().imported, 1);
    assert_eq!(vault.records()[0].name, "Bare");
}

#[test]
fn newer_import_replaces_older_local() {
    let primary = FaultyPrimary::new();
    let vault = vault(&primary, &FaultyKv::new());
    vault.initialize();
    vault.save_current(brand("a"), Vec::new());
    let local = vault.records()[0].timestamp;

    let file = json!([{ "id": "a", "name": "Imported", "timestamp": local + 1, "brand": { "id": "a", "name": "Imported" } }])
        .to_string();
    vault.import(&file);
    assert_eq!(vault.records()[0].name, "Imported");
    assert_eq!(vault.records()[0].timestamp, local + 1);
}

#[test]
fn rejected_imports_change_nothing() {
    let primary = FaultyPrimary::new();
    let vault = vault(&primary, &FaultyKv::new());
    vault.initialize();
    vault.save_current(brand("a"), Vec::new());

    let not_json = vault.import("definitely { not json");
    assert_eq!(not_json.notice.message, "Import failed. File is not valid JSON.");
    assert!(not_json.report.is_none());

    let nothing_valid = vault.import(&json!({ "slots": [{ "id": "x" }] }).to_string());
    assert_eq!(nothing_valid.notice.message, "Import failed. No valid archives found.");

    primary.faults(|f| f.bulk_upsert = Some(StoreError::TransactionFailed("aborted".into())));
    let write_failed = vault.import(&json!([{ "brand": { "id": "b" } }]).to_string());
    assert_eq!(write_failed.notice.tone, NoticeTone::Error);

    assert_eq!(ids(&vault.records()), vec!["a"]);
}

#[test]
fn legacy_mode_import_merges_and_persists() {
    let primary = FaultyPrimary::new();
    let kv = FaultyKv::new();
    primary.faults(|f| f.get_all = Some(unavailable()));
    let vault = vault(&primary, &kv);
    vault.initialize();
    assert_eq!(vault.storage_mode(), Some(StorageMode::Legacy));
    vault.save_current(brand("a"), Vec::new());

    let file = json!([
        { "id": "b", "timestamp": 1, "brand": { "id": "b" } },
        { "id": "a", "timestamp": 1, "brand": { "id": "a", "name": "Older" } },
    ])
    .to_string();
    let outcome = vault.import(&file);
    assert_eq!(outcome.report.unwrap().replaced, 1);

    let records = vault.records();
    assert_eq!(ids(&records), vec!["a", "b"]);
    assert_eq!(records[0].name, "Maison a");

    // A fresh session in legacy mode sees the same list.
    let reopened = crate::support::vault(&primary, &kv);
    reopened.initialize();
    assert_eq!(reopened.records(), records);
}

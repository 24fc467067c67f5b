//! End-to-end generation pipeline tests over in-memory collaborators

mod common;

use common::{phone_master, phone_request, MemoryVariantStore, RecordingInventory, RecordingSnapshots};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use variant_engine::generation::VariantGenerator;
use variant_engine::EngineConfig;

fn generator(
    master: Arc<common::MemoryMasterData>,
    store: Arc<MemoryVariantStore>,
    inventory: Arc<RecordingInventory>,
    snapshots: Arc<RecordingSnapshots>,
) -> VariantGenerator {
    VariantGenerator::new(
        EngineConfig::default(),
        master,
        store,
        inventory,
        snapshots,
    )
}

#[tokio::test]
async fn generates_full_cartesian_product() {
    let master = phone_master();
    let store = Arc::new(MemoryVariantStore::default());
    let inventory = Arc::new(RecordingInventory::default());
    let snapshots = Arc::new(RecordingSnapshots::default());
    let generator = generator(master, store.clone(), inventory.clone(), snapshots.clone());

    let result = generator
        .generate(&phone_request(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.total_generated, 8);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.race_duplicates, 0);
    let batch_id = result.batch_id.as_deref().unwrap();
    assert!(!batch_id.is_empty());
    assert_eq!(store.count(), 8);

    let stored = store.stored();
    // 8 distinct identities, all in the same batch
    let hashes: HashSet<&String> = stored.iter().map(|v| &v.config_hash).collect();
    assert_eq!(hashes.len(), 8);
    for variant in &stored {
        assert_eq!(variant.config_hash.len(), 64);
        assert!(variant.config_hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(variant.sku.starts_with("APP-IPHONE-"));
        assert_eq!(variant.generation_batch.as_deref(), Some(batch_id));
        assert_eq!(variant.status, variant_engine::lifecycle::VariantStatus::Draft);
        assert!(!variant.governance.is_locked);
    }

    // First combination takes the first value of every axis in request order
    let keys: Vec<&str> = stored.iter().map(|v| v.combination_key.as_str()).collect();
    assert!(keys.contains(&"black-titanium-8gb-128gb"));

    // Price modifiers stack on the base price
    let top = stored
        .iter()
        .find(|v| v.combination_key.contains("16gb") && v.combination_key.contains("256gb"))
        .unwrap();
    assert_eq!(top.final_price, Decimal::from(1149));
    assert_eq!(top.price_resolution.len(), 3);
    let base_only = stored
        .iter()
        .find(|v| v.combination_key.contains("8gb") && v.combination_key.contains("128gb"))
        .unwrap();
    assert_eq!(base_only.final_price, Decimal::from(999));

    // Every created variant got an inventory placeholder, one snapshot nudge
    assert_eq!(inventory.placeholders.lock().len(), 8);
    assert_eq!(
        snapshots.scheduled.lock().as_slice(),
        ["product_group:iphone"]
    );
}

#[tokio::test]
async fn rerun_skips_existing_identities() {
    let master = phone_master();
    let store = Arc::new(MemoryVariantStore::default());
    let inventory = Arc::new(RecordingInventory::default());
    let snapshots = Arc::new(RecordingSnapshots::default());
    let generator = generator(master, store.clone(), inventory.clone(), snapshots);

    generator
        .generate(&phone_request(), &CancellationToken::new())
        .await
        .unwrap();
    let rerun = generator
        .generate(&phone_request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(rerun.total_generated, 0);
    assert_eq!(rerun.skipped, 8);
    assert_eq!(rerun.race_duplicates, 0);
    assert_eq!(store.count(), 8);
    // No new placeholders for skipped identities
    assert_eq!(inventory.placeholders.lock().len(), 8);
}

#[tokio::test]
async fn insert_races_count_as_duplicates_not_errors() {
    let master = phone_master();
    let store = Arc::new(MemoryVariantStore::default());
    let generator = generator(
        master,
        store.clone(),
        Arc::new(RecordingInventory::default()),
        Arc::new(RecordingSnapshots::default()),
    );

    generator
        .generate(&phone_request(), &CancellationToken::new())
        .await
        .unwrap();

    // Blind the pre-insert existence check so every candidate races the
    // stored records at insert time
    store.hide_existing.store(true, Ordering::SeqCst);
    let raced = generator
        .generate(&phone_request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(raced.total_generated, 0);
    assert_eq!(raced.skipped, 0);
    assert_eq!(raced.race_duplicates, 8);
    assert_eq!(store.count(), 8);
}

#[tokio::test]
async fn disabled_axis_is_excluded_from_expansion() {
    let master = phone_master();
    let store = Arc::new(MemoryVariantStore::default());
    let generator = generator(
        master,
        store.clone(),
        Arc::new(RecordingInventory::default()),
        Arc::new(RecordingSnapshots::default()),
    );

    let mut req = phone_request();
    req.attribute_dimensions[1].disabled = true; // storage off

    let result = generator
        .generate(&req, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.total_generated, 4);
    for variant in store.stored() {
        assert!(!variant.combination_key.contains("128gb"));
        assert!(!variant.combination_key.contains("256gb"));
        assert_eq!(variant.attribute_dimensions.len(), 1);
    }
}

#[tokio::test]
async fn descriptive_axis_does_not_generate_variants() {
    let master = phone_master();
    let mut master_data = common::MemoryMasterData::default();
    master_data.groups = master.groups.clone();
    master_data.colors = master.colors.clone();
    master_data.axes = master.axes.clone();
    master_data.values = master.values.clone();
    master_data
        .axes
        .insert("attribute:engraving".to_string(), common::axis("attribute:engraving", "Engraving", false));
    master_data.values.insert(
        "attribute_value:none".to_string(),
        common::attr_value("attribute_value:none", "attribute:engraving", "None", "0"),
    );

    let store = Arc::new(MemoryVariantStore::default());
    let generator = generator(
        Arc::new(master_data),
        store.clone(),
        Arc::new(RecordingInventory::default()),
        Arc::new(RecordingSnapshots::default()),
    );

    let mut req = phone_request();
    req.attribute_dimensions.push(shared::AttributeAxisInput {
        attribute_id: "attribute:engraving".to_string(),
        values: vec!["attribute_value:none".to_string()],
        disabled: false,
    });

    let result = generator
        .generate(&req, &CancellationToken::new())
        .await
        .unwrap();

    // Still 2x2x2, the descriptive axis contributes nothing
    assert_eq!(result.total_generated, 8);
}

#[tokio::test]
async fn axis_order_does_not_change_identity() {
    let master = phone_master();

    let store_a = Arc::new(MemoryVariantStore::default());
    let generator_a = generator(
        master.clone(),
        store_a.clone(),
        Arc::new(RecordingInventory::default()),
        Arc::new(RecordingSnapshots::default()),
    );
    generator_a
        .generate(&phone_request(), &CancellationToken::new())
        .await
        .unwrap();

    let store_b = Arc::new(MemoryVariantStore::default());
    let generator_b = generator(
        master,
        store_b.clone(),
        Arc::new(RecordingInventory::default()),
        Arc::new(RecordingSnapshots::default()),
    );
    let mut reordered = phone_request();
    reordered.attribute_dimensions.reverse();
    reordered.base_dimensions.color.reverse();
    generator_b
        .generate(&reordered, &CancellationToken::new())
        .await
        .unwrap();

    let hashes_a: HashSet<String> = store_a.stored().into_iter().map(|v| v.config_hash).collect();
    let hashes_b: HashSet<String> = store_b.stored().into_iter().map(|v| v.config_hash).collect();
    assert_eq!(hashes_a, hashes_b);
}

#[tokio::test]
async fn cancellation_before_first_chunk_inserts_nothing() {
    let master = phone_master();
    let store = Arc::new(MemoryVariantStore::default());
    let generator = generator(
        master,
        store.clone(),
        Arc::new(RecordingInventory::default()),
        Arc::new(RecordingSnapshots::default()),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = generator.generate(&phone_request(), &cancel).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.total_generated, 0);
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn missing_product_group_is_rejected() {
    let master = phone_master();
    let generator = generator(
        master,
        Arc::new(MemoryVariantStore::default()),
        Arc::new(RecordingInventory::default()),
        Arc::new(RecordingSnapshots::default()),
    );

    let mut req = phone_request();
    req.product_group_id = "product_group:ghost".to_string();
    let err = generator
        .generate(&req, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), shared::ErrorCode::MissingProductGroup);
}

#[tokio::test]
async fn soft_limit_rejects_oversized_expansion() {
    let master = phone_master();
    let generator = generator(
        master,
        Arc::new(MemoryVariantStore::default()),
        Arc::new(RecordingInventory::default()),
        Arc::new(RecordingSnapshots::default()),
    );

    let mut req = phone_request();
    req.max_combinations = Some(4); // 8 > 4
    let err = generator
        .generate(&req, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), shared::ErrorCode::SoftLimitExceeded);
}

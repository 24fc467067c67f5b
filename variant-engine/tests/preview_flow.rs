//! Preview service tests: memoization, invalidation, limits, configurator matrix

mod common;

use common::{phone_master, phone_request, MemoryVariantStore, RecordingInventory, RecordingSnapshots};
use shared::{AttributeAxisInput, BaseDimensions, ErrorCode, GenerationRequest};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use variant_engine::generation::VariantGenerator;
use variant_engine::EngineConfig;

struct Fixture {
    master: Arc<common::MemoryMasterData>,
    generator: VariantGenerator,
}

fn fixture() -> Fixture {
    let master = phone_master();
    let generator = VariantGenerator::new(
        EngineConfig::default(),
        master.clone(),
        Arc::new(MemoryVariantStore::default()),
        Arc::new(RecordingInventory::default()),
        Arc::new(RecordingSnapshots::default()),
    );
    Fixture { master, generator }
}

#[tokio::test]
async fn preview_expands_without_writing() {
    let fx = fixture();
    let preview = fx.generator.preview_service();

    let result = preview.preview(&phone_request()).await.unwrap();

    assert_eq!(result.total_combinations, 8);
    assert_eq!(result.combinations.len(), 8);
    assert_eq!(result.dimension_breakdown.get("Color"), Some(&2));
    assert_eq!(result.dimension_breakdown.get("RAM"), Some(&2));
    assert_eq!(result.dimension_breakdown.get("Storage"), Some(&2));

    let first = &result.combinations[0];
    assert_eq!(first.combination_key, "black-titanium-8gb-128gb");
    assert_eq!(first.config_hash.len(), 64);
    assert_eq!(
        first.selections.get("color").map(String::as_str),
        Some("Black Titanium")
    );

    // All hashes distinct
    let hashes: std::collections::HashSet<&String> =
        result.combinations.iter().map(|c| &c.config_hash).collect();
    assert_eq!(hashes.len(), 8);
}

#[tokio::test]
async fn preview_is_memoized_per_request_shape() {
    let fx = fixture();
    let preview = fx.generator.preview_service();

    preview.preview(&phone_request()).await.unwrap();
    let after_first = fx.master.lookups.load(Ordering::SeqCst);

    // Identical request: served from cache, no further master lookups
    preview.preview(&phone_request()).await.unwrap();
    assert_eq!(fx.master.lookups.load(Ordering::SeqCst), after_first);

    // Axis order does not change the cache key
    let mut reordered = phone_request();
    reordered.attribute_dimensions.reverse();
    preview.preview(&reordered).await.unwrap();
    assert_eq!(fx.master.lookups.load(Ordering::SeqCst), after_first);

    // A different shape misses
    let mut narrowed = phone_request();
    narrowed.base_dimensions.color.pop();
    preview.preview(&narrowed).await.unwrap();
    assert!(fx.master.lookups.load(Ordering::SeqCst) > after_first);
}

#[tokio::test]
async fn generation_invalidates_preview_for_the_group() {
    let fx = fixture();
    let preview = fx.generator.preview_service();

    preview.preview(&phone_request()).await.unwrap();
    let cached = fx.master.lookups.load(Ordering::SeqCst);

    fx.generator
        .generate(&phone_request(), &CancellationToken::new())
        .await
        .unwrap();

    // The cached preview was dropped with the group
    preview.preview(&phone_request()).await.unwrap();
    assert!(fx.master.lookups.load(Ordering::SeqCst) > cached);
}

#[tokio::test]
async fn configurator_matrix_reflects_generated_variants() {
    let fx = fixture();

    fx.generator
        .generate(&phone_request(), &CancellationToken::new())
        .await
        .unwrap();

    let preview = fx.generator.preview_service();
    let matrix = preview
        .configurator_matrix("product_group:iphone")
        .await
        .unwrap();

    assert_eq!(matrix.variant_count, 8);
    assert_eq!(matrix.axes.get("color").map(|s| s.len()), Some(2));
    assert_eq!(matrix.axes.get("attribute:ram").map(|s| s.len()), Some(2));
    assert_eq!(matrix.axes.get("attribute:storage").map(|s| s.len()), Some(2));
    assert!(matrix
        .axes
        .get("color")
        .unwrap()
        .contains("color:black"));
}

#[tokio::test]
async fn empty_request_previews_to_nothing() {
    let fx = fixture();
    let preview = fx.generator.preview_service();

    let req = GenerationRequest {
        product_group_id: "product_group:iphone".to_string(),
        brand: None,
        base_price: None,
        tenant_id: None,
        base_dimensions: BaseDimensions::default(),
        attribute_dimensions: vec![],
        max_combinations: None,
    };
    let result = preview.preview(&req).await.unwrap();
    assert_eq!(result.total_combinations, 0);
    assert!(result.combinations.is_empty());
}

#[tokio::test]
async fn per_axis_value_ceiling_is_enforced() {
    let fx = fixture();
    let preview = fx.generator.preview_service();

    let mut req = phone_request();
    req.attribute_dimensions[0].values =
        (0..101).map(|i| format!("attribute_value:v{i}")).collect();
    let err = preview.preview(&req).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::LimitExceeded);
}

#[tokio::test]
async fn attribute_axis_count_ceiling_is_enforced() {
    let fx = fixture();
    let preview = fx.generator.preview_service();

    let mut req = phone_request();
    req.attribute_dimensions = (0..11)
        .map(|i| AttributeAxisInput {
            attribute_id: format!("attribute:axis{i}"),
            values: vec![format!("attribute_value:v{i}")],
            disabled: false,
        })
        .collect();
    let err = preview.preview(&req).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::LimitExceeded);
}

#[tokio::test]
async fn hard_cap_rejects_runaway_expansion() {
    let fx = fixture();
    let preview = fx.generator.preview_service();

    // 100 x 100 x 2 = 20_000 > the 10_000 hard cap, even with a huge
    // caller-supplied soft limit
    let mut req = phone_request();
    req.base_dimensions.color.clear();
    req.attribute_dimensions = vec![
        AttributeAxisInput {
            attribute_id: "attribute:a".to_string(),
            values: (0..100).map(|i| format!("attribute_value:a{i}")).collect(),
            disabled: false,
        },
        AttributeAxisInput {
            attribute_id: "attribute:b".to_string(),
            values: (0..100).map(|i| format!("attribute_value:b{i}")).collect(),
            disabled: false,
        },
        AttributeAxisInput {
            attribute_id: "attribute:c".to_string(),
            values: vec![
                "attribute_value:c0".to_string(),
                "attribute_value:c1".to_string(),
            ],
            disabled: false,
        },
    ];
    req.max_combinations = Some(1_000_000);
    let err = preview.preview(&req).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::HardCapExceeded);
}

#[tokio::test]
async fn adhoc_preview_normalizes_mixed_raw_shapes() {
    let fx = fixture();
    let preview = fx.generator.preview_service();

    // One axis of bare strings, one of foreign records resolving id from
    // different fields
    let raw: Vec<variant_engine::normalize::RawDimension> = serde_json::from_value(
        serde_json::json!([
            {
                "key": "material",
                "values": ["Cotton", "Linen"]
            },
            {
                "attributeId": "finish",
                "label": "Finish",
                "values": [
                    { "id": "matte", "label": "Matte" },
                    { "_id": "gloss", "name": "Gloss" },
                    { "value": 42, "label": "Custom 42" }
                ]
            }
        ]),
    )
    .unwrap();

    let result = preview
        .preview_adhoc("product_group:iphone", &raw, None)
        .unwrap();

    assert_eq!(result.total_combinations, 6);
    assert_eq!(result.dimension_breakdown.get("material"), Some(&2));
    assert_eq!(result.dimension_breakdown.get("Finish"), Some(&3));
    assert_eq!(result.combinations[0].combination_key, "cotton-matte");
    // All six identities distinct
    let hashes: std::collections::HashSet<&String> =
        result.combinations.iter().map(|c| &c.config_hash).collect();
    assert_eq!(hashes.len(), 6);
}

#[tokio::test]
async fn size_categories_take_part_in_identity() {
    let master = phone_master();
    let mut master_data = common::MemoryMasterData::default();
    master_data.groups = master.groups.clone();
    master_data
        .sizes
        .insert("size:m".to_string(), common::size("size:m", "M", "shirt"));
    master_data
        .sizes
        .insert("size:l".to_string(), common::size("size:l", "L", "shirt"));

    let generator = VariantGenerator::new(
        EngineConfig::default(),
        Arc::new(master_data),
        Arc::new(MemoryVariantStore::default()),
        Arc::new(RecordingInventory::default()),
        Arc::new(RecordingSnapshots::default()),
    );
    let preview = generator.preview_service();

    let req = GenerationRequest {
        product_group_id: "product_group:iphone".to_string(),
        brand: None,
        base_price: None,
        tenant_id: None,
        base_dimensions: BaseDimensions {
            color: vec![],
            size: vec!["size:m".to_string(), "size:l".to_string()],
        },
        attribute_dimensions: vec![],
        max_combinations: None,
    };
    let result = preview.preview(&req).await.unwrap();

    assert_eq!(result.total_combinations, 2);
    assert_ne!(
        result.combinations[0].config_hash,
        result.combinations[1].config_hash
    );
}

#[tokio::test]
async fn shuffled_axis_order_never_moves_identity() {
    use rand::seq::SliceRandom;

    let fx = fixture();
    let preview = fx.generator.preview_service();

    let baseline = preview.preview(&phone_request()).await.unwrap();
    let expected: std::collections::HashSet<String> = baseline
        .combinations
        .iter()
        .map(|c| c.config_hash.clone())
        .collect();

    let mut rng = rand::thread_rng();
    for _ in 0..20 {
        let mut request = phone_request();
        request.attribute_dimensions.shuffle(&mut rng);
        for axis in &mut request.attribute_dimensions {
            axis.values.shuffle(&mut rng);
        }

        let shuffled = preview.preview(&request).await.unwrap();
        let hashes: std::collections::HashSet<String> = shuffled
            .combinations
            .iter()
            .map(|c| c.config_hash.clone())
            .collect();
        assert_eq!(hashes, expected);
    }
}

#[tokio::test]
async fn mixed_case_group_id_does_not_survive_invalidation() {
    let fx = fixture();
    let preview = fx.generator.preview_service();

    let mut spaced = phone_request();
    spaced.product_group_id = "  Product_Group:iPhone  ".into();
    preview.preview(&spaced).await.unwrap();

    fx.generator
        .generate(&phone_request(), &CancellationToken::new())
        .await
        .unwrap();
    let after_generate = fx.master.lookups.load(Ordering::SeqCst);

    // The entry cached under the unnormalized spelling was dropped too,
    // so this preview recomputes instead of serving stale data
    preview.preview(&spaced).await.unwrap();
    assert!(fx.master.lookups.load(Ordering::SeqCst) > after_generate);
}

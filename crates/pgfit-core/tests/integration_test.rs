use pgfit_core::health::{Flag, IndexHealth, annotate, leading_key};
use pgfit_db::fetch_index_stats;
use pgfit_db::fixtures;
use pgfit_db::test_utils::TestDb;

fn find<'a>(report: &'a [IndexHealth], name: &str) -> &'a IndexHealth {
    report
        .iter()
        .find(|h| h.descriptor.index == name)
        .unwrap_or_else(|| panic!("Index {name} missing from report"))
}

#[tokio::test]
async fn test_annotate_flags_redundant_fixture_indexes() {
    let db = TestDb::new().await.expect("Failed to create test database");

    fixtures::create_small_dataset(&db.pool)
        .await
        .expect("Failed to create fixture");

    let snapshot = fetch_index_stats(&db.pool, "shop_")
        .await
        .expect("Failed to fetch index stats");
    let report = annotate(snapshot);

    // The UNIQUE constraint already indexes sku, so the extra index is covered
    let sku_extra = find(&report, "idx_product_sku_nonunique");
    assert!(sku_extra.has(Flag::DuplicateOrCovered));

    // Three order indexes lead with customer_id; every member gets flagged
    for name in [
        "idx_order_customer_created_at",
        "idx_order_customer_only",
        "idx_order_cust_inc_created",
    ] {
        assert!(
            find(&report, name).has(Flag::DuplicateOrCovered),
            "{name} shares its leading key"
        );
    }

    // Nothing in the fixture queries on is_active, so the index never scans.
    // Scan counters only ever lag upwards, so zero here is stable to assert.
    let is_active = find(&report, "idx_product_is_active");
    assert!(is_active.has(Flag::Unused));
    assert!(!is_active.has(Flag::DuplicateOrCovered));
}

#[tokio::test]
async fn test_functional_indexes_keep_their_own_group() {
    let db = TestDb::new().await.expect("Failed to create test database");

    fixtures::create_small_dataset(&db.pool)
        .await
        .expect("Failed to create fixture");

    let snapshot = fetch_index_stats(&db.pool, "shop_")
        .await
        .expect("Failed to fetch index stats");
    let report = annotate(snapshot);

    // The plain email index collides with the UNIQUE constraint's index,
    // but lower(email) is a different key entirely
    assert!(find(&report, "idx_customer_email_plain").has(Flag::DuplicateOrCovered));
    assert!(!find(&report, "idx_customer_email_lower").has(Flag::DuplicateOrCovered));
}

#[tokio::test]
async fn test_annotate_scopes_groups_per_table() {
    let db = TestDb::new().await.expect("Failed to create test database");

    fixtures::create_small_dataset(&db.pool)
        .await
        .expect("Failed to create fixture");

    let snapshot = fetch_index_stats(&db.pool, "shop_")
        .await
        .expect("Failed to fetch index stats");
    let report = annotate(snapshot);

    // order_id leads two item indexes; the column-swapped one stands alone
    assert!(find(&report, "idx_orderitem_order_product").has(Flag::DuplicateOrCovered));
    assert!(find(&report, "idx_orderitem_order_only").has(Flag::DuplicateOrCovered));
    assert!(!find(&report, "idx_oi_prod_order_bad").has(Flag::DuplicateOrCovered));
}

#[tokio::test]
async fn test_leading_key_against_server_rendered_definitions() {
    let db = TestDb::new().await.expect("Failed to create test database");

    fixtures::ensure_schema(&db.pool)
        .await
        .expect("Failed to create schema");

    let snapshot = fetch_index_stats(&db.pool, "shop_")
        .await
        .expect("Failed to fetch index stats");

    // pg_get_indexdef rewrites the DDL, so check the extraction against the
    // server's own rendering rather than the strings we fed in
    let definition_of = |name: &str| {
        snapshot
            .iter()
            .find(|d| d.index == name)
            .unwrap_or_else(|| panic!("Index {name} missing from snapshot"))
            .definition
            .clone()
    };

    assert_eq!(
        leading_key(&definition_of("idx_order_customer_created_at")),
        "customer_id"
    );
    assert_eq!(
        leading_key(&definition_of("idx_order_cust_inc_created")),
        "customer_id"
    );
    assert_eq!(
        leading_key(&definition_of("idx_product_name_lower")),
        "lower(name"
    );
    assert_eq!(
        leading_key(&definition_of("idx_order_cancelled_partial")),
        "cancelled_at"
    );
}

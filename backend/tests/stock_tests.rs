//! Stock ledger calculator tests
//!
//! Covers:
//! - The net-stock identity: initial + produced - ordered, in both units
//! - Snapshot idempotence and insertion-order independence
//! - The tolerant read path for malformed conversion factors

use pasta_stock_backend::db;
use pasta_stock_backend::error::AppError;
use pasta_stock_backend::services::client::{ClientService, CreateClientInput};
use pasta_stock_backend::services::order::{CreateOrderInput, OrderService};
use pasta_stock_backend::services::product::{CreateProductInput, ProductService};
use pasta_stock_backend::services::production::{ProductionService, RecordProductionInput};
use pasta_stock_backend::services::stock::StockService;
use shared::validation::RawOrderLine;
use sqlx::SqlitePool;

async fn setup() -> SqlitePool {
    db::connect_in_memory().await.expect("in-memory database")
}

async fn seed_client(pool: &SqlitePool, name: &str) -> i64 {
    ClientService::new(pool.clone())
        .create_client(CreateClientInput {
            code: None,
            name: name.to_string(),
        })
        .await
        .unwrap()
        .id
}

async fn seed_product(pool: &SqlitePool, name: &str, kg_per_tray: f64, initial: f64) -> i64 {
    ProductService::new(pool.clone())
        .create_product(CreateProductInput {
            code: None,
            name: name.to_string(),
            kg_per_tray,
            initial_stock_trays: Some(initial),
        })
        .await
        .unwrap()
        .id
}

async fn record(pool: &SqlitePool, product_id: i64, trays: f64) {
    ProductionService::new(pool.clone())
        .record_production(RecordProductionInput {
            product_id,
            entry_date: None,
            trays_produced: trays,
        })
        .await
        .unwrap();
}

async fn order(pool: &SqlitePool, client_id: i64, lines: Vec<(i64, &str, &str)>) {
    let lines = lines
        .into_iter()
        .map(|(product_id, quantity, unit)| RawOrderLine {
            product_id: Some(product_id),
            quantity: Some(quantity.to_string()),
            unit: Some(unit.to_string()),
        })
        .collect();

    OrderService::new(pool.clone())
        .create_order(CreateOrderInput {
            client_id,
            order_date: None,
            lines,
        })
        .await
        .unwrap();
}

// ============================================================================
// Net-Stock Identity
// ============================================================================

/// Worked example: factor 2.5, initial 10, production 20, order lines of
/// 5 trays and 25 kg (10 trays) leave 15 trays / 37.5 kg on hand.
#[tokio::test]
async fn test_worked_example() {
    let pool = setup().await;
    let client_id = seed_client(&pool, "Bar Rossi").await;
    let product_id = seed_product(&pool, "Tagliatelle", 2.5, 10.0).await;

    record(&pool, product_id, 12.0).await;
    record(&pool, product_id, 8.0).await;
    order(
        &pool,
        client_id,
        vec![(product_id, "5", "unit"), (product_id, "25", "kg")],
    )
    .await;

    let snapshot = StockService::new(pool).get_snapshot(product_id).await.unwrap();
    assert_eq!(snapshot.initial_trays, 10.0);
    assert_eq!(snapshot.produced_trays, 20.0);
    assert_eq!(snapshot.ordered_trays, 15.0);
    assert_eq!(snapshot.net_trays, 15.0);
    assert_eq!(snapshot.net_kilograms, 37.5);
}

#[tokio::test]
async fn test_product_with_no_activity_keeps_initial_stock() {
    let pool = setup().await;
    let product_id = seed_product(&pool, "Gnocchi", 0.5, 4.0).await;

    let snapshot = StockService::new(pool).get_snapshot(product_id).await.unwrap();
    assert_eq!(snapshot.produced_trays, 0.0);
    assert_eq!(snapshot.ordered_trays, 0.0);
    assert_eq!(snapshot.net_trays, 4.0);
    assert_eq!(snapshot.net_kilograms, 2.0);
}

#[tokio::test]
async fn test_net_stock_can_go_negative() {
    let pool = setup().await;
    let client_id = seed_client(&pool, "Bar Rossi").await;
    let product_id = seed_product(&pool, "Gnocchi", 0.5, 0.0).await;

    order(&pool, client_id, vec![(product_id, "3", "unit")]).await;

    let snapshot = StockService::new(pool).get_snapshot(product_id).await.unwrap();
    assert_eq!(snapshot.net_trays, -3.0);
    assert_eq!(snapshot.net_kilograms, -1.5);
}

#[tokio::test]
async fn test_list_snapshots_sorted_by_name_and_consistent_with_get() {
    let pool = setup().await;
    let client_id = seed_client(&pool, "Bar Rossi").await;
    let tagliatelle = seed_product(&pool, "Tagliatelle", 2.5, 10.0).await;
    let gnocchi = seed_product(&pool, "Gnocchi", 0.5, 0.0).await;

    record(&pool, tagliatelle, 20.0).await;
    record(&pool, gnocchi, 6.0).await;
    order(
        &pool,
        client_id,
        vec![(tagliatelle, "25", "kg"), (gnocchi, "2", "unit")],
    )
    .await;

    let stock = StockService::new(pool);
    let all = stock.list_snapshots().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].product_name, "Gnocchi");
    assert_eq!(all[1].product_name, "Tagliatelle");

    for snapshot in &all {
        let single = stock.get_snapshot(snapshot.product_id).await.unwrap();
        assert_eq!(&single, snapshot);
    }
}

// ============================================================================
// Idempotence and Order Independence
// ============================================================================

#[tokio::test]
async fn test_snapshot_read_is_idempotent() {
    let pool = setup().await;
    let client_id = seed_client(&pool, "Bar Rossi").await;
    let product_id = seed_product(&pool, "Tagliatelle", 2.5, 10.0).await;

    record(&pool, product_id, 20.0).await;
    order(&pool, client_id, vec![(product_id, "25", "kg")]).await;

    let stock = StockService::new(pool);
    let first = stock.list_snapshots().await.unwrap();
    let second = stock.list_snapshots().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_snapshot_independent_of_insertion_order() {
    // Same events, applied in a different order, in two separate stores
    let pool_a = setup().await;
    let client_a = seed_client(&pool_a, "Bar Rossi").await;
    let product_a = seed_product(&pool_a, "Tagliatelle", 2.5, 10.0).await;
    record(&pool_a, product_a, 12.0).await;
    record(&pool_a, product_a, 8.0).await;
    order(&pool_a, client_a, vec![(product_a, "5", "unit")]).await;
    order(&pool_a, client_a, vec![(product_a, "25", "kg")]).await;

    let pool_b = setup().await;
    let client_b = seed_client(&pool_b, "Bar Rossi").await;
    let product_b = seed_product(&pool_b, "Tagliatelle", 2.5, 10.0).await;
    order(&pool_b, client_b, vec![(product_b, "25", "kg")]).await;
    record(&pool_b, product_b, 8.0).await;
    order(&pool_b, client_b, vec![(product_b, "5", "unit")]).await;
    record(&pool_b, product_b, 12.0).await;

    let a = StockService::new(pool_a).get_snapshot(product_a).await.unwrap();
    let b = StockService::new(pool_b).get_snapshot(product_b).await.unwrap();
    assert_eq!(a.net_trays, b.net_trays);
    assert_eq!(a.net_kilograms, b.net_kilograms);
}

// ============================================================================
// Malformed Conversion Factors
// ============================================================================

/// The catalog refuses non-positive factors, but legacy rows can carry
/// them. The read path must not abort: kilogram lines against such a
/// product normalize to 0 trays.
#[tokio::test]
async fn test_malformed_factor_zeroes_kg_lines_without_aborting() {
    let pool = setup().await;
    let client_id = seed_client(&pool, "Bar Rossi").await;

    // Slipped past a legacy importer; the service layer would refuse it
    sqlx::query(
        "INSERT INTO products (code, name, kg_per_tray, initial_stock_trays) \
         VALUES (NULL, 'Legacy', 0.0, 2.0)",
    )
    .execute(&pool)
    .await
    .unwrap();
    let product_id = sqlx::query_scalar::<_, i64>("SELECT id FROM products WHERE name = 'Legacy'")
        .fetch_one(&pool)
        .await
        .unwrap();

    record(&pool, product_id, 3.0).await;
    order(
        &pool,
        client_id,
        vec![(product_id, "25", "kg"), (product_id, "1", "unit")],
    )
    .await;

    let stock = StockService::new(pool);
    let snapshot = stock.get_snapshot(product_id).await.unwrap();

    // The kg line contributed nothing; only the tray line counts
    assert_eq!(snapshot.ordered_trays, 1.0);
    assert_eq!(snapshot.net_trays, 4.0);
    assert_eq!(snapshot.net_kilograms, 0.0);

    // The whole-warehouse read carries the product instead of failing
    let all = stock.list_snapshots().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], snapshot);
}

#[tokio::test]
async fn test_get_snapshot_unknown_product_not_found() {
    let pool = setup().await;
    let err = StockService::new(pool).get_snapshot(999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use proptest::prelude::*;
    use shared::models::{Product, StockSnapshot};
    use shared::units::{normalize, to_kilograms, to_trays, UnitType};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    fn factor_strategy() -> impl Strategy<Value = f64> {
        0.001f64..1000.0
    }

    fn quantity_strategy() -> impl Strategy<Value = f64> {
        0.01f64..10_000.0
    }

    fn unit_strategy() -> impl Strategy<Value = UnitType> {
        prop_oneof![Just(UnitType::Kg), Just(UnitType::Unit)]
    }

    fn product(kg_per_tray: f64, initial: f64) -> Product {
        Product {
            id: 1,
            code: None,
            name: "Tagliatelle".to_string(),
            kg_per_tray,
            initial_stock_trays: initial,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Round-trip: kilograms -> trays -> kilograms is the identity for
        /// every positive factor, within floating tolerance.
        #[test]
        fn prop_kg_round_trip(q in quantity_strategy(), f in factor_strategy()) {
            let trays = to_trays(q, UnitType::Kg, f);
            prop_assert!(close(to_kilograms(trays, f), q));
        }

        /// Net stock equals initial + produced - ordered for any ledger.
        #[test]
        fn prop_net_stock_identity(
            initial in -100.0f64..100.0,
            f in factor_strategy(),
            produced in prop::collection::vec(quantity_strategy(), 0..10),
            lines in prop::collection::vec((quantity_strategy(), unit_strategy()), 0..10)
        ) {
            let produced_sum: f64 = produced.iter().sum();
            let ordered_sum: f64 = lines
                .iter()
                .map(|(q, unit)| to_trays(*q, *unit, f))
                .sum();

            let p = product(f, initial);
            let snapshot = StockSnapshot::compute(&p, produced_sum, ordered_sum);

            prop_assert!(close(snapshot.net_trays, initial + produced_sum - ordered_sum));
            prop_assert!(close(snapshot.net_kilograms, snapshot.net_trays * f));
        }

        /// Accumulation is insertion-order independent within tolerance.
        #[test]
        fn prop_ordered_sum_independent_of_order(
            f in factor_strategy(),
            lines in prop::collection::vec((quantity_strategy(), unit_strategy()), 0..12)
        ) {
            let forward: f64 = lines.iter().map(|(q, u)| to_trays(*q, *u, f)).sum();
            let backward: f64 = lines.iter().rev().map(|(q, u)| to_trays(*q, *u, f)).sum();
            prop_assert!(close(forward, backward));
        }

        /// The normalized pair keeps the entered side verbatim.
        #[test]
        fn prop_normalize_keeps_entered_side(
            q in quantity_strategy(),
            unit in unit_strategy(),
            f in factor_strategy()
        ) {
            let (kilograms, trays) = normalize(q, unit, f);
            match unit {
                UnitType::Kg => prop_assert_eq!(kilograms, q),
                UnitType::Unit => prop_assert_eq!(trays, q),
            }
        }

        /// A malformed factor never panics and zeroes only the derived side.
        #[test]
        fn prop_malformed_factor_degrades_to_zero(
            q in quantity_strategy(),
            f in -1000.0f64..=0.0
        ) {
            prop_assert_eq!(to_trays(q, UnitType::Kg, f), 0.0);
            prop_assert_eq!(to_trays(q, UnitType::Unit, f), q);
        }
    }
}

//! Recap service integration tests against the in-memory store

mod common;

use common::{seeded_store, service_with};
use works_recap_rust::models::{ApplyTo, TaxEntry, UnitInputs};
use works_recap_rust::RecapError;

#[tokio::test]
async fn test_load_session_computes_end_to_end_totals() {
    let service = service_with(seeded_store());
    let calc = service.load_session(1).await.unwrap();

    assert_eq!(calc.part_a.subtotal, 2000.0);
    assert_eq!(calc.part_b.subtotal, 500.0);
    assert_eq!(calc.part_b.taxes[&1], 90.0);
    assert_eq!(calc.part_b.total, 590.0);
    assert_eq!(calc.part_c.subtotal, 0.0);
    assert_eq!(calc.part_ab_combined.subtotal, 2590.0);
    assert_eq!(calc.additional_charges.dpr_charges, 100.0);
    assert_eq!(calc.grand_total, 2690.0);
}

#[tokio::test]
async fn test_zero_category_totals_override_item_amounts() {
    let service = service_with(seeded_store());
    let calc = service.load_session(2).await.unwrap();

    // 22 无分类行, 加载后为全零汇总, A/B 不回退明细; C 仍取明细
    assert_eq!(calc.part_a.subtotal, 40_000.0);
    assert_eq!(calc.part_b.subtotal, 1_500.0);
    assert_eq!(calc.part_c.subtotal, 12_000.0);
    assert_eq!(calc.part_b.taxes[&1], 270.0);
    assert_eq!(calc.part_c.total, 12_000.0);
    assert_eq!(calc.additional_charges.dpr_charges, 2_000.0);
    assert_eq!(calc.grand_total, 55_770.0);
}

#[tokio::test]
async fn test_work_without_items_totals_zero() {
    let service = service_with(seeded_store());
    let calc = service.load_session(3).await.unwrap();

    assert_eq!(calc.part_a.subtotal, 0.0);
    assert_eq!(calc.part_b.subtotal, 0.0);
    assert_eq!(calc.part_c.subtotal, 0.0);
    assert_eq!(calc.additional_charges.dpr_charges, 0.0);
    assert_eq!(calc.grand_total, 0.0);
}

#[tokio::test]
async fn test_unknown_work_is_reported_and_not_registered() {
    let service = service_with(seeded_store());
    let err = service.load_session(404).await.unwrap_err();

    assert!(matches!(err, RecapError::WorkNotFound(404)));
    assert!(!service.has_session(404));
}

#[tokio::test]
async fn test_store_failure_during_load_leaves_no_session() {
    let store = seeded_store();
    let service = service_with(store.clone());
    store.set_unavailable(true);

    let err = service.load_session(1).await.unwrap_err();
    assert!(matches!(err, RecapError::StoreUnavailable(_)));
    assert!(!service.has_session(1));
}

#[tokio::test]
async fn test_edits_recompute_without_touching_storage() {
    let store = seeded_store();
    let service = service_with(store.clone());
    service.load_session(1).await.unwrap();

    let calc = service.set_unit_input(1, 11, 3.0).unwrap();
    assert_eq!(calc.part_a.subtotal, 3000.0);

    let calc = service
        .add_tax(1, TaxEntry::fixed(2, "Insurance", 500.0, ApplyTo::PartABCombined))
        .unwrap();
    assert_eq!(calc.part_ab_combined.taxes[&2], 500.0);
    assert_eq!(calc.part_ab_combined.total, calc.part_ab_combined.subtotal + 500.0);

    let calc = service.remove_tax(1, 1).unwrap();
    assert!(calc.part_b.taxes.is_empty());

    assert!(store.saved_snapshot(1).is_none());
    assert!(matches!(
        service.remove_tax(1, 1),
        Err(RecapError::TaxNotFound(1))
    ));
    assert!(matches!(
        service.set_unit_input(9, 11, 1.0),
        Err(RecapError::SessionNotFound(9))
    ));
}

#[tokio::test]
async fn test_save_writes_document_and_estimated_cost() {
    let store = seeded_store();
    let service = service_with(store.clone());
    service.load_session(1).await.unwrap();
    service.set_unit_input(1, 11, 4.0).unwrap();

    let outcome = service.save(1).await.unwrap();
    // 4000 + 1000 + 0
    assert_eq!(outcome.total_estimated_cost, 5000.0);
    assert_eq!(store.estimated_cost(1), Some(5000.0));

    let snapshot = store.saved_snapshot(1).unwrap();
    assert_eq!(snapshot["workId"], 1);
    assert_eq!(snapshot["type"], "recap_sheet");
    assert_eq!(snapshot["work_name"], "CC road at Kothur");
    assert_eq!(snapshot["unitInputs"]["11"], 4.0);
    assert_eq!(snapshot["calculations"]["partA"]["subtotal"], 4000.0);
    assert!(snapshot["subworkItems"]["11"].is_array());
}

#[tokio::test]
async fn test_reload_restores_taxes_and_units_from_snapshot() {
    let store = seeded_store();
    let service = service_with(store.clone());
    service.load_session(1).await.unwrap();
    service.set_unit_input(1, 11, 5.0).unwrap();
    service
        .replace_taxes(1, vec![TaxEntry::percentage(8, "Cess", 1.0, ApplyTo::Both)])
        .unwrap();
    service.save(1).await.unwrap();

    let fresh = service_with(store);
    let calc = fresh.load_session(1).await.unwrap();
    assert_eq!(calc.part_a.subtotal, 5000.0);
    assert_eq!(calc.part_a.taxes[&8], 50.0);
    assert!(calc.part_b.taxes.get(&1).is_none());
}

#[tokio::test]
async fn test_failed_save_keeps_session_intact() {
    let store = seeded_store();
    let service = service_with(store.clone());
    service.load_session(1).await.unwrap();
    service.set_unit_input(1, 11, 3.0).unwrap();
    let before = service.calculations(1).unwrap();

    store.set_unavailable(true);
    assert!(service.save(1).await.is_err());
    assert_eq!(service.calculations(1).unwrap(), before);

    store.set_unavailable(false);
    assert!(service.save(1).await.is_ok());
}

#[tokio::test]
async fn test_embedded_view_uses_caller_units_without_mutating() {
    let service = service_with(seeded_store());
    service.load_session(1).await.unwrap();

    let mut units = UnitInputs::new();
    units.insert(11, 10.0);
    let embedded = service.embedded(1, &units).unwrap();
    assert_eq!(embedded.part_a.subtotal, 10_000.0);
    assert_eq!(service.calculations(1).unwrap().part_a.subtotal, 2000.0);
}

#[tokio::test]
async fn test_batch_summary_skips_missing_works() {
    let service = service_with(seeded_store());
    let summaries = service.batch_summary(&[1, 404, 3]).await.unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].work_id, 1);
    assert_eq!(summaries[0].grand_total, 2690.0);
    assert_eq!(summaries[1].work_id, 3);
    assert_eq!(summaries[1].grand_total, 0.0);
    assert!(!service.has_session(1));
}

#[tokio::test]
async fn test_sessions_for_different_works_are_independent() {
    let service = service_with(seeded_store());
    service.load_session(1).await.unwrap();
    service.load_session(2).await.unwrap();

    service.remove_tax(1, 1).unwrap();
    assert!(service.calculations(1).unwrap().part_b.taxes.is_empty());
    assert_eq!(service.calculations(2).unwrap().part_b.taxes[&1], 270.0);
}

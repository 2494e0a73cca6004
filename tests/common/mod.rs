//! Shared fixtures: an in-memory store seeded with realistic works

#![allow(dead_code)]

use std::sync::Arc;
use works_recap_rust::models::{CategoryTotals, ItemCategory, Subwork, SubworkItem, Work};
use works_recap_rust::{MemoryRecapStore, RecapService};

pub fn work(id: i64, name: &str) -> Work {
    Work {
        id,
        name: name.to_string(),
        village: Some("Kothur".to_string()),
        fund_head: Some("5054 - Roads".to_string()),
        recap_json: None,
    }
}

pub fn subwork(id: i64, work_id: i64, sequence: i64, name: &str, unit: &str) -> Subwork {
    Subwork {
        id,
        work_id,
        sequence,
        name: name.to_string(),
        unit: Some(unit.to_string()),
    }
}

pub fn item(subwork_id: i64, sequence: i64, tag: Option<&str>, amount: f64) -> SubworkItem {
    SubworkItem {
        subwork_id,
        sequence,
        category: ItemCategory::parse(tag),
        total_item_amount: Some(amount),
    }
}

/// Work 1: one subwork, unit 2, regular 1000 / royalty 200 / testing 50.
/// Work 2: two subworks; the second has no category detail rows, so it loads with zero
/// category totals (Part A/B contribute 0) while its GST material item still feeds Part C.
/// Work 3: subworks without any items.
pub fn seeded_store() -> Arc<MemoryRecapStore> {
    let store = Arc::new(MemoryRecapStore::new());

    store.insert_work(work(1, "CC road at Kothur"));
    store.insert_subwork(subwork(11, 1, 1, "CC road", "2"));
    store.insert_items(
        11,
        vec![
            item(11, 1, None, 1000.0),
            item(11, 2, Some("royalty"), 200.0),
            item(11, 3, Some("testing"), 50.0),
        ],
    );
    store.insert_category_totals(
        11,
        CategoryTotals {
            regular: 1000.0,
            royalty: 200.0,
            testing: 50.0,
        },
    );

    store.insert_work(work(2, "Anganwadi building"));
    store.insert_subwork(subwork(21, 2, 1, "Foundation", "1"));
    store.insert_subwork(subwork(22, 2, 2, "Electrification", "Nos"));
    store.insert_items(
        21,
        vec![item(21, 1, None, 40_000.0), item(21, 2, Some("royalty"), 1_500.0)],
    );
    store.insert_category_totals(
        21,
        CategoryTotals {
            regular: 40_000.0,
            royalty: 1_500.0,
            testing: 0.0,
        },
    );
    store.insert_items(
        22,
        vec![
            item(22, 1, None, 8_000.0),
            item(22, 2, Some("With GST"), 12_000.0),
        ],
    );

    store.insert_work(work(3, "Compound wall"));
    store.insert_subwork(subwork(31, 3, 1, "Wall", "3"));

    store
}

pub fn service_with(store: Arc<MemoryRecapStore>) -> RecapService {
    RecapService::new(store)
}

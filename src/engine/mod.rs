//! 汇总表计算引擎
//!
//! 分类 -> 聚合 -> 计税 -> 组合, 全部为纯函数。调用方在任何输入变化后
//! 自行调用 [`calculate_recap`] 整体重算, 不做增量更新。

pub mod aggregator;
pub mod classifier;
pub mod coerce;
pub mod combiner;
pub mod tax_engine;

pub use aggregator::{aggregate, subwork_contribution, Subtotals, SubworkContribution};
pub use classifier::{classify, PartGroups};
pub use combiner::combine;

use crate::models::{
    CategoryTotalsBySubwork, ItemsBySubwork, RecapCalculations, Subwork, TaxEntry, UnitInputs,
};

/// 一次计算所需的全部输入
#[derive(Debug, Clone, Copy)]
pub struct RecapInput<'a> {
    pub subworks: &'a [Subwork],
    pub items: &'a ItemsBySubwork,
    pub category_totals: &'a CategoryTotalsBySubwork,
    pub taxes: &'a [TaxEntry],
    pub unit_inputs: &'a UnitInputs,
}

pub fn calculate_recap(input: &RecapInput<'_>) -> RecapCalculations {
    let subtotals = aggregate(input);
    combine(subtotals, input.taxes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApplyTo, CategoryTotals, ItemCategory, SubworkItem};

    struct Fixture {
        subworks: Vec<Subwork>,
        items: ItemsBySubwork,
        totals: CategoryTotalsBySubwork,
        taxes: Vec<TaxEntry>,
        unit_inputs: UnitInputs,
    }

    impl Fixture {
        fn input(&self) -> RecapInput<'_> {
            RecapInput {
                subworks: &self.subworks,
                items: &self.items,
                category_totals: &self.totals,
                taxes: &self.taxes,
                unit_inputs: &self.unit_inputs,
            }
        }
    }

    fn single_subwork_fixture() -> Fixture {
        let subworks = vec![Subwork {
            id: 11,
            work_id: 1,
            sequence: 1,
            name: "CC road".to_string(),
            unit: Some("2".to_string()),
        }];
        let mut items = ItemsBySubwork::new();
        items.insert(
            11,
            vec![
                SubworkItem {
                    subwork_id: 11,
                    sequence: 1,
                    category: ItemCategory::Regular,
                    total_item_amount: Some(1000.0),
                },
                SubworkItem {
                    subwork_id: 11,
                    sequence: 2,
                    category: ItemCategory::Royalty,
                    total_item_amount: Some(200.0),
                },
                SubworkItem {
                    subwork_id: 11,
                    sequence: 3,
                    category: ItemCategory::Testing,
                    total_item_amount: Some(50.0),
                },
            ],
        );
        let mut totals = CategoryTotalsBySubwork::new();
        totals.insert(11, CategoryTotals { regular: 1000.0, royalty: 200.0, testing: 50.0 });

        Fixture {
            subworks,
            items,
            totals,
            taxes: vec![TaxEntry::percentage(1, "GST", 18.0, ApplyTo::PartB)],
            unit_inputs: UnitInputs::new(),
        }
    }

    #[test]
    fn end_to_end_single_subwork() {
        let fixture = single_subwork_fixture();
        let calc = calculate_recap(&fixture.input());

        assert_eq!(calc.part_a.subtotal, 2000.0);
        assert_eq!(calc.part_b.subtotal, 500.0);
        assert_eq!(calc.part_b.taxes[&1], 90.0);
        assert_eq!(calc.part_b.total, 590.0);
        assert_eq!(calc.part_c.subtotal, 0.0);
        assert_eq!(calc.part_ab_combined.subtotal, 2590.0);
        assert_eq!(calc.additional_charges.dpr_charges, 100.0);
        assert_eq!(calc.grand_total, 2690.0);
    }

    #[test]
    fn recompute_is_idempotent() {
        let fixture = single_subwork_fixture();
        let first = calculate_recap(&fixture.input());
        let second = calculate_recap(&fixture.input());
        assert_eq!(first, second);
    }

    #[test]
    fn subworks_without_items_yield_zero_totals() {
        let mut fixture = single_subwork_fixture();
        fixture.items.clear();
        fixture.totals.insert(11, CategoryTotals::default());

        let calc = calculate_recap(&fixture.input());
        assert_eq!(calc.part_a.subtotal, 0.0);
        assert_eq!(calc.part_b.subtotal, 0.0);
        assert_eq!(calc.part_c.subtotal, 0.0);
        assert_eq!(calc.additional_charges.dpr_charges, 0.0);
        assert_eq!(calc.grand_total, 0.0);
    }

    #[test]
    fn both_tax_uses_each_parts_own_subtotal() {
        let mut fixture = single_subwork_fixture();
        fixture.items[0].push(SubworkItem {
            subwork_id: 11,
            sequence: 4,
            category: ItemCategory::Materials,
            total_item_amount: Some(150.0),
        });
        fixture.taxes = vec![TaxEntry::percentage(7, "Cess", 10.0, ApplyTo::Both)];

        let calc = calculate_recap(&fixture.input());
        assert_eq!(calc.part_a.taxes[&7], 200.0);
        assert_eq!(calc.part_b.taxes[&7], 50.0);
        assert_eq!(calc.part_c.taxes[&7], 30.0);
        assert!(calc.part_ab_combined.taxes.is_empty());
    }
}

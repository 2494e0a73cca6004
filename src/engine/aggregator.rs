use serde::Serialize;

use super::coerce::{number_or_zero, resolve_unit};
use super::RecapInput;
use crate::models::{CategoryTotals, ItemCategory, Part, Subwork, SubworkItem, UnitInputs};

/// 三部分税前小计
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Subtotals {
    pub part_a: f64,
    pub part_b: f64,
    pub part_c: f64,
}

impl Subtotals {
    pub fn get(&self, part: Part) -> f64 {
        match part {
            Part::A => self.part_a,
            Part::B => self.part_b,
            Part::C => self.part_c,
        }
    }

    fn add(&mut self, other: Subtotals) {
        self.part_a += other.part_a;
        self.part_b += other.part_b;
        self.part_c += other.part_c;
    }
}

/// 单个子工程对各部分的贡献 (已乘单位倍数)
///
/// A/B: 有分类汇总时取 regular 与 royalty + testing, 否则按明细金额求和。
/// C 部分没有对应的分类汇总, 始终按明细金额求和。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SubworkContribution {
    pub unit: f64,
    pub part_a: f64,
    pub royalty: f64,
    pub testing: f64,
    pub part_b: f64,
    pub part_c: f64,
}

pub fn subwork_contribution(
    subwork: &Subwork,
    items: &[SubworkItem],
    totals: Option<&CategoryTotals>,
    unit_inputs: &UnitInputs,
) -> SubworkContribution {
    let unit = resolve_unit(subwork, unit_inputs);
    if items.is_empty() {
        return SubworkContribution {
            unit,
            ..Default::default()
        };
    }

    let part_c = sum_items(items, Part::C) * unit;

    match totals {
        Some(totals) => {
            let royalty = number_or_zero(Some(totals.royalty));
            let testing = number_or_zero(Some(totals.testing));
            SubworkContribution {
                unit,
                part_a: number_or_zero(Some(totals.regular)) * unit,
                royalty: royalty * unit,
                testing: testing * unit,
                part_b: (royalty + testing) * unit,
                part_c,
            }
        }
        None => {
            let royalty = sum_where(items, |item| item.category == ItemCategory::Royalty);
            let testing = sum_where(items, |item| item.category == ItemCategory::Testing);
            SubworkContribution {
                unit,
                part_a: sum_items(items, Part::A) * unit,
                royalty: royalty * unit,
                testing: testing * unit,
                part_b: sum_items(items, Part::B) * unit,
                part_c,
            }
        }
    }
}

/// 汇总所有子工程, 得到三部分小计
pub fn aggregate(input: &RecapInput<'_>) -> Subtotals {
    let mut subtotals = Subtotals::default();

    for subwork in input.subworks {
        let items = input
            .items
            .get(&subwork.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let contribution = subwork_contribution(
            subwork,
            items,
            input.category_totals.get(&subwork.id),
            input.unit_inputs,
        );
        subtotals.add(Subtotals {
            part_a: contribution.part_a,
            part_b: contribution.part_b,
            part_c: contribution.part_c,
        });
    }

    subtotals
}

fn sum_items(items: &[SubworkItem], part: Part) -> f64 {
    sum_where(items, |item| item.category.part() == Some(part))
}

fn sum_where<F>(items: &[SubworkItem], predicate: F) -> f64
where
    F: Fn(&SubworkItem) -> bool,
{
    items
        .iter()
        .filter(|item| predicate(item))
        .map(|item| number_or_zero(item.total_item_amount))
        .sum()
}

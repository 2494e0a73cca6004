use serde::Serialize;

use crate::models::{CategoryTotalsBySubwork, ItemsBySubwork, Part, Subwork, SubworkItem};

/// 汇总表展示分组, 值为子工程 ID (按子工程顺序)
///
/// 只决定展示归属, 金额来自聚合器。同一子工程可出现在多个分组。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartGroups {
    pub part_a: Vec<i64>,
    pub part_b: Vec<i64>,
    pub royalty: Vec<i64>,
    pub testing: Vec<i64>,
    pub part_c: Vec<i64>,
}

/// 子工程是否有任一明细归属于该部分
pub fn has_items_in(items: &[SubworkItem], part: Part) -> bool {
    items.iter().any(|item| item.category.part() == Some(part))
}

pub fn classify(
    subworks: &[Subwork],
    items: &ItemsBySubwork,
    category_totals: &CategoryTotalsBySubwork,
) -> PartGroups {
    let mut groups = PartGroups::default();

    for subwork in subworks {
        let Some(subwork_items) = items.get(&subwork.id).filter(|list| !list.is_empty()) else {
            continue;
        };

        if has_items_in(subwork_items, Part::A) {
            groups.part_a.push(subwork.id);
        }

        if has_items_in(subwork_items, Part::B) {
            groups.part_b.push(subwork.id);
            let totals = category_totals.get(&subwork.id).copied().unwrap_or_default();
            if totals.royalty > 0.0 {
                groups.royalty.push(subwork.id);
            }
            if totals.testing > 0.0 {
                groups.testing.push(subwork.id);
            }
        }

        if has_items_in(subwork_items, Part::C) {
            groups.part_c.push(subwork.id);
        }
    }

    groups
}

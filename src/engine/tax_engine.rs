use super::coerce::number_or_zero;
use crate::models::{Part, TaxAmounts, TaxEntry, TaxType};

/// 单个税项对给定小计的税额
pub fn tax_amount(tax: &TaxEntry, subtotal: f64) -> f64 {
    match tax.tax_type {
        TaxType::Fixed => number_or_zero(tax.fixed_amount),
        TaxType::Percentage => subtotal * number_or_zero(tax.percentage) / 100.0,
    }
}

/// A/B/C 部分的税额: applyTo 为该部分或 both 的税项
pub fn part_taxes(subtotal: f64, part: Part, taxes: &[TaxEntry]) -> TaxAmounts {
    collect_taxes(subtotal, taxes, |tax| tax.applies_to_part(part))
}

/// A+B 合计阶段的税额: 只有 part_a_b_combined, both 不参与
pub fn combined_taxes(subtotal: f64, taxes: &[TaxEntry]) -> TaxAmounts {
    collect_taxes(subtotal, taxes, TaxEntry::applies_to_combined)
}

fn collect_taxes<F>(subtotal: f64, taxes: &[TaxEntry], selected: F) -> TaxAmounts
where
    F: Fn(&TaxEntry) -> bool,
{
    taxes
        .iter()
        .filter(|tax| selected(tax))
        .map(|tax| (tax.id, tax_amount(tax, subtotal)))
        .collect()
}

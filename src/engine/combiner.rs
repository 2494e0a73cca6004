use super::aggregator::Subtotals;
use super::tax_engine::{combined_taxes, part_taxes};
use crate::models::{AdditionalCharges, Part, PartCalculation, RecapCalculations, TaxEntry};

pub const CONTINGENCY_RATE: f64 = 0.005;
pub const INSPECTION_RATE: f64 = 0.005;
pub const DPR_RATE: f64 = 0.05;
/// DPR 费用上限, 与币种无关
pub const DPR_CAP: f64 = 100_000.0;

fn finalize_part(subtotal: f64, part: Part, taxes: &[TaxEntry]) -> PartCalculation {
    let taxes = part_taxes(subtotal, part, taxes);
    let tax_total: f64 = taxes.values().sum();
    PartCalculation {
        subtotal,
        taxes,
        total: subtotal + tax_total,
    }
}

pub fn additional_charges(part_a_total: f64) -> AdditionalCharges {
    AdditionalCharges {
        contingencies: part_a_total * CONTINGENCY_RATE,
        inspection_charges: part_a_total * INSPECTION_RATE,
        dpr_charges: (part_a_total * DPR_RATE).min(DPR_CAP),
    }
}

/// 组合各部分得到最终结果
///
/// A、B 先各自加税得到合计, 再以两者之和作为合计阶段的小计。
/// C 独立计税, 不进入合计阶段。不可预见费与检验费单独列示, 不计入总计。
pub fn combine(subtotals: Subtotals, taxes: &[TaxEntry]) -> RecapCalculations {
    let part_a = finalize_part(subtotals.part_a, Part::A, taxes);
    let part_b = finalize_part(subtotals.part_b, Part::B, taxes);
    let part_c = finalize_part(subtotals.part_c, Part::C, taxes);

    let combined_subtotal = part_a.total + part_b.total;
    let combined = combined_taxes(combined_subtotal, taxes);
    let combined_tax_total: f64 = combined.values().sum();
    let part_ab_combined = PartCalculation {
        subtotal: combined_subtotal,
        taxes: combined,
        total: combined_subtotal + combined_tax_total,
    };

    let additional_charges = additional_charges(part_a.total);
    let grand_total = part_ab_combined.subtotal
        + combined_tax_total
        + part_c.total
        + additional_charges.dpr_charges;

    RecapCalculations {
        part_a,
        part_b,
        part_c,
        part_ab_combined,
        additional_charges,
        grand_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApplyTo;

    #[test]
    fn dpr_charges_are_capped() {
        assert_eq!(additional_charges(3_000_000.0).dpr_charges, 100_000.0);
        assert_eq!(additional_charges(1_000_000.0).dpr_charges, 50_000.0);
    }

    #[test]
    fn contingencies_and_inspection_are_listed_but_not_totalled() {
        let subtotals = Subtotals {
            part_a: 200_000.0,
            part_b: 0.0,
            part_c: 0.0,
        };
        let calc = combine(subtotals, &[]);
        assert_eq!(calc.additional_charges.contingencies, 1_000.0);
        assert_eq!(calc.additional_charges.inspection_charges, 1_000.0);
        assert_eq!(calc.additional_charges.dpr_charges, 10_000.0);
        assert_eq!(calc.grand_total, 210_000.0);
    }

    #[test]
    fn combined_stage_taxes_post_tax_totals() {
        let subtotals = Subtotals {
            part_a: 1_000.0,
            part_b: 100.0,
            part_c: 0.0,
        };
        let taxes = vec![
            TaxEntry::percentage(1, "GST", 10.0, ApplyTo::PartA),
            TaxEntry::percentage(2, "Overhead", 10.0, ApplyTo::PartABCombined),
        ];
        let calc = combine(subtotals, &taxes);
        assert_eq!(calc.part_a.total, 1_100.0);
        assert_eq!(calc.part_ab_combined.subtotal, 1_200.0);
        assert_eq!(calc.part_ab_combined.taxes[&2], 120.0);
        assert_eq!(calc.part_ab_combined.total, 1_320.0);
        assert!(calc.part_a.taxes.get(&2).is_none());
    }

    #[test]
    fn part_c_is_taxed_independently_of_combined_stage() {
        let subtotals = Subtotals {
            part_a: 0.0,
            part_b: 0.0,
            part_c: 1_000.0,
        };
        let taxes = vec![
            TaxEntry::percentage(1, "GST", 18.0, ApplyTo::PartC),
            TaxEntry::percentage(2, "Overhead", 10.0, ApplyTo::PartABCombined),
        ];
        let calc = combine(subtotals, &taxes);
        assert_eq!(calc.part_c.total, 1_180.0);
        assert_eq!(calc.part_ab_combined.taxes[&2], 0.0);
        assert_eq!(calc.grand_total, 1_180.0);
    }
}

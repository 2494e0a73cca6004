use serde::Serialize;

use crate::engine::{subwork_contribution, SubworkContribution};
use crate::models::{AdditionalCharges, RecapCalculations, Subwork, TaxAmounts, TaxEntry};
use crate::service::RecapSession;

/// 显示取整 (0 位小数), 只用于展示, 不参与累加
pub fn round_display(value: f64) -> f64 {
    value.round()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetRow {
    pub subwork_id: i64,
    pub sequence: i64,
    pub name: String,
    pub unit: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxLine {
    pub tax_id: i64,
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartSection {
    pub rows: Vec<SheetRow>,
    pub subtotal: f64,
    pub taxes: Vec<TaxLine>,
    pub total: f64,
}

/// B 部分按 royalty / testing 分列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartBSection {
    pub royalty: Vec<SheetRow>,
    pub testing: Vec<SheetRow>,
    pub subtotal: f64,
    pub taxes: Vec<TaxLine>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedSection {
    pub subtotal: f64,
    pub taxes: Vec<TaxLine>,
    pub total: f64,
}

/// 汇总表展示视图
///
/// 金额均已取整; 原始精度的结果保留在 `calculations`。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecapSheet {
    pub work_id: i64,
    pub work_name: String,
    pub village: Option<String>,
    pub fund_head: Option<String>,
    pub part_a: PartSection,
    pub part_b: PartBSection,
    pub part_c: PartSection,
    pub part_ab_combined: CombinedSection,
    pub additional_charges: AdditionalCharges,
    pub grand_total: f64,
    pub calculations: RecapCalculations,
}

impl RecapSheet {
    pub fn build(session: &RecapSession, calculations: &RecapCalculations) -> Self {
        let loaded = session.loaded();
        let groups = session.groups();

        let taxes = session.taxes();
        let charges = calculations.additional_charges;

        Self {
            work_id: loaded.work.id,
            work_name: loaded.work.name.clone(),
            village: loaded.work.village.clone(),
            fund_head: loaded.work.fund_head.clone(),
            part_a: PartSection {
                rows: section_rows(session, &groups.part_a, |c| c.part_a),
                subtotal: round_display(calculations.part_a.subtotal),
                taxes: tax_lines(&calculations.part_a.taxes, taxes),
                total: round_display(calculations.part_a.total),
            },
            part_b: PartBSection {
                royalty: section_rows(session, &groups.royalty, |c| c.royalty),
                testing: section_rows(session, &groups.testing, |c| c.testing),
                subtotal: round_display(calculations.part_b.subtotal),
                taxes: tax_lines(&calculations.part_b.taxes, taxes),
                total: round_display(calculations.part_b.total),
            },
            part_c: PartSection {
                rows: section_rows(session, &groups.part_c, |c| c.part_c),
                subtotal: round_display(calculations.part_c.subtotal),
                taxes: tax_lines(&calculations.part_c.taxes, taxes),
                total: round_display(calculations.part_c.total),
            },
            part_ab_combined: CombinedSection {
                subtotal: round_display(calculations.part_ab_combined.subtotal),
                taxes: tax_lines(&calculations.part_ab_combined.taxes, taxes),
                total: round_display(calculations.part_ab_combined.total),
            },
            additional_charges: AdditionalCharges {
                contingencies: round_display(charges.contingencies),
                inspection_charges: round_display(charges.inspection_charges),
                dpr_charges: round_display(charges.dpr_charges),
            },
            grand_total: round_display(calculations.grand_total),
            calculations: calculations.clone(),
        }
    }
}

/// 分组内各子工程的行, 金额取自该子工程对本部分的贡献
fn section_rows(
    session: &RecapSession,
    subwork_ids: &[i64],
    pick: fn(&SubworkContribution) -> f64,
) -> Vec<SheetRow> {
    let loaded = session.loaded();
    subwork_ids
        .iter()
        .filter_map(|id| loaded.subworks.iter().find(|s| s.id == *id))
        .map(|subwork| {
            let items = loaded
                .items
                .get(&subwork.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let contribution = subwork_contribution(
                subwork,
                items,
                loaded.category_totals.get(&subwork.id),
                session.unit_inputs(),
            );
            sheet_row(subwork, contribution.unit, pick(&contribution))
        })
        .collect()
}

fn sheet_row(subwork: &Subwork, unit: f64, amount: f64) -> SheetRow {
    SheetRow {
        subwork_id: subwork.id,
        sequence: subwork.sequence,
        name: subwork.name.clone(),
        unit,
        amount: round_display(amount),
    }
}

fn tax_lines(amounts: &TaxAmounts, taxes: &[TaxEntry]) -> Vec<TaxLine> {
    amounts
        .iter()
        .map(|(tax_id, amount)| TaxLine {
            tax_id: *tax_id,
            label: taxes
                .iter()
                .find(|t| t.id == *tax_id)
                .map(TaxEntry::display_label)
                .unwrap_or_else(|| format!("Tax {}", tax_id)),
            amount: round_display(*amount),
        })
        .collect()
}

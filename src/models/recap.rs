use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::tax::TaxEntry;
use super::work::{Subwork, SubworkItem, Work};

/// 子工程 ID -> 单位倍数
pub type UnitInputs = IndexMap<i64, f64>;

/// 税项 ID -> 税额 (保持税项录入顺序)
pub type TaxAmounts = IndexMap<i64, f64>;

/// 子工程 ID -> 明细列表
pub type ItemsBySubwork = IndexMap<i64, Vec<SubworkItem>>;

/// 子工程分类汇总 (由明细与费率/计量表关联得出)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub regular: f64,
    pub royalty: f64,
    pub testing: f64,
}

/// 子工程 ID -> 分类汇总
pub type CategoryTotalsBySubwork = IndexMap<i64, CategoryTotals>;

/// 分类汇总查询结果行
#[derive(Debug, Clone, FromRow)]
pub struct SubworkCategoryTotals {
    pub subwork_id: i64,
    pub regular: Option<f64>,
    pub royalty: Option<f64>,
    pub testing: Option<f64>,
}

impl From<&SubworkCategoryTotals> for CategoryTotals {
    fn from(row: &SubworkCategoryTotals) -> Self {
        Self {
            regular: row.regular.unwrap_or(0.0),
            royalty: row.royalty.unwrap_or(0.0),
            testing: row.testing.unwrap_or(0.0),
        }
    }
}

/// 单个部分的计算结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartCalculation {
    pub subtotal: f64,
    pub taxes: TaxAmounts,
    pub total: f64,
}

impl PartCalculation {
    pub fn tax_total(&self) -> f64 {
        self.taxes.values().sum()
    }
}

/// 附加费用, 均由 A 部分合计得出
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalCharges {
    pub contingencies: f64,
    pub inspection_charges: f64,
    pub dpr_charges: f64,
}

/// 汇总表计算结果, 每次输入变化后整体重算
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapCalculations {
    pub part_a: PartCalculation,
    pub part_b: PartCalculation,
    pub part_c: PartCalculation,
    #[serde(rename = "partABCombined")]
    pub part_ab_combined: PartCalculation,
    pub additional_charges: AdditionalCharges,
    pub grand_total: f64,
}

impl RecapCalculations {
    /// 写回工程主表的估算总额 (三部分税前小计之和)
    pub fn total_estimated_cost(&self) -> f64 {
        self.part_a.subtotal + self.part_b.subtotal + self.part_c.subtotal
    }
}

/// works.recap_json 中可恢复的部分
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapSnapshot {
    #[serde(default)]
    pub work: Option<serde_json::Value>,
    #[serde(default)]
    pub taxes: Option<Vec<TaxEntry>>,
    #[serde(default)]
    pub unit_inputs: Option<UnitInputs>,
    #[serde(default)]
    pub calculations: Option<RecapCalculations>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

/// 保存时写入 works.recap_json 的完整文档
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecapDocument {
    #[serde(rename = "workId")]
    pub work_id: i64,
    pub work: Work,
    #[serde(rename = "type")]
    pub document_type: String,
    pub work_name: String,
    pub subworks: Vec<Subwork>,
    #[serde(rename = "subworkItems")]
    pub subwork_items: ItemsBySubwork,
    pub taxes: Vec<TaxEntry>,
    pub calculations: RecapCalculations,
    #[serde(rename = "unitInputs")]
    pub unit_inputs: UnitInputs,
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

pub const RECAP_DOCUMENT_TYPE: &str = "recap_sheet";

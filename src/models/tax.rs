use serde::{Deserialize, Serialize};

use super::work::Part;

/// 税项计算方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxType {
    Percentage,
    Fixed,
}

/// 税项作用目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyTo {
    #[serde(rename = "part_a")]
    PartA,
    #[serde(rename = "part_b")]
    PartB,
    #[serde(rename = "part_c")]
    PartC,
    #[serde(rename = "part_a_b_combined")]
    PartABCombined,
    /// 分别作用于 A/B/C 三部分, 不作用于 A+B 合计
    #[serde(rename = "both")]
    Both,
}

/// 用户配置的税项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxEntry {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub tax_type: TaxType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_amount: Option<f64>,
    pub apply_to: ApplyTo,
}

impl TaxEntry {
    pub fn percentage(id: i64, name: impl Into<String>, percentage: f64, apply_to: ApplyTo) -> Self {
        Self {
            id,
            name: name.into(),
            tax_type: TaxType::Percentage,
            percentage: Some(percentage),
            fixed_amount: None,
            apply_to,
        }
    }

    pub fn fixed(id: i64, name: impl Into<String>, amount: f64, apply_to: ApplyTo) -> Self {
        Self {
            id,
            name: name.into(),
            tax_type: TaxType::Fixed,
            percentage: None,
            fixed_amount: Some(amount),
            apply_to,
        }
    }

    /// 新会话的默认税项: GST 18%, 作用于 B 部分
    pub fn default_gst() -> Self {
        Self::percentage(1, "GST", 18.0, ApplyTo::PartB)
    }

    /// 切换计算方式, 另一种方式的字段随之清空
    pub fn set_type(&mut self, tax_type: TaxType) {
        if self.tax_type == tax_type {
            return;
        }
        self.tax_type = tax_type;
        self.clear_inactive();
        match tax_type {
            TaxType::Fixed => self.fixed_amount = Some(0.0),
            TaxType::Percentage => self.percentage = Some(0.0),
        }
    }

    /// 只保留当前计算方式对应的字段
    pub fn clear_inactive(&mut self) {
        match self.tax_type {
            TaxType::Fixed => self.percentage = None,
            TaxType::Percentage => self.fixed_amount = None,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.clear_inactive();
        self
    }

    pub fn applies_to_part(&self, part: Part) -> bool {
        match self.apply_to {
            ApplyTo::Both => true,
            ApplyTo::PartA => part == Part::A,
            ApplyTo::PartB => part == Part::B,
            ApplyTo::PartC => part == Part::C,
            ApplyTo::PartABCombined => false,
        }
    }

    pub fn applies_to_combined(&self) -> bool {
        self.apply_to == ApplyTo::PartABCombined
    }

    /// 显示用标签, 如 "GST @ 18%"
    pub fn display_label(&self) -> String {
        match self.tax_type {
            TaxType::Percentage => {
                format!("{} @ {}%", self.name, self.percentage.unwrap_or(0.0))
            }
            TaxType::Fixed => format!("{} (fixed)", self.name),
        }
    }
}

pub fn default_taxes() -> Vec<TaxEntry> {
    vec![TaxEntry::default_gst()]
}

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::engine::coerce::declared_unit;
use crate::engine::{calculate_recap, classify, PartGroups, RecapInput};
use crate::error::{RecapError, RecapResult};
use crate::models::{
    default_taxes, CategoryTotalsBySubwork, ItemsBySubwork, RecapCalculations, RecapDocument,
    RecapSnapshot, Subwork, TaxEntry, UnitInputs, Work, RECAP_DOCUMENT_TYPE,
};

/// 从存储加载的一份工程数据 (每次加载都重新读取, 不使用快照中的明细)
#[derive(Debug, Clone)]
pub struct LoadedWork {
    pub work: Work,
    pub subworks: Vec<Subwork>,
    pub items: ItemsBySubwork,
    /// 每个子工程恰有一条, 无明细数据时为全零
    pub category_totals: CategoryTotalsBySubwork,
}

impl LoadedWork {
    /// 各子工程声明的单位倍数
    pub fn declared_unit_inputs(&self) -> UnitInputs {
        self.subworks
            .iter()
            .map(|s| (s.id, declared_unit(s.unit.as_deref())))
            .collect()
    }

    /// 解析 works.recap_json; 格式不对时忽略
    pub fn snapshot(&self) -> Option<RecapSnapshot> {
        let raw = self.work.recap_json.as_ref()?;
        match serde_json::from_value::<RecapSnapshot>(raw.clone()) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Work {} recap_json 无法解析, 忽略快照: {}", self.work.id, e);
                None
            }
        }
    }
}

/// 单个工程的汇总会话
///
/// 所有修改只作用于内存, 不会自动重算; 调用方在修改后调用 [`RecapSession::calculate`]。
#[derive(Debug, Clone)]
pub struct RecapSession {
    loaded: LoadedWork,
    taxes: Vec<TaxEntry>,
    unit_inputs: UnitInputs,
    last_saved_at: Option<DateTime<Utc>>,
}

impl RecapSession {
    /// 建立会话: 有快照时恢复税项和单位倍数, 否则使用默认值
    pub fn restore(loaded: LoadedWork) -> Self {
        let mut unit_inputs = loaded.declared_unit_inputs();
        let mut taxes = default_taxes();
        let mut last_saved_at = None;

        if let Some(snapshot) = loaded.snapshot() {
            if let Some(saved_taxes) = snapshot.taxes {
                match first_duplicate_id(&saved_taxes) {
                    Some(dup) => tracing::warn!(
                        "Work {} 快照税项ID重复 ({}), 使用默认税项",
                        loaded.work.id,
                        dup
                    ),
                    None => {
                        taxes = saved_taxes.into_iter().map(TaxEntry::normalized).collect();
                    }
                }
            }
            if let Some(saved_units) = snapshot.unit_inputs {
                for (subwork_id, unit) in saved_units {
                    if let Some(slot) = unit_inputs.get_mut(&subwork_id) {
                        *slot = unit;
                    }
                }
            }
            last_saved_at = snapshot.saved_at;
        }

        Self {
            loaded,
            taxes,
            unit_inputs,
            last_saved_at,
        }
    }

    pub fn work(&self) -> &Work {
        &self.loaded.work
    }

    pub fn loaded(&self) -> &LoadedWork {
        &self.loaded
    }

    pub fn taxes(&self) -> &[TaxEntry] {
        &self.taxes
    }

    pub fn unit_inputs(&self) -> &UnitInputs {
        &self.unit_inputs
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    pub fn input(&self) -> RecapInput<'_> {
        self.input_with(&self.unit_inputs)
    }

    /// 使用外部提供的单位倍数 (嵌入只读视图)
    pub fn input_with<'a>(&'a self, unit_inputs: &'a UnitInputs) -> RecapInput<'a> {
        RecapInput {
            subworks: &self.loaded.subworks,
            items: &self.loaded.items,
            category_totals: &self.loaded.category_totals,
            taxes: &self.taxes,
            unit_inputs,
        }
    }

    pub fn calculate(&self) -> RecapCalculations {
        calculate_recap(&self.input())
    }

    pub fn groups(&self) -> PartGroups {
        classify(
            &self.loaded.subworks,
            &self.loaded.items,
            &self.loaded.category_totals,
        )
    }

    pub fn add_tax(&mut self, tax: TaxEntry) -> RecapResult<()> {
        if self.taxes.iter().any(|t| t.id == tax.id) {
            return Err(RecapError::DuplicateTax(tax.id));
        }
        self.taxes.push(tax.normalized());
        Ok(())
    }

    pub fn update_tax(&mut self, tax: TaxEntry) -> RecapResult<()> {
        let slot = self
            .taxes
            .iter_mut()
            .find(|t| t.id == tax.id)
            .ok_or(RecapError::TaxNotFound(tax.id))?;
        *slot = tax.normalized();
        Ok(())
    }

    pub fn remove_tax(&mut self, tax_id: i64) -> RecapResult<TaxEntry> {
        let index = self
            .taxes
            .iter()
            .position(|t| t.id == tax_id)
            .ok_or(RecapError::TaxNotFound(tax_id))?;
        Ok(self.taxes.remove(index))
    }

    pub fn replace_taxes(&mut self, taxes: Vec<TaxEntry>) -> RecapResult<()> {
        if let Some(dup) = first_duplicate_id(&taxes) {
            return Err(RecapError::DuplicateTax(dup));
        }
        self.taxes = taxes.into_iter().map(TaxEntry::normalized).collect();
        Ok(())
    }

    pub fn set_unit_input(&mut self, subwork_id: i64, unit: f64) -> RecapResult<()> {
        match self.unit_inputs.get_mut(&subwork_id) {
            Some(slot) => {
                *slot = unit;
                Ok(())
            }
            None => Err(RecapError::SubworkNotFound {
                work_id: self.loaded.work.id,
                subwork_id,
            }),
        }
    }

    pub fn reset_unit_inputs(&mut self) {
        self.unit_inputs = self.loaded.declared_unit_inputs();
    }

    /// 生成保存文档 (含本次计算结果和原始输入)
    pub fn to_document(&self, saved_at: DateTime<Utc>) -> RecapDocument {
        RecapDocument {
            work_id: self.loaded.work.id,
            work: self.loaded.work.clone(),
            document_type: RECAP_DOCUMENT_TYPE.to_string(),
            work_name: self.loaded.work.name.clone(),
            subworks: self.loaded.subworks.clone(),
            subwork_items: self.loaded.items.clone(),
            taxes: self.taxes.clone(),
            calculations: self.calculate(),
            unit_inputs: self.unit_inputs.clone(),
            saved_at,
        }
    }

    pub fn mark_saved(&mut self, saved_at: DateTime<Utc>) {
        self.last_saved_at = Some(saved_at);
    }
}

fn first_duplicate_id(taxes: &[TaxEntry]) -> Option<i64> {
    let mut seen = HashSet::new();
    taxes.iter().map(|t| t.id).find(|id| !seen.insert(*id))
}

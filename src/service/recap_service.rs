use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::try_join_all;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::session::{LoadedWork, RecapSession};
use crate::db::RecapStore;
use crate::engine::calculate_recap;
use crate::error::{RecapError, RecapResult};
use crate::models::{
    CategoryTotals, CategoryTotalsBySubwork, ItemsBySubwork, RecapCalculations, TaxEntry,
    UnitInputs,
};
use crate::report::{export_csv, RecapSheet};

/// 保存结果
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub work_id: i64,
    pub total_estimated_cost: f64,
    pub saved_at: DateTime<Utc>,
}

/// 批量汇总中单个工程的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkRecapSummary {
    pub work_id: i64,
    pub work_name: String,
    pub part_a_total: f64,
    pub part_b_total: f64,
    pub part_c_total: f64,
    pub grand_total: f64,
}

impl WorkRecapSummary {
    fn from_session(session: &RecapSession) -> Self {
        let calc = session.calculate();
        Self {
            work_id: session.work().id,
            work_name: session.work().name.clone(),
            part_a_total: calc.part_a.total,
            part_b_total: calc.part_b.total,
            part_c_total: calc.part_c.total,
            grand_total: calc.grand_total,
        }
    }
}

/// 汇总服务: 加载、会话编辑、保存
///
/// 每个工程一个会话, 互不共享状态。同一工程重复加载会替换旧会话。
pub struct RecapService {
    store: Arc<dyn RecapStore>,
    sessions: DashMap<i64, RecapSession>,
    export_dir: PathBuf,
}

impl RecapService {
    pub fn new(store: Arc<dyn RecapStore>) -> Self {
        Self {
            store,
            sessions: DashMap::new(),
            export_dir: PathBuf::from("exports"),
        }
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// 从存储读取一份完整的工程数据
    pub async fn fetch_work(&self, work_id: i64) -> RecapResult<LoadedWork> {
        let work = self
            .store
            .get_work(work_id)
            .await?
            .ok_or(RecapError::WorkNotFound(work_id))?;

        let subworks = self.store.list_subworks(work_id).await?;

        let item_lists =
            try_join_all(subworks.iter().map(|s| self.store.list_subwork_items(s.id))).await?;
        let items: ItemsBySubwork = subworks
            .iter()
            .map(|s| s.id)
            .zip(item_lists)
            .collect();

        let subwork_ids: Vec<i64> = subworks.iter().map(|s| s.id).collect();
        let rows = self.store.list_category_totals(&subwork_ids).await?;
        let mut category_totals: CategoryTotalsBySubwork = subwork_ids
            .iter()
            .map(|id| (*id, CategoryTotals::default()))
            .collect();
        for row in &rows {
            if let Some(slot) = category_totals.get_mut(&row.subwork_id) {
                *slot = CategoryTotals::from(row);
            }
        }

        tracing::debug!(
            "Work {}: {} 个子工程, {} 条明细",
            work_id,
            subworks.len(),
            items.values().map(Vec::len).sum::<usize>()
        );

        Ok(LoadedWork {
            work,
            subworks,
            items,
            category_totals,
        })
    }

    /// 加载工程并建立会话, 返回首次计算结果
    pub async fn load_session(&self, work_id: i64) -> RecapResult<RecapCalculations> {
        let loaded = match self.fetch_work(work_id).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!("Work {} 加载失败: {}", work_id, e);
                return Err(e);
            }
        };

        let session = RecapSession::restore(loaded);
        let calculations = session.calculate();
        tracing::info!(
            "Work {} recap loaded: grand total {:.0}, {} taxes",
            work_id,
            calculations.grand_total,
            session.taxes().len()
        );
        self.sessions.insert(work_id, session);
        Ok(calculations)
    }

    pub fn has_session(&self, work_id: i64) -> bool {
        self.sessions.contains_key(&work_id)
    }

    pub fn close_session(&self, work_id: i64) -> bool {
        self.sessions.remove(&work_id).is_some()
    }

    pub fn calculations(&self, work_id: i64) -> RecapResult<RecapCalculations> {
        self.with_session(work_id, |session| Ok(session.calculate()))
    }

    pub fn sheet(&self, work_id: i64) -> RecapResult<RecapSheet> {
        self.with_session(work_id, |session| {
            Ok(RecapSheet::build(session, &session.calculate()))
        })
    }

    pub fn taxes(&self, work_id: i64) -> RecapResult<Vec<TaxEntry>> {
        self.with_session(work_id, |session| Ok(session.taxes().to_vec()))
    }

    /// 只读嵌入: 用调用方持有的单位倍数计算, 不修改会话
    pub fn embedded(&self, work_id: i64, unit_inputs: &UnitInputs) -> RecapResult<RecapCalculations> {
        self.with_session(work_id, |session| {
            Ok(calculate_recap(&session.input_with(unit_inputs)))
        })
    }

    pub fn add_tax(&self, work_id: i64, tax: TaxEntry) -> RecapResult<RecapCalculations> {
        self.mutate(work_id, |session| session.add_tax(tax))
    }

    pub fn update_tax(&self, work_id: i64, tax: TaxEntry) -> RecapResult<RecapCalculations> {
        self.mutate(work_id, |session| session.update_tax(tax))
    }

    pub fn remove_tax(&self, work_id: i64, tax_id: i64) -> RecapResult<RecapCalculations> {
        self.mutate(work_id, |session| session.remove_tax(tax_id).map(|_| ()))
    }

    pub fn replace_taxes(&self, work_id: i64, taxes: Vec<TaxEntry>) -> RecapResult<RecapCalculations> {
        self.mutate(work_id, |session| session.replace_taxes(taxes))
    }

    pub fn set_unit_input(
        &self,
        work_id: i64,
        subwork_id: i64,
        unit: f64,
    ) -> RecapResult<RecapCalculations> {
        self.mutate(work_id, |session| session.set_unit_input(subwork_id, unit))
    }

    pub fn reset_unit_inputs(&self, work_id: i64) -> RecapResult<RecapCalculations> {
        self.mutate(work_id, |session| {
            session.reset_unit_inputs();
            Ok(())
        })
    }

    /// 保存快照并回写估算总额; 失败时会话保持不变, 不自动重试
    pub async fn save(&self, work_id: i64) -> RecapResult<SaveOutcome> {
        let saved_at = Utc::now();
        let document = self.with_session(work_id, |session| Ok(session.to_document(saved_at)))?;
        let total_estimated_cost = document.calculations.total_estimated_cost();

        if let Err(e) = self
            .store
            .save_recap(work_id, &document, total_estimated_cost)
            .await
        {
            tracing::error!("Work {} recap 保存失败: {}", work_id, e);
            return Err(e);
        }

        if let Some(mut session) = self.sessions.get_mut(&work_id) {
            session.mark_saved(saved_at);
        }
        tracing::info!(
            "✓ Work {} recap saved, total_estimated_cost = {:.2}",
            work_id,
            total_estimated_cost
        );

        Ok(SaveOutcome {
            work_id,
            total_estimated_cost,
            saved_at,
        })
    }

    /// 批量汇总: 逐个读取, 并行计算; 不存在的工程跳过
    pub async fn batch_summary(&self, work_ids: &[i64]) -> RecapResult<Vec<WorkRecapSummary>> {
        let mut sessions = Vec::with_capacity(work_ids.len());
        for (idx, &work_id) in work_ids.iter().enumerate() {
            match self.fetch_work(work_id).await {
                Ok(loaded) => sessions.push(RecapSession::restore(loaded)),
                Err(RecapError::WorkNotFound(_)) => {
                    tracing::warn!("Work {} not found, skipping", work_id);
                }
                Err(e) => {
                    tracing::error!("Work {} 批量汇总读取失败: {}", work_id, e);
                    return Err(e);
                }
            }

            let current_idx = idx + 1;
            if current_idx % 100 == 0 || current_idx == 1 {
                tracing::info!("批量汇总读取进度: {}/{}", current_idx, work_ids.len());
            }
        }

        let summaries: Vec<WorkRecapSummary> = sessions
            .par_iter()
            .map(WorkRecapSummary::from_session)
            .collect();

        tracing::info!(
            "批量汇总完成: 请求 {} 个工程, 计算 {} 个",
            work_ids.len(),
            summaries.len()
        );
        Ok(summaries)
    }

    /// 导出当前汇总表到 `<dir>/recap_<work_id>.csv`
    pub fn export_csv(&self, work_id: i64, dir: &Path) -> RecapResult<PathBuf> {
        let sheet = self.sheet(work_id)?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("recap_{}.csv", work_id));
        export_csv(&sheet, &path)?;
        tracing::info!("Work {} recap exported to {}", work_id, path.display());
        Ok(path)
    }

    fn with_session<T, F>(&self, work_id: i64, f: F) -> RecapResult<T>
    where
        F: FnOnce(&RecapSession) -> RecapResult<T>,
    {
        let session = self
            .sessions
            .get(&work_id)
            .ok_or(RecapError::SessionNotFound(work_id))?;
        f(session.value())
    }

    /// 修改会话后整体重算
    fn mutate<F>(&self, work_id: i64, f: F) -> RecapResult<RecapCalculations>
    where
        F: FnOnce(&mut RecapSession) -> RecapResult<()>,
    {
        let mut session = self
            .sessions
            .get_mut(&work_id)
            .ok_or(RecapError::SessionNotFound(work_id))?;
        f(session.value_mut())?;
        Ok(session.calculate())
    }
}

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::store::RecapStore;
use crate::error::{RecapError, RecapResult};
use crate::models::{
    CategoryTotals, RecapDocument, Subwork, SubworkCategoryTotals, SubworkItem, Work,
};

/// 内存实现, 用于测试和本地调试
#[derive(Default)]
pub struct MemoryRecapStore {
    works: DashMap<i64, Work>,
    subworks: DashMap<i64, Subwork>,
    items: DashMap<i64, Vec<SubworkItem>>,
    category_totals: DashMap<i64, CategoryTotals>,
    estimated_costs: DashMap<i64, f64>,
    unavailable: AtomicBool,
}

impl MemoryRecapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_work(&self, work: Work) {
        self.works.insert(work.id, work);
    }

    pub fn insert_subwork(&self, subwork: Subwork) {
        self.subworks.insert(subwork.id, subwork);
    }

    pub fn insert_items(&self, subwork_id: i64, items: Vec<SubworkItem>) {
        self.items.insert(subwork_id, items);
    }

    pub fn insert_category_totals(&self, subwork_id: i64, totals: CategoryTotals) {
        self.category_totals.insert(subwork_id, totals);
    }

    /// 模拟存储故障: 之后的所有读写都返回错误
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn saved_snapshot(&self, work_id: i64) -> Option<serde_json::Value> {
        self.works.get(&work_id).and_then(|w| w.recap_json.clone())
    }

    pub fn estimated_cost(&self, work_id: i64) -> Option<f64> {
        self.estimated_costs.get(&work_id).map(|c| *c)
    }

    fn check_available(&self) -> RecapResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RecapError::StoreUnavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RecapStore for MemoryRecapStore {
    async fn get_work(&self, work_id: i64) -> RecapResult<Option<Work>> {
        self.check_available()?;
        Ok(self.works.get(&work_id).map(|w| w.clone()))
    }

    async fn list_subworks(&self, work_id: i64) -> RecapResult<Vec<Subwork>> {
        self.check_available()?;
        let mut subworks: Vec<Subwork> = self
            .subworks
            .iter()
            .filter(|s| s.work_id == work_id)
            .map(|s| s.value().clone())
            .collect();
        subworks.sort_by_key(|s| s.sequence);
        Ok(subworks)
    }

    async fn list_subwork_items(&self, subwork_id: i64) -> RecapResult<Vec<SubworkItem>> {
        self.check_available()?;
        let mut items = self
            .items
            .get(&subwork_id)
            .map(|i| i.clone())
            .unwrap_or_default();
        items.sort_by_key(|i| i.sequence);
        Ok(items)
    }

    async fn list_category_totals(
        &self,
        subwork_ids: &[i64],
    ) -> RecapResult<Vec<SubworkCategoryTotals>> {
        self.check_available()?;
        Ok(subwork_ids
            .iter()
            .filter_map(|id| {
                self.category_totals.get(id).map(|t| SubworkCategoryTotals {
                    subwork_id: *id,
                    regular: Some(t.regular),
                    royalty: Some(t.royalty),
                    testing: Some(t.testing),
                })
            })
            .collect())
    }

    async fn save_recap(
        &self,
        work_id: i64,
        document: &RecapDocument,
        total_estimated_cost: f64,
    ) -> RecapResult<()> {
        self.check_available()?;
        let snapshot = serde_json::to_value(document)?;
        let mut work = self
            .works
            .get_mut(&work_id)
            .ok_or(RecapError::WorkNotFound(work_id))?;
        work.recap_json = Some(snapshot);
        drop(work);
        self.estimated_costs.insert(work_id, total_estimated_cost);
        Ok(())
    }
}

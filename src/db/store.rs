use async_trait::async_trait;
use sqlx::PgPool;

use super::queries;
use crate::error::{RecapError, RecapResult};
use crate::models::{RecapDocument, Subwork, SubworkCategoryTotals, SubworkItem, Work};

/// 外部存储边界
///
/// 汇总服务只通过该接口读取工程数据、写回快照; 实现可以是 Postgres 或内存。
#[async_trait]
pub trait RecapStore: Send + Sync {
    async fn get_work(&self, work_id: i64) -> RecapResult<Option<Work>>;

    async fn list_subworks(&self, work_id: i64) -> RecapResult<Vec<Subwork>>;

    async fn list_subwork_items(&self, subwork_id: i64) -> RecapResult<Vec<SubworkItem>>;

    /// 只返回有明细数据的子工程, 缺失的由调用方补零
    async fn list_category_totals(
        &self,
        subwork_ids: &[i64],
    ) -> RecapResult<Vec<SubworkCategoryTotals>>;

    async fn save_recap(
        &self,
        work_id: i64,
        document: &RecapDocument,
        total_estimated_cost: f64,
    ) -> RecapResult<()>;
}

/// Postgres 实现
pub struct PgRecapStore {
    pool: PgPool,
}

impl PgRecapStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecapStore for PgRecapStore {
    async fn get_work(&self, work_id: i64) -> RecapResult<Option<Work>> {
        Ok(queries::get_work(&self.pool, work_id).await?)
    }

    async fn list_subworks(&self, work_id: i64) -> RecapResult<Vec<Subwork>> {
        Ok(queries::list_subworks(&self.pool, work_id).await?)
    }

    async fn list_subwork_items(&self, subwork_id: i64) -> RecapResult<Vec<SubworkItem>> {
        Ok(queries::list_subwork_items(&self.pool, subwork_id).await?)
    }

    async fn list_category_totals(
        &self,
        subwork_ids: &[i64],
    ) -> RecapResult<Vec<SubworkCategoryTotals>> {
        if subwork_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(queries::list_category_totals(&self.pool, subwork_ids).await?)
    }

    async fn save_recap(
        &self,
        work_id: i64,
        document: &RecapDocument,
        total_estimated_cost: f64,
    ) -> RecapResult<()> {
        let affected =
            queries::update_work_recap(&self.pool, work_id, document, total_estimated_cost).await?;
        if affected == 0 {
            return Err(RecapError::WorkNotFound(work_id));
        }
        Ok(())
    }
}

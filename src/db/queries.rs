use crate::models::{RecapDocument, Subwork, SubworkCategoryTotals, SubworkItem, Work};
use sqlx::types::Json;
use sqlx::PgPool;
use std::time::{Duration, Instant};

/// 查询工程主表
pub async fn get_work(pool: &PgPool, work_id: i64) -> Result<Option<Work>, sqlx::Error> {
    sqlx::query_as::<_, Work>(
        r#"
        SELECT id, name, village, fund_head, recap_json
        FROM works
        WHERE id = $1
        "#,
    )
    .bind(work_id)
    .fetch_optional(pool)
    .await
}

/// 查询工程下的子工程 (按序号)
pub async fn list_subworks(pool: &PgPool, work_id: i64) -> Result<Vec<Subwork>, sqlx::Error> {
    sqlx::query_as::<_, Subwork>(
        r#"
        SELECT id, work_id, sequence::int8 AS sequence, name, unit::text AS unit
        FROM subworks
        WHERE work_id = $1
        ORDER BY sequence
        "#,
    )
    .bind(work_id)
    .fetch_all(pool)
    .await
}

/// 查询子工程明细 (按序号)
pub async fn list_subwork_items(
    pool: &PgPool,
    subwork_id: i64,
) -> Result<Vec<SubworkItem>, sqlx::Error> {
    sqlx::query_as::<_, SubworkItem>(
        r#"
        SELECT subwork_id, sequence::int8 AS sequence, category,
               total_item_amount::float8 AS total_item_amount
        FROM subwork_items
        WHERE subwork_id = $1
        ORDER BY sequence
        "#,
    )
    .bind(subwork_id)
    .fetch_all(pool)
    .await
}

/// 按子工程统计分类金额
/// regular 来自普通明细的费率行, royalty / testing 来自对应计量表
pub async fn list_category_totals(
    pool: &PgPool,
    subwork_ids: &[i64],
) -> Result<Vec<SubworkCategoryTotals>, sqlx::Error> {
    sqlx::query_as::<_, SubworkCategoryTotals>(
        r#"
        SELECT
            s.id AS subwork_id,
            (
                SELECT COALESCE(SUM(ir.amount), 0)::float8
                FROM item_rates ir
                INNER JOIN subwork_items si ON si.id = ir.subwork_item_id
                WHERE si.subwork_id = s.id
                  AND COALESCE(si.category, '') = ''
            ) AS regular,
            (
                SELECT COALESCE(SUM(rm.total_amount), 0)::float8
                FROM royalty_measurements rm
                INNER JOIN subwork_items si ON si.id = rm.subwork_item_id
                WHERE si.subwork_id = s.id
                  AND si.category = 'royalty'
            ) AS royalty,
            (
                SELECT COALESCE(SUM(tm.total_amount), 0)::float8
                FROM testing_measurements tm
                INNER JOIN subwork_items si ON si.id = tm.subwork_item_id
                WHERE si.subwork_id = s.id
                  AND si.category = 'testing'
            ) AS testing
        FROM subworks s
        WHERE s.id = ANY($1)
        "#,
    )
    .bind(subwork_ids)
    .fetch_all(pool)
    .await
}

/// 保存汇总快照并回写估算总额, 返回影响行数
pub async fn update_work_recap(
    pool: &PgPool,
    work_id: i64,
    document: &RecapDocument,
    total_estimated_cost: f64,
) -> Result<u64, sqlx::Error> {
    let start_time = Instant::now();

    let execute_result = tokio::time::timeout(
        Duration::from_secs(30),
        sqlx::query(
            r#"
            UPDATE works
            SET recap_json = $2,
                total_estimated_cost = $3
            WHERE id = $1
            "#,
        )
        .bind(work_id)
        .bind(Json(document))
        .bind(total_estimated_cost)
        .execute(pool),
    )
    .await;

    match execute_result {
        Ok(Ok(result)) => {
            tracing::debug!(
                "UPDATE works {} 完成, 影响 {} 行, 耗时: {:?}",
                work_id,
                result.rows_affected(),
                start_time.elapsed()
            );
            Ok(result.rows_affected())
        }
        Ok(Err(e)) => {
            tracing::error!("✗ UPDATE works {} 失败, 耗时: {:?}, 错误: {:?}", work_id, start_time.elapsed(), e);
            Err(e)
        }
        Err(_) => {
            tracing::error!("✗ UPDATE works {} 超时 (>30秒)!", work_id);
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}

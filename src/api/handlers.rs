use crate::error::{RecapError, RecapResult};
use crate::models::{TaxEntry, UnitInputs};
use crate::service::{RecapService, WorkRecapSummary};
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 请求体: 工程ID列表
#[derive(Debug, Deserialize)]
pub struct BatchRecapRequest {
    pub work_ids: Vec<i64>,
}

/// 请求体: 单位倍数
#[derive(Debug, Deserialize)]
pub struct UnitInputRequest {
    pub unit: f64,
}

/// 请求体: 只读嵌入计算
#[derive(Debug, Deserialize)]
pub struct EmbeddedRequest {
    #[serde(rename = "unitInputs")]
    pub unit_inputs: UnitInputs,
}

/// 通用响应体
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 批量汇总响应体
#[derive(Debug, Serialize)]
pub struct BatchRecapResponse {
    pub success: bool,
    pub message: String,
    pub summaries: Option<Vec<WorkRecapSummary>>,
}

/// 保存响应体
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
    pub total_estimated_cost: Option<f64>,
}

fn error_status(e: &RecapError) -> StatusCode {
    if e.is_not_found() {
        StatusCode::NOT_FOUND
    } else if e.is_invalid_input() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn respond<T: Serialize>(result: RecapResult<T>, message: impl FnOnce() -> String) -> Response {
    match result {
        Ok(data) => {
            let response = ApiResponse {
                success: true,
                message: message(),
                data: Some(data),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = ApiResponse::<()> {
                success: false,
                message: format!("Error: {}", e),
                data: None,
            };
            (error_status(&e), Json(response)).into_response()
        }
    }
}

/// 解析请求体; 格式错误时返回 400 和统一响应体
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        tracing::warn!("请求体无法解析: {}", rejection.body_text());
        let response = ApiResponse::<()> {
            success: false,
            message: format!("Invalid request body: {}", rejection.body_text()),
            data: None,
        };
        (StatusCode::BAD_REQUEST, Json(response)).into_response()
    })
}

/// 重算后返回完整汇总表
fn respond_sheet(service: &RecapService, work_id: i64, result: RecapResult<()>) -> Response {
    let message = format!("Recap sheet for work {}", work_id);
    respond(result.and_then(|_| service.sheet(work_id)), || message)
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 加载工程并建立汇总会话
pub async fn load_recap(
    State(service): State<Arc<RecapService>>,
    Path(work_id): Path<i64>,
) -> Response {
    let result = service.load_session(work_id).await.map(|_| ());
    respond_sheet(&service, work_id, result)
}

/// 当前汇总表
pub async fn get_recap(
    State(service): State<Arc<RecapService>>,
    Path(work_id): Path<i64>,
) -> Response {
    respond_sheet(&service, work_id, Ok(()))
}

/// 只读嵌入计算 (单位倍数由调用方提供)
pub async fn embedded_recap(
    State(service): State<Arc<RecapService>>,
    Path(work_id): Path<i64>,
    payload: Result<Json<EmbeddedRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    respond(service.embedded(work_id, &req.unit_inputs), || {
        format!("Embedded recap for work {}", work_id)
    })
}

pub async fn add_tax(
    State(service): State<Arc<RecapService>>,
    Path(work_id): Path<i64>,
    payload: Result<Json<TaxEntry>, JsonRejection>,
) -> Response {
    let tax = match json_body(payload) {
        Ok(tax) => tax,
        Err(response) => return response,
    };
    let result = service.add_tax(work_id, tax).map(|_| ());
    respond_sheet(&service, work_id, result)
}

pub async fn replace_taxes(
    State(service): State<Arc<RecapService>>,
    Path(work_id): Path<i64>,
    payload: Result<Json<Vec<TaxEntry>>, JsonRejection>,
) -> Response {
    let taxes = match json_body(payload) {
        Ok(taxes) => taxes,
        Err(response) => return response,
    };
    let result = service.replace_taxes(work_id, taxes).map(|_| ());
    respond_sheet(&service, work_id, result)
}

pub async fn update_tax(
    State(service): State<Arc<RecapService>>,
    Path((work_id, tax_id)): Path<(i64, i64)>,
    payload: Result<Json<TaxEntry>, JsonRejection>,
) -> Response {
    let mut tax = match json_body(payload) {
        Ok(tax) => tax,
        Err(response) => return response,
    };
    tax.id = tax_id;
    let result = service.update_tax(work_id, tax).map(|_| ());
    respond_sheet(&service, work_id, result)
}

pub async fn remove_tax(
    State(service): State<Arc<RecapService>>,
    Path((work_id, tax_id)): Path<(i64, i64)>,
) -> Response {
    let result = service.remove_tax(work_id, tax_id).map(|_| ());
    respond_sheet(&service, work_id, result)
}

pub async fn set_unit_input(
    State(service): State<Arc<RecapService>>,
    Path((work_id, subwork_id)): Path<(i64, i64)>,
    payload: Result<Json<UnitInputRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let result = service
        .set_unit_input(work_id, subwork_id, req.unit)
        .map(|_| ());
    respond_sheet(&service, work_id, result)
}

pub async fn reset_unit_inputs(
    State(service): State<Arc<RecapService>>,
    Path(work_id): Path<i64>,
) -> Response {
    let result = service.reset_unit_inputs(work_id).map(|_| ());
    respond_sheet(&service, work_id, result)
}

/// 保存汇总快照
pub async fn save_recap(
    State(service): State<Arc<RecapService>>,
    Path(work_id): Path<i64>,
) -> Response {
    match service.save(work_id).await {
        Ok(outcome) => {
            let response = SaveResponse {
                success: true,
                message: format!("Recap for work {} saved at {}", work_id, outcome.saved_at.to_rfc3339()),
                total_estimated_cost: Some(outcome.total_estimated_cost),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = SaveResponse {
                success: false,
                message: format!("Error: {}", e),
                total_estimated_cost: None,
            };
            (error_status(&e), Json(response)).into_response()
        }
    }
}

/// 导出 CSV 到配置的导出目录, 返回文件路径
pub async fn export_recap(
    State(service): State<Arc<RecapService>>,
    Path(work_id): Path<i64>,
) -> Response {
    let result = service
        .export_csv(work_id, service.export_dir())
        .map(|path| path.display().to_string());
    respond(result, || format!("Recap for work {} exported", work_id))
}

/// 批量汇总接口
pub async fn batch_recap(
    State(service): State<Arc<RecapService>>,
    payload: Result<Json<BatchRecapRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    match service.batch_summary(&req.work_ids).await {
        Ok(summaries) => {
            let grand_total: f64 = summaries.iter().map(|s| s.grand_total).sum();
            let response = BatchRecapResponse {
                success: true,
                message: format!(
                    "Summarized {} of {} works, grand total {:.0}",
                    summaries.len(),
                    req.work_ids.len(),
                    grand_total
                ),
                summaries: Some(summaries),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = BatchRecapResponse {
                success: false,
                message: format!("Error: {}", e),
                summaries: None,
            };
            (error_status(&e), Json(response)).into_response()
        }
    }
}

pub mod handlers;

pub use handlers::*;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::service::RecapService;

/// 汇总表路由
pub fn router(service: Arc<RecapService>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/recap/batch", post(batch_recap))
        .route("/api/recap/:work_id", get(get_recap))
        .route("/api/recap/:work_id/load", post(load_recap))
        .route("/api/recap/:work_id/embedded", post(embedded_recap))
        .route("/api/recap/:work_id/save", post(save_recap))
        .route("/api/recap/:work_id/export", post(export_recap))
        .route(
            "/api/recap/:work_id/taxes",
            post(add_tax).put(replace_taxes),
        )
        .route(
            "/api/recap/:work_id/taxes/:tax_id",
            put(update_tax).delete(remove_tax),
        )
        .route("/api/recap/:work_id/units", axum::routing::delete(reset_unit_inputs))
        .route("/api/recap/:work_id/units/:subwork_id", put(set_unit_input))
        .with_state(service)
}

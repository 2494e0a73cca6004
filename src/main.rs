use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use works_recap_rust::{api, create_pool, AppConfig, PgRecapStore, RecapService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let store = Arc::new(PgRecapStore::new(pool));
    let service = Arc::new(RecapService::new(store).with_export_dir(&config.export.dir));

    let app = api::router(service).layer(ServiceBuilder::new());

    let addr = config.bind_addr();
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST   /api/recap/:work_id/load   - load recap session");
    info!("  GET    /api/recap/:work_id        - current recap sheet");
    info!("  POST   /api/recap/:work_id/save   - persist recap snapshot");
    info!("  POST   /api/recap/:work_id/export - export recap sheet as CSV");
    info!("  POST   /api/recap/batch           - batch grand totals");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

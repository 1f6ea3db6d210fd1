use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use recruitify::config::AppConfig;
use recruitify::error::AppError;
use recruitify::recruiting::{InMemoryStore, RecruitingService, RecruitingStore, SqliteStore};
use recruitify::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.database.take() {
        config.database.path = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    match config.database.path.clone() {
        Some(path) => {
            let store = SqliteStore::open(&path)?;
            serve(config, store).await
        }
        None => {
            warn!("no database configured, records will not survive a restart");
            serve(config, InMemoryStore::default()).await
        }
    }
}

async fn serve<S>(config: AppConfig, store: S) -> Result<(), AppError>
where
    S: RecruitingStore + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(RecruitingService::new(Arc::new(store)));

    let app = with_operational_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        persistent = config.database.path.is_some(),
        "recruiting api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

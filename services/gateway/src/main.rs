//! Gateway HTTP service entry point.
use gateway::app::{AppState, build_router};
use gateway::jwks_client::JwksKeySource;
use gateway::{config, observability};
use shepherd_auth::TokenVerifier;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::GatewayConfig::from_env_or_yaml()?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: config::GatewayConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("shepherd-gateway");
    let state = build_state(&config);
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);

    let addr = config.bind_addr;
    tracing::info!(%addr, auth_url = %config.auth_url, "gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

fn build_state(config: &config::GatewayConfig) -> AppState {
    let keys = Arc::new(JwksKeySource::new(
        config.auth_url.clone(),
        Duration::from_secs(config.jwks_ttl_secs),
    ));
    let verifier = TokenVerifier::new(config.issuer.clone(), config.leeway_secs, keys.clone());
    AppState { verifier, keys }
}

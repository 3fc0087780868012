//! Authserver HTTP service entry point.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup
//! logic.
use authserver::app::{AppState, build_router};
use authserver::auth::composer::ClaimsComposer;
use authserver::auth::grants::GrantDispatcher;
use authserver::auth::registry::SigningKeyRegistry;
use authserver::store::memory::InMemoryStore;
use authserver::{config, observability};
use shepherd_auth::{TokenSigner, TokenVerifier};
use std::future::Future;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AuthServerConfig::from_env_or_yaml().expect("authserver config");
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: config::AuthServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("shepherd-authserver");
    let state = build_state(&config)?;
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);

    let addr = config.bind_addr;
    tracing::info!(%addr, "authserver listening");
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

fn build_state(config: &config::AuthServerConfig) -> anyhow::Result<AppState> {
    let registry = Arc::new(SigningKeyRegistry::new());
    let clients = Arc::new(InMemoryStore::new());

    let signer = TokenSigner::new(config.issuer.clone(), registry.clone());
    let verifier = TokenVerifier::new(config.issuer.clone(), config.leeway_secs, registry.clone());
    let composer = ClaimsComposer::new(config.issuer.clone(), config.access_ttl_secs);
    let dispatcher = GrantDispatcher::new(
        clients.clone(),
        composer,
        signer,
        verifier,
        config.refresh_ttl_secs,
        config.max_refresh_count,
    )
    .map_err(|err| anyhow::anyhow!("build grant dispatcher: {err}"))?;

    Ok(AppState {
        registry,
        clients,
        dispatcher: Arc::new(dispatcher),
    })
}

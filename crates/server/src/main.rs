use flockkit_api::{AppState, router};
use flockkit_auth::CredentialService;
use flockkit_core::AppConfig;
use flockkit_mail::{LinkBuilder, TracingMailer};
use flockkit_store::MemoryStore;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Fails closed when the signing secret is unset or empty.
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "refusing to start with invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let service = CredentialService::new(
        MemoryStore::new(),
        TracingMailer::new(config.mail.sender.clone()),
        LinkBuilder::new(config.mail.frontend_url.clone()),
        config.auth.jwt_secret.clone(),
        config.auth.session_ttl_seconds,
        config.auth.reset_token_ttl_seconds,
    );

    let state = Arc::new(AppState::new(service));
    let app = router::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%addr, "listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server exited with error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

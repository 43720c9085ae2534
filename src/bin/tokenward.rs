//! Runs the tokenward HTTP server.
//!
//! Usage:
//!
//! ```text
//! JWT_AT_SECRET=... JWT_RT_SECRET=... DATABASE_URL=postgres://... tokenward
//! ```
//!
//! Every setting is read from the environment; see [`tokenward::config`].
//! Without `DATABASE_URL` principals are kept in memory and lost on exit.

use anyhow::{Context, Result};
use axum::Router;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tokenward::auth::{
    adapters::{
        argon2::Argon2SecretHasher,
        http::{AuthHttpState, cors_layer, router},
        memory::InMemoryCredentialStore,
        postgres::PostgresCredentialStore,
    },
    ports::CredentialStore,
    services::AuthService,
};
use tokenward::config::{AuthConfig, ServerConfig};
use tokenward::telemetry;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let server = ServerConfig::from_env().context("invalid server configuration")?;
    telemetry::init(server.log_format())?;
    let auth = Arc::new(AuthConfig::from_env().context("invalid auth configuration")?);
    if auth.master_password().is_some() {
        warn!("MASTER_PASSWORD is set; master-secret login is enabled for every principal");
    }

    let cors = cors_layer(server.frontend_base_url()).context("invalid FRONTEND_BASE_URL")?;

    let clock = Arc::new(DefaultClock);
    let hasher = Arc::new(Argon2SecretHasher::new());
    let app = if let Some(url) = server.database_url() {
        let manager = ConnectionManager::<PgConnection>::new(url.expose_secret());
        let pool = Pool::builder()
            .build(manager)
            .context("failed to build PostgreSQL connection pool")?;
        let store = PostgresCredentialStore::new(pool, hasher, Arc::clone(&clock));
        store
            .ensure_schema()
            .await
            .context("failed to prepare principals table")?;
        info!("using PostgreSQL credential store");
        build_app(store, auth, clock, cors)
    } else {
        warn!("DATABASE_URL is not set; principals are kept in memory");
        build_app(
            InMemoryCredentialStore::new(hasher, Arc::clone(&clock)),
            auth,
            clock,
            cors,
        )
    };

    let address = server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(%address, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;
    info!("server stopped");
    Ok(())
}

fn build_app<S>(
    store: S,
    config: Arc<AuthConfig>,
    clock: Arc<DefaultClock>,
    cors: CorsLayer,
) -> Router
where
    S: CredentialStore + 'static,
{
    let service = AuthService::new(Arc::new(store), config, clock);
    router(Arc::new(AuthHttpState::new(service)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

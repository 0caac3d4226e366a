// coopgate — session and authorization gate for the cooperative-society
// management application. Verifies externally issued identity tokens,
// resolves member/admin roles from the document store, mints the 5-day
// session cookie, and guards the dashboard and admin areas.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod roles;
pub mod routes;
pub mod session;
pub mod store;

pub use config::GateConfig;
pub use error::AuthError;
pub use identity::{CredentialVerifier, HttpCredentialVerifier, IdentityClaims};
pub use roles::{Role, RoleResolver};
pub use session::{CookieSettings, Session, SessionIssuer, SessionReader};
pub use store::{HttpUserStore, UserRecord, UserStore};

/// Shared handler state. Clients are constructed once at startup and
/// injected; nothing here is global or lazily initialized.
#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<SessionIssuer>,
    pub reader: Arc<SessionReader>,
    pub cookie: CookieSettings,
}

impl AppState {
    /// Wire the session components from a config and injected collaborator
    /// handles. Tests pass fakes for both traits.
    pub fn new(
        config: &GateConfig,
        verifier: Arc<dyn CredentialVerifier>,
        store: Arc<dyn UserStore>,
    ) -> Self {
        let cookie = CookieSettings::from_config(&config.cookie, config.production);
        let resolver = RoleResolver::new(store);
        let issuer = Arc::new(SessionIssuer::new(
            Arc::clone(&verifier),
            resolver,
            cookie.clone(),
        ));
        let reader = Arc::new(SessionReader::new(verifier, cookie.name.clone()));
        Self {
            issuer,
            reader,
            cookie,
        }
    }
}

/// Assemble the application router with the route guard applied to every
/// non-excluded path.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/session",
            post(routes::create_session).get(routes::current_session),
        )
        .route("/api/session/logout", post(routes::logout))
        .route("/logout", get(routes::logout))
        .route("/dashboard", get(routes::dashboard))
        .route("/admin", get(routes::admin))
        .route("/login", get(routes::login_page))
        .route("/signup", get(routes::signup_page))
        .route("/healthz", get(routes::healthz))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::route_guard,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gate server. Binds immediately, returns the bound port, and
/// serves in a background task until the shutdown receiver fires.
pub async fn start_server(
    config: GateConfig,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> anyhow::Result<u16> {
    config.validate()?;

    let verifier: Arc<dyn CredentialVerifier> =
        Arc::new(HttpCredentialVerifier::new(&config.identity)?);
    let store: Arc<dyn UserStore> = Arc::new(HttpUserStore::new(&config.store)?);
    let state = AppState::new(&config, verifier, store);

    let listener = tokio::net::TcpListener::bind(config.server_addr()).await?;
    let port = listener.local_addr()?.port();
    info!(port, production = config.production, "coopgate listening");

    let app = build_router(state);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
        {
            tracing::error!("server error: {}", e);
        }
    });

    Ok(port)
}

//! # HTTP Server
//!
//! Combines the resource routers under `/api` (behind the store-readiness
//! middleware), the health routes at the root, and the static front-end
//! fallback for every other GET path.

use std::io;
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::config::Config;
use crate::observability::logger;
use crate::store::RecordStore;

use super::course_routes::course_routes;
use super::dashboard_routes::dashboard_routes;
use super::health_routes::health_routes;
use super::student_routes::student_routes;
use super::{ApiError, AppState};

/// HTTP server for the records API
pub struct HttpServer {
    addr: String,
    router: Router,
}

impl HttpServer {
    /// Create a server from configuration and a shared store
    pub fn new<S: RecordStore + 'static>(config: &Config, store: Arc<S>) -> Self {
        let state = Arc::new(AppState::new(store, config.environment.clone()));
        Self {
            addr: config.socket_addr(),
            router: app(state, &config.static_dir),
        }
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start serving requests (async)
    pub async fn start(self) -> io::Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;
        logger::info("SERVER_LISTENING", &[("addr", &self.addr)]);
        axum::serve(listener, self.router).await
    }
}

/// Build the combined router.
///
/// Exposed separately so tests can drive the full application against an
/// in-memory store without binding a socket.
pub fn app<S: RecordStore + 'static>(state: Arc<AppState<S>>, static_dir: &FsPath) -> Router {
    let api = Router::new()
        .merge(course_routes(state.clone()))
        .merge(student_routes(state.clone()))
        .merge(dashboard_routes(state.clone()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_store::<S>,
        ));

    // Permissive CORS; this API fronts a same-origin dashboard in production
    // and local dev servers otherwise.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api)
        .merge(health_routes(state))
        .fallback_service(spa)
        .layer(cors)
}

/// Refuse `/api` requests with 503 before the handler body runs when no
/// store connection can be obtained. A failed attempt is not cached; the
/// next request triggers a fresh connection attempt.
async fn require_store<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    state.store.ready().await?;
    Ok(next.run(request).await)
}

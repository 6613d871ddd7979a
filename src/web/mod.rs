//! Web layer module
//!
//! The HTTP interface of HomeDash. Handlers stay thin and delegate to the
//! registry, the aggregator and the icon catalog held in [`AppState`].
//!
//! All API routes live under `/api/v1`:
//!
//! | method | path | purpose |
//! |---|---|---|
//! | POST | `/applications` | sidecar registration |
//! | GET | `/applications` | aggregated, sorted item list |
//! | GET | `/sidecars` | known sidecar ids |
//! | GET / DELETE | `/sidecars/{id}` | last report time / forget a sidecar |
//! | GET | `/icons/{filename}` | icon file from the catalog cache |
//! | POST | `/icons/refresh` | download a fresh icon catalog |
//! | GET / HEAD | `/status` | liveness |

use anyhow::Result;
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
};
use tracing::{info, warn};

use crate::{
    config::{Config, CorsConfig},
    icons::{IconCatalog, IconResolver},
    registry::SourceRegistry,
    services::Aggregator,
};

pub mod handlers;
pub mod middleware;
pub mod responses;

pub use responses::{ApiResponse, handle_error};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: SourceRegistry,
    pub aggregator: Aggregator,
    pub resolver: IconResolver,
    pub catalog: Arc<IconCatalog>,
}

impl AppState {
    /// Wire the resolver and aggregator to an existing registry and catalog
    pub fn new(config: Config, registry: SourceRegistry, catalog: Arc<IconCatalog>) -> Self {
        let resolver = IconResolver::new(
            catalog.index_handle(),
            config.icons.url_prefix.clone(),
            config.icons.default_icon.clone(),
        );
        let aggregator = Aggregator::new(
            registry.clone(),
            config.static_items.apps.clone(),
            resolver.clone(),
        );

        Self {
            config: Arc::new(config),
            registry,
            aggregator,
            resolver,
            catalog,
        }
    }
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(state: AppState) -> Result<Self> {
        let addr: SocketAddr =
            format!("{}:{}", state.config.web.host, state.config.web.port).parse()?;
        Ok(Self {
            app: router(state),
            addr,
        })
    }

    /// Serve until `cancellation_token` fires, then drain in-flight requests
    pub async fn serve_with_cancellation(self, cancellation_token: CancellationToken) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.addr, e))?;
        info!("HomeDash listening on http://{}", self.addr);

        let shutdown_signal = async move {
            cancellation_token.cancelled().await;
            info!("Web server received cancellation signal, shutting down gracefully");
        };

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Build the complete router: API, optional static front end, middleware
pub fn router(state: AppState) -> Router {
    let mut app = Router::new().nest("/api/v1", api_v1_routes());

    if let Some(static_dir) = &state.config.web.static_dir {
        app = app
            .nest_service("/static", ServeDir::new(static_dir))
            .route_service("/", ServeFile::new(static_dir.join("index.html")));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(
                middleware::request_logging_middleware,
            ))
            .layer(cors_layer(&state.config.cors)),
    )
    .with_state(state)
}

fn api_v1_routes() -> Router<AppState> {
    use handlers::{applications, health, icons, sidecars};

    Router::new()
        .route(
            "/applications",
            get(applications::list_applications).post(applications::register_applications),
        )
        .route("/sidecars", get(sidecars::list_sidecars))
        .route(
            "/sidecars/{id}",
            get(sidecars::get_sidecar).delete(sidecars::delete_sidecar),
        )
        .route("/icons/refresh", post(icons::refresh_icons))
        .route("/icons/{filename}", get(icons::serve_icon))
        .route("/status", get(health::status))
}

/// CORS policy from configuration; unparsable entries are skipped
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let wildcard = cors.allowed_origins.iter().any(|origin| origin == "*");

    let origins = if wildcard {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(cors.allowed_origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| warn!("Ignoring invalid CORS origin: {}", origin))
                .ok()
        }))
    };

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|method| {
            Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .inspect_err(|_| warn!("Ignoring invalid CORS method: {}", method))
                .ok()
        })
        .collect();

    let headers: Vec<HeaderName> = cors
        .allowed_headers
        .iter()
        .filter_map(|name| {
            HeaderName::from_bytes(name.as_bytes())
                .inspect_err(|_| warn!("Ignoring invalid CORS header: {}", name))
                .ok()
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers);

    if cors.allow_credentials && !wildcard {
        layer.allow_credentials(true)
    } else {
        if cors.allow_credentials {
            warn!("CORS credentials cannot be combined with a wildcard origin, ignoring");
        }
        layer
    }
}

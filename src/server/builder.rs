//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::AppState;
use super::router::{build_catalog_routes, build_health_routes};
use crate::config::CatalogConfig;
use crate::core::store::CatalogStore;
use crate::resolver::PaginationResolver;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the catalog HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryCatalogStore::with_products(seed))
///     .with_config(CatalogConfig::from_yaml_file("catalog.yaml")?)
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn CatalogStore>>,
    config: CatalogConfig,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            config: CatalogConfig::default_config(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the catalog store (required)
    pub fn with_store(mut self, store: impl CatalogStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set a catalog store that is shared with other owners
    pub fn with_shared_store(mut self, store: Arc<dyn CatalogStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the default configuration
    pub fn with_config(mut self, config: CatalogConfig) -> Self {
        self.config = config;
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints outside the pagination contract, such as
    /// product detail pages or admin actions.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the resolver the routes will share
    pub fn build_resolver(&mut self) -> Result<PaginationResolver> {
        self.config.validate()?;

        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("CatalogStore is required. Call .with_store()"))?;

        Ok(PaginationResolver::with_config(
            store,
            self.config.resolver.clone(),
        ))
    }

    /// Build the final router
    ///
    /// This generates:
    /// - Health check routes
    /// - Catalog pagination and validation routes
    /// - Any custom routes
    ///
    /// wrapped in request tracing and a permissive CORS layer.
    pub fn build(mut self) -> Result<Router> {
        let resolver = self.build_resolver()?;
        let state = AppState { resolver };

        let mut app = build_health_routes().merge(build_catalog_routes(state));
        for custom_router in std::mem::take(&mut self.custom_routes) {
            app = app.merge(custom_router);
        }

        Ok(app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
    }

    /// Serve on the configured `server.bind` address
    pub async fn serve_configured(self) -> Result<()> {
        let addr = self.config.server.bind.clone();
        self.serve(&addr).await
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

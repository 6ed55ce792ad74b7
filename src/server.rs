use crate::{
    classifier::Classifier,
    config::{Config, CorsConfig, ServerConfig},
    cors::build_cors_layer,
    routes::api_routes,
    telemetry::Metrics,
};
use axum::{extract::DefaultBodyLimit, Router};
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::broadcast::Receiver, task::JoinHandle};

#[derive(Clone)]
pub struct SharedState {
    pub classifier: Arc<dyn Classifier>,
    pub classifier_timeout: Duration,
    pub metrics: Arc<Metrics>,
}

impl SharedState {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        classifier_timeout: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            classifier,
            classifier_timeout,
            metrics,
        }
    }
}

pub fn build_router(state: SharedState, server: &ServerConfig, cors: &CorsConfig) -> Router {
    let router = Router::new()
        .merge(api_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(server.max_upload_bytes));

    match build_cors_layer(cors) {
        Some(cors_layer) => router.layer(cors_layer),
        None => router,
    }
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new(state: SharedState, config: &Config) -> anyhow::Result<Self> {
        let addr = config.server.get_address();
        let router = build_router(state, &config.server, &config.cors);
        let listener = TcpListener::bind(addr).await?;

        Ok(Self { router, listener })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(
        self,
        mut shutdown_rx: Receiver<()>,
    ) -> anyhow::Result<JoinHandle<anyhow::Result<()>>> {
        tracing::info!("Starting app on {}", self.listener.local_addr()?);

        let listener = self.listener;
        let router = self.router;
        let server_handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    shutdown_rx.recv().await.ok();
                })
                .await?;
            Ok(())
        });

        Ok(server_handle)
    }
}

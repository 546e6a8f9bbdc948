//! Website server
//!
//! One axum router carries the public pages, the JSON API and the admin
//! console. Shared state is cheap to clone; handlers reach storage through
//! [`ContentStore`] only.

pub mod admin;
pub mod api;
pub mod error;
pub mod extract;
pub mod html;
pub mod middleware;
pub mod public;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::session::SessionError;
use crate::auth::AdminAuth;
use crate::config::SiteConfig;
use crate::database::ContentStore;
use crate::i18n::Translations;

#[derive(Clone)]
pub struct WebState {
    pub config: Arc<SiteConfig>,
    pub store: Arc<dyn ContentStore>,
    pub translations: Arc<Translations>,
    pub auth: Arc<AdminAuth>,
}

impl WebState {
    pub fn new(
        config: SiteConfig,
        store: Arc<dyn ContentStore>,
        translations: Translations,
    ) -> Result<Self, SessionError> {
        let auth = AdminAuth::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            store,
            translations: Arc::new(translations),
            auth: Arc::new(auth),
        })
    }

    pub fn router(&self) -> Router {
        let images = ServeDir::new(Path::new(&self.config.public_dir).join("images"));

        Router::new()
            .merge(public::routes())
            .merge(api::routes())
            .merge(admin::routes())
            .nest_service("/images", images)
            .fallback(public::fallback)
            .layer(axum::middleware::from_fn_with_state(
                self.clone(),
                middleware::admin_gate,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    pub async fn run(self, bind_addr: &str) -> Result<()> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("Cannot bind {}", bind_addr))?;
        tracing::info!("[web] [ready] addr={}", bind_addr);

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

        tracing::info!("[web] [stopped]");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("[web] [signal] Ctrl+C handler failed: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("[web] [shutdown] received Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("[web] [shutdown] received SIGTERM");
            }
            Err(e) => {
                tracing::error!("[web] [signal] SIGTERM handler failed: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

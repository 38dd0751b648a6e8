use crate::repositories::AuthorRepository;
use anyhow::Context;
use axum::Router;
use axum::routing::{get, post, put};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod handler;

#[derive(Debug)]
pub struct AppState<AR> {
    pub author_repo: Arc<AR>,
}

impl<AR> Clone for AppState<AR> {
    fn clone(&self) -> Self {
        Self {
            author_repo: Arc::clone(&self.author_repo),
        }
    }
}

impl<AR: AuthorRepository> AppState<AR> {
    pub fn new(author_repo: AR) -> Self {
        Self {
            author_repo: Arc::new(author_repo),
        }
    }
}

#[derive(Debug)]
pub struct HttpServerConfig {
    port: u16,
}

impl HttpServerConfig {
    pub const fn new(port: u16) -> Self {
        Self { port }
    }
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<AR: AuthorRepository>(
        state: AppState<AR>,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        let router = Router::new()
            .nest("/api/v1", api_routes::<AR>())
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("Failed to bind to port {}", config.port))?;

        Ok(Self { router, listener })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    pub async fn run(self) -> anyhow::Result<()> {
        if let Ok(addr) = self.listener.local_addr() {
            info!(%addr, "Listening");
        }
        axum::serve(self.listener, self.router)
            .await
            .context("Received error from running server")?;
        Ok(())
    }
}

fn api_routes<AR: AuthorRepository>() -> Router<AppState<AR>> {
    Router::new()
        .route(
            "/authors",
            get(handler::list_authors::<AR>).post(handler::create_author::<AR>),
        )
        .route(
            "/authors/{id}",
            get(handler::find_author::<AR>)
                .put(handler::update_author::<AR>)
                .delete(handler::delete_author::<AR>),
        )
        .route("/authors/{id}/progress", put(handler::set_progress::<AR>))
        .route(
            "/books",
            get(handler::list_books::<AR>).post(handler::create_book::<AR>),
        )
        .route(
            "/books/{id}",
            get(handler::find_book::<AR>)
                .put(handler::update_book::<AR>)
                .delete(handler::delete_book::<AR>),
        )
        .route("/stats", get(handler::reading_stats::<AR>))
        .route("/status", get(handler::load_status::<AR>))
        .route("/refresh", post(handler::refresh::<AR>))
}

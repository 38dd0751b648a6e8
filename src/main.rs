use bookshelf::config::Config;
use bookshelf::http::{AppState, HttpServer, HttpServerConfig};
use bookshelf::remote::HttpAuthorSource;
use bookshelf::repositories::{AuthorRepository, DefaultAuthorRepository};
use bookshelf::store::AuthorStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let source = HttpAuthorSource::new(config.authors_api_url());
    let repo = DefaultAuthorRepository::new(AuthorStore::new(), source);
    let state = AppState::new(repo);

    let initial = state.clone();
    tokio::spawn(async move {
        initial.author_repo.refresh().await;
    });

    let server_config = HttpServerConfig::new(config.server_port());
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::response::IntoResponse;
use reqwest::Client;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tilhub_backend::{
    config::Config,
    responses::JsonResponse,
    routes::build_router,
    services::{
        github::{client::GitHubOAuthClient, contents::GitHubContentsClient},
        llm::LlmClient,
        publisher::{ContentPublisher, PublishOptions},
    },
    store::{InMemoryRepositoryStore, InMemoryTokenRegistry},
    utils::jwt::SessionTokens,
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env file
    init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;
    let sessions = SessionTokens::new(&config.jwt).context("invalid JWT_SECRET")?;

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(config.rate_limit.per_millisecond)
            .burst_size(config.rate_limit.burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .context("invalid rate limiter settings")?,
    );

    // Background task to cleanup old IPs
    let governor_limiter = governor_conf.limiter().clone();
    std::thread::spawn(move || {
        let interval = std::time::Duration::from_secs(60);
        loop {
            std::thread::sleep(interval);
            governor_limiter.retain_recent();
        }
    });

    let http_client = Client::new();
    let tokens = Arc::new(InMemoryTokenRegistry::new());
    let repositories = Arc::new(InMemoryRepositoryStore::new());
    let contents = Arc::new(GitHubContentsClient::new(
        http_client.clone(),
        config.github.api_base_url.clone(),
    ));
    let publisher = ContentPublisher::new(
        tokens.clone(),
        repositories.clone(),
        contents,
        PublishOptions {
            branch: config.github.branch.clone(),
            scaffold_directories: config.github.scaffold_directories,
        },
    );

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_origin
                .parse::<HeaderValue>()
                .context("FRONTEND_ORIGIN is not a valid header value")?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    let port = config.port;
    let state = AppState {
        sessions: Arc::new(sessions),
        tokens,
        repositories,
        github_oauth: Arc::new(GitHubOAuthClient::new(
            http_client.clone(),
            config.github.clone(),
        )),
        publisher: Arc::new(publisher),
        llm: Arc::new(LlmClient::new(http_client, config.llm.clone())),
        config: Arc::new(config),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(cors);

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{}", addr);
    axum::serve(listener, make_service)
        .await
        .context("server error")?;

    Ok(())
}

/// `RUST_LOG` picks the filter (default `info`); `LOG_FORMAT=json` switches to
/// JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

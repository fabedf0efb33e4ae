use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    http::{
        HeaderName, HeaderValue, Method,
        header::{
            ACCEPT, AUTHORIZATION, CONTENT_SECURITY_POLICY, CONTENT_TYPE, ORIGIN,
            STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
        },
    },
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;
#[cfg(test)]
mod test_support;
mod validation;

use auth::{
    AuthService, IdentityConfig, JwtConfig, JwtService, PesuAuthClient, RateLimiter,
    RateLimiterConfig, UserRepository,
};
use common::database::{DataServiceConfig, RestClient, TableStore};
use media::{ImageLimits, ImageUploader, S3ObjectStore, StorageConfig};

use crate::{
    config::AppConfig,
    repositories::{ItemRepository, MessageRepository},
    state::AppState,
};

const CONTENT_SECURITY: &str = "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; font-src 'self'";

/// How often idle rate limiter keys are dropped
const LIMITER_PURGE_INTERVAL: Duration = Duration::from_secs(300);

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origin = if config.is_development() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(
            config
                .allowed_origins()
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin {}", origin);
                        None
                    }
                }),
        )
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers([
            ORIGIN,
            CONTENT_TYPE,
            ACCEPT,
            AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("x-user-id"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

fn with_http_layers(router: Router, config: &AppConfig) -> Router {
    let security_headers = [
        (X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (X_FRAME_OPTIONS, "DENY"),
        (X_XSS_PROTECTION, "1; mode=block"),
        (STRICT_TRANSPORT_SECURITY, "max-age=31536000"),
        (CONTENT_SECURITY_POLICY, CONTENT_SECURITY),
    ];

    security_headers
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::overriding(
                name,
                HeaderValue::from_static(value),
            ))
        })
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize logging; RUST_LOG wins over the environment default
    let default_level = if config.is_development() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting PesXChange backend ({})", config.environment);

    // Data service
    let mut data_config = DataServiceConfig::new(&config.supabase_url, &config.supabase_anon_key);
    data_config.timeout_secs = config.data_service_timeout;
    let tables: Arc<dyn TableStore> = Arc::new(RestClient::new(&data_config)?);

    if tables.health_check().await? {
        info!("Data service connection successful");
    } else {
        anyhow::bail!("Failed to connect to data service");
    }

    // Authentication
    let users = UserRepository::new(tables.clone());
    let identity = Arc::new(PesuAuthClient::new(&IdentityConfig::new(&config.pesu_auth_url))?);
    let jwt = JwtService::new(JwtConfig::from_secret(config.jwt_secret.clone())?);
    let auth = AuthService::new(identity, users.clone(), jwt);

    // Object storage
    let mut storage_config = StorageConfig::for_project(&config.supabase_url);
    storage_config.bucket = config.storage_bucket.clone();
    storage_config.region = config.storage_region.clone();
    if let Some(endpoint) = &config.storage_endpoint {
        storage_config.endpoint = endpoint.clone();
    }
    storage_config.access_key_id = config.storage_access_key_id.clone();
    storage_config.secret_access_key = config.storage_secret_access_key.clone();
    let objects = Arc::new(S3ObjectStore::connect(storage_config).await?);

    let general_limiter = RateLimiter::new(RateLimiterConfig {
        max_requests: config.rate_limit_max,
        window_seconds: config.rate_limit_window,
    });
    let auth_limiter = RateLimiter::new(RateLimiterConfig {
        max_requests: config.auth_rate_limit_max,
        window_seconds: config.auth_rate_limit_window,
    });

    for limiter in [general_limiter.clone(), auth_limiter.clone()] {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(LIMITER_PURGE_INTERVAL);
            loop {
                interval.tick().await;
                limiter.purge_stale().await;
            }
        });
    }

    let app_state = AppState {
        auth,
        users,
        items: ItemRepository::new(tables.clone()),
        messages: MessageRepository::new(tables),
        uploader: ImageUploader::new(objects, ImageLimits::default()),
        general_limiter,
        auth_limiter,
    };

    info!("PesXChange backend initialized successfully");

    // Start the web server
    let app = with_http_layers(routes::create_router(app_state), &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("PesXChange backend listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    })
    .await?;

    Ok(())
}

use axum::{
    extract::State,
    routing::{delete, get, patch, post},
    Router,
};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::{trace::{Sampler, SdkTracerProvider}, Resource};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use tracing_opentelemetry::OpenTelemetryLayer;

use crate::api::error::{ApiError, ApiResult};
use crate::api::handlers::{blogs, comments, users, webhooks};
use crate::config::AppConfig;
use crate::db::{create_pool, run_migrations, BlogStore, PgStore};

/// Shared handler state: the injected store and the startup configuration
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn BlogStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

pub fn init_tracing() {
    let enable_otel = env::var("OTEL_ENABLED").map(|v| v == "true").unwrap_or(false);

    let otel_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4318/v1/traces".to_string());

    // Span close events duplicate what the exporter already records
    let fmt_layer = fmt::layer().json().with_target(false);
    let fmt_layer = if enable_otel {
        fmt_layer.boxed()
    } else {
        fmt_layer.with_span_events(fmt::format::FmtSpan::CLOSE).boxed()
    };

    let subscriber = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn,tower=warn")),
        );

    if enable_otel {
        match init_opentelemetry(&otel_endpoint) {
            Ok(provider) => {
                opentelemetry::global::set_tracer_provider(provider.clone());

                // global::tracer returns a BoxedTracer, which OpenTelemetryLayer can't use
                let tracer = provider.tracer("jix-blog-api");

                subscriber.with(OpenTelemetryLayer::new(tracer)).init();

                info!("OpenTelemetry enabled: {}", otel_endpoint);
            }
            Err(e) => {
                subscriber.init();
                tracing::error!("Failed to initialize OpenTelemetry: {}. Continuing with logs only.", e);
            }
        }
    } else {
        subscriber.init();
    }
}

fn init_opentelemetry(endpoint: &str) -> Result<SdkTracerProvider, Box<dyn std::error::Error>> {
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let service_name = env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "jix-blog-api".to_string());

    // Default 0.01 = 1%
    let sampling_rate = env::var("OTEL_TRACE_SAMPLING_RATE")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.01)
        .clamp(0.0, 1.0);

    let resource = Resource::builder()
        .with_attribute(KeyValue::new("service.name", service_name))
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .with_attribute(KeyValue::new("deployment.environment", environment))
        .build();

    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_sampler(Sampler::TraceIdRatioBased(sampling_rate))
        .with_batch_exporter(exporter)
        .build();

    info!("OpenTelemetry sampling rate: {}%", sampling_rate * 100.0);

    Ok(provider)
}

/// Router over any store; used directly by tests with `MemoryStore`
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Identity provider
        .route("/webhooks/clerk", post(webhooks::clerk_webhook_handler))
        // Users
        .route("/users/saved", get(users::saved_blogs_handler))
        .route("/users/save", patch(users::save_blog_handler))
        // Blogs
        .route("/blogs/upload-auth", get(blogs::upload_auth_handler))
        .route("/blogs/list", get(blogs::list_blogs_handler))
        .route("/blogs/create", post(blogs::create_blog_handler))
        .route("/blogs/delete/{id}", delete(blogs::delete_blog_handler))
        .route("/blogs/featured", patch(blogs::toggle_featured_handler))
        .route("/blogs/{slug}", get(blogs::read_blog_handler))
        // Comments
        .route("/comments/list", get(comments::list_comments_handler))
        .route("/comments", post(comments::create_comment_handler))
        .route(
            "/comments/{id}",
            get(comments::blog_comments_handler)
                .post(comments::delete_comment_handler)
                .delete(comments::delete_comment_handler),
        )
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Connect to Postgres, apply migrations and build the production router
pub async fn create_app(config: AppConfig) -> anyhow::Result<Router> {
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let state = AppState::new(Arc::new(PgStore::new(pool)), config);
    Ok(create_router(state))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<&'static str> {
    state.store.health_check().await?;
    Ok("OK")
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

pub async fn run_server() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Jix blog API server");

    let config = AppConfig::from_env()?;
    let port = config.port;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutting down gracefully...");
    };

    let app = create_app(config).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

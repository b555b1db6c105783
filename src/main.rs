mod api;
mod auth;
mod cart;
mod catalog;
mod db;
mod models;
mod schema;

use axum::extract::MatchedPath;
use axum::http::Request;
use axum::Router;
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across all handlers
pub type AppState = Arc<db::DbPool>;

/// Polled constantly by liveness checks; not worth a span or a log line.
fn is_quiet_path(path: &str) -> bool {
    path == "/api/test/unauthed-ping"
}

/// Resolve the collector address and probe it with a short TCP connect, so
/// a configured-but-absent collector degrades to console logging instead of
/// a hung exporter.
fn otlp_collector_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://");

    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

/// Console logging via `tracing-subscriber`, plus OTLP trace and log export
/// when OTEL_EXPORTER_OTLP_ENDPOINT points at a live collector.
fn init_telemetry() {
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer());

    match env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok() {
        Some(endpoint) if otlp_collector_reachable(&endpoint) => {
            let service_name =
                env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "mealbook-server".to_string());

            let resource = opentelemetry_sdk::Resource::builder()
                .with_service_name(service_name.clone())
                .build();

            let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(&endpoint)
                .build()
                .expect("Failed to create OTLP trace exporter");
            let trace_provider = SdkTracerProvider::builder()
                .with_batch_exporter(trace_exporter)
                .with_resource(resource.clone())
                .build();
            let tracer = trace_provider.tracer("mealbook-server");
            opentelemetry::global::set_tracer_provider(trace_provider);

            let log_exporter = opentelemetry_otlp::LogExporter::builder()
                .with_tonic()
                .with_endpoint(&endpoint)
                .build()
                .expect("Failed to create OTLP log exporter");
            let log_provider = SdkLoggerProvider::builder()
                .with_batch_exporter(log_exporter)
                .with_resource(resource)
                .build();

            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .with(OpenTelemetryTracingBridge::new(&log_provider))
                .init();

            tracing::info!(
                "Exporting traces and logs to {} as {}",
                endpoint,
                service_name
            );
        }
        Some(endpoint) => {
            registry.init();
            tracing::info!(
                "OTLP collector at {} is unreachable, console logging only",
                endpoint
            );
        }
        None => {
            registry.init();
            tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, console logging only");
        }
    }
}

#[tokio::main]
async fn main() {
    // `--openapi` dumps the API document and exits
    if env::args().any(|arg| arg == "--openapi") {
        let spec = api::openapi().to_pretty_json().unwrap();
        println!("{}", spec);
        return;
    }

    init_telemetry();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool: AppState = Arc::new(db::create_pool(&database_url));

    // One-shot catalog load: --load-ingredients <file.json>
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--load-ingredients") {
        let path = args
            .get(pos + 1)
            .expect("--load-ingredients requires a file path");
        let mut conn = pool.get().expect("Failed to get DB connection");
        match catalog::load_ingredients(&mut conn, Path::new(path)) {
            Ok(inserted) => {
                tracing::info!("Ingredient catalog loaded, {} new rows", inserted);
            }
            Err(e) => {
                tracing::error!("Ingredient catalog load failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Public routes (no auth required)
    let public_router = api::public::router();

    // Reference data is readable without a token
    let reference_router = Router::new()
        .nest("/api/ingredients", api::ingredients::router())
        .nest("/api/tags", api::tags::router());

    // Token-protected routes; each handler extracts the authenticated user
    let protected_router = Router::new()
        .nest("/api/test", api::testing::router())
        .nest("/api/recipes", api::recipes::router())
        .nest("/api/users", api::users::router());

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    let app = Router::new()
        .merge(public_router)
        .merge(reference_router)
        .merge(protected_router)
        .merge(swagger_ui)
        .with_state(pool)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    // Quiet paths get a trace-level stub span that the
                    // default filter drops
                    if is_quiet_path(matched_path) {
                        tracing::trace_span!("http_request")
                    } else {
                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            path = %matched_path,
                        )
                    }
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        // Stub spans mark quiet paths; nothing to log
                        if span.metadata().map(|m| m.level()) == Some(&tracing::Level::TRACE) {
                            return;
                        }
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     _span: &Span| {
                        tracing::error!(
                            error = %error,
                            latency_ms = %latency.as_millis(),
                            "request failed"
                        );
                    },
                ),
        );

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());
    tracing::info!("Swagger UI available at http://localhost:3000/swagger-ui/");
    tracing::info!("OpenAPI spec available at http://localhost:3000/api-docs/openapi.json");

    axum::serve(listener, app).await.unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_unauthed_ping_is_quiet() {
        assert!(is_quiet_path("/api/test/unauthed-ping"));
        assert!(!is_quiet_path("/api/test/ping"));
        assert!(!is_quiet_path("/api/recipes"));
    }

    #[test]
    fn unreachable_collector_is_detected_quickly() {
        // Reserved TEST-NET-1 address, nothing listens there
        assert!(!otlp_collector_reachable("http://192.0.2.1:4317"));
        assert!(!otlp_collector_reachable("not a url"));
    }
}

pub mod dtos;
pub mod handlers;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app_state::AppState,
    extractor::{ArticleRecord, DegradeCause, ExtractionStatus},
    health,
    relay::Accessibility,
};

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::extract_article,
        handlers::probe_article,
        health::health_check,
    ),
    components(schemas(
        ArticleRecord,
        ExtractionStatus,
        DegradeCause,
        Accessibility,
        dtos::ErrorResponse,
        dtos::ProbeResponse,
    )),
    tags(
        (name = "articles", description = "Article extraction through relay providers"),
        (name = "health", description = "Service liveness")
    )
)]
pub struct ApiDoc;

/// Full HTTP surface: routes, API docs, request ids and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/articles/extract", post(handlers::extract_article))
        .route("/v1/articles/probe", post(handlers::probe_article))
        .route("/healthz", get(health::health_check))
        .merge(SwaggerUi::new("/docs").url(OPENAPI_PATH, ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::{
    api::dtos::{ErrorResponse, ExtractArticleRequest, ProbeRequest, ProbeResponse},
    app_state::AppState,
    extractor::{ArticleRecord, ExtractError, ExtractRequest, LogProgress},
};

fn bad_request(error: ExtractError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/v1/articles/extract",
    tag = "articles",
    request_body = ExtractArticleRequest,
    responses(
        (status = 200, description = "Article record, possibly with placeholder content", body = ArticleRecord),
        (status = 400, description = "URL is not an absolute http(s) URL", body = ErrorResponse)
    )
)]
pub async fn extract_article(
    State(state): State<AppState>,
    Json(payload): Json<ExtractArticleRequest>,
) -> Response {
    let request = ExtractRequest::from(payload);

    match state
        .extractor
        .extract_with_progress(&request, Some(&LogProgress))
        .await
    {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => {
            info!(url = %request.url, "Rejected extraction request: {}", error);
            bad_request(error)
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/articles/probe",
    tag = "articles",
    request_body = ProbeRequest,
    responses(
        (status = 200, description = "Advisory reachability of the URL", body = ProbeResponse),
        (status = 400, description = "URL is not an absolute http(s) URL", body = ErrorResponse)
    )
)]
pub async fn probe_article(
    State(state): State<AppState>,
    Json(payload): Json<ProbeRequest>,
) -> Response {
    match state.extractor.probe(&payload.url).await {
        Ok(accessibility) => Json(ProbeResponse {
            url: payload.url,
            accessibility,
        })
        .into_response(),
        Err(error) => bad_request(error),
    }
}

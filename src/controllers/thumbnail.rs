use crate::{
    dto::{
        request::{GenerateThumbnailRequest, MAX_TITLE_CHARS},
        response::{GenerateThumbnailResponse, HealthResponse},
    },
    utils::error::{format_error, AppError},
    ServiceState,
};
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use chrono::Utc;
use garde::Validate;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

type AppResult<T> = Result<T, AppError>;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const GENERATION_FAILED: &str =
    "Image generation failed. The API may be busy or an error occurred.";

const INDEX_PAGE: &str = include_str!("../../assets/index.html");

fn output_filename() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("thumbnail_{}_{}.png", Utc::now().timestamp(), &id[..8])
}

pub async fn generate_thumbnail(
    State(state): State<Arc<ServiceState>>,
    payload: Result<Json<GenerateThumbnailRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) =
        payload.map_err(|e| format_error("Invalid request body", &e, e.status()))?;

    let req = req.normalized();
    req.validate().map_err(|e| {
        format_error(
            &format!("Title must be at most {} characters", MAX_TITLE_CHARS),
            e,
            StatusCode::BAD_REQUEST,
        )
    })?;
    let title = req
        .title
        .as_deref()
        .ok_or_else(|| format_error(TITLE_REQUIRED, "missing title", StatusCode::BAD_REQUEST))?;

    let filename = output_filename();
    let dest = state.config.server.output_dir.join(&filename);
    info!("Generating thumbnail '{}' for the title '{}'.", filename, title);

    if let Err(e) = state.workflow.run(title, &dest).await {
        error!("Thumbnail workflow failed: {}", e);
    }

    // The file on disk is the only success signal.
    if !dest.exists() {
        return Err(format_error(
            GENERATION_FAILED,
            format!("{} was not created", dest.display()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ));
    }

    Ok(Json(GenerateThumbnailResponse {
        image_url: state.config.server.public_url(&filename),
    }))
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

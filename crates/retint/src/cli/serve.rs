//! The `retint serve` command: the HTTP surface over the pipeline.
//!
//! - `POST /correct` with `{"path": name}` corrects one downloaded file.
//! - `GET /last-image` runs a fetch-only batch and returns the latest download.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Args;
use retint_core::{BatchMode, Config, Coordinator, OutputKind};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use super::correct::PathResponse;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address (overrides server.bind)
    #[arg(long)]
    pub bind: Option<String>,
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    corrector: Arc<Coordinator>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            corrector: Arc::new(Coordinator::offline(config.clone())),
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CorrectRequest {
    path: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Build the router with CORS applied to every route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/correct", post(correct_handler))
        .route("/last-image", get(last_image_handler))
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .with_state(state)
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    config.validate()?;

    let listener = TcpListener::bind(&config.server.bind).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    let app = router(AppState::new(config));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}

/// POST /correct
async fn correct_handler(
    State(state): State<AppState>,
    payload: Result<Json<CorrectRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::debug!("Rejected /correct body: {rejection}");
            return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    match state.corrector.correct_file(&request.path).await {
        Ok(corrected) => Json(PathResponse {
            path: Some(
                state
                    .corrector
                    .public_url(OutputKind::Corrected, &corrected.file_name),
            ),
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Correcting {} failed: {e}", request.path);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing image: {e}"),
            )
        }
    }
}

/// GET /last-image
async fn last_image_handler(State(state): State<AppState>) -> Response {
    let result = match Coordinator::connect((*state.config).clone()).await {
        Ok(coordinator) => coordinator.run_batch(BatchMode::FetchOnly).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(result) => {
            if result.failed() > 0 {
                tracing::warn!("{} of {} downloads failed", result.failed(), result.total());
            }
            let path = result
                .representative
                .as_deref()
                .map(|name| state.corrector.public_url(OutputKind::Fetched, name));
            Json(PathResponse { path }).into_response()
        }
        Err(e) => {
            tracing::error!("Fetch batch failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let origin = &state.config.server.cors_origin;
    if origin.is_empty() {
        return response;
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => {
            let headers = response.headers_mut();
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("POST, GET, OPTIONS"),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type"),
            );
        }
        Err(_) => tracing::warn!("server.cors_origin is not a valid header value: {origin}"),
    }
    response
}

//! HTTP route handlers: the page itself and the per-session intent API.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, Json};
use axum::routing::{get, post, put};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use lawxygen::content::SiteContent;
use lawxygen::controller::ConsultationSnapshot;
use lawxygen::core::carousel::{CarouselState, NavOutcome, Navigation};
use lawxygen::core::types::FormField;
use lawxygen::render::{PageView, current_year};

use crate::error::{ApiError, ErrorCode};
use crate::sse;
use crate::state::AppState;

/// Page, API, and event routes. Static assets are mounted by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page))
        .nest("/api", api_router())
        .route("/events/{id}", get(sse::events_handler))
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/content", get(content))
        .route("/sessions/{id}/carousel", get(carousel))
        .route("/sessions/{id}/carousel/next", post(carousel_next))
        .route("/sessions/{id}/carousel/prev", post(carousel_prev))
        .route("/sessions/{id}/carousel/select/{index}", post(carousel_select))
        .route("/sessions/{id}/consultation", get(consultation))
        .route(
            "/sessions/{id}/consultation/fields/{field}",
            put(update_field),
        )
        .route("/sessions/{id}/consultation/submit", post(submit))
        .route("/sessions/{id}/close", post(close))
}

/// GET / - open a session and render the page bound to it. Past the
/// session limit the page renders in its initial state with no session.
async fn page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let config = state.config();
    let (session_id, carousel, consultation) = match state.open_session()? {
        Some((id, controllers)) => (
            Some(id.to_string()),
            controllers.carousel.current(),
            controllers.consultation.current(),
        ),
        None => {
            let carousel = CarouselState::new(state.content.testimonials.len())
                .map_err(|err| ApiError::new(ErrorCode::Unavailable, err.to_string()))?;
            (None, carousel, ConsultationSnapshot::default())
        }
    };
    let html = state
        .renderer
        .render_page(&PageView {
            config: &config,
            content: &state.content,
            carousel,
            consultation: &consultation,
            session_id: session_id.as_deref(),
            year: current_year(),
        })
        .map_err(|err| ApiError::new(ErrorCode::Unavailable, format!("{:#}", err)))?;
    Ok(Html(html))
}

async fn health() -> &'static str {
    "ok"
}

/// GET /api/content - static site copy.
async fn content(State(state): State<AppState>) -> Json<SiteContent> {
    Json(state.content.as_ref().clone())
}

#[derive(Debug, Serialize)]
struct NavResponse {
    #[serde(flatten)]
    outcome: NavOutcome,
    carousel: CarouselState,
}

async fn carousel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CarouselState>, ApiError> {
    let controllers = state.session(id)?;
    Ok(Json(controllers.carousel.snapshot().await?))
}

async fn carousel_next(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NavResponse>, ApiError> {
    navigate(&state, id, Navigation::Next).await
}

async fn carousel_prev(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NavResponse>, ApiError> {
    navigate(&state, id, Navigation::Prev).await
}

async fn carousel_select(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<NavResponse>, ApiError> {
    navigate(&state, id, Navigation::Select(index)).await
}

async fn navigate(
    state: &AppState,
    id: Uuid,
    nav: Navigation,
) -> Result<Json<NavResponse>, ApiError> {
    let controllers = state.session(id)?;
    let outcome = controllers.carousel.navigate(nav).await?;
    let carousel = controllers.carousel.snapshot().await?;
    debug!(session = %id, ?nav, ?outcome, "carousel intent");
    Ok(Json(NavResponse { outcome, carousel }))
}

async fn consultation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConsultationSnapshot>, ApiError> {
    let controllers = state.session(id)?;
    Ok(Json(controllers.consultation.snapshot().await?))
}

#[derive(Debug, Deserialize)]
struct FieldValue {
    value: String,
}

/// PUT /api/sessions/:id/consultation/fields/:field
async fn update_field(
    State(state): State<AppState>,
    Path((id, field)): Path<(Uuid, String)>,
    Json(body): Json<FieldValue>,
) -> Result<Json<ConsultationSnapshot>, ApiError> {
    let field: FormField = field.parse()?;
    let controllers = state.session(id)?;
    controllers.consultation.update_field(field, body.value).await?;
    Ok(Json(controllers.consultation.snapshot().await?))
}

/// POST /api/sessions/:id/consultation/submit - accepted once `Submitting`.
async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ConsultationSnapshot>), ApiError> {
    let controllers = state.session(id)?;
    controllers.consultation.submit().await?;
    let snapshot = controllers.consultation.snapshot().await?;
    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

async fn close(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.close_session(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::session_not_found())
    }
}

//! # cf-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the services.
//! Every failure travels as an explicit [`ApiError`] carrying the domain
//! error; there is no out-of-band error channel.

use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use askama::Template;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use cf_core::error::AppError;
use cf_core::models::{ItemDraft, ItemKind, ItemStatus, SessionUser};
use cf_core::traits::ItemRepo;
use cf_services::{AuthSessions, ItemLifecycle, MatchGateway};
use cf_ui::{IndexTemplate, ItemView, ItemsTemplate};

/// State shared across all workers. Constructed once in the binary and
/// injected; components never reach for module-level singletons.
pub struct AppState {
    pub items: Arc<dyn ItemRepo>,
    pub lifecycle: ItemLifecycle,
    pub matching: MatchGateway,
    pub sessions: AuthSessions,
}

/// Wraps [`AppError`] with its HTTP mapping.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound(_, _) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ExternalCallFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.0.is_transient() {
            log::warn!("transient failure: {}", self.0);
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.0.to_string() }))
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct ListQuery {
    status: Option<String>,
}

#[derive(Deserialize)]
pub struct SignUpForm {
    full_name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct SignInForm {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct MatchForm {
    lost_id: Uuid,
    found_id: Uuid,
}

#[derive(Serialize)]
pub struct SessionResponse {
    token: String,
    user: SessionUser,
}

#[derive(Serialize)]
pub struct SimilarResponse {
    similar_item_ids: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct ItemsPageQuery {
    kind: Option<String>,
    category: Option<String>,
    q: Option<String>,
}

// ---------------------------------------------------------------------------
// Auth helper
// ---------------------------------------------------------------------------

/// Resolves the `Authorization: Bearer` token to a session identity.
async fn require_session(state: &AppState, req: &HttpRequest) -> Result<SessionUser, ApiError> {
    let denied = || ApiError(AppError::Unauthorized("sign in to continue".into()));
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(denied)?;
    state
        .sessions
        .resolve_token(token)
        .await?
        .ok_or_else(denied)
}

// ---------------------------------------------------------------------------
// Item handlers
// ---------------------------------------------------------------------------

pub async fn list_items(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let kind: ItemKind = path.into_inner().parse()?;
    let status = query
        .into_inner()
        .status
        .map(|s| s.parse::<ItemStatus>())
        .transpose()?;
    let items = state.items.list_items(kind, status).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn create_item(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    draft: web::Json<ItemDraft>,
) -> Result<HttpResponse, ApiError> {
    let kind: ItemKind = path.into_inner().parse()?;
    let user = require_session(&state, &req).await?;
    let item = state.lifecycle.submit(kind, draft.into_inner(), &user).await?;
    Ok(HttpResponse::Created().json(item))
}

pub async fn mark_returned(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let user = require_session(&state, &req).await?;
    let item = state.lifecycle.mark_returned(path.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn mark_resolved(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let user = require_session(&state, &req).await?;
    let item = state.lifecycle.mark_resolved(path.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(item))
}

// ---------------------------------------------------------------------------
// Matching handlers
// ---------------------------------------------------------------------------

pub async fn match_pair(
    state: web::Data<AppState>,
    form: web::Json<MatchForm>,
) -> Result<HttpResponse, ApiError> {
    let judgment = state.matching.score_pair(form.lost_id, form.found_id).await?;
    Ok(HttpResponse::Ok().json(judgment))
}

pub async fn find_similar(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let similar_item_ids = state.matching.find_similar(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(SimilarResponse { similar_item_ids }))
}

// ---------------------------------------------------------------------------
// Auth handlers
// ---------------------------------------------------------------------------

pub async fn sign_up(
    state: web::Data<AppState>,
    form: web::Json<SignUpForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    let (user, token) = state
        .sessions
        .sign_up(&form.full_name, &form.email, &form.password)
        .await?;
    Ok(HttpResponse::Created().json(SessionResponse { token, user }))
}

pub async fn sign_in(
    state: web::Data<AppState>,
    form: web::Json<SignInForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    let (user, token) = state.sessions.sign_in(&form.email, &form.password).await?;
    Ok(HttpResponse::Ok().json(SessionResponse { token, user }))
}

pub async fn session(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = require_session(&state, &req).await?;
    Ok(HttpResponse::Ok().json(user))
}

// ---------------------------------------------------------------------------
// Server-rendered pages
// ---------------------------------------------------------------------------

pub async fn index_page(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let lost_count = state.items.list_items(ItemKind::Lost, None).await?.len();
    let found_count = state.items.list_items(ItemKind::Found, None).await?.len();
    render(IndexTemplate {
        lost_count,
        found_count,
    })
}

pub async fn items_page(
    state: web::Data<AppState>,
    query: web::Query<ItemsPageQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let kind: ItemKind = query.kind.as_deref().unwrap_or("lost").parse()?;
    let category = query.category.unwrap_or_default();
    let needle = query.q.unwrap_or_default().trim().to_lowercase();

    let items = state.items.list_items(kind, None).await?;
    let views: Vec<ItemView> = items
        .iter()
        .filter(|i| category.is_empty() || i.category.as_str() == category)
        .filter(|i| {
            needle.is_empty()
                || i.name.to_lowercase().contains(&needle)
                || i.description.to_lowercase().contains(&needle)
        })
        .map(ItemView::from)
        .collect();

    render(ItemsTemplate {
        title: match kind {
            ItemKind::Lost => "Lost Items".to_string(),
            ItemKind::Found => "Found Items".to_string(),
        },
        kind: kind.to_string(),
        items: views,
        category,
        query: needle,
    })
}

fn render(template: impl Template) -> Result<HttpResponse, ApiError> {
    let html = template
        .render()
        .map_err(|e| ApiError(AppError::Internal(format!("template rendering failed: {e}"))))?;
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

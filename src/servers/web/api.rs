//! JSON API under `/api`.
//!
//! Reads are public and return visible rows only; `?all=true` adds hidden
//! rows for a logged-in admin. Writes need the admin session cookie.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::error::ApiError;
use super::extract::{AdminSession, ClientIp, MaybeSession};
use super::WebState;
use crate::database::{Destination, DestinationInput, Package, PackageInput};

pub fn routes() -> Router<WebState> {
    Router::new()
        .route(
            "/api/destinations",
            get(list_destinations).post(create_destination),
        )
        .route(
            "/api/destinations/{id}",
            get(get_destination)
                .put(update_destination)
                .delete(delete_destination),
        )
        .route("/api/packages", get(list_packages).post(create_package))
        .route(
            "/api/packages/{id}",
            get(get_package).put(update_package).delete(delete_package),
        )
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    all: bool,
}

fn success() -> Json<serde_json::Value> {
    Json(json!({ "success": true }))
}

// ============================================
// Destinations
// ============================================

async fn list_destinations(
    State(state): State<WebState>,
    MaybeSession(session): MaybeSession,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Destination>>, ApiError> {
    let Query(query) = query?;
    let include_inactive = query.all && session.is_some();
    let rows = state
        .store
        .list_destinations(include_inactive)
        .await
        .map_err(|e| ApiError::store("fetch destinations", e))?;
    Ok(Json(rows))
}

async fn get_destination(
    State(state): State<WebState>,
    Path(id): Path<String>,
) -> Result<Json<Destination>, ApiError> {
    let row = state
        .store
        .get_destination(&id)
        .await
        .map_err(|e| ApiError::store("fetch destination", e))?;
    Ok(Json(row))
}

async fn create_destination(
    State(state): State<WebState>,
    AdminSession(_): AdminSession,
    body: Result<Json<DestinationInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Destination>), ApiError> {
    let Json(input) = body?;
    let draft = input.into_new_draft()?;
    let row = state
        .store
        .create_destination(draft)
        .await
        .map_err(|e| ApiError::store("create destination", e))?;
    tracing::info!("[api] [destination_created] id={}", row.id);
    Ok((StatusCode::CREATED, Json(row)))
}

async fn update_destination(
    State(state): State<WebState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
    body: Result<Json<DestinationInput>, JsonRejection>,
) -> Result<Json<Destination>, ApiError> {
    let Json(input) = body?;
    let current = state
        .store
        .get_destination(&id)
        .await
        .map_err(|e| ApiError::store("update destination", e))?;
    let draft = input.merge_into(&current)?;
    let row = state
        .store
        .update_destination(&id, draft)
        .await
        .map_err(|e| ApiError::store("update destination", e))?;
    tracing::info!("[api] [destination_updated] id={}", row.id);
    Ok(Json(row))
}

async fn delete_destination(
    State(state): State<WebState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store
        .delete_destination(&id)
        .await
        .map_err(|e| ApiError::store("delete destination", e))?;
    tracing::info!("[api] [destination_deleted] id={}", id);
    Ok(success())
}

// ============================================
// Packages
// ============================================

async fn list_packages(
    State(state): State<WebState>,
    MaybeSession(session): MaybeSession,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Package>>, ApiError> {
    let Query(query) = query?;
    let include_inactive = query.all && session.is_some();
    let rows = state
        .store
        .list_packages(include_inactive)
        .await
        .map_err(|e| ApiError::store("fetch packages", e))?;
    Ok(Json(rows))
}

async fn get_package(
    State(state): State<WebState>,
    Path(id): Path<String>,
) -> Result<Json<Package>, ApiError> {
    let row = state
        .store
        .get_package(&id)
        .await
        .map_err(|e| ApiError::store("fetch package", e))?;
    Ok(Json(row))
}

/// Answers 200 rather than 201.
async fn create_package(
    State(state): State<WebState>,
    AdminSession(_): AdminSession,
    body: Result<Json<PackageInput>, JsonRejection>,
) -> Result<Json<Package>, ApiError> {
    let Json(input) = body?;
    let draft = input.into_new_draft()?;
    let row = state
        .store
        .create_package(draft)
        .await
        .map_err(|e| ApiError::store("create package", e))?;
    tracing::info!("[api] [package_created] id={}", row.id);
    Ok(Json(row))
}

async fn update_package(
    State(state): State<WebState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
    body: Result<Json<PackageInput>, JsonRejection>,
) -> Result<Json<Package>, ApiError> {
    let Json(input) = body?;
    let current = state
        .store
        .get_package(&id)
        .await
        .map_err(|e| ApiError::store("update package", e))?;
    let draft = input.merge_into(&current)?;
    let row = state
        .store
        .update_package(&id, draft)
        .await
        .map_err(|e| ApiError::store("update package", e))?;
    tracing::info!("[api] [package_updated] id={}", row.id);
    Ok(Json(row))
}

async fn delete_package(
    State(state): State<WebState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store
        .delete_package(&id)
        .await
        .map_err(|e| ApiError::store("delete package", e))?;
    tracing::info!("[api] [package_deleted] id={}", id);
    Ok(success())
}

// ============================================
// Session
// ============================================

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login(
    State(state): State<WebState>,
    ClientIp(ip): ClientIp,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let token = state.auth.login(ip, &body.username, &body.password).await?;
    let cookie = state.auth.sessions().set_cookie(&token);
    Ok(([(header::SET_COOKIE, cookie)], success()).into_response())
}

async fn logout(State(state): State<WebState>) -> impl IntoResponse {
    let cookie = state.auth.sessions().clear_cookie();
    ([(header::SET_COOKIE, cookie)], success())
}

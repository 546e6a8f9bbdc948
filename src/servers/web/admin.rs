//! Admin console
//!
//! Plain HTML forms over both collections. Every route here except the
//! login page sits behind [`super::middleware::admin_gate`].

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use super::extract::{ClientIp, MaybeSession};
use super::html::admin::{self as pages, is_checked, ListRow};
use super::html::respond;
use super::WebState;
use crate::auth::LoginError;
use crate::database::{
    Collection, Destination, DestinationDraft, DestinationInput, DraftError, Package,
    PackageDraft, PackageInput, StoreError,
};

const HOME_PATH: &str = "/admin/destinations";

pub fn routes() -> Router<WebState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/login", get(login_form).post(login_submit))
        .route("/admin/logout", post(logout))
        .route("/admin/{collection}", get(list).post(create))
        .route("/admin/{collection}/new", get(new_form))
        .route("/admin/{collection}/{id}", post(update))
        .route("/admin/{collection}/{id}/edit", get(edit_form))
        .route("/admin/{collection}/{id}/toggle", post(toggle))
        .route("/admin/{collection}/{id}/delete", post(delete))
}

type FormData = HashMap<String, String>;

/// Why a create or update did not go through.
#[derive(Debug)]
enum Failure {
    Invalid(String),
    Store(StoreError),
}

impl From<DraftError> for Failure {
    fn from(err: DraftError) -> Self {
        Failure::Invalid(err.to_string())
    }
}

impl From<StoreError> for Failure {
    fn from(err: StoreError) -> Self {
        Failure::Store(err)
    }
}

fn not_found(message: &str) -> Response {
    respond(StatusCode::NOT_FOUND, pages::not_found_page(message))
}

fn unknown_collection(slug: &str) -> Response {
    tracing::debug!("[admin] [unknown_collection] {}", slug);
    not_found("There is no such section.")
}

fn store_failure(collection: Collection, action: &str, err: StoreError) -> Response {
    match err {
        StoreError::NotFound(_) => not_found(&format!("{} not found.", collection.title())),
        StoreError::Database(e) => {
            tracing::error!("[admin] [db_error] action={} {} err={}", action, collection, e);
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                pages::error_page(&format!("Failed to {action} {collection}.")),
            )
        }
    }
}

// ============================================
// Form <-> row conversion
// ============================================

fn text(form: &FormData, name: &str) -> Option<String> {
    Some(form.get(name).map(|v| v.trim().to_string()).unwrap_or_default())
}

fn display_order(form: &FormData) -> Result<Option<i32>, Failure> {
    match form.get("display_order").map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| Failure::Invalid("Display order must be a whole number".to_string())),
    }
}

fn destination_input(form: &FormData) -> Result<DestinationInput, Failure> {
    Ok(DestinationInput {
        name_en: text(form, "name_en"),
        name_ar: text(form, "name_ar"),
        days: text(form, "days"),
        nights: text(form, "nights"),
        people: text(form, "people"),
        price: text(form, "price"),
        image: text(form, "image"),
        active: Some(form.get("active").is_some_and(|v| is_checked(v))),
        display_order: display_order(form)?,
    })
}

fn package_input(form: &FormData) -> Result<PackageInput, Failure> {
    Ok(PackageInput {
        name_en: text(form, "name_en"),
        name_ar: text(form, "name_ar"),
        description_en: text(form, "description_en"),
        description_ar: text(form, "description_ar"),
        days: text(form, "days"),
        nights: text(form, "nights"),
        price: text(form, "price"),
        image: text(form, "image"),
        active: Some(form.get("active").is_some_and(|v| is_checked(v))),
        display_order: display_order(form)?,
    })
}

fn destination_values(d: &Destination) -> FormData {
    let mut values = FormData::new();
    for (name, value) in [
        ("name_en", &d.name_en),
        ("name_ar", &d.name_ar),
        ("days", &d.days),
        ("nights", &d.nights),
        ("people", &d.people),
        ("price", &d.price),
        ("image", &d.image),
    ] {
        values.insert(name.to_string(), value.clone());
    }
    values.insert("display_order".to_string(), d.display_order.to_string());
    values.insert("active".to_string(), d.active.to_string());
    values
}

fn package_values(p: &Package) -> FormData {
    let mut values = FormData::new();
    for (name, value) in [
        ("name_en", &p.name_en),
        ("name_ar", &p.name_ar),
        ("description_en", &p.description_en),
        ("description_ar", &p.description_ar),
        ("days", &p.days),
        ("nights", &p.nights),
        ("price", &p.price),
        ("image", &p.image),
    ] {
        values.insert(name.to_string(), value.clone());
    }
    values.insert("display_order".to_string(), p.display_order.to_string());
    values.insert("active".to_string(), p.active.to_string());
    values
}

fn duration(days: &str, nights: &str) -> String {
    if days.is_empty() && nights.is_empty() {
        "-".to_string()
    } else {
        format!("{days} days / {nights} nights")
    }
}

impl From<&Destination> for ListRow {
    fn from(d: &Destination) -> Self {
        ListRow {
            id: d.id.clone(),
            name_en: d.name_en.clone(),
            name_ar: d.name_ar.clone(),
            duration: duration(&d.days, &d.nights),
            price: d.price.clone(),
            active: d.active,
            display_order: d.display_order,
        }
    }
}

impl From<&Package> for ListRow {
    fn from(p: &Package) -> Self {
        ListRow {
            id: p.id.clone(),
            name_en: p.name_en.clone(),
            name_ar: p.name_ar.clone(),
            duration: duration(&p.days, &p.nights),
            price: p.price.clone(),
            active: p.active,
            display_order: p.display_order,
        }
    }
}

// ============================================
// Session pages
// ============================================

async fn dashboard() -> Redirect {
    Redirect::to(HOME_PATH)
}

async fn login_form(MaybeSession(session): MaybeSession) -> Response {
    if session.is_some() {
        return Redirect::to(HOME_PATH).into_response();
    }
    respond(StatusCode::OK, pages::login_page("", None))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login_submit(
    State(state): State<WebState>,
    ClientIp(ip): ClientIp,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth.login(ip, &form.username, &form.password).await {
        Ok(token) => {
            let cookie = state.auth.sessions().set_cookie(&token);
            ([(header::SET_COOKIE, cookie)], Redirect::to(HOME_PATH)).into_response()
        }
        Err(LoginError::InvalidCredentials) => respond(
            StatusCode::UNAUTHORIZED,
            pages::login_page(&form.username, Some("Invalid username or password")),
        ),
        Err(LoginError::LockedOut) => respond(
            StatusCode::TOO_MANY_REQUESTS,
            pages::login_page(
                &form.username,
                Some("Too many failed attempts. Please try again later."),
            ),
        ),
        Err(LoginError::Session(e)) => {
            tracing::error!("[admin] [session_error] {}", e);
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                pages::login_page(&form.username, Some("Login failed, please try again.")),
            )
        }
    }
}

async fn logout(State(state): State<WebState>) -> Response {
    let cookie = state.auth.sessions().clear_cookie();
    ([(header::SET_COOKIE, cookie)], Redirect::to("/admin/login")).into_response()
}

// ============================================
// Collections
// ============================================

async fn list(State(state): State<WebState>, Path(slug): Path<String>) -> Response {
    let Some(collection) = Collection::from_slug(&slug) else {
        return unknown_collection(&slug);
    };
    let rows: Result<Vec<ListRow>, StoreError> = match collection {
        Collection::Destinations => state
            .store
            .list_destinations(true)
            .await
            .map(|rows| rows.iter().map(ListRow::from).collect()),
        Collection::Packages => state
            .store
            .list_packages(true)
            .await
            .map(|rows| rows.iter().map(ListRow::from).collect()),
    };
    match rows {
        Ok(rows) => respond(StatusCode::OK, pages::list_page(collection, &rows)),
        Err(e) => store_failure(collection, "fetch", e),
    }
}

async fn new_form(Path(slug): Path<String>) -> Response {
    let Some(collection) = Collection::from_slug(&slug) else {
        return unknown_collection(&slug);
    };
    let mut values = FormData::new();
    values.insert("display_order".to_string(), "0".to_string());
    values.insert("active".to_string(), "on".to_string());
    respond(StatusCode::OK, pages::form_page(collection, None, &values, None))
}

async fn create_row(state: &WebState, collection: Collection, form: &FormData) -> Result<String, Failure> {
    let id = match collection {
        Collection::Destinations => {
            let draft = destination_input(form)?.into_new_draft()?;
            state.store.create_destination(draft).await?.id
        }
        Collection::Packages => {
            let draft = package_input(form)?.into_new_draft()?;
            state.store.create_package(draft).await?.id
        }
    };
    Ok(id)
}

async fn create(
    State(state): State<WebState>,
    Path(slug): Path<String>,
    Form(form): Form<FormData>,
) -> Response {
    let Some(collection) = Collection::from_slug(&slug) else {
        return unknown_collection(&slug);
    };
    match create_row(&state, collection, &form).await {
        Ok(id) => {
            tracing::info!("[admin] [created] {} id={}", collection, id);
            Redirect::to(&format!("/admin/{}", collection.slug())).into_response()
        }
        Err(Failure::Invalid(msg)) => respond(
            StatusCode::BAD_REQUEST,
            pages::form_page(collection, None, &form, Some(&msg)),
        ),
        Err(Failure::Store(e)) => store_failure(collection, "create", e),
    }
}

async fn edit_form(
    State(state): State<WebState>,
    Path((slug, id)): Path<(String, String)>,
) -> Response {
    let Some(collection) = Collection::from_slug(&slug) else {
        return unknown_collection(&slug);
    };
    let values = match collection {
        Collection::Destinations => state.store.get_destination(&id).await.map(|d| destination_values(&d)),
        Collection::Packages => state.store.get_package(&id).await.map(|p| package_values(&p)),
    };
    match values {
        Ok(values) => respond(
            StatusCode::OK,
            pages::form_page(collection, Some(&id), &values, None),
        ),
        Err(e) => store_failure(collection, "fetch", e),
    }
}

async fn update_row(
    state: &WebState,
    collection: Collection,
    id: &str,
    form: &FormData,
) -> Result<(), Failure> {
    match collection {
        Collection::Destinations => {
            let current = state.store.get_destination(id).await?;
            let draft = destination_input(form)?.merge_into(&current)?;
            state.store.update_destination(id, draft).await?;
        }
        Collection::Packages => {
            let current = state.store.get_package(id).await?;
            let draft = package_input(form)?.merge_into(&current)?;
            state.store.update_package(id, draft).await?;
        }
    }
    Ok(())
}

async fn update(
    State(state): State<WebState>,
    Path((slug, id)): Path<(String, String)>,
    Form(form): Form<FormData>,
) -> Response {
    let Some(collection) = Collection::from_slug(&slug) else {
        return unknown_collection(&slug);
    };
    match update_row(&state, collection, &id, &form).await {
        Ok(()) => {
            tracing::info!("[admin] [updated] {} id={}", collection, id);
            Redirect::to(&format!("/admin/{}", collection.slug())).into_response()
        }
        Err(Failure::Invalid(msg)) => respond(
            StatusCode::BAD_REQUEST,
            pages::form_page(collection, Some(&id), &form, Some(&msg)),
        ),
        Err(Failure::Store(e)) => store_failure(collection, "update", e),
    }
}

async fn toggle_row(state: &WebState, collection: Collection, id: &str) -> Result<bool, StoreError> {
    match collection {
        Collection::Destinations => {
            let current = state.store.get_destination(id).await?;
            let draft = DestinationDraft {
                active: !current.active,
                ..DestinationDraft::from(&current)
            };
            Ok(state.store.update_destination(id, draft).await?.active)
        }
        Collection::Packages => {
            let current = state.store.get_package(id).await?;
            let draft = PackageDraft {
                active: !current.active,
                ..PackageDraft::from(&current)
            };
            Ok(state.store.update_package(id, draft).await?.active)
        }
    }
}

async fn toggle(
    State(state): State<WebState>,
    Path((slug, id)): Path<(String, String)>,
) -> Response {
    let Some(collection) = Collection::from_slug(&slug) else {
        return unknown_collection(&slug);
    };
    match toggle_row(&state, collection, &id).await {
        Ok(active) => {
            tracing::info!("[admin] [toggled] {} id={} active={}", collection, id, active);
            Redirect::to(&format!("/admin/{}", collection.slug())).into_response()
        }
        Err(e) => store_failure(collection, "update", e),
    }
}

async fn delete(
    State(state): State<WebState>,
    Path((slug, id)): Path<(String, String)>,
) -> Response {
    let Some(collection) = Collection::from_slug(&slug) else {
        return unknown_collection(&slug);
    };
    let result = match collection {
        Collection::Destinations => state.store.delete_destination(&id).await,
        Collection::Packages => state.store.delete_package(&id).await,
    };
    match result {
        Ok(()) => {
            tracing::info!("[admin] [deleted] {} id={}", collection, id);
            Redirect::to(&format!("/admin/{}", collection.slug())).into_response()
        }
        Err(e) => store_failure(collection, "delete", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_unchecked_box_means_hidden() {
        let input = package_input(&form(&[("name_en", "Umrah")])).unwrap();
        assert_eq!(input.active, Some(false));
        let input = package_input(&form(&[("active", "on")])).unwrap();
        assert_eq!(input.active, Some(true));
    }

    #[test]
    fn test_display_order_parsing() {
        assert_eq!(display_order(&form(&[("display_order", " 4 ")])).unwrap(), Some(4));
        assert_eq!(display_order(&form(&[("display_order", "")])).unwrap(), None);
        assert!(matches!(
            display_order(&form(&[("display_order", "top")])),
            Err(Failure::Invalid(_))
        ));
    }

    #[test]
    fn test_destination_form_missing_fields() {
        let input = destination_input(&form(&[("name_en", "Bali"), ("name_ar", "بالي")])).unwrap();
        let err = input.into_new_draft().unwrap_err();
        assert_eq!(
            err,
            DraftError::Missing(vec!["days", "nights", "people", "price", "image"])
        );
    }

    #[test]
    fn test_duration() {
        assert_eq!(duration("5", "4"), "5 days / 4 nights");
        assert_eq!(duration("", ""), "-");
    }

    #[tokio::test]
    async fn test_database_failure_renders_error_page() {
        let err = StoreError::Database(sqlx::Error::PoolTimedOut);
        let response = store_failure(Collection::Packages, "delete", err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Failed to delete package."));
        assert!(!html.contains("Not found"));
    }
}

//! Public site routes: locale redirect, home page, the two visitor forms.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};

use super::html::site::{HomePage, Notice};
use super::html::{self, document, Esc, Shell};
use super::WebState;
use crate::i18n::Locale;

const STYLESHEET: &str = include_str!("../../../assets/site.css");

pub fn routes() -> Router<WebState> {
    Router::new()
        .route("/", get(root))
        .route("/static/site.css", get(stylesheet))
        .route("/{locale}", get(home))
        .route("/{locale}/contact", post(contact))
        .route("/{locale}/newsletter", post(newsletter))
}

async fn root(State(state): State<WebState>) -> Redirect {
    Redirect::temporary(&format!("/{}", state.config.default_locale()))
}

async fn stylesheet() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        STYLESHEET,
    )
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct HomeQuery {
    packages: Option<String>,
    sent: Option<String>,
    error: Option<String>,
}

async fn home(
    State(state): State<WebState>,
    Path(locale): Path<String>,
    Query(query): Query<HomeQuery>,
) -> Response {
    let Ok(locale) = locale.parse::<Locale>() else {
        return not_found(&state);
    };

    let destinations = state
        .store
        .list_destinations(false)
        .await
        .map_err(|e| tracing::error!("[web] [home] destinations: {}", e))
        .ok();
    let packages = state
        .store
        .list_packages(false)
        .await
        .map_err(|e| tracing::error!("[web] [home] packages: {}", e))
        .ok();

    let page = HomePage {
        locale,
        translations: &state.translations,
        config: &state.config,
        destinations: destinations.as_deref(),
        packages: packages.as_deref(),
        all_packages: query.packages.as_deref() == Some("all"),
        notice: Notice::from_query(query.sent.as_deref(), query.error.as_deref()),
    };
    html::respond(StatusCode::OK, page.render())
}

/// Required form values, trimmed; `None` if any is blank.
fn required<'a>(form: &'a HashMap<String, String>, names: &[&str]) -> Option<Vec<&'a str>> {
    names
        .iter()
        .map(|name| form.get(*name).map(|v| v.trim()).filter(|v| !v.is_empty()))
        .collect()
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((user, domain)) => !user.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

async fn contact(
    State(state): State<WebState>,
    Path(locale): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let Ok(locale) = locale.parse::<Locale>() else {
        return not_found(&state);
    };
    match required(&form, &["name", "phone", "email", "subject", "comment"]) {
        Some(values) if looks_like_email(values[2]) => {
            tracing::info!(
                "[web] [contact] locale={} name={} phone={} email={} subject={} comment_len={}",
                locale,
                values[0],
                values[1],
                values[2],
                values[3],
                values[4].len()
            );
            Redirect::to(&format!("/{locale}?sent=contact#contact")).into_response()
        }
        _ => Redirect::to(&format!("/{locale}?error=contact#contact")).into_response(),
    }
}

async fn newsletter(
    State(state): State<WebState>,
    Path(locale): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let Ok(locale) = locale.parse::<Locale>() else {
        return not_found(&state);
    };
    match required(&form, &["name", "email"]) {
        Some(values) if looks_like_email(values[1]) => {
            tracing::info!(
                "[web] [newsletter] locale={} name={} email={}",
                locale,
                values[0],
                values[1]
            );
            Redirect::to(&format!("/{locale}?sent=newsletter#footer")).into_response()
        }
        _ => Redirect::to(&format!("/{locale}?error=newsletter#footer")).into_response(),
    }
}

/// 404 page in the default locale.
pub fn not_found(state: &WebState) -> Response {
    let locale = state.config.default_locale();
    let t = &state.translations;
    let body = format!(
        r#"<main class="not-found container"><h1>404</h1><p><a class="btn btn-primary" href="/{}">{}</a></p></main>"#,
        locale,
        Esc(t.t(locale, "meta.title")),
    );
    let shell = Shell {
        lang: locale.code(),
        dir: locale.dir(),
        title: "404",
        description: "",
        body_class: "site",
    };
    html::respond(StatusCode::NOT_FOUND, document(&shell, &body))
}

pub async fn fallback(State(state): State<WebState>) -> Response {
    not_found(&state)
}

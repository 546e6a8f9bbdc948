use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::WebState;

pub const LOGIN_PATH: &str = "/admin/login";

/// Paths under `/admin` that need a session. The login page itself is open.
pub fn requires_admin(path: &str) -> bool {
    let admin = path == "/admin" || path.starts_with("/admin/");
    admin && path != LOGIN_PATH
}

/// Send anonymous visitors of the admin console to the login page.
pub async fn admin_gate(State(state): State<WebState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if requires_admin(path) && state.auth.session(request.headers()).is_none() {
        tracing::debug!("[web] [admin_gate] redirect path={}", path);
        return Redirect::to(LOGIN_PATH).into_response();
    }
    next.run(request).await
}

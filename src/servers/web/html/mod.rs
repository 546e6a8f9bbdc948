//! Server-rendered markup
//!
//! Pages are built with `write!` into a `String`. Anything that did not come
//! from this module goes through [`Esc`].

use std::fmt::{self, Write};

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

pub mod admin;
pub mod site;

pub type Render = Result<String, fmt::Error>;

/// Escapes text for element content and double- or single-quoted attributes.
pub struct Esc<'a>(pub &'a str);

impl fmt::Display for Esc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(pos) = rest.find(['&', '<', '>', '"', '\'']) {
            f.write_str(&rest[..pos])?;
            f.write_str(match rest.as_bytes()[pos] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'"' => "&quot;",
                _ => "&#39;",
            })?;
            rest = &rest[pos + 1..];
        }
        f.write_str(rest)
    }
}

pub fn escape(text: &str) -> String {
    Esc(text).to_string()
}

/// Document head fields.
pub struct Shell<'a> {
    pub lang: &'a str,
    pub dir: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub body_class: &'a str,
}

pub fn document(shell: &Shell<'_>, body: &str) -> Render {
    let mut out = String::with_capacity(body.len() + 512);
    write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"{}\" dir=\"{}\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n",
        Esc(shell.lang),
        Esc(shell.dir),
        Esc(shell.title),
    )?;
    if !shell.description.is_empty() {
        writeln!(out, "<meta name=\"description\" content=\"{}\">", Esc(shell.description))?;
    }
    write!(
        out,
        "<link rel=\"stylesheet\" href=\"/static/site.css\">\n</head>\n<body class=\"{}\">\n{}\n</body>\n</html>\n",
        Esc(shell.body_class),
        body,
    )?;
    Ok(out)
}

/// Turn a rendered page into a response, or a bare 500 if rendering failed.
pub fn respond(status: StatusCode, page: Render) -> Response {
    match page {
        Ok(markup) => (status, Html(markup)).into_response(),
        Err(e) => {
            tracing::error!("[web] [render_failed] {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

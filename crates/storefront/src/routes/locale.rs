//! Language switcher.

use axum::{Form, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use souq_core::Locale;

use crate::error::{AppError, Result};
use crate::models::session_keys;

/// Language switcher form data.
#[derive(Debug, Deserialize)]
pub struct LocaleForm {
    pub locale: String,
    /// Page to return to.
    #[serde(default)]
    pub next: String,
}

/// Only same-site paths are followed back.
fn return_path(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

/// Switch the session locale and go back to the page.
#[instrument(skip(session))]
pub async fn switch(session: Session, Form(form): Form<LocaleForm>) -> Result<Redirect> {
    let locale = Locale::from_tag(&form.locale)
        .ok_or_else(|| AppError::BadRequest(format!("Unsupported language: {}", form.locale)))?;
    session.insert(session_keys::LOCALE, locale).await?;
    Ok(Redirect::to(return_path(&form.next)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_path_stays_on_site() {
        assert_eq!(return_path("/products?page=2"), "/products?page=2");
        assert_eq!(return_path("https://evil.example"), "/");
        assert_eq!(return_path("//evil.example"), "/");
        assert_eq!(return_path("/\\evil.example"), "/");
        assert_eq!(return_path(""), "/");
    }
}

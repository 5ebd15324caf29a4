//! Authentication route handlers.
//!
//! Login exchanges phone + password for a backend bearer token, which is
//! kept in the session together with the customer summary. The storefront
//! never sees or stores passwords beyond forwarding them once.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::context::{PageContext, set_flash};
use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::forms::FieldErrors;
use crate::htmx::{HX_REDIRECT, HxRequest};
use crate::middleware::{
    CspNonce, LOGIN_PATH, OptionalCustomer, clear_current_customer, current_customer, set_current_customer,
};
use crate::models::CurrentCustomer;
use crate::state::AppState;

/// Where customers land after signing in or out.
const HOME_PATH: &str = "/";

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginForm {
    /// Check both fields are filled in.
    fn validate(self) -> std::result::Result<(String, SecretString), FieldErrors> {
        let mut errors = FieldErrors::new();
        let phone = self.phone.trim().to_string();
        if phone.is_empty() {
            errors.add("phone", "Please enter your phone number.");
        }
        if self.password.is_empty() {
            errors.add("password", "Please enter your password.");
        }
        if errors.is_empty() {
            Ok((phone, SecretString::from(self.password)))
        } else {
            Err(errors)
        }
    }
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub phone: String,
    pub errors: FieldErrors,
}

/// Display the login page.
///
/// HTMX requests land here after a session expired mid-page; they get an
/// `HX-Redirect` so the whole page navigates instead of swapping the form
/// into a fragment.
#[instrument(skip_all)]
pub async fn login_page(
    OptionalCustomer(customer): OptionalCustomer,
    HxRequest(is_htmx): HxRequest,
    page: PageContext,
    CspNonce(nonce): CspNonce,
) -> Response {
    if is_htmx {
        return (
            [(HX_REDIRECT, HeaderValue::from_static(LOGIN_PATH))],
            StatusCode::NO_CONTENT,
        )
            .into_response();
    }
    // The page context drops revoked tokens, so only a live session redirects
    if customer.is_some() && page.is_authenticated() {
        return Redirect::to(HOME_PATH).into_response();
    }

    LoginTemplate {
        page,
        nonce,
        phone: String::new(),
        errors: FieldErrors::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    CspNonce(nonce): CspNonce,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let submitted_phone = form.phone.trim().to_string();

    let errors = match form.validate() {
        Ok((phone, password)) => {
            match state
                .market()
                .login(&page.caller(), &phone, password.expose_secret())
                .await
            {
                Ok(response) => {
                    let customer = CurrentCustomer::new(&response.user, response.token);
                    set_current_customer(&session, &customer).await?;
                    set_sentry_user(&customer.id);
                    add_breadcrumb("auth", "Signed in", None);
                    tracing::info!(customer_id = %customer.id, "Customer signed in");
                    return Ok(Redirect::to(HOME_PATH).into_response());
                }
                Err(err) => {
                    let Some(errors) = err.field_errors().cloned() else {
                        return Err(AppError::from(err));
                    };
                    tracing::warn!("Login rejected");
                    if errors.is_empty() {
                        FieldErrors::new().with("phone", err.user_message())
                    } else {
                        errors
                    }
                }
            }
        }
        Err(errors) => errors,
    };

    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        LoginTemplate {
            page,
            nonce,
            phone: submitted_phone,
            errors,
        },
    )
        .into_response())
}

/// Sign out: revoke the token at the backend and forget it here.
///
/// The session is cleared even when the backend call fails.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    if let Some(customer) = current_customer(&session).await {
        let caller = customer.caller(state.config().default_locale);
        if let Err(e) = state.market().logout(&caller).await {
            tracing::warn!(error = %e, "Backend logout failed");
        }
        tracing::info!(customer_id = %customer.id, "Customer signed out");
    }

    clear_current_customer(&session).await?;
    session.cycle_id().await?;
    clear_sentry_user();
    set_flash(&session, "You have been signed out.").await;
    Ok(Redirect::to(HOME_PATH))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(phone: &str, password: &str) -> LoginForm {
        serde_json::from_value(serde_json::json!({ "phone": phone, "password": password }))
            .unwrap()
    }

    #[test]
    fn test_login_form_requires_both_fields() {
        let errors = form("  ", "").validate().unwrap_err();
        assert!(errors.has("phone"));
        assert!(errors.has("password"));
    }

    #[test]
    fn test_login_form_trims_phone() {
        let (phone, password) = form(" 01012345678 ", "secret").validate().unwrap();
        assert_eq!(phone, "01012345678");
        assert_eq!(password.expose_secret(), "secret");
    }

    #[test]
    fn test_login_form_debug_redacts_password() {
        let debug = format!("{:?}", form("01012345678", "hunter22"));
        assert!(!debug.contains("hunter22"));
    }
}

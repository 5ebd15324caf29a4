//! Driver application: the "become a driver" upgrade path.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::context::{PageContext, set_flash};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::forms::FieldErrors;
use crate::middleware::{CspNonce, RequireCustomer};
use crate::services::roles::{DRIVER_APPLICATION_PATH, DriverApplicationForm, DriverApplicationView};
use crate::state::AppState;

/// Vehicle choices offered on the form.
pub const VEHICLE_TYPES: &[(&str, &str)] = &[
    ("motorcycle", "Motorcycle"),
    ("bicycle", "Bicycle"),
    ("car", "Car"),
];

/// Driver application page template.
#[derive(Template, WebTemplate)]
#[template(path = "driver_application.html")]
pub struct DriverApplicationTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub application: DriverApplicationView,
    pub form: DriverApplicationForm,
    pub errors: FieldErrors,
    pub vehicle_types: &'static [(&'static str, &'static str)],
}

impl DriverApplicationTemplate {
    #[must_use]
    pub fn vehicle_selected(&self, value: &str) -> bool {
        self.form.vehicle_type == value
    }
}

/// Show the application status and, when allowed, the form.
#[instrument(skip(state, page, nonce, customer), fields(customer_id = %customer.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let application = state.market().driver_application(&page.caller()).await?;

    Ok(DriverApplicationTemplate {
        application: DriverApplicationView::from(application.as_ref()),
        page,
        nonce,
        form: DriverApplicationForm::default(),
        errors: FieldErrors::new(),
        vehicle_types: VEHICLE_TYPES,
    })
}

/// Submit the application.
#[instrument(skip(state, session, page, nonce, customer, form), fields(customer_id = %customer.id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    page: PageContext,
    CspNonce(nonce): CspNonce,
    Form(form): Form<DriverApplicationForm>,
) -> Result<Response> {
    let caller = page.caller();
    let current = state.market().driver_application(&caller).await?;
    let application = DriverApplicationView::from(current.as_ref());

    let errors = if application.can_apply {
        match form.validate() {
            Ok(request) => match state.market().submit_driver_application(&caller, &request).await {
                Ok(_) => {
                    add_breadcrumb("roles", "Submitted driver application", None);
                    set_flash(&session, "Your driver application was submitted.").await;
                    return Ok(Redirect::to(DRIVER_APPLICATION_PATH).into_response());
                }
                Err(err) => {
                    let Some(errors) = err.field_errors().cloned() else {
                        return Err(err.into());
                    };
                    errors
                }
            },
            Err(errors) => errors,
        }
    } else {
        FieldErrors::new().with("application", application.hint.clone())
    };

    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        DriverApplicationTemplate {
            application,
            page,
            nonce,
            form,
            errors,
            vehicle_types: VEHICLE_TYPES,
        },
    )
        .into_response())
}

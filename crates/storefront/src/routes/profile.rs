//! Customer profile: details form, avatar upload and live avatar preview.
//!
//! The form is posted as multipart so the avatar file travels with the text
//! fields. Oversized or non-image files are reported inline next to the
//! avatar input rather than failing the request.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{instrument, warn};

use souq_core::{AreaId, GovernorateId};

use crate::backend::{AvatarUpload, Caller, Customer, MarketClient};
use crate::context::{DisplayFormat, PageContext, initials, set_flash};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::forms::FieldErrors;
use crate::middleware::{CspNonce, RequireCustomer, set_current_customer};
use crate::routes::listing_page::OptionView;
use crate::routes::lookup::area_options;
use crate::services::profile::{AvatarError, ProfileForm, avatar_data_url};
use crate::state::AppState;

pub const PATH: &str = "/profile";

/// Multipart field carrying the avatar file.
const AVATAR_FIELD: &str = "avatar";

/// Fields shown on the profile form.
const FORM_FIELDS: &[&str] = &["name", "phone", "address", "governorate_id", "area_id", "avatar"];

/// Profile form data for templates.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub avatar_url: Option<String>,
    pub initials: String,
    pub is_verified: bool,
    pub governorates: Vec<OptionView>,
    pub areas: Vec<OptionView>,
}

impl ProfileView {
    fn from_customer(customer: &Customer, format: &DisplayFormat) -> Self {
        Self {
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone().unwrap_or_default(),
            avatar_url: format.image(customer.avatar.as_deref()),
            initials: initials(&customer.name),
            is_verified: customer.is_verified,
            governorates: Vec::new(),
            areas: Vec::new(),
        }
    }

    /// Keep what the customer typed after a rejected submission.
    fn with_submitted(mut self, form: &ProfileForm) -> Self {
        self.name.clone_from(&form.name);
        self.phone.clone_from(&form.phone);
        self.address.clone_from(&form.address);
        self
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub profile: ProfileView,
    pub errors: FieldErrors,
    /// Backend messages for fields the form does not show.
    pub other_errors: Vec<String>,
}

/// Avatar preview fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/avatar_preview.html")]
pub struct AvatarPreviewTemplate {
    pub preview: Option<String>,
    pub error: Option<String>,
}

/// Governorate and area options with the given selection.
async fn location_choices(
    market: &MarketClient,
    caller: &Caller,
    governorate_id: Option<GovernorateId>,
    area_id: Option<AreaId>,
) -> (Vec<OptionView>, Vec<OptionView>) {
    let governorates = market.governorates(caller).await.unwrap_or_else(|e| {
        warn!(error = %e, "Governorate lookup failed");
        Vec::new()
    });
    let areas = market.areas(caller).await.unwrap_or_else(|e| {
        warn!(error = %e, "Area lookup failed");
        Vec::new()
    });

    let governorates = governorates
        .into_iter()
        .map(|g| OptionView {
            value: g.id.to_string(),
            selected: Some(g.id) == governorate_id,
            label: g.name,
        })
        .collect();
    (governorates, area_options(&areas, governorate_id, area_id))
}

/// Read a field's bytes, mapping a broken body to a bad request.
async fn field_bytes(field: Field<'_>) -> Result<Vec<u8>> {
    field
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// Collect the multipart profile form.
///
/// An empty file input (no file chosen) leaves the avatar unchanged.
async fn read_profile_form(mut multipart: Multipart) -> Result<ProfileForm> {
    let mut form = ProfileForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == AVATAR_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field_bytes(field).await?;
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            form.avatar = Some(AvatarUpload {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let bytes = field_bytes(field).await?;
            form.set_field(&name, String::from_utf8_lossy(&bytes).into_owned());
        }
    }

    Ok(form)
}

/// Display the profile form.
#[instrument(skip(state, page, nonce, customer), fields(customer_id = %customer.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let caller = page.caller();
    let details = state.market().profile(&caller).await?.data;

    let (governorates, areas) = location_choices(
        state.market(),
        &caller,
        details.governorate_id,
        details.area_id,
    )
    .await;

    Ok(ProfileTemplate {
        profile: ProfileView {
            governorates,
            areas,
            ..ProfileView::from_customer(&details, &page.format)
        },
        page,
        nonce,
        errors: FieldErrors::new(),
        other_errors: Vec::new(),
    })
}

/// Save the profile.
///
/// On success the session copy of the customer is refreshed so the header
/// and the default city follow the change right away.
#[instrument(skip_all, fields(customer_id = %customer.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireCustomer(mut customer): RequireCustomer,
    session: Session,
    page: PageContext,
    CspNonce(nonce): CspNonce,
    multipart: Multipart,
) -> Result<Response> {
    let caller = page.caller();
    let form = read_profile_form(multipart).await?;
    let submitted = form.clone();

    let errors = match form.validate() {
        Ok(update) => match state.market().update_profile(&caller, update).await {
            Ok(updated) => {
                customer.refresh(&updated);
                set_current_customer(&session, &customer).await?;
                add_breadcrumb("profile", "Updated profile", None);
                set_flash(&session, "Your profile was updated.").await;
                return Ok(Redirect::to(PATH).into_response());
            }
            Err(err) => {
                let Some(errors) = err.field_errors().cloned() else {
                    return Err(err.into());
                };
                errors
            }
        },
        Err(errors) => errors,
    };

    let profile = state.market().profile(&caller).await?;
    let (governorates, areas) = location_choices(
        state.market(),
        &caller,
        submitted.governorate_id,
        submitted.area_id,
    )
    .await;

    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        ProfileTemplate {
            profile: ProfileView {
                governorates,
                areas,
                ..ProfileView::from_customer(&profile.data, &page.format)
            }
            .with_submitted(&submitted),
            other_errors: errors.unattached(FORM_FIELDS),
            errors,
            page,
            nonce,
        },
    )
        .into_response())
}

/// Preview a chosen avatar before saving (HTMX).
///
/// The file is checked the same way the save is and echoed back as a data
/// URL; nothing is stored.
#[instrument(skip_all, fields(customer_id = %customer.id))]
pub async fn avatar_preview(
    RequireCustomer(customer): RequireCustomer,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field_bytes(field).await?;
        return Ok(preview(&content_type, &bytes));
    }

    Ok(AvatarPreviewTemplate {
        preview: None,
        error: Some(AvatarError::Empty.to_string()),
    })
}

fn preview(content_type: &str, bytes: &[u8]) -> AvatarPreviewTemplate {
    match avatar_data_url(content_type, bytes) {
        Ok(url) => AvatarPreviewTemplate {
            preview: Some(url),
            error: None,
        },
        Err(err) => AvatarPreviewTemplate {
            preview: None,
            error: Some(err.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::profile::AVATAR_MAX_BYTES;
    use souq_core::CustomerId;

    #[test]
    fn test_preview_accepts_small_png() {
        let template = preview("image/png", &[0x89, b'P', b'N', b'G']);
        assert!(template.error.is_none());
        assert!(
            template
                .preview
                .is_some_and(|url| url.starts_with("data:image/png;base64,"))
        );
    }

    #[test]
    fn test_preview_reports_oversized_file() {
        let bytes = vec![0_u8; AVATAR_MAX_BYTES + 1];
        let template = preview("image/jpeg", &bytes);
        assert!(template.preview.is_none());
        assert_eq!(
            template.error.as_deref(),
            Some("The avatar may not be larger than 2 MB.")
        );
    }

    #[test]
    fn test_rejected_form_keeps_typed_values() {
        let customer = Customer {
            id: CustomerId::new(1),
            name: "Old Name".to_string(),
            phone: "01000000000".to_string(),
            avatar: None,
            address: None,
            governorate_id: None,
            city_id: None,
            area_id: None,
            is_verified: true,
        };
        let submitted = ProfileForm {
            name: "New Name".to_string(),
            phone: "123".to_string(),
            ..ProfileForm::default()
        };
        let view =
            ProfileView::from_customer(&customer, &DisplayFormat::default()).with_submitted(&submitted);
        assert_eq!(view.name, "New Name");
        assert_eq!(view.phone, "123");
        assert_eq!(view.initials, "ON");
    }
}

//! Saved delivery locations.
//!
//! Coordinates are filled in from a map pick or from the browser's
//! geolocation. The "use my location" button posts each step of the
//! geolocation request to `POST /locations/position`; the answer is the
//! status line, and on success it also carries the latitude and longitude
//! inputs so they are swapped into the form out of band.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use souq_core::{Coordinates, LocationId};

use crate::backend::{BackendError, CustomerLocation};
use crate::context::{PageContext, set_flash};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::forms::FieldErrors;
use crate::middleware::{CspNonce, RequireCustomer};
use crate::services::geolocation::{
    ENABLE_HIGH_ACCURACY, GeolocationStatus, MAXIMUM_AGE_MS, PositionReport, TIMEOUT_MS,
};
use crate::services::locations::NewLocation;
use crate::state::AppState;

const PATH: &str = "/locations";

/// Saved location row data for templates.
#[derive(Debug, Clone)]
pub struct LocationRowView {
    pub label: String,
    pub address: String,
    pub notes: Option<String>,
    pub map_url: Option<String>,
    pub is_default: bool,
    pub delete_href: String,
    pub default_href: String,
}

impl LocationRowView {
    #[must_use]
    pub fn new(location: &CustomerLocation) -> Self {
        Self {
            label: location
                .label
                .clone()
                .filter(|label| !label.trim().is_empty())
                .unwrap_or_else(|| "Saved location".to_string()),
            address: location.address.clone(),
            notes: location.notes.clone(),
            map_url: Coordinates::new(location.latitude, location.longitude)
                .ok()
                .map(|c| c.map_url()),
            is_default: location.is_default,
            delete_href: format!("{PATH}/{}/delete", location.id),
            default_href: format!("{PATH}/{}/default", location.id),
        }
    }
}

/// Geolocation options handed to the browser through `data-*` attributes.
#[derive(Debug, Clone, Copy)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u32,
    pub maximum_age_ms: u32,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: ENABLE_HIGH_ACCURACY,
            timeout_ms: TIMEOUT_MS,
            maximum_age_ms: MAXIMUM_AGE_MS,
        }
    }
}

/// Locations page template: saved list plus the "add location" form.
#[derive(Template, WebTemplate)]
#[template(path = "locations.html")]
pub struct LocationsTemplate {
    pub page: PageContext,
    pub nonce: String,
    pub locations: Vec<LocationRowView>,
    pub form: NewLocation,
    pub errors: FieldErrors,
    pub geolocation: GeolocationOptions,
}

/// Coordinate input value, empty when unset.
fn coordinate_value(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

impl LocationsTemplate {
    #[must_use]
    pub fn latitude_value(&self) -> String {
        coordinate_value(self.form.latitude)
    }

    #[must_use]
    pub fn longitude_value(&self) -> String {
        coordinate_value(self.form.longitude)
    }
}

/// Geolocation status fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/geo_status.html")]
pub struct GeoStatusTemplate {
    pub class: &'static str,
    pub message: String,
    /// Latitude and longitude input values on success.
    pub coordinates: Option<(String, String)>,
}

impl From<GeolocationStatus> for GeoStatusTemplate {
    fn from(status: GeolocationStatus) -> Self {
        Self {
            class: status.css_class(),
            message: status.message(),
            coordinates: status.coordinates().map(|c| {
                (
                    coordinate_value(Some(c.latitude())),
                    coordinate_value(Some(c.longitude())),
                )
            }),
        }
    }
}

async fn render(
    state: &AppState,
    page: PageContext,
    nonce: String,
    form: NewLocation,
    errors: FieldErrors,
) -> Result<LocationsTemplate> {
    let locations = state.market().locations(&page.caller()).await?;
    Ok(LocationsTemplate {
        locations: locations.iter().map(LocationRowView::new).collect(),
        page,
        nonce,
        form,
        errors,
        geolocation: GeolocationOptions::default(),
    })
}

/// Display saved locations and the add form.
#[instrument(skip(state, page, nonce, customer), fields(customer_id = %customer.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    render(&state, page, nonce, NewLocation::default(), FieldErrors::new()).await
}

/// Save a new location.
#[instrument(skip(state, session, page, nonce, customer, form), fields(customer_id = %customer.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    page: PageContext,
    CspNonce(nonce): CspNonce,
    Form(form): Form<NewLocation>,
) -> Result<Response> {
    let errors = match form.validate() {
        Ok(request) => match state.market().create_location(&page.caller(), &request).await {
            Ok(response) => {
                add_breadcrumb("locations", "Saved location", None);
                set_flash(
                    &session,
                    response
                        .message
                        .unwrap_or_else(|| "Location saved.".to_string()),
                )
                .await;
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

    let template = render(&state, page, nonce, form, errors).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
}

/// Delete a saved location.
#[instrument(skip(state, session, page, customer), fields(customer_id = %customer.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    page: PageContext,
    Path(id): Path<LocationId>,
) -> Result<Redirect> {
    let message = match state.market().delete_location(&page.caller(), id).await {
        Ok(response) => response
            .message
            .unwrap_or_else(|| "Location removed.".to_string()),
        Err(err @ BackendError::Rejected(_)) => err.user_message(),
        Err(err) => return Err(AppError::from(err)),
    };
    set_flash(&session, message).await;
    Ok(Redirect::to(PATH))
}

/// Make a saved location the default.
#[instrument(skip(state, session, page, customer), fields(customer_id = %customer.id))]
pub async fn make_default(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    page: PageContext,
    Path(id): Path<LocationId>,
) -> Result<Redirect> {
    let message = match state.market().set_default_location(&page.caller(), id).await {
        Ok(response) => response
            .message
            .unwrap_or_else(|| "Default location updated.".to_string()),
        Err(err @ BackendError::Rejected(_)) => err.user_message(),
        Err(err) => return Err(AppError::from(err)),
    };
    set_flash(&session, message).await;
    Ok(Redirect::to(PATH))
}

/// Render the status line for a geolocation step.
#[instrument(skip(report))]
pub async fn position(Json(report): Json<PositionReport>) -> GeoStatusTemplate {
    GeolocationStatus::from(report).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::geolocation::GeolocationError;

    #[test]
    fn test_location_row_links() {
        let location = CustomerLocation {
            id: LocationId::new(8),
            label: Some("  ".to_string()),
            address: "12 Nile St".to_string(),
            latitude: 30.0444,
            longitude: 31.2357,
            notes: None,
            is_default: true,
        };
        let row = LocationRowView::new(&location);
        assert_eq!(row.label, "Saved location");
        assert_eq!(row.delete_href, "/locations/8/delete");
        assert_eq!(row.default_href, "/locations/8/default");
        assert!(row.map_url.is_some());
    }

    #[test]
    fn test_geo_status_success_fills_inputs() {
        let status = GeolocationStatus::Success(Coordinates::new(30.0444, 31.2357).unwrap());
        let template = GeoStatusTemplate::from(status);
        assert_eq!(template.class, "geo-status--success");
        assert_eq!(
            template.coordinates,
            Some(("30.044400".to_string(), "31.235700".to_string()))
        );
    }

    #[test]
    fn test_geo_status_error_has_no_inputs() {
        let template = GeoStatusTemplate::from(GeolocationStatus::Error(GeolocationError::Timeout));
        assert_eq!(template.class, "geo-status--error");
        assert!(template.coordinates.is_none());
        assert!(template.message.contains("too long"));
    }
}

//! Saved delivery locations.

use serde::Deserialize;

use souq_core::Coordinates;

use crate::backend::LocationRequest;
use crate::forms::{FieldErrors, checkbox, lenient};

/// Fields of the "add location" form, as submitted.
///
/// Latitude and longitude come either from the map pick or from a
/// geolocation fix; both arrive as plain inputs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewLocation {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_default: bool,
}

/// Blank strings become `None`, everything else is trimmed.
fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl NewLocation {
    /// Check the form before anything is sent to the backend.
    ///
    /// # Errors
    ///
    /// Returns the field errors when the address is blank or the coordinates
    /// are missing or out of range.
    pub fn validate(&self) -> Result<LocationRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let address = self.address.trim();
        if address.is_empty() {
            errors.add("address", "Please enter the delivery address.");
        }

        let coordinates = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => match Coordinates::new(latitude, longitude) {
                Ok(coordinates) => Some(coordinates),
                Err(err) => {
                    errors.add("latitude", err.to_string());
                    None
                }
            },
            _ => {
                errors.add(
                    "latitude",
                    "Pick the location on the map or use your current location.",
                );
                None
            }
        };

        match coordinates {
            Some(coordinates) if errors.is_empty() => Ok(LocationRequest {
                label: optional(&self.label),
                address: address.to_string(),
                latitude: coordinates.latitude(),
                longitude: coordinates.longitude(),
                notes: optional(&self.notes),
                is_default: self.is_default,
            }),
            _ => Err(errors),
        }
    }
}

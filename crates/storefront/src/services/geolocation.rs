//! Browser geolocation for the "use my location" button.
//!
//! The browser asks for a position with the options below and reports the
//! outcome to `POST /locations/position`, which answers with the status
//! fragment for the location form.

use serde::Deserialize;

use souq_core::Coordinates;

/// Ask the device for its most accurate fix (GPS over cell/Wi-Fi).
pub const ENABLE_HIGH_ACCURACY: bool = true;

/// Give up after this many milliseconds.
pub const TIMEOUT_MS: u32 = 10_000;

/// Never reuse a cached position.
pub const MAXIMUM_AGE_MS: u32 = 0;

/// Why a position could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unsupported,
}

impl GeolocationError {
    /// Map a `GeolocationPositionError.code`.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }

    /// Message shown under the button.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Location access was denied. Allow it in your browser settings or pick the spot on the map."
            }
            Self::PositionUnavailable => {
                "Your location could not be determined. Pick the spot on the map instead."
            }
            Self::Timeout => "Finding your location took too long. Please try again.",
            Self::Unsupported => "Your browser does not support location detection.",
        }
    }
}

/// State of the geolocation request, as shown in the form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeolocationStatus {
    Loading,
    Success(Coordinates),
    Error(GeolocationError),
}

impl GeolocationStatus {
    /// CSS modifier for the status line.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Loading => "geo-status--loading",
            Self::Success(_) => "geo-status--success",
            Self::Error(_) => "geo-status--error",
        }
    }

    /// Status text.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Loading => "Finding your location…".to_string(),
            Self::Success(coordinates) => format!(
                "Location found ({:.5}, {:.5})",
                coordinates.latitude(),
                coordinates.longitude()
            ),
            Self::Error(error) => error.message().to_string(),
        }
    }

    /// Coordinates to fill into the form, on success.
    #[must_use]
    pub const fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Success(coordinates) => Some(*coordinates),
            Self::Loading | Self::Error(_) => None,
        }
    }
}

/// What the browser reports.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PositionReport {
    Loading,
    Success { latitude: f64, longitude: f64 },
    Error { code: u16 },
    Unsupported,
}

impl From<PositionReport> for GeolocationStatus {
    fn from(report: PositionReport) -> Self {
        match report {
            PositionReport::Loading => Self::Loading,
            PositionReport::Success {
                latitude,
                longitude,
            } => Coordinates::new(latitude, longitude).map_or(
                Self::Error(GeolocationError::PositionUnavailable),
                Self::Success,
            ),
            PositionReport::Error { code } => Self::Error(GeolocationError::from_code(code)),
            PositionReport::Unsupported => Self::Error(GeolocationError::Unsupported),
        }
    }
}

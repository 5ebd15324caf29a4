//! Role upgrades from the customer dashboard.
//!
//! Becoming a driver goes through an application the marketplace reviews;
//! becoming a store owner is a single request.

use serde::Deserialize;

use souq_core::{DriverApplicationStatus, UpgradeRole};

use crate::backend::{DriverApplication, DriverApplicationRequest, RoleUpgradeRequest};
use crate::forms::FieldErrors;

/// Page a driver upgrade navigates to.
pub const DRIVER_APPLICATION_PATH: &str = "/driver-application";

/// What choosing an upgrade does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeAction {
    /// Go to another page.
    Navigate(&'static str),
    /// Send the request to the backend.
    Submit(RoleUpgradeRequest),
}

impl UpgradeAction {
    #[must_use]
    pub const fn for_role(role: UpgradeRole) -> Self {
        match role {
            UpgradeRole::Driver => Self::Navigate(DRIVER_APPLICATION_PATH),
            UpgradeRole::Store => Self::Submit(RoleUpgradeRequest { role }),
        }
    }
}

/// How the dashboard presents the driver application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverApplicationView {
    pub cta_label: &'static str,
    pub badge_class: &'static str,
    pub status_label: &'static str,
    pub hint: String,
    pub can_apply: bool,
}

impl From<Option<&DriverApplication>> for DriverApplicationView {
    fn from(application: Option<&DriverApplication>) -> Self {
        let Some(application) = application else {
            return Self {
                cta_label: "Become a driver",
                badge_class: "badge badge--muted",
                status_label: "Not applied",
                hint: "Deliver orders in your area and earn on your own schedule.".to_string(),
                can_apply: true,
            };
        };

        match application.status {
            DriverApplicationStatus::Pending => Self {
                cta_label: "Application under review",
                badge_class: "badge badge--warning",
                status_label: "Pending",
                hint: "We are reviewing your application. This usually takes a few days."
                    .to_string(),
                can_apply: false,
            },
            DriverApplicationStatus::Rejected => Self {
                cta_label: "Apply again",
                badge_class: "badge badge--danger",
                status_label: "Rejected",
                hint: application
                    .notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|notes| !notes.is_empty())
                    .map_or_else(
                        || "Your application was not approved. You can apply again.".to_string(),
                        str::to_string,
                    ),
                can_apply: true,
            },
            DriverApplicationStatus::Approved => Self {
                cta_label: "You are a driver",
                badge_class: "badge badge--success",
                status_label: "Approved",
                hint: "Your application was approved. Sign in to the driver app to start delivering."
                    .to_string(),
                can_apply: false,
            },
        }
    }
}

/// Driver application form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverApplicationForm {
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub notes: String,
}

impl DriverApplicationForm {
    /// # Errors
    ///
    /// Returns field errors when the vehicle type or licence number is blank.
    pub fn validate(&self) -> Result<DriverApplicationRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        let vehicle_type = self.vehicle_type.trim();
        let license_number = self.license_number.trim();
        if vehicle_type.is_empty() {
            errors.add("vehicle_type", "Please choose your vehicle type.");
        }
        if license_number.is_empty() {
            errors.add("license_number", "Please enter your licence number.");
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let notes = self.notes.trim();
        Ok(DriverApplicationRequest {
            vehicle_type: vehicle_type.to_string(),
            license_number: license_number.to_string(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn application(status: DriverApplicationStatus, notes: Option<&str>) -> DriverApplication {
        DriverApplication {
            status,
            notes: notes.map(str::to_string),
            created_at: None,
        }
    }

    #[test]
    fn test_rejected_with_notes_shows_notes() {
        let app = application(DriverApplicationStatus::Rejected, Some("License photo unreadable"));
        let view = DriverApplicationView::from(Some(&app));
        assert_eq!(view.hint, "License photo unreadable");
        assert!(view.can_apply);
        assert_eq!(view.cta_label, "Apply again");
    }

    #[test]
    fn test_rejected_without_notes_gets_generic_hint() {
        let app = application(DriverApplicationStatus::Rejected, Some("  "));
        let view = DriverApplicationView::from(Some(&app));
        assert!(view.hint.contains("not approved"));
    }

    #[test]
    fn test_pending_and_approved_cannot_apply() {
        let pending = application(DriverApplicationStatus::Pending, Some("ignored"));
        let view = DriverApplicationView::from(Some(&pending));
        assert!(!view.can_apply);
        assert_eq!(view.badge_class, "badge badge--warning");
        assert_ne!(view.hint, "ignored");

        let approved = application(DriverApplicationStatus::Approved, None);
        assert!(!DriverApplicationView::from(Some(&approved)).can_apply);
    }

    #[test]
    fn test_no_application() {
        let view = DriverApplicationView::from(None);
        assert!(view.can_apply);
        assert_eq!(view.cta_label, "Become a driver");
    }

    #[test]
    fn test_upgrade_actions() {
        assert_eq!(
            UpgradeAction::for_role(UpgradeRole::Driver),
            UpgradeAction::Navigate(DRIVER_APPLICATION_PATH)
        );
        assert_eq!(
            UpgradeAction::for_role(UpgradeRole::Store),
            UpgradeAction::Submit(RoleUpgradeRequest {
                role: UpgradeRole::Store
            })
        );
    }

    #[test]
    fn test_application_form() {
        let form = DriverApplicationForm {
            vehicle_type: "motorcycle".to_string(),
            license_number: " ".to_string(),
            notes: String::new(),
        };
        assert!(form.validate().unwrap_err().has("license_number"));

        let form = DriverApplicationForm {
            license_number: "AB-123".to_string(),
            ..form
        };
        let request = form.validate().unwrap();
        assert_eq!(request.notes, None);
    }
}

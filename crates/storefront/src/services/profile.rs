//! Customer profile form: field validation, avatar checks and the area list.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use souq_core::{AreaId, GovernorateId, Phone};

use crate::backend::{Area, AvatarUpload, ProfileUpdate};
use crate::forms::FieldErrors;

/// Largest avatar accepted, in bytes.
pub const AVATAR_MAX_BYTES: usize = 2 * 1024 * 1024;

/// Image types the backend stores as avatars.
const AVATAR_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Why an avatar file was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AvatarError {
    #[error("The avatar must be a JPEG, PNG, GIF or WebP image.")]
    UnsupportedType(String),

    #[error("The avatar may not be larger than 2 MB.")]
    TooLarge(usize),

    #[error("The selected file is empty.")]
    Empty,
}

/// Check an avatar's type and size.
///
/// # Errors
///
/// Returns an [`AvatarError`] for empty files, non-image types and files
/// over [`AVATAR_MAX_BYTES`].
pub fn check_avatar(content_type: &str, size: usize) -> Result<(), AvatarError> {
    let content_type = content_type.trim().to_ascii_lowercase();
    if !AVATAR_TYPES.contains(&content_type.as_str()) {
        return Err(AvatarError::UnsupportedType(content_type));
    }
    if size == 0 {
        return Err(AvatarError::Empty);
    }
    if size > AVATAR_MAX_BYTES {
        return Err(AvatarError::TooLarge(size));
    }
    Ok(())
}

/// Encode a selected avatar as a `data:` URL for the local preview.
///
/// # Errors
///
/// Same as [`check_avatar`].
pub fn avatar_data_url(content_type: &str, bytes: &[u8]) -> Result<String, AvatarError> {
    check_avatar(content_type, bytes.len())?;
    Ok(format!(
        "data:{};base64,{}",
        content_type.trim().to_ascii_lowercase(),
        STANDARD.encode(bytes)
    ))
}

/// Areas that belong to the selected governorate.
#[must_use]
pub fn areas_for_governorate(areas: &[Area], governorate_id: Option<GovernorateId>) -> Vec<Area> {
    let Some(governorate_id) = governorate_id else {
        return Vec::new();
    };
    areas
        .iter()
        .filter(|area| area.governorate_id == Some(governorate_id))
        .cloned()
        .collect()
}

/// Profile form as collected from the multipart body.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub governorate_id: Option<GovernorateId>,
    pub area_id: Option<AreaId>,
    pub avatar: Option<AvatarUpload>,
}

impl ProfileForm {
    /// Store a text field. Unknown names and unparseable ids are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = value,
            "phone" => self.phone = value,
            "address" => self.address = value,
            "governorate_id" => self.governorate_id = value.trim().parse().ok(),
            "area_id" => self.area_id = value.trim().parse().ok(),
            _ => {}
        }
    }

    /// Validate and build the backend request.
    ///
    /// # Errors
    ///
    /// Returns field errors for a blank name, an invalid phone number or a
    /// refused avatar.
    pub fn validate(self) -> Result<ProfileUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.add("name", "Please enter your name.");
        }

        let phone = match Phone::parse(&self.phone) {
            Ok(phone) => Some(phone),
            Err(err) => {
                errors.add("phone", err.to_string());
                None
            }
        };

        if let Some(avatar) = &self.avatar
            && let Err(err) = check_avatar(&avatar.content_type, avatar.bytes.len())
        {
            errors.add("avatar", err.to_string());
        }

        let Some(phone) = phone.filter(|_| errors.is_empty()) else {
            return Err(errors);
        };

        let address = self.address.trim();
        Ok(ProfileUpdate {
            name,
            phone: phone.into_inner(),
            address: (!address.is_empty()).then(|| address.to_string()),
            governorate_id: self.governorate_id,
            area_id: self.area_id,
            avatar: self.avatar,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn area(id: i64, governorate: Option<i64>) -> Area {
        Area {
            id: AreaId::new(id),
            name: format!("Area {id}"),
            governorate_id: governorate.map(GovernorateId::new),
        }
    }

    fn form() -> ProfileForm {
        let mut form = ProfileForm::default();
        form.set_field("name", "Mona Adel".to_string());
        form.set_field("phone", "01012345678".to_string());
        form.set_field("governorate_id", "3".to_string());
        form.set_field("area_id", "".to_string());
        form
    }

    #[test]
    fn test_data_url() {
        let url = avatar_data_url("image/PNG", &[1, 2, 3]).unwrap();
        assert_eq!(url, "data:image/png;base64,AQID");
    }

    #[test]
    fn test_avatar_limits() {
        assert_eq!(
            avatar_data_url("application/pdf", &[1]),
            Err(AvatarError::UnsupportedType("application/pdf".to_string()))
        );
        assert_eq!(avatar_data_url("image/jpeg", &[]), Err(AvatarError::Empty));
        let big = vec![0_u8; AVATAR_MAX_BYTES + 1];
        assert_eq!(
            avatar_data_url("image/jpeg", &big),
            Err(AvatarError::TooLarge(AVATAR_MAX_BYTES + 1))
        );
        assert!(check_avatar("image/webp", AVATAR_MAX_BYTES).is_ok());
    }

    #[test]
    fn test_areas_follow_governorate() {
        let areas = vec![area(1, Some(3)), area(2, Some(4)), area(3, Some(3)), area(4, None)];
        let ids: Vec<_> = areas_for_governorate(&areas, Some(GovernorateId::new(3)))
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![AreaId::new(1), AreaId::new(3)]);
        assert!(areas_for_governorate(&areas, None).is_empty());
    }

    #[test]
    fn test_valid_profile() {
        let update = form().validate().unwrap();
        assert_eq!(update.name, "Mona Adel");
        assert_eq!(update.governorate_id, Some(GovernorateId::new(3)));
        assert_eq!(update.area_id, None);
        assert_eq!(update.address, None);
    }

    #[test]
    fn test_invalid_profile_fields() {
        let mut form = form();
        form.set_field("name", "  ".to_string());
        form.set_field("phone", "abc".to_string());
        form.avatar = Some(AvatarUpload {
            file_name: "cv.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![1],
        });
        let errors = form.validate().unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("phone"));
        assert!(errors.has("avatar"));
    }
}

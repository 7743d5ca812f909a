use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::RecordId;
use crate::error::AuthError;

pub const MIN_PASSWORD_LEN: usize = 6;

const DEFAULT_PROFILE_IMAGE: &str = "https://images.unsplash.com/photo-1535713875002-d1d0cf377fde?ixlib=rb-4.0.3&auto=format&fit=crop&w=200&h=200&q=80";
const DEFAULT_RATING: f64 = 4.8;

/// Represents a registered customer.
///
/// Stored in the `users` collection and mirrored into the session under
/// `userData`. Every field defaults so partially filled records from the
/// mock store still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub dietary_preference: String,
    pub profile_image: String,
    pub join_date: String,
    pub created_at: String,
    pub orders: u32,
    pub favorites: u32,
    pub rating: f64,
}

/// Signup form as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub dietary_preference: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), AuthError> {
        let required = [
            &self.full_name,
            &self.email,
            &self.password,
            &self.confirm_password,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AuthError::MissingFields);
        }
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        Ok(())
    }
}

/// Editable profile fields. `name` is derived from first and last name.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub dietary_preference: String,
    pub profile_image: Option<String>,
}

impl User {
    /// Builds the full profile stored at signup.
    pub fn from_sign_up(id: RecordId, form: &SignUpForm, now: DateTime<Utc>) -> Self {
        let full_name = form.full_name.trim();
        let mut parts = full_name.split(' ');
        let first_name = parts.next().unwrap_or_default().to_string();
        let last_name = parts.collect::<Vec<_>>().join(" ");

        Self {
            id,
            name: full_name.to_string(),
            first_name,
            last_name,
            email: form.email.trim().to_string(),
            phone: form.phone.clone(),
            address: form.address.clone(),
            city: form.city.clone(),
            zip_code: form.zip_code.clone(),
            dietary_preference: form.dietary_preference.clone(),
            profile_image: DEFAULT_PROFILE_IMAGE.to_string(),
            join_date: now.format("%B %-d, %Y").to_string(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            orders: 0,
            favorites: 0,
            rating: DEFAULT_RATING,
        }
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        let combined = format!("{} {}", update.first_name, update.last_name);
        let combined = combined.trim();
        if !combined.is_empty() {
            self.name = combined.to_string();
        }
        self.first_name = update.first_name;
        self.last_name = update.last_name;
        self.phone = update.phone;
        self.address = update.address;
        self.city = update.city;
        self.zip_code = update.zip_code;
        self.dietary_preference = update.dietary_preference;
        if let Some(image) = update.profile_image {
            self.profile_image = image;
        }
    }

    /// Label for the navigation bar.
    pub fn display_name(&self) -> &str {
        if self.first_name.is_empty() {
            "Profile"
        } else {
            &self.first_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn form() -> SignUpForm {
        SignUpForm {
            full_name: "Asha Rani Verma".into(),
            email: "asha@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn validation_order_matches_form_feedback() {
        let mut missing = form();
        missing.confirm_password.clear();
        assert_eq!(missing.validate(), Err(AuthError::MissingFields));

        let mut mismatch = form();
        mismatch.confirm_password = "secret2".into();
        assert_eq!(mismatch.validate(), Err(AuthError::PasswordMismatch));

        let mut short = form();
        short.password = "abc".into();
        short.confirm_password = "abc".into();
        assert_eq!(short.validate(), Err(AuthError::PasswordTooShort(6)));

        assert_eq!(form().validate(), Ok(()));
    }

    #[test]
    fn signup_splits_the_full_name() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        let user = User::from_sign_up(RecordId::from("1709649000000"), &form(), now);

        assert_eq!(user.first_name, "Asha");
        assert_eq!(user.last_name, "Rani Verma");
        assert_eq!(user.join_date, "March 5, 2024");
        assert_eq!(user.created_at, "2024-03-05T14:30:00.000Z");
        assert_eq!(user.rating, 4.8);
    }

    #[test]
    fn profile_update_keeps_old_name_when_blank() {
        let mut user = User {
            name: "Asha Verma".into(),
            ..Default::default()
        };
        user.apply(ProfileUpdate {
            city: "Pune".into(),
            ..Default::default()
        });
        assert_eq!(user.name, "Asha Verma");
        assert_eq!(user.city, "Pune");

        user.apply(ProfileUpdate {
            first_name: "Asha".into(),
            last_name: "Kapoor".into(),
            ..Default::default()
        });
        assert_eq!(user.name, "Asha Kapoor");
        assert_eq!(user.display_name(), "Asha");
    }

    #[test]
    fn sparse_store_records_still_load() {
        let user: User = serde_json::from_str(r#"{"id": 3, "email": "a@b.c"}"#).unwrap();
        assert_eq!(user.id, RecordId::from(3u64));
        assert_eq!(user.display_name(), "Profile");
    }
}

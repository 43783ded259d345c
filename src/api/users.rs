use serde::{Deserialize, Serialize};

use super::auth::{is_valid_pincode, looks_like_email};
use super::http::{ApiClient, Authed};
use crate::error::Error;
use crate::session::TokenProvider;
use crate::types::{KycStatus, MobileNumber, Mpin, UserId};

const PROFILE: &str = "users/profile";
const CHANGE_MPIN: &str = "users/change-mpin";

/// Full customer profile, richer than the [`User`](crate::types::User) kept
/// in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct UserProfile {
    pub user_id: UserId,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub full_name: String,
    pub mobile_number: MobileNumber,
    #[serde(default)]
    pub email: Option<String>,
    /// `YYYY-MM-DD` as sent by the server.
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub kyc_status: KycStatus,
    #[serde(default)]
    pub account_status: Option<String>,
    #[serde(default)]
    pub profile_image_path: Option<String>,
}

/// Partial profile edit. Only the fields that were set are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pincode: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a name shorter than 3 characters.
    pub fn with_full_name(mut self, full_name: &str) -> Result<Self, Error> {
        let full_name = full_name.trim();
        if full_name.chars().count() < 3 {
            return Err(Error::validation("Full name must be at least 3 characters"));
        }
        self.full_name = Some(full_name.to_owned());
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed address.
    pub fn with_email(mut self, email: &str) -> Result<Self, Error> {
        let email = email.trim();
        if !looks_like_email(email) {
            return Err(Error::validation("Enter a valid email address"));
        }
        self.email = Some(email.to_owned());
        Ok(self)
    }

    /// Replace the postal address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a line is blank or the PIN code is not
    /// 6 digits.
    pub fn with_address(
        mut self,
        address: &str,
        city: &str,
        state: &str,
        pincode: &str,
    ) -> Result<Self, Error> {
        let (address, city, state, pincode) =
            (address.trim(), city.trim(), state.trim(), pincode.trim());
        if address.is_empty() || city.is_empty() || state.is_empty() {
            return Err(Error::validation("Address, city and state are required"));
        }
        if !is_valid_pincode(pincode) {
            return Err(Error::validation("Enter a valid 6-digit PIN code"));
        }
        self.address = Some(address.to_owned());
        self.city = Some(city.to_owned());
        self.state = Some(state.to_owned());
        self.pincode = Some(pincode.to_owned());
        Ok(self)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.address.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeMpin {
    current_mpin: Mpin,
    new_mpin: Mpin,
}

impl ChangeMpin {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the new MPIN equals the current one.
    pub fn new(current_mpin: Mpin, new_mpin: Mpin) -> Result<Self, Error> {
        if current_mpin == new_mpin {
            return Err(Error::validation(
                "New MPIN must be different from the current MPIN",
            ));
        }
        Ok(Self {
            current_mpin,
            new_mpin,
        })
    }
}

/// The signed-in customer's profile and MPIN.
pub struct Users<'a> {
    http: Authed<'a>,
}

impl<'a> Users<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient, tokens: &'a dyn TokenProvider) -> Self {
        Self {
            http: Authed::new(api, tokens),
        }
    }

    pub async fn profile(&self) -> Result<UserProfile, Error> {
        self.http.get(PROFILE).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, Error> {
        if update.is_empty() {
            return Err(Error::validation("Nothing to update"));
        }
        self.http.put(PROFILE, update).await
    }

    /// Returns the server's confirmation message.
    pub async fn change_mpin(&self, change: &ChangeMpin) -> Result<String, Error> {
        let message: String = self.http.post(CHANGE_MPIN, change).await?;
        tracing::info!("MPIN changed");
        Ok(message)
    }
}

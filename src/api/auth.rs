use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::account::format_date;
use super::http::ApiClient;
use crate::error::Error;
use crate::session::{AuthApi, Credentials, LoginRequest, LoginResponse};
use crate::types::{DeviceId, MobileNumber, Mpin, Otp};

const LOGIN: &str = "auth/login";
const REGISTER: &str = "auth/register";
const OTP_SEND: &str = "auth/send-otp";
const OTP_VERIFY: &str = "auth/verify-otp";

/// Minimum age for opening an account.
const MIN_AGE_YEARS: i32 = 18;

/// Why an OTP is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpType {
    Registration,
    Login,
    ForgotMpin,
    Transaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Name, birth date and gender from the first registration step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct PersonalDetails {
    pub full_name: String,
    #[serde(serialize_with = "serialize_date")]
    pub date_of_birth: Date,
    pub gender: Gender,
}

impl PersonalDetails {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is shorter than 3 characters
    /// or the customer is under 18 today.
    pub fn new(full_name: &str, date_of_birth: Date, gender: Gender) -> Result<Self, Error> {
        let full_name = full_name.trim();
        if full_name.chars().count() < 3 {
            return Err(Error::validation("Full name must be at least 3 characters"));
        }
        if !is_adult(date_of_birth, OffsetDateTime::now_utc().date()) {
            return Err(Error::validation("You must be at least 18 years old"));
        }
        Ok(Self {
            full_name: full_name.to_owned(),
            date_of_birth,
            gender,
        })
    }
}

fn is_adult(date_of_birth: Date, today: Date) -> bool {
    let years = today.year() - date_of_birth.year();
    let had_birthday = (u8::from(today.month()), today.day())
        >= (u8::from(date_of_birth.month()), date_of_birth.day());
    years > MIN_AGE_YEARS || (years == MIN_AGE_YEARS && had_birthday)
}

fn serialize_date<S: serde::Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    let text = format_date(*date).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

/// Postal address from the contact step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Address {
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl Address {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a line is blank or the PIN code is not
    /// 6 digits.
    pub fn new(address: &str, city: &str, state: &str, pincode: &str) -> Result<Self, Error> {
        let required = |value: &str, label: &str| {
            let value = value.trim();
            if value.is_empty() {
                Err(Error::validation(format!("{label} is required")))
            } else {
                Ok(value.to_owned())
            }
        };
        let pincode = pincode.trim();
        if !is_valid_pincode(pincode) {
            return Err(Error::validation("Enter a valid 6-digit PIN code"));
        }
        Ok(Self {
            address: required(address, "Address")?,
            city: required(city, "City")?,
            state: required(state, "State")?,
            pincode: pincode.to_owned(),
        })
    }
}

pub(crate) fn is_valid_pincode(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

/// New-customer registration form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Registration {
    pub mobile_number: MobileNumber,
    pub email: String,
    #[serde(flatten)]
    pub personal: PersonalDetails,
    #[serde(flatten)]
    pub address: Address,
    pub mpin: Mpin,
    pub confirm_mpin: Mpin,
}

impl Registration {
    /// Validate the registration form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the email is malformed or the two
    /// MPIN entries differ.
    pub fn new(
        personal: PersonalDetails,
        mobile_number: MobileNumber,
        email: &str,
        address: Address,
        mpin: Mpin,
        confirm_mpin: Mpin,
    ) -> Result<Self, Error> {
        let email = email.trim();
        if !looks_like_email(email) {
            return Err(Error::validation("Enter a valid email address"));
        }
        if mpin != confirm_mpin {
            return Err(Error::validation("MPIN entries do not match"));
        }
        Ok(Self {
            mobile_number,
            email: email.to_owned(),
            personal,
            address,
            mpin,
            confirm_mpin,
        })
    }
}

pub(crate) fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OtpRequest<'a> {
    mobile_number: &'a MobileNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    otp_type: OtpType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OtpCheck<'a> {
    mobile_number: &'a MobileNumber,
    otp_code: &'a Otp,
    otp_type: OtpType,
}

impl ApiClient {
    /// Exchange credentials for tokens. Does not touch any session state;
    /// use [`SessionStore::login`](crate::session::SessionStore::login) to sign in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] for rejected credentials, or
    /// [`Error::Transport`] on network failure.
    pub async fn login(
        &self,
        credentials: &Credentials,
        device_id: &DeviceId,
    ) -> Result<LoginResponse, Error> {
        self.post_public(LOGIN, &LoginRequest::new(credentials, device_id))
            .await
    }

    /// Create a customer profile. The customer signs in separately afterwards.
    pub async fn register(&self, registration: &Registration) -> Result<(), Error> {
        let _: IgnoredAny = self.post_public(REGISTER, registration).await?;
        tracing::info!(mobile = %registration.mobile_number.masked(), "Registered");
        Ok(())
    }

    /// Ask the server to send an OTP to `mobile_number`, and to `email` when given.
    pub async fn send_otp(
        &self,
        mobile_number: &MobileNumber,
        email: Option<&str>,
        otp_type: OtpType,
    ) -> Result<(), Error> {
        let body = OtpRequest {
            mobile_number,
            email: email.map(str::trim).filter(|e| !e.is_empty()),
            otp_type,
        };
        let _: IgnoredAny = self.post_public(OTP_SEND, &body).await?;
        Ok(())
    }

    /// Check an OTP previously sent with [`send_otp`](Self::send_otp).
    ///
    /// # Errors
    ///
    /// A wrong or expired code comes back as [`Error::Api`] carrying the
    /// server's message.
    pub async fn verify_otp(
        &self,
        mobile_number: &MobileNumber,
        otp_code: &Otp,
        otp_type: OtpType,
    ) -> Result<(), Error> {
        let body = OtpCheck {
            mobile_number,
            otp_code,
            otp_type,
        };
        let _: IgnoredAny = self.post_public(OTP_VERIFY, &body).await?;
        Ok(())
    }
}

impl AuthApi for ApiClient {
    async fn login(
        &self,
        credentials: &Credentials,
        device_id: &DeviceId,
    ) -> Result<LoginResponse, Error> {
        ApiClient::login(self, credentials, device_id).await
    }
}

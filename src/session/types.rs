use std::fmt;

use serde::Deserialize;
#[cfg(feature = "client")]
use serde::Serialize;

#[cfg(feature = "client")]
use crate::types::DeviceId;
use crate::types::{AccountSummary, MobileNumber, Mpin, User};

/// The signed-in state: credentials and the profile they belong to.
///
/// The access token and user live in one value, so one can never exist
/// without the other.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: User,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish()
    }
}

impl From<LoginResponse> for Session {
    fn from(r: LoginResponse) -> Self {
        Self {
            access_token: r.access_token,
            refresh_token: r.refresh_token,
            user: r.user,
        }
    }
}

/// Login form input. Construction validates both fields, so invalid input
/// never reaches the network.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub mobile_number: MobileNumber,
    pub mpin: Mpin,
}

impl Credentials {
    /// Validate raw form input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) if either field is malformed.
    pub fn parse(mobile_number: &str, mpin: &str) -> Result<Self, crate::Error> {
        Ok(Self {
            mobile_number: mobile_number.parse()?,
            mpin: mpin.parse()?,
        })
    }
}

/// Body of the login call.
#[cfg(feature = "client")]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub(crate) mobile_number: &'a MobileNumber,
    pub(crate) mpin: &'a Mpin,
    pub(crate) device_id: &'a DeviceId,
    pub(crate) device_type: &'static str,
    pub(crate) os_type: &'static str,
}

#[cfg(feature = "client")]
impl<'a> LoginRequest<'a> {
    pub(crate) fn new(credentials: &'a Credentials, device_id: &'a DeviceId) -> Self {
        Self {
            mobile_number: &credentials.mobile_number,
            mpin: &credentials.mpin,
            device_id,
            device_type: device_type(std::env::consts::OS),
            os_type: os_type(std::env::consts::OS),
        }
    }
}

/// Device class reported at login: `MOBILE` on phone platforms, else `DESKTOP`.
#[cfg(feature = "client")]
fn device_type(os: &str) -> &'static str {
    match os {
        "android" | "ios" => "MOBILE",
        _ => "DESKTOP",
    }
}

#[cfg(feature = "client")]
fn os_type(os: &str) -> &'static str {
    match os {
        "windows" => "Windows",
        "macos" => "macOS",
        "linux" => "Linux",
        "android" => "Android",
        "ios" => "iOS",
        _ => "Unknown",
    }
}

/// Payload of a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct LoginResponse {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds, when the server reports it.
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: User,
    #[serde(default)]
    pub account: Option<AccountSummary>,
}

impl LoginResponse {
    #[must_use]
    pub fn new(access_token: impl Into<String>, user: User) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_in: None,
            user,
            account: None,
        }
    }

    #[must_use]
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_tokens() {
        let user = User::new("u1".into(), "Asha", "9876543210".parse().unwrap());
        let session = Session::from(LoginResponse::new("secret-token", user).with_refresh_token("r"));
        let out = format!("{session:?}");
        assert!(!out.contains("secret-token"));
        assert!(out.contains("<redacted>"));
        assert!(out.contains("Asha"));
    }

    #[test]
    fn credentials_validate_before_use() {
        assert!(Credentials::parse("9876543210", "123456").is_ok());
        assert!(Credentials::parse("98765", "123456").unwrap_err().is_validation());
        assert!(Credentials::parse("9876543210", "12").unwrap_err().is_validation());
        assert!(Credentials::parse("9876543210", "1234").unwrap_err().is_validation());
    }

    #[test]
    fn login_response_accepts_token_alias() {
        let json = r#"{"token":"t","user":{"id":1,"name":"A","mobileNumber":"9876543210"}}"#;
        let r: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(r.access_token, "t");
        assert_eq!(r.refresh_token, None);
        assert_eq!(r.expires_in, None);
        assert!(r.account.is_none());
    }

    #[test]
    fn login_response_full_payload() {
        let json = r#"{
            "token": "eyJ.a.b",
            "refreshToken": "r-1",
            "expiresIn": 86400,
            "user": {
                "userId": 7, "customerId": "C1", "fullName": "Asha",
                "email": "asha@example.com", "mobileNumber": "9876543210",
                "accountStatus": "ACTIVE", "kycStatus": "PENDING", "biometricEnabled": false
            },
            "account": {
                "accountId": 3, "accountNumber": "1234567890123456",
                "accountType": "SAVINGS", "balance": "15000.50", "accountStatus": "ACTIVE"
            }
        }"#;
        let r: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(r.access_token, "eyJ.a.b");
        assert_eq!(r.refresh_token.as_deref(), Some("r-1"));
        assert_eq!(r.expires_in, Some(86_400));
        assert_eq!(r.user.user_id.as_str(), "7");
        assert_eq!(r.user.customer_id.as_deref(), Some("C1"));
        assert_eq!(r.user.account_status.as_deref(), Some("ACTIVE"));
        assert!(!r.user.biometric_enabled);
        let account = r.account.unwrap();
        assert_eq!(account.account_number, "1234567890123456");
        assert_eq!(account.balance, crate::types::Amount::from_minor(1_500_050));
    }

    #[cfg(feature = "client")]
    #[test]
    fn login_request_wire_shape() {
        let creds = Credentials::parse("9876543210", "123456").unwrap();
        let device = DeviceId(ulid::Ulid::nil());
        let body = serde_json::to_value(LoginRequest::new(&creds, &device)).unwrap();
        assert_eq!(body["mobileNumber"], "9876543210");
        assert_eq!(body["mpin"], "123456");
        assert_eq!(body["deviceId"], "00000000000000000000000000");
        assert!(body["deviceType"].is_string());
        assert!(body["osType"].is_string());
    }

    #[cfg(feature = "client")]
    #[test]
    fn platform_names() {
        assert_eq!(device_type("android"), "MOBILE");
        assert_eq!(device_type("linux"), "DESKTOP");
        assert_eq!(os_type("macos"), "macOS");
        assert_eq!(os_type("ios"), "iOS");
        assert_eq!(os_type("freebsd"), "Unknown");
    }
}

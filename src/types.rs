use std::fmt;
use std::str::FromStr;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ulid::Ulid;

use crate::error::Error;
use crate::validation;

/// Wire form of server-assigned identifiers, which arrive as either JSON
/// strings or JSON numbers depending on the endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(u64),
}

impl From<IdRepr> for String {
    fn from(repr: IdRepr) -> Self {
        match repr {
            IdRepr::Text(s) => s,
            IdRepr::Number(n) => n.to_string(),
        }
    }
}

macro_rules! server_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Display, From, Into)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                IdRepr::deserialize(deserializer).map(|repr| Self(repr.into()))
            }
        }
    };
}

server_id!(
    /// Server-assigned user identifier.
    UserId
);
server_id!(
    /// Saved payee identifier.
    BeneficiaryId
);
server_id!(AccountId);
server_id!(BillerId);
server_id!(SavedBillerId);
server_id!(BillPaymentId);
server_id!(CardId);
server_id!(CardTransactionId);
server_id!(MoneyRequestId);
server_id!(NotificationId);
server_id!(QrPaymentId);
server_id!(
    /// Id of a record another record points at, e.g. a notification's subject.
    ReferenceId
);
server_id!(TransactionId);

/// Per-device identifier, generated once and reused across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct DeviceId(pub Ulid);

impl DeviceId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

/// Validated mobile number (10 digits, leading 6-9).
///
/// Holding a `MobileNumber` proves the format is correct.
/// Use `"9876543210".parse::<MobileNumber>()` to create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MobileNumber(String);

impl MobileNumber {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `98xxxxxx10`, for display next to masked account data.
    #[must_use]
    pub fn masked(&self) -> String {
        format!("{}xxxxxx{}", &self.0[..2], &self.0[8..])
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MobileNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.trim().to_owned())
    }
}

impl TryFrom<String> for MobileNumber {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if validation::is_valid_mobile_number(&s) {
            Ok(Self(s))
        } else {
            Err(Error::validation("Enter a valid 10-digit mobile number"))
        }
    }
}

impl From<MobileNumber> for String {
    fn from(m: MobileNumber) -> Self {
        m.0
    }
}

/// Numeric PIN authorising logins and money movements.
///
/// Serialised as a plain string; `Debug` never prints the digits.
#[derive(Clone, PartialEq, Eq)]
pub struct Mpin(String);

impl Mpin {
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Mpin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mpin(****)")
    }
}

impl FromStr for Mpin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if validation::is_valid_mpin(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(Error::validation("MPIN must be 6 digits"))
        }
    }
}

impl Serialize for Mpin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Six-digit one-time password.
#[derive(Clone, PartialEq, Eq)]
pub struct Otp(String);

impl fmt::Debug for Otp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Otp(******)")
    }
}

impl FromStr for Otp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if validation::is_valid_otp(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(Error::validation("OTP must be 6 digits"))
        }
    }
}

impl Serialize for Otp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Validated IFSC branch code. Input is upper-cased before checking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ifsc(String);

impl Ifsc {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ifsc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ifsc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for Ifsc {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let s = s.trim().to_ascii_uppercase();
        if validation::is_valid_ifsc(&s) {
            Ok(Self(s))
        } else {
            Err(Error::validation("Enter a valid IFSC code"))
        }
    }
}

impl From<Ifsc> for String {
    fn from(i: Ifsc) -> Self {
        i.0
    }
}

/// Money amount in minor units (paise).
///
/// Serialised as a JSON decimal number (`1500.5`); deserialised from either a
/// number or a decimal string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_f64(value: f64) -> Result<Self, String> {
        if !value.is_finite() || value.abs() > 9.0e15 {
            return Err(format!("amount out of range: {value}"));
        }
        Ok(Self((value * 100.0).round() as i64))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Amount {
    type Err = Error;

    /// Parses user input such as `"1500"`, `"1500.5"` or `"1,500.50"`.
    /// Negative values and more than two decimal places are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::validation("Enter a valid amount");
        let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
        let (whole, frac) = cleaned.split_once('.').unwrap_or((&cleaned, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };
        whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(frac))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Self::from_f64(n).map_err(serde::de::Error::custom),
            Repr::Text(s) => {
                let (negative, digits) = match s.trim().strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, s.trim()),
                };
                let amount: Amount = digits.parse().map_err(serde::de::Error::custom)?;
                Ok(if negative { Self(-amount.0) } else { amount })
            }
        }
    }
}

/// KYC verification state of an account holder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum KycStatus {
    #[default]
    NotSubmitted,
    Pending,
    Verified,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// Account snapshot returned next to the profile at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct AccountSummary {
    pub account_id: AccountId,
    pub account_number: String,
    #[serde(default)]
    pub account_type: Option<String>,
    pub balance: Amount,
    #[serde(default)]
    pub account_status: Option<String>,
}

/// Signed-in user profile, as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct User {
    #[serde(alias = "id")]
    pub user_id: UserId,
    /// Bank-side customer reference (CIF), shown on statements.
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(alias = "name")]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub mobile_number: MobileNumber,
    /// Free-form status string such as `ACTIVE` or `BLOCKED`.
    #[serde(default)]
    pub account_status: Option<String>,
    #[serde(default)]
    pub kyc_status: KycStatus,
    #[serde(default)]
    pub biometric_enabled: bool,
}

impl User {
    /// Create a `User` with only the required fields.
    #[must_use]
    pub fn new(user_id: UserId, full_name: impl Into<String>, mobile_number: MobileNumber) -> Self {
        Self {
            user_id,
            customer_id: None,
            full_name: full_name.into(),
            email: None,
            mobile_number,
            account_status: None,
            kyc_status: KycStatus::default(),
            biometric_enabled: false,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    #[must_use]
    pub fn with_kyc_status(mut self, status: KycStatus) -> Self {
        self.kyc_status = status;
        self
    }

    #[must_use]
    pub fn is_kyc_verified(&self) -> bool {
        self.kyc_status == KycStatus::Verified
    }

    /// `true` unless the server reported a status other than `ACTIVE`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.account_status
            .as_deref()
            .is_none_or(|s| s.eq_ignore_ascii_case("ACTIVE"))
    }
}

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::auth::looks_like_email;
use super::http::{ApiClient, Authed};
use crate::error::Error;
use crate::session::TokenProvider;
use crate::types::{Amount, BeneficiaryId, Ifsc, MobileNumber};

const BENEFICIARIES: &str = "beneficiaries";
const ALL: &str = "beneficiaries/all";
const FAVORITES: &str = "beneficiaries/favorites";
const FREQUENTLY_USED: &str = "beneficiaries/frequently-used";
const SEARCH: &str = "beneficiaries/search";
const ADD: &str = "beneficiaries/add";

/// A saved payee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Beneficiary {
    pub beneficiary_id: BeneficiaryId,
    pub beneficiary_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub beneficiary_type: Option<String>,
    #[serde(default, with = "crate::api::timestamp::option")]
    pub last_transaction_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default)]
    pub total_amount: Option<Amount>,
    #[serde(default, with = "crate::api::timestamp::option")]
    pub created_at: Option<OffsetDateTime>,
}

impl Beneficiary {
    /// Nickname when set, otherwise the account holder's name.
    #[must_use]
    pub fn label(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.beneficiary_name)
    }
}

fn check_name(name: &str) -> Result<String, Error> {
    let name = name.trim();
    if name.chars().count() < 3 {
        return Err(Error::validation(
            "Beneficiary name must be at least 3 characters",
        ));
    }
    Ok(name.to_owned())
}

fn check_email(email: &str) -> Result<String, Error> {
    let email = email.trim();
    if !looks_like_email(email) {
        return Err(Error::validation("Enter a valid email address"));
    }
    Ok(email.to_owned())
}

fn non_blank(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Add-beneficiary form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct NewBeneficiary {
    pub beneficiary_name: String,
    pub account_number: String,
    pub ifsc_code: Ifsc,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<MobileNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub beneficiary_type: String,
}

impl NewBeneficiary {
    /// Validate the add-beneficiary form. The type defaults to `BANK`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is shorter than 3 characters
    /// or the account number is not 9-18 digits.
    pub fn new(name: &str, account_number: &str, ifsc_code: Ifsc) -> Result<Self, Error> {
        let account_number = account_number.trim();
        if !(9..=18).contains(&account_number.len())
            || !account_number.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::validation("Account number must be 9 to 18 digits"));
        }
        Ok(Self {
            beneficiary_name: check_name(name)?,
            account_number: account_number.to_owned(),
            ifsc_code,
            bank_name: None,
            branch_name: None,
            mobile_number: None,
            email: None,
            nickname: None,
            beneficiary_type: "BANK".to_owned(),
        })
    }

    #[must_use]
    pub fn with_bank(mut self, bank_name: impl Into<String>, branch_name: impl Into<String>) -> Self {
        self.bank_name = non_blank(bank_name);
        self.branch_name = non_blank(branch_name);
        self
    }

    #[must_use]
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = non_blank(nickname);
        self
    }

    #[must_use]
    pub fn with_mobile_number(mut self, mobile: MobileNumber) -> Self {
        self.mobile_number = Some(mobile);
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the address is malformed.
    pub fn with_email(mut self, email: &str) -> Result<Self, Error> {
        self.email = Some(check_email(email)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_type(mut self, beneficiary_type: impl Into<String>) -> Self {
        self.beneficiary_type = beneficiary_type.into();
        self
    }
}

/// Partial update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    beneficiary_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile_number: Option<MobileNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nickname: Option<String>,
}

impl BeneficiaryUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is shorter than 3 characters.
    pub fn with_name(mut self, name: &str) -> Result<Self, Error> {
        self.beneficiary_name = Some(check_name(name)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_mobile_number(mut self, mobile: MobileNumber) -> Self {
        self.mobile_number = Some(mobile);
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the address is malformed.
    pub fn with_email(mut self, email: &str) -> Result<Self, Error> {
        self.email = Some(check_email(email)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into().trim().to_owned());
        self
    }

    fn is_empty(&self) -> bool {
        self.beneficiary_name.is_none()
            && self.mobile_number.is_none()
            && self.email.is_none()
            && self.nickname.is_none()
    }
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
}

#[derive(Serialize)]
struct EmptyBody {}

/// Saved payees.
pub struct Beneficiaries<'a> {
    http: Authed<'a>,
}

impl<'a> Beneficiaries<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient, tokens: &'a dyn TokenProvider) -> Self {
        Self {
            http: Authed::new(api, tokens),
        }
    }

    pub async fn list(&self) -> Result<Vec<Beneficiary>, Error> {
        self.http.get(ALL).await
    }

    pub async fn favorites(&self) -> Result<Vec<Beneficiary>, Error> {
        self.http.get(FAVORITES).await
    }

    /// Payees ordered by how often the customer pays them.
    pub async fn frequently_used(&self) -> Result<Vec<Beneficiary>, Error> {
        self.http.get(FREQUENTLY_USED).await
    }

    /// Search by name, nickname or account number. Blank queries list everything.
    pub async fn search(&self, term: &str) -> Result<Vec<Beneficiary>, Error> {
        let term = term.trim();
        if term.is_empty() {
            return self.list().await;
        }
        self.http.get_with(SEARCH, &SearchQuery { q: term }).await
    }

    pub async fn get(&self, id: &BeneficiaryId) -> Result<Beneficiary, Error> {
        self.http.get(&format!("{BENEFICIARIES}/{id}")).await
    }

    pub async fn add(&self, beneficiary: &NewBeneficiary) -> Result<Beneficiary, Error> {
        let saved: Beneficiary = self.http.post(ADD, beneficiary).await?;
        tracing::info!(beneficiary_id = %saved.beneficiary_id, "Beneficiary added");
        Ok(saved)
    }

    pub async fn update(
        &self,
        id: &BeneficiaryId,
        update: &BeneficiaryUpdate,
    ) -> Result<Beneficiary, Error> {
        if update.is_empty() {
            return Err(Error::validation("Nothing to update"));
        }
        self.http.put(&format!("{BENEFICIARIES}/{id}"), update).await
    }

    /// Remove a payee. Whatever the server echoes back is discarded.
    pub async fn delete(&self, id: &BeneficiaryId) -> Result<(), Error> {
        let _: IgnoredAny = self.http.delete(&format!("{BENEFICIARIES}/{id}")).await?;
        Ok(())
    }

    /// Flip the favourite flag; returns the updated record.
    pub async fn toggle_favorite(&self, id: &BeneficiaryId) -> Result<Beneficiary, Error> {
        self.http
            .put(&format!("{BENEFICIARIES}/{id}/toggle-favorite"), &EmptyBody {})
            .await
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::http::{ApiClient, Authed};
use crate::error::Error;
use crate::session::TokenProvider;
use crate::types::{Amount, CardId, CardTransactionId};

const CARDS: &str = "cards";
const ALL: &str = "cards/all";
const ACTIVE: &str = "cards/active";
const ADD: &str = "cards/add";

/// Smallest daily limit a customer may set (1000.00).
pub const MIN_DAILY_LIMIT: Amount = Amount::from_minor(100_000);
/// Smallest monthly limit a customer may set (10000.00).
pub const MIN_MONTHLY_LIMIT: Amount = Amount::from_minor(1_000_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum CardType {
    Debit,
    Credit,
    Prepaid,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum CardStatus {
    Active,
    Inactive,
    /// Blocked by the customer or the bank; can be reactivated.
    Blocked,
    Expired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Card {
    pub card_id: CardId,
    /// Masked, e.g. `**** **** **** 4242`.
    pub card_number: String,
    pub card_type: CardType,
    pub card_holder_name: String,
    /// `MM/YY`.
    pub expiry_date: String,
    pub card_status: CardStatus,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub daily_limit: Option<Amount>,
    #[serde(default)]
    pub monthly_limit: Option<Amount>,
    #[serde(default)]
    pub atm_enabled: bool,
    #[serde(default)]
    pub online_enabled: bool,
    #[serde(default)]
    pub contactless_enabled: bool,
    #[serde(default)]
    pub international_enabled: bool,
    #[serde(default, with = "crate::api::timestamp::option")]
    pub issued_date: Option<OffsetDateTime>,
    #[serde(default, with = "crate::api::timestamp::option")]
    pub last_used_date: Option<OffsetDateTime>,
    /// `VISA`, `MASTERCARD`, `RUPAY`.
    #[serde(default)]
    pub card_brand: Option<String>,
}

/// Card details typed in by the customer. `Debug` hides the number and CVV.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct NewCard {
    pub card_number: String,
    pub card_type: CardType,
    pub card_holder_name: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_limit: Option<Amount>,
}

impl fmt::Debug for NewCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last4 = self.card_number.get(12..).unwrap_or("");
        f.debug_struct("NewCard")
            .field("card_number", &format_args!("************{last4}"))
            .field("card_type", &self.card_type)
            .field("card_holder_name", &self.card_holder_name)
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"***")
            .finish_non_exhaustive()
    }
}

fn all_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

impl NewCard {
    /// Validate the add-card form.
    ///
    /// `expiry_month` is `01`-`12`; `expiry_year` is four digits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed number, name, expiry or CVV.
    pub fn new(
        card_number: &str,
        card_type: CardType,
        card_holder_name: &str,
        expiry_month: &str,
        expiry_year: &str,
        cvv: &str,
    ) -> Result<Self, Error> {
        let card_number: String = card_number.chars().filter(|c| !c.is_whitespace()).collect();
        if !all_digits(&card_number, 16) {
            return Err(Error::validation("Card number must be 16 digits"));
        }
        let card_holder_name = card_holder_name.trim();
        if card_holder_name.chars().count() < 3 {
            return Err(Error::validation(
                "Card holder name must be at least 3 characters",
            ));
        }
        let month_ok = all_digits(expiry_month, 2)
            && matches!(expiry_month.parse::<u8>(), Ok(1..=12));
        if !month_ok || !all_digits(expiry_year, 4) {
            return Err(Error::validation("Enter a valid expiry date"));
        }
        if !all_digits(cvv, 3) {
            return Err(Error::validation("CVV must be 3 digits"));
        }
        Ok(Self {
            card_number,
            card_type,
            card_holder_name: card_holder_name.to_owned(),
            expiry_month: expiry_month.to_owned(),
            expiry_year: expiry_year.to_owned(),
            cvv: cvv.to_owned(),
            daily_limit: None,
            monthly_limit: None,
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either limit is below its minimum.
    pub fn with_limits(mut self, daily: Amount, monthly: Amount) -> Result<Self, Error> {
        let limits = CardLimits::new().with_daily(daily).with_monthly(monthly);
        limits.validate()?;
        self.daily_limit = limits.daily_limit;
        self.monthly_limit = limits.monthly_limit;
        Ok(self)
    }
}

/// Partial limit update; unset limits are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    daily_limit: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    monthly_limit: Option<Amount>,
}

impl CardLimits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_daily(mut self, limit: Amount) -> Self {
        self.daily_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_monthly(mut self, limit: Amount) -> Self {
        self.monthly_limit = Some(limit);
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.daily_limit.is_none() && self.monthly_limit.is_none() {
            return Err(Error::validation("Nothing to update"));
        }
        if self.daily_limit.is_some_and(|l| l < MIN_DAILY_LIMIT) {
            return Err(Error::validation(format!(
                "Daily limit must be at least {MIN_DAILY_LIMIT}"
            )));
        }
        if self.monthly_limit.is_some_and(|l| l < MIN_MONTHLY_LIMIT) {
            return Err(Error::validation(format!(
                "Monthly limit must be at least {MIN_MONTHLY_LIMIT}"
            )));
        }
        if let (Some(daily), Some(monthly)) = (self.daily_limit, self.monthly_limit) {
            if daily > monthly {
                return Err(Error::validation(
                    "Daily limit cannot exceed the monthly limit",
                ));
            }
        }
        Ok(())
    }
}

/// Partial channel toggle; unset channels are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atm_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contactless_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub international_enabled: Option<bool>,
}

impl CardSettings {
    #[must_use]
    pub fn with_atm(mut self, enabled: bool) -> Self {
        self.atm_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_online(mut self, enabled: bool) -> Self {
        self.online_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_contactless(mut self, enabled: bool) -> Self {
        self.contactless_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_international(mut self, enabled: bool) -> Self {
        self.international_enabled = Some(enabled);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct CardTransaction {
    pub card_txn_id: CardTransactionId,
    pub card_id: CardId,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub merchant_category: Option<String>,
    pub transaction_type: String,
    pub amount: Amount,
    #[serde(default)]
    pub currency: Option<String>,
    pub transaction_status: String,
    #[serde(default)]
    pub authorization_code: Option<String>,
    #[serde(default)]
    pub merchant_city: Option<String>,
    #[serde(default)]
    pub merchant_country: Option<String>,
    /// `POS`, `ONLINE`, `ATM`, `CONTACTLESS`.
    #[serde(default)]
    pub transaction_mode: Option<String>,
    #[serde(with = "crate::api::timestamp")]
    pub created_at: OffsetDateTime,
}

#[derive(Serialize)]
struct StatusChange {
    status: CardStatus,
}

/// Cards linked to the account.
pub struct Cards<'a> {
    http: Authed<'a>,
}

impl<'a> Cards<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient, tokens: &'a dyn TokenProvider) -> Self {
        Self {
            http: Authed::new(api, tokens),
        }
    }

    pub async fn list(&self) -> Result<Vec<Card>, Error> {
        self.http.get(ALL).await
    }

    /// Cards currently usable for payments.
    pub async fn active(&self) -> Result<Vec<Card>, Error> {
        self.http.get(ACTIVE).await
    }

    pub async fn get(&self, id: &CardId) -> Result<Card, Error> {
        self.http.get(&format!("{CARDS}/{id}")).await
    }

    pub async fn add(&self, card: &NewCard) -> Result<Card, Error> {
        let added: Card = self.http.post(ADD, card).await?;
        tracing::info!(card_id = %added.card_id, "Card added");
        Ok(added)
    }

    /// Block or reactivate a card.
    pub async fn set_status(&self, id: &CardId, status: CardStatus) -> Result<Card, Error> {
        if matches!(status, CardStatus::Expired | CardStatus::Unknown) {
            return Err(Error::validation("That status cannot be set"));
        }
        let card: Card = self
            .http
            .put(&format!("{CARDS}/{id}/status"), &StatusChange { status })
            .await?;
        tracing::info!(card_id = %id, ?status, "Card status changed");
        Ok(card)
    }

    /// Make this the card used by default.
    pub async fn set_primary(&self, id: &CardId) -> Result<Card, Error> {
        self.http
            .call(reqwest::Method::PUT, &format!("{CARDS}/{id}/set-primary"))
            .await
    }

    pub async fn update_limits(&self, id: &CardId, limits: &CardLimits) -> Result<Card, Error> {
        limits.validate()?;
        self.http.put(&format!("{CARDS}/{id}/limits"), limits).await
    }

    pub async fn update_settings(&self, id: &CardId, settings: &CardSettings) -> Result<Card, Error> {
        if *settings == CardSettings::default() {
            return Err(Error::validation("Nothing to update"));
        }
        self.http.put(&format!("{CARDS}/{id}/settings"), settings).await
    }

    pub async fn transactions(&self, id: &CardId) -> Result<Vec<CardTransaction>, Error> {
        self.http.get(&format!("{CARDS}/{id}/transactions")).await
    }
}

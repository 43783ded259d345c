use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::http::{ApiClient, Authed};
use crate::error::Error;
use crate::session::TokenProvider;
use crate::types::{Amount, BillPaymentId, BillerId, Mpin, SavedBillerId, TransactionId};
use crate::validation::check_transfer_amount;

const BILLERS: &str = "bills/billers";
const BILLER_SEARCH: &str = "bills/billers/search";
const PAY: &str = "bills/pay";
const SAVED: &str = "bills/saved";
const HISTORY: &str = "bills/history";

const MIN_CONSUMER_NUMBER_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum BillCategory {
    Electricity,
    Water,
    Gas,
    MobilePrepaid,
    Dth,
    Broadband,
    #[serde(other)]
    Other,
}

impl BillCategory {
    /// Path segment used by `bills/billers/category/{category}`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Electricity => "ELECTRICITY",
            Self::Water => "WATER",
            Self::Gas => "GAS",
            Self::MobilePrepaid => "MOBILE_PREPAID",
            Self::Dth => "DTH",
            Self::Broadband => "BROADBAND",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Biller {
    pub biller_id: BillerId,
    pub biller_name: String,
    pub biller_category: BillCategory,
    #[serde(default)]
    pub biller_code: Option<String>,
    #[serde(default)]
    pub biller_logo: Option<String>,
    #[serde(default)]
    pub convenience_fee: Amount,
    /// Label for the consumer number field, e.g. "CA Number".
    #[serde(default)]
    pub consumer_number_label: Option<String>,
    #[serde(default)]
    pub consumer_number_regex: Option<String>,
    #[serde(default = "yes")]
    pub is_active: bool,
    #[serde(default)]
    pub supports_fetch_bill: bool,
    #[serde(default)]
    pub min_amount: Option<Amount>,
    #[serde(default)]
    pub max_amount: Option<Amount>,
}

fn yes() -> bool {
    true
}

impl Biller {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `amount` is outside this biller's range.
    pub fn check_amount(&self, amount: Amount) -> Result<(), Error> {
        let below = self.min_amount.is_some_and(|min| amount < min);
        let above = self.max_amount.is_some_and(|max| amount > max);
        if below || above {
            let min = self.min_amount.unwrap_or(Amount::ZERO);
            return Err(match self.max_amount {
                Some(max) => Error::validation(format!("Amount must be between {min} and {max}")),
                None => Error::validation(format!("Minimum amount is {min}")),
            });
        }
        Ok(())
    }
}

fn check_consumer_number(consumer_number: &str) -> Result<String, Error> {
    let n = consumer_number.trim();
    if n.chars().count() < MIN_CONSUMER_NUMBER_LEN {
        return Err(Error::validation(
            "Consumer number must be at least 5 characters",
        ));
    }
    Ok(n.to_owned())
}

/// Bill payment form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct PayBill {
    pub biller_id: BillerId,
    pub consumer_number: String,
    pub amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_year: Option<i32>,
    pub mpin: Mpin,
    pub save_biller: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl PayBill {
    /// Validate a payment against the chosen biller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the consumer number is too short or
    /// the amount is outside the biller's range.
    pub fn new(
        biller: &Biller,
        consumer_number: &str,
        amount: Amount,
        mpin: Mpin,
    ) -> Result<Self, Error> {
        biller.check_amount(amount)?;
        Ok(Self {
            biller_id: biller.biller_id.clone(),
            consumer_number: check_consumer_number(consumer_number)?,
            amount,
            bill_month: None,
            bill_year: None,
            mpin,
            save_biller: false,
            nickname: None,
        })
    }

    #[must_use]
    pub fn for_period(mut self, month: impl Into<String>, year: i32) -> Self {
        self.bill_month = Some(month.into());
        self.bill_year = Some(year);
        self
    }

    /// Also remember this biller and consumer number for next time.
    #[must_use]
    pub fn and_save(mut self, nickname: Option<&str>) -> Self {
        self.save_biller = true;
        self.nickname = nickname
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned);
        self
    }
}

/// A biller remembered with the customer's consumer number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct SavedBiller {
    pub saved_biller_id: SavedBillerId,
    pub biller_id: BillerId,
    #[serde(default)]
    pub biller_name: Option<String>,
    #[serde(default)]
    pub biller_category: Option<BillCategory>,
    #[serde(default)]
    pub biller_code: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    pub consumer_number: String,
    #[serde(default)]
    pub is_autopay_enabled: bool,
    #[serde(default)]
    pub min_amount: Option<Amount>,
    #[serde(default)]
    pub max_amount: Option<Amount>,
    #[serde(default, with = "crate::api::timestamp::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// Save-biller form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct SaveBiller {
    pub biller_id: BillerId,
    pub consumer_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl SaveBiller {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the consumer number is too short.
    pub fn new(biller_id: BillerId, consumer_number: &str) -> Result<Self, Error> {
        Ok(Self {
            biller_id,
            consumer_number: check_consumer_number(consumer_number)?,
            nickname: None,
        })
    }

    #[must_use]
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }
}

/// A completed or attempted bill payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct BillPayment {
    pub payment_id: BillPaymentId,
    pub biller_id: BillerId,
    pub biller_name: String,
    #[serde(default)]
    pub biller_category: Option<BillCategory>,
    pub consumer_number: String,
    pub amount: Amount,
    pub payment_status: String,
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
    #[serde(default)]
    pub bill_month: Option<String>,
    #[serde(default)]
    pub bill_year: Option<i32>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, with = "crate::api::timestamp::option")]
    pub paid_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub confirmation_number: Option<String>,
    #[serde(default)]
    pub payment_mode: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default, with = "crate::api::timestamp::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
}

/// Bill payments.
pub struct Bills<'a> {
    http: Authed<'a>,
}

impl<'a> Bills<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient, tokens: &'a dyn TokenProvider) -> Self {
        Self {
            http: Authed::new(api, tokens),
        }
    }

    pub async fn billers(&self) -> Result<Vec<Biller>, Error> {
        self.http.get(BILLERS).await
    }

    pub async fn billers_by_category(&self, category: BillCategory) -> Result<Vec<Biller>, Error> {
        self.http
            .get(&format!("{BILLERS}/category/{}", category.as_str()))
            .await
    }

    pub async fn search_billers(&self, term: &str) -> Result<Vec<Biller>, Error> {
        let term = term.trim();
        if term.chars().count() < 2 {
            return Err(Error::validation("Type at least 2 characters to search"));
        }
        self.http.get_with(BILLER_SEARCH, &SearchQuery { q: term }).await
    }

    /// Pay a bill. Amount rules are checked locally before any request.
    pub async fn pay(&self, payment: &PayBill, available_balance: Amount) -> Result<BillPayment, Error> {
        check_transfer_amount(payment.amount, available_balance)?;
        let paid: BillPayment = self.http.post(PAY, payment).await?;
        tracing::info!(
            payment_id = %paid.payment_id,
            biller_id = %payment.biller_id,
            status = %paid.payment_status,
            "Bill paid"
        );
        Ok(paid)
    }

    pub async fn saved_billers(&self) -> Result<Vec<SavedBiller>, Error> {
        self.http.get(SAVED).await
    }

    pub async fn save_biller(&self, biller: &SaveBiller) -> Result<SavedBiller, Error> {
        self.http.post(SAVED, biller).await
    }

    pub async fn remove_saved_biller(&self, id: &SavedBillerId) -> Result<(), Error> {
        let _: IgnoredAny = self.http.delete(&format!("{SAVED}/{id}")).await?;
        Ok(())
    }

    pub async fn history(&self) -> Result<Vec<BillPayment>, Error> {
        self.http.get(HISTORY).await
    }

    pub async fn payment(&self, id: &BillPaymentId) -> Result<BillPayment, Error> {
        self.http.get(&format!("{HISTORY}/{id}")).await
    }
}

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::http::{ApiClient, Authed};
use crate::error::Error;
use crate::session::TokenProvider;
use crate::types::{Amount, Mpin, QrPaymentId, TransactionId};
use crate::validation::{MAX_TRANSFER_AMOUNT, MIN_TRANSFER_AMOUNT, check_transfer_amount};

const QR_PAYMENTS: &str = "qr-payments";
const GENERATE: &str = "qr-payments/generate";
const SCAN: &str = "qr-payments/scan";
const PAY: &str = "qr-payments/pay";
const HISTORY: &str = "qr-payments/history";
const ACTIVE: &str = "qr-payments/active";

pub const DEFAULT_EXPIRY_MINUTES: u32 = 30;
const EXPIRY_RANGE: std::ops::RangeInclusive<u32> = 5..=1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum QrType {
    /// Collect money into the customer's own account.
    Receive,
    Merchant,
    #[serde(other)]
    Other,
}

/// A generated, scanned or paid QR code. Every QR endpoint answers with one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct QrPayment {
    pub qr_payment_id: QrPaymentId,
    pub qr_code: String,
    pub qr_type: QrType,
    /// Absent for open-amount codes.
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub merchant_upi: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub ifsc_code: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
    #[serde(default)]
    pub payment_status: Option<String>,
    /// Payload to render as the QR image.
    #[serde(default)]
    pub qr_data: Option<String>,
    #[serde(default)]
    pub is_expired: bool,
    #[serde(default, with = "crate::api::timestamp::option")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(with = "crate::api::timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "crate::api::timestamp::option")]
    pub completed_at: Option<OffsetDateTime>,
}

impl QrPayment {
    /// Whether the code can still be paid at `now`.
    #[must_use]
    pub fn is_payable_at(&self, now: OffsetDateTime) -> bool {
        !self.is_expired && self.expires_at.is_none_or(|at| at > now)
    }
}

/// Ask for a new QR code. Defaults to a receive-money code valid for
/// [`DEFAULT_EXPIRY_MINUTES`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQr {
    qr_type: QrType,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    merchant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    merchant_upi: Option<String>,
    expiry_minutes: u32,
}

impl Default for GenerateQr {
    fn default() -> Self {
        Self {
            qr_type: QrType::Receive,
            amount: None,
            merchant_name: None,
            merchant_upi: None,
            expiry_minutes: DEFAULT_EXPIRY_MINUTES,
        }
    }
}

impl GenerateQr {
    #[must_use]
    pub fn receive() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn merchant(name: impl Into<String>, upi: impl Into<String>) -> Self {
        Self {
            qr_type: QrType::Merchant,
            merchant_name: Some(name.into()),
            merchant_upi: Some(upi.into()),
            ..Self::default()
        }
    }

    /// Fix the amount the payer will be asked for.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the amount is outside the
    /// per-transaction bounds.
    pub fn with_amount(mut self, amount: Amount) -> Result<Self, Error> {
        if amount < MIN_TRANSFER_AMOUNT || amount > MAX_TRANSFER_AMOUNT {
            return Err(Error::validation(format!(
                "Amount must be between {MIN_TRANSFER_AMOUNT} and {MAX_TRANSFER_AMOUNT}"
            )));
        }
        self.amount = Some(amount);
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] outside 5 to 1440 minutes.
    pub fn with_expiry_minutes(mut self, minutes: u32) -> Result<Self, Error> {
        if !EXPIRY_RANGE.contains(&minutes) {
            return Err(Error::validation(
                "Expiry must be between 5 and 1440 minutes",
            ));
        }
        self.expiry_minutes = minutes;
        Ok(self)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanBody<'a> {
    qr_code: &'a str,
}

/// Pay a scanned code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayQr {
    qr_code: String,
    /// Required for open-amount codes, ignored by the server otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<Amount>,
    mpin: Mpin,
}

impl PayQr {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the code is blank.
    pub fn new(qr_code: &str, mpin: Mpin) -> Result<Self, Error> {
        let qr_code = qr_code.trim();
        if qr_code.is_empty() {
            return Err(Error::validation("No QR code data"));
        }
        Ok(Self {
            qr_code: qr_code.to_owned(),
            amount: None,
            mpin,
        })
    }

    #[must_use]
    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// Receive and pay by QR code.
pub struct QrPayments<'a> {
    http: Authed<'a>,
}

impl<'a> QrPayments<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient, tokens: &'a dyn TokenProvider) -> Self {
        Self {
            http: Authed::new(api, tokens),
        }
    }

    pub async fn generate(&self, request: &GenerateQr) -> Result<QrPayment, Error> {
        let qr: QrPayment = self.http.post(GENERATE, request).await?;
        tracing::debug!(qr_payment_id = %qr.qr_payment_id, "QR code generated");
        Ok(qr)
    }

    /// Resolve scanned data to the payee before paying.
    pub async fn scan(&self, qr_code: &str) -> Result<QrPayment, Error> {
        let qr_code = qr_code.trim();
        if qr_code.is_empty() {
            return Err(Error::validation("No QR code data"));
        }
        self.http.post(SCAN, &ScanBody { qr_code }).await
    }

    /// Pay a scanned code. An explicit amount is checked locally before any
    /// request.
    pub async fn pay(&self, payment: &PayQr, available_balance: Amount) -> Result<QrPayment, Error> {
        if let Some(amount) = payment.amount {
            check_transfer_amount(amount, available_balance)?;
        }
        let qr: QrPayment = self.http.post(PAY, payment).await?;
        tracing::info!(
            qr_payment_id = %qr.qr_payment_id,
            status = qr.payment_status.as_deref().unwrap_or("unknown"),
            "QR payment submitted"
        );
        Ok(qr)
    }

    pub async fn history(&self) -> Result<Vec<QrPayment>, Error> {
        self.http.get(HISTORY).await
    }

    /// Codes the customer generated that have not expired or been paid.
    pub async fn active(&self) -> Result<Vec<QrPayment>, Error> {
        self.http.get(ACTIVE).await
    }

    pub async fn get(&self, id: &QrPaymentId) -> Result<QrPayment, Error> {
        self.http.get(&format!("{QR_PAYMENTS}/{id}")).await
    }
}

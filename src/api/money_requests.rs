use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::http::{ApiClient, Authed};
use crate::error::Error;
use crate::session::TokenProvider;
use crate::types::{Amount, MobileNumber, MoneyRequestId, Mpin, TransactionId, UserId};
use crate::validation::{MAX_TRANSFER_AMOUNT, MIN_TRANSFER_AMOUNT};

const MONEY_REQUESTS: &str = "money-requests";
const CREATE: &str = "money-requests/create";
const ALL: &str = "money-requests/all";
const PENDING: &str = "money-requests/pending";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum MoneyRequestStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

impl MoneyRequestStatus {
    /// Whether the request can still be accepted, rejected or cancelled.
    #[must_use]
    pub fn is_open(self) -> bool {
        self == Self::Pending
    }
}

/// Which side of a request the customer is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum RequestDirection {
    /// Requests the customer raised.
    Sent,
    /// Requests other people sent to the customer.
    Received,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct MoneyRequest {
    pub request_id: MoneyRequestId,
    #[serde(default)]
    pub requester_id: Option<UserId>,
    pub requester_name: String,
    pub requester_mobile: String,
    #[serde(default)]
    pub requestee_id: Option<UserId>,
    #[serde(default)]
    pub requestee_name: Option<String>,
    pub requestee_mobile: String,
    pub amount: Amount,
    #[serde(default)]
    pub description: Option<String>,
    pub status: MoneyRequestStatus,
    /// Set once the request has been paid.
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
    #[serde(with = "crate::api::timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "crate::api::timestamp::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default, with = "crate::api::timestamp::option")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(rename = "requestType")]
    pub direction: RequestDirection,
}

/// Ask someone to pay the customer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct NewMoneyRequest {
    pub requestee_mobile: MobileNumber,
    pub amount: Amount,
    pub description: String,
}

impl NewMoneyRequest {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the amount is outside the
    /// per-transaction bounds or the description is not 3 to 500 characters.
    /// No balance applies to a request.
    pub fn new(
        requestee_mobile: MobileNumber,
        amount: Amount,
        description: &str,
    ) -> Result<Self, Error> {
        if amount < MIN_TRANSFER_AMOUNT {
            return Err(Error::validation(format!(
                "Minimum amount is {MIN_TRANSFER_AMOUNT}"
            )));
        }
        if amount > MAX_TRANSFER_AMOUNT {
            return Err(Error::validation(format!(
                "Maximum amount per transaction is {MAX_TRANSFER_AMOUNT}"
            )));
        }
        let description = description.trim();
        if !(3..=500).contains(&description.chars().count()) {
            return Err(Error::validation(
                "Description must be between 3 and 500 characters",
            ));
        }
        Ok(Self {
            requestee_mobile,
            amount,
            description: description.to_owned(),
        })
    }
}

#[derive(Serialize)]
struct Approval<'a> {
    mpin: &'a Mpin,
}

/// Requests to pay and be paid.
pub struct MoneyRequests<'a> {
    http: Authed<'a>,
}

impl<'a> MoneyRequests<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient, tokens: &'a dyn TokenProvider) -> Self {
        Self {
            http: Authed::new(api, tokens),
        }
    }

    pub async fn create(&self, request: &NewMoneyRequest) -> Result<MoneyRequest, Error> {
        self.http.post(CREATE, request).await
    }

    /// Sent and received requests together; see [`MoneyRequest::direction`].
    pub async fn list(&self) -> Result<Vec<MoneyRequest>, Error> {
        self.http.get(ALL).await
    }

    /// Received requests still awaiting an answer.
    pub async fn pending(&self) -> Result<Vec<MoneyRequest>, Error> {
        self.http.get(PENDING).await
    }

    /// Pay a received request. Money moves, so the MPIN is required.
    pub async fn accept(&self, id: &MoneyRequestId, mpin: &Mpin) -> Result<MoneyRequest, Error> {
        let request: MoneyRequest = self
            .http
            .post(&format!("{MONEY_REQUESTS}/{id}/accept"), &Approval { mpin })
            .await?;
        tracing::info!(
            request_id = %id,
            transaction_id = ?request.transaction_id.as_ref().map(TransactionId::as_str),
            "Money request paid"
        );
        Ok(request)
    }

    pub async fn reject(&self, id: &MoneyRequestId) -> Result<MoneyRequest, Error> {
        self.http
            .call(reqwest::Method::POST, &format!("{MONEY_REQUESTS}/{id}/reject"))
            .await
    }

    /// Withdraw a request the customer sent.
    pub async fn cancel(&self, id: &MoneyRequestId) -> Result<MoneyRequest, Error> {
        self.http
            .call(reqwest::Method::POST, &format!("{MONEY_REQUESTS}/{id}/cancel"))
            .await
    }
}

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use super::http::{ApiClient, Authed};
use crate::error::Error;
use crate::session::TokenProvider;
use crate::types::{AccountId, Amount, Mpin, TransactionId};
use crate::validation::check_transfer_amount;

const ACCOUNT: &str = "accounts/me";
const RECENT_TRANSACTIONS: &str = "accounts/transactions/recent";
const TRANSACTIONS: &str = "accounts/transactions/all";
const SEND_MONEY: &str = "accounts/transactions/send-money";
const STATEMENT: &str = "accounts/statement/download";

const ACCOUNT_NUMBER_LEN: usize = 16;

pub(crate) fn format_date(date: Date) -> Result<String, Error> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| Error::validation(format!("Invalid date: {e}")))
}

/// The customer's primary account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Account {
    pub account_id: AccountId,
    pub account_number: String,
    #[serde(default)]
    pub account_type: Option<String>,
    pub balance: Amount,
    /// Balance net of holds. Falls back to `balance` when absent.
    #[serde(default)]
    pub available_balance: Option<Amount>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub account_status: Option<String>,
    #[serde(default)]
    pub ifsc_code: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
}

impl Account {
    /// The amount a transfer may draw on.
    #[must_use]
    pub fn spendable(&self) -> Amount {
        self.available_balance.unwrap_or(self.balance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    TransferIn,
    TransferOut,
    InterestCredit,
    Fee,
    #[serde(other)]
    Other,
}

impl TransactionType {
    /// Money coming into the account.
    #[must_use]
    pub fn is_credit(self) -> bool {
        matches!(self, Self::Deposit | Self::TransferIn | Self::InterestCredit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
    Reversed,
    #[serde(other)]
    Unknown,
}

/// One ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Transaction {
    pub transaction_id: TransactionId,
    #[serde(default)]
    pub transaction_ref: Option<String>,
    pub transaction_type: TransactionType,
    pub amount: Amount,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TransactionStatus,
    #[serde(with = "crate::api::timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub from_account_number: Option<String>,
    #[serde(default)]
    pub to_account_number: Option<String>,
}

/// Optional filters for the full transaction list.
///
/// ```rust,ignore
/// let filter = TransactionFilter::new()
///     .with_type(TransactionType::TransferOut)
///     .with_date_range(from, to)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    transaction_type: Option<TransactionType>,
    status: Option<TransactionStatus>,
    from: Option<Date>,
    to: Option<Date>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionQuery {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
}

impl TransactionFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to `from..=to`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `from` is after `to`.
    pub fn with_date_range(mut self, from: Date, to: Date) -> Result<Self, Error> {
        if from > to {
            return Err(Error::validation("Start date must be on or before end date"));
        }
        self.from = Some(from);
        self.to = Some(to);
        Ok(self)
    }

    fn to_query(&self) -> Result<TransactionQuery, Error> {
        Ok(TransactionQuery {
            transaction_type: self.transaction_type,
            status: self.status,
            start_date: self.from.map(format_date).transpose()?,
            end_date: self.to.map(format_date).transpose()?,
        })
    }
}

/// Send-money form, validated on construction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct SendMoney {
    pub to_account_number: String,
    pub amount: Amount,
    pub description: String,
    pub mpin: Mpin,
}

impl SendMoney {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the account number is not 16 digits
    /// or the description is not 3 to 100 characters.
    pub fn new(
        to_account_number: &str,
        amount: Amount,
        description: &str,
        mpin: Mpin,
    ) -> Result<Self, Error> {
        let to_account_number = to_account_number.trim();
        if to_account_number.len() != ACCOUNT_NUMBER_LEN
            || !to_account_number.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::validation("Account number must be 16 digits"));
        }
        let description = description.trim();
        if !(3..=100).contains(&description.chars().count()) {
            return Err(Error::validation(
                "Description must be between 3 and 100 characters",
            ));
        }
        Ok(Self {
            to_account_number: to_account_number.to_owned(),
            amount,
            description: description.to_owned(),
            mpin,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatementQuery {
    start_date: String,
    end_date: String,
}

/// Account, transaction history and transfers.
pub struct Accounts<'a> {
    http: Authed<'a>,
}

impl<'a> Accounts<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient, tokens: &'a dyn TokenProvider) -> Self {
        Self {
            http: Authed::new(api, tokens),
        }
    }

    pub async fn account(&self) -> Result<Account, Error> {
        self.http.get(ACCOUNT).await
    }

    /// Latest transactions, newest first. The server picks the count.
    pub async fn recent_transactions(&self) -> Result<Vec<Transaction>, Error> {
        self.http.get(RECENT_TRANSACTIONS).await
    }

    pub async fn transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, Error> {
        let query = filter.to_query()?;
        self.http.get_with(TRANSACTIONS, &query).await
    }

    /// Transfer money to another account.
    ///
    /// The amount is checked against the transfer bounds and
    /// `available_balance` before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without making a request if the amount
    /// is rejected locally; otherwise whatever the server reports.
    pub async fn send_money(
        &self,
        request: &SendMoney,
        available_balance: Amount,
    ) -> Result<Transaction, Error> {
        check_transfer_amount(request.amount, available_balance)?;
        let transaction: Transaction = self.http.post(SEND_MONEY, request).await?;
        tracing::info!(
            transaction_id = %transaction.transaction_id,
            reference = transaction.transaction_ref.as_deref().unwrap_or(""),
            "Transfer submitted"
        );
        Ok(transaction)
    }

    /// Download the statement for `from..=to` as raw file bytes.
    pub async fn download_statement(&self, from: Date, to: Date) -> Result<Vec<u8>, Error> {
        if from > to {
            return Err(Error::validation("Start date must be on or before end date"));
        }
        let query = StatementQuery {
            start_date: format_date(from)?,
            end_date: format_date(to)?,
        };
        self.http.get_bytes(STATEMENT, &query).await
    }
}

//! HTTP client for the banking API.
//!
//! [`BankClient`] ties an [`ApiClient`] to a [`SessionStore`] and hands out
//! borrowed feature clients that sign every request with the session's token.
//!
//! ```rust,ignore
//! use mbank_client::api::BankClient;
//! use mbank_client::config::ClientConfig;
//! use mbank_client::session::Credentials;
//! use mbank_client::storage::FileStorage;
//!
//! let client = BankClient::new(ClientConfig::from_env()?, FileStorage::open(path))?;
//! client.login(&Credentials::parse("9876543210", "123456")?).await?;
//!
//! let account = client.accounts().account().await?;
//! let recent = client.accounts().recent_transactions().await?;
//! ```

mod account;
mod auth;
mod beneficiaries;
mod bills;
mod cards;
mod http;
mod money_requests;
mod notifications;
mod qr;
mod timestamp;
mod users;

use std::sync::Arc;

use tokio::sync::watch;

pub use account::{
    Account, Accounts, SendMoney, Transaction, TransactionFilter, TransactionStatus,
    TransactionType,
};
pub use auth::{Address, Gender, OtpType, PersonalDetails, Registration};
pub use beneficiaries::{Beneficiaries, Beneficiary, BeneficiaryUpdate, NewBeneficiary};
pub use bills::{BillCategory, BillPayment, Biller, Bills, PayBill, SaveBiller, SavedBiller};
pub use cards::{
    Card, CardLimits, CardSettings, CardStatus, CardTransaction, CardType, Cards,
    MIN_DAILY_LIMIT, MIN_MONTHLY_LIMIT, NewCard,
};
pub use http::{AUTHENTICATION_FAILED_MESSAGE, ApiClient};
pub use money_requests::{
    MoneyRequest, MoneyRequestStatus, MoneyRequests, NewMoneyRequest, RequestDirection,
};
pub use notifications::{
    NewNotification, Notification, NotificationKind, NotificationStats, Notifications,
};
pub use qr::{DEFAULT_EXPIRY_MINUTES, GenerateQr, PayQr, QrPayment, QrPayments, QrType};
pub use users::{ChangeMpin, ProfileUpdate, UserProfile, Users};

use crate::config::ClientConfig;
use crate::error::Error;
use crate::session::{Credentials, Session, SessionStore};
use crate::storage::Storage;
use crate::types::User;

/// Session store signing in through the HTTP client.
pub type HttpSessionStore<S> = SessionStore<Arc<ApiClient>, S>;

/// Entry point: one transport, one session, many feature clients.
pub struct BankClient<S: Storage> {
    api: Arc<ApiClient>,
    session: Arc<HttpSessionStore<S>>,
}

impl<S: Storage> Clone for BankClient<S> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            session: Arc::clone(&self.session),
        }
    }
}

impl<S: Storage> BankClient<S> {
    /// Build the transport and restore any persisted session from `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, storage: S) -> Result<Self, Error> {
        let keys = config.storage_keys().clone();
        let api = Arc::new(ApiClient::new(config)?);
        let session = Arc::new(SessionStore::new(Arc::clone(&api), storage, keys));
        Ok(Self { api, session })
    }

    /// Unauthenticated calls: registration and OTP.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn session(&self) -> &HttpSessionStore<S> {
        &self.session
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session, Error> {
        self.session.login(credentials).await
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    /// Signed-in user changes; the current value is available immediately.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.session.subscribe()
    }

    #[must_use]
    pub fn accounts(&self) -> Accounts<'_> {
        Accounts::new(&self.api, self.session.as_ref())
    }

    #[must_use]
    pub fn beneficiaries(&self) -> Beneficiaries<'_> {
        Beneficiaries::new(&self.api, self.session.as_ref())
    }

    #[must_use]
    pub fn bills(&self) -> Bills<'_> {
        Bills::new(&self.api, self.session.as_ref())
    }

    #[must_use]
    pub fn cards(&self) -> Cards<'_> {
        Cards::new(&self.api, self.session.as_ref())
    }

    #[must_use]
    pub fn money_requests(&self) -> MoneyRequests<'_> {
        MoneyRequests::new(&self.api, self.session.as_ref())
    }

    #[must_use]
    pub fn notifications(&self) -> Notifications<'_> {
        Notifications::new(&self.api, self.session.as_ref())
    }

    #[must_use]
    pub fn qr_payments(&self) -> QrPayments<'_> {
        QrPayments::new(&self.api, self.session.as_ref())
    }

    #[must_use]
    pub fn users(&self) -> Users<'_> {
        Users::new(&self.api, self.session.as_ref())
    }
}

use std::sync::OnceLock;

use parking_lot::RwLock;
use tokio::sync::watch;

use super::traits::{AuthApi, TokenProvider};
use super::types::{Credentials, Session};
use crate::config::StorageKeys;
use crate::error::Error;
use crate::storage::{Storage, StorageExt};
use crate::token;
use crate::types::{DeviceId, User};

/// Single authority for "who is signed in".
///
/// Holds the current [`Session`], mirrors it into durable storage, and
/// broadcasts the current [`User`] to subscribers. Construct one at startup
/// and share it (usually behind an `Arc`) with every consumer.
pub struct SessionStore<A, S> {
    api: A,
    storage: S,
    keys: StorageKeys,
    session: RwLock<Option<Session>>,
    user_tx: watch::Sender<Option<User>>,
    device_id: OnceLock<DeviceId>,
}

impl<A: AuthApi, S: Storage> SessionStore<A, S> {
    /// Create the store, restoring any session persisted in `storage`.
    pub fn new(api: A, storage: S, keys: StorageKeys) -> Self {
        let session = restore(&storage, &keys);
        let (user_tx, _) = watch::channel(session.as_ref().map(|s| s.user.clone()));
        Self {
            api,
            storage,
            keys,
            session: RwLock::new(session),
            user_tx,
            device_id: OnceLock::new(),
        }
    }

    /// The in-memory session, if any. Does not check expiry.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.read().as_ref().map(|s| s.user.clone())
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.access_token.clone())
    }

    /// True iff a session exists and its access token is not expired locally.
    ///
    /// Undecodable tokens count as expired.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .as_ref()
            .is_some_and(|s| !token::is_expired(&s.access_token))
    }

    /// Subscribe to the current user.
    ///
    /// The receiver starts with the latest value already visible through
    /// [`watch::Receiver::borrow`], and is notified on every login and on
    /// every logout that actually ends a session.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user_tx.subscribe()
    }

    /// Per-device identifier, generated on first use and persisted.
    pub fn device_id(&self) -> DeviceId {
        *self.device_id.get_or_init(|| {
            if let Some(id) = self.storage.get::<DeviceId>(&self.keys.device_id) {
                return id;
            }
            let id = DeviceId::generate();
            self.storage.set(&self.keys.device_id, &id);
            tracing::debug!(device_id = %id, "Generated device identifier");
            id
        })
    }

    /// Sign in.
    ///
    /// On success the new session replaces any previous one in memory and in
    /// storage, and subscribers receive the new user. On failure nothing
    /// changes and the server's message is returned.
    ///
    /// # Errors
    ///
    /// Whatever the login call returns: [`Error::Unauthorized`] for rejected
    /// credentials, [`Error::Transport`] for network failures, etc.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, Error> {
        let device_id = self.device_id();
        let response = self
            .api
            .login(credentials, &device_id)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Login failed"))?;

        let session = Session::from(response);
        self.install(session.clone());
        tracing::info!(user_id = %session.user.user_id, "Signed in");
        Ok(session)
    }

    /// Sign out. Safe to call repeatedly.
    ///
    /// Clears the three session keys (the device identifier is kept) and
    /// publishes `None`, but only if a session was actually active.
    pub fn logout(&self) {
        let mut guard = self.session.write();
        self.storage.remove(&self.keys.access_token);
        self.storage.remove(&self.keys.refresh_token);
        self.storage.remove(&self.keys.current_user);
        let ended = guard.take().is_some();
        self.user_tx.send_if_modified(|user| user.take().is_some());
        drop(guard);

        if ended {
            tracing::info!("Signed out");
        }
    }

    /// Re-read the session from storage, replacing the in-memory copy.
    ///
    /// Subscribers are notified only if the visible user changed.
    pub fn reload(&self) {
        let mut guard = self.session.write();
        *guard = restore(&self.storage, &self.keys);
        let user = guard.as_ref().map(|s| s.user.clone());
        self.user_tx.send_if_modified(|current| {
            if *current == user {
                false
            } else {
                *current = user;
                true
            }
        });
    }

    fn install(&self, session: Session) {
        let mut guard = self.session.write();
        self.storage.set(&self.keys.access_token, &session.access_token);
        match &session.refresh_token {
            Some(refresh) => self.storage.set(&self.keys.refresh_token, refresh),
            None => self.storage.remove(&self.keys.refresh_token),
        }
        self.storage.set(&self.keys.current_user, &session.user);
        let user = session.user.clone();
        *guard = Some(session);
        self.user_tx.send_modify(|current| *current = Some(user));
    }
}

impl<A: AuthApi, S: Storage> TokenProvider for SessionStore<A, S> {
    fn bearer_token(&self) -> Result<String, Error> {
        let token = self.access_token().ok_or_else(Error::not_signed_in)?;
        if token::is_expired(&token) {
            tracing::info!("Access token expired locally; signing out");
            self.logout();
            return Err(Error::session_expired());
        }
        Ok(token)
    }

    fn revoke(&self) {
        tracing::warn!("Access token rejected by server; signing out");
        self.logout();
    }
}

/// Reads the persisted session. Both the token and the user must be present;
/// a half-written pair is discarded so storage and memory agree.
fn restore<S: Storage>(storage: &S, keys: &StorageKeys) -> Option<Session> {
    let access_token = storage.get::<String>(&keys.access_token);
    let user = storage.get::<User>(&keys.current_user);

    match (access_token, user) {
        (Some(access_token), Some(user)) => Some(Session {
            access_token,
            refresh_token: storage.get::<String>(&keys.refresh_token),
            user,
        }),
        (None, None) => None,
        _ => {
            tracing::warn!("Discarding incomplete persisted session");
            storage.remove(&keys.access_token);
            storage.remove(&keys.refresh_token);
            storage.remove(&keys.current_user);
            None
        }
    }
}

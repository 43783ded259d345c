//! Client-side session lifecycle.
//!
//! A [`SessionStore`] owns the signed-in state. It restores that state from
//! [`Storage`](crate::storage::Storage) at construction, delegates the login
//! call to an [`AuthApi`], and hands bearer tokens to feature clients through
//! [`TokenProvider`].
//!
//! ```rust,ignore
//! use mbank_client::session::{Credentials, SessionStore};
//!
//! let store = SessionStore::new(api, FileStorage::open(path), config.storage_keys().clone());
//! let mut users = store.subscribe();
//!
//! store.login(&Credentials::parse("9876543210", "123456")?).await?;
//! assert!(users.borrow_and_update().is_some());
//! ```

mod store;
mod traits;
mod types;

pub use store::SessionStore;
pub use traits::{AuthApi, TokenProvider};
#[cfg(feature = "client")]
pub(crate) use types::LoginRequest;
pub use types::{Credentials, LoginResponse, Session};

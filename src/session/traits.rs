use std::future::Future;
use std::sync::Arc;

use super::types::{Credentials, LoginResponse};
use crate::error::Error;
use crate::types::DeviceId;

/// The unauthenticated login call the session store delegates to.
///
/// Implemented by [`ApiClient`](crate::api::ApiClient); tests supply stubs.
///
/// # Example
///
/// ```rust,ignore
/// impl AuthApi for FixedLogin {
///     async fn login(&self, _: &Credentials, _: &DeviceId) -> Result<LoginResponse, Error> {
///         Ok(self.response.clone())
///     }
/// }
/// ```
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for tokens and the user profile.
    fn login(
        &self,
        credentials: &Credentials,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<LoginResponse, Error>> + Send;
}

impl<T: AuthApi> AuthApi for Arc<T> {
    fn login(
        &self,
        credentials: &Credentials,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<LoginResponse, Error>> + Send {
        (**self).login(credentials, device_id)
    }
}

/// Source of the bearer credential for authenticated requests.
///
/// Object-safe so feature clients can hold `&dyn TokenProvider`.
pub trait TokenProvider: Send + Sync {
    /// The access token to present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] when there is no usable session.
    fn bearer_token(&self) -> Result<String, Error>;

    /// Called when the server rejects the presented token. Must drop the session.
    fn revoke(&self);
}

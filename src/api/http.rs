use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::envelope::{ApiResponse, non_empty_or};
use crate::error::{Error, MALFORMED_RESPONSE_MESSAGE, TIMEOUT_MESSAGE, TRANSPORT_FAILURE_MESSAGE};
use crate::session::TokenProvider;

/// Fallback for a 401 whose body carries no message.
pub const AUTHENTICATION_FAILED_MESSAGE: &str = "Authentication failed. Please log in again.";

/// HTTP transport for the banking API.
///
/// Owns the connection pool and the configured deadline. Calls made directly
/// on `ApiClient` are unauthenticated; feature clients add the bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client with a connection pool honouring `config.timeout()`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    ///
    /// The caller is responsible for configuring its timeout.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let url: Url = self.config.endpoint(path)?;
        tracing::debug!(%method, path, "API request");
        Ok(self.http.request(method, url))
    }

    /// Unauthenticated JSON POST.
    pub(crate) async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, path)?
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        read_envelope(response).await
    }
}

/// Authenticated request helper shared by every feature client.
///
/// Attaches the bearer token from the [`TokenProvider`] and revokes the
/// session when the server answers 401.
#[derive(Clone, Copy)]
pub(crate) struct Authed<'a> {
    api: &'a ApiClient,
    tokens: &'a dyn TokenProvider,
}

impl<'a> Authed<'a> {
    pub(crate) fn new(api: &'a ApiClient, tokens: &'a dyn TokenProvider) -> Self {
        Self { api, tokens }
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let token = self.tokens.bearer_token()?;
        Ok(self.api.request(method, path)?.bearer_auth(token))
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, Error> {
        let response = builder.send().await.map_err(transport_error)?;
        let result = read_envelope(response).await;
        self.revoke_if_rejected(result)
    }

    fn revoke_if_rejected<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(e) = &result {
            if e.is_unauthorized() {
                self.tokens.revoke();
            }
        }
        result
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let builder = self.request(Method::GET, path)?;
        self.execute(builder).await
    }

    pub(crate) async fn get_with<Q, T>(&self, path: &str, query: &Q) -> Result<T, Error>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::GET, path)?.query(query);
        self.execute(builder).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method, path)?.json(body);
        self.execute(builder).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, body).await
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, body).await
    }

    /// Bodiless request with the given method (e.g. `POST .../reject`).
    pub(crate) async fn call<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, Error> {
        let builder = self.request(method, path)?;
        self.execute(builder).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.call(Method::DELETE, path).await
    }

    /// GET returning the raw body on success (binary downloads).
    pub(crate) async fn get_bytes<Q>(&self, path: &str, query: &Q) -> Result<Vec<u8>, Error>
    where
        Q: Serialize + ?Sized,
    {
        let response = self
            .request(Method::GET, path)?
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;
        if status.is_success() {
            return Ok(body.to_vec());
        }
        let envelope = serde_json::from_slice::<ApiResponse>(&body).ok();
        self.revoke_if_rejected(Err(status_error(status, envelope)))
    }
}

/// Normalises a response into the payload or a single error.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;
    let envelope = serde_json::from_slice::<ApiResponse>(&body);

    if status.is_success() {
        let envelope = envelope.map_err(|e| {
            tracing::warn!(%status, error = %e, "Response body is not an API envelope");
            Error::Transport(MALFORMED_RESPONSE_MESSAGE.to_owned())
        })?;
        return envelope.into_data(Some(status.as_u16()));
    }

    Err(status_error(status, envelope.ok()))
}

fn status_error(status: StatusCode, envelope: Option<ApiResponse>) -> Error {
    let (message, error_code) = match envelope {
        Some(env) => (env.message, env.error_code),
        None => (String::new(), None),
    };
    tracing::debug!(%status, error_code = ?error_code, "API request rejected");

    if status == StatusCode::UNAUTHORIZED {
        return Error::Unauthorized {
            message: non_empty_or(message, AUTHENTICATION_FAILED_MESSAGE),
        };
    }
    Error::Api {
        message: non_empty_or(message, fallback_message(status)),
        error_code,
        status: Some(status.as_u16()),
    }
}

fn fallback_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "The requested item was not found.",
        StatusCode::FORBIDDEN => "You are not allowed to perform this action.",
        StatusCode::TOO_MANY_REQUESTS => "Too many attempts. Please wait and try again.",
        s if s.is_server_error() => "The service is temporarily unavailable. Please try again later.",
        _ => "Request failed. Please try again.",
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    tracing::warn!(error = %e, "Transport failure");
    if e.is_timeout() {
        Error::Transport(TIMEOUT_MESSAGE.to_owned())
    } else {
        Error::Transport(TRANSPORT_FAILURE_MESSAGE.to_owned())
    }
}

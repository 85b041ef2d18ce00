//! Access-token acquisition and caching.

use crate::error::Error;
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::{collections::HashMap, fmt, sync::Arc};
use tokio::sync::Mutex;

/// Tokens are refreshed this many seconds before their actual expiry, so a
/// token never expires while a request carrying it is in flight.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Wrapper for a secret string that redacts itself in `Debug` output and
/// wipes the backing memory on drop.
#[derive(Clone, Debug)]
pub struct Token(Secret<String>);

impl Token {
    pub fn new<T: Into<String>>(s: T) -> Self {
        Self(Secret::new(s.into()))
    }

    /// Exposes a reference to the underlying secret string.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl<T> From<T> for Token
where
    T: Into<String>,
{
    fn from(s: T) -> Self {
        Token::new(s)
    }
}

/// Manager for client credentials and the per-scope access tokens issued for
/// them.
///
/// Each Inter permission scope is requested (and expires) independently, so
/// the cache holds one entry per scope. The whole read-check-refresh-write
/// sequence runs under one async mutex: concurrent callers that hit an
/// expired entry are serialized, and at most one token exchange is in flight
/// per client.
#[derive(Clone)]
pub(crate) struct Authenticator {
    inner: Arc<AuthenticatorInner>,
}

struct AuthenticatorInner {
    client: ClientWithMiddleware,
    token_url: Url,
    client_id: String,
    client_secret: Token,
    tokens: Mutex<HashMap<String, CachedToken>>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("client_id", &self.inner.client_id)
            .field("token_url", &self.inner.token_url)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Creates a new authenticator. `client` must already carry the client's
    /// mutual-TLS identity: the token endpoint authenticates the exchange
    /// through the TLS handshake, not through a bearer token.
    pub(crate) fn new(
        client: ClientWithMiddleware,
        token_url: Url,
        client_id: String,
        client_secret: Token,
    ) -> Self {
        Self {
            inner: Arc::new(AuthenticatorInner {
                client,
                token_url,
                client_id,
                client_secret,
                tokens: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns a valid access token for `scope`, performing a
    /// client-credentials exchange if the cached one is absent or within the
    /// expiry margin. A refresh replaces the previous cache entry.
    #[tracing::instrument(name = "Get Access Token", level = "debug", skip(self))]
    pub(crate) async fn access_token(&self, scope: &str) -> Result<Token, Error> {
        let mut tokens = self.inner.tokens.lock().await;

        if let Some(cached) = tokens.get(scope) {
            if cached.is_valid(now()) {
                tracing::debug!("Reusing cached access token");
                return Ok(cached.access_token.clone());
            }
        }

        let fresh = self.exchange(scope).await?;
        let token = fresh.access_token.clone();
        tokens.insert(scope.to_string(), fresh);

        Ok(token)
    }

    async fn exchange(&self, scope: &str) -> Result<CachedToken, Error> {
        let form = [
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("grant_type", "client_credentials"),
            ("scope", scope),
        ];

        let result = async {
            let res: RawTokenResponse = self
                .inner
                .client
                .post(self.inner.token_url.clone())
                .form(&form)
                .send()
                .await
                .map_err(Error::from)?
                .json()
                .await?;
            Ok::<_, Error>(res)
        }
        .await;

        // Whatever went wrong here, the cause is the credential pair or the
        // TLS identity: the token endpoint takes no other input. A structured
        // error body, if the endpoint sent one, rides along.
        let res = result.map_err(|e| {
            let api_error = match &e {
                Error::Api(api_error) | Error::Server(api_error) => Some(api_error.clone()),
                _ => None,
            };
            Error::Credentials {
                scope: scope.to_string(),
                detail: e.to_string(),
                api_error,
            }
        })?;

        tracing::info!("Obtained new access token");

        // If the server does not echo an issuance timestamp, stamp the moment
        // the response was received. That slightly under-counts the real
        // remaining lifetime, which is the safe direction.
        let created_at = res
            .created_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(now);

        Ok(CachedToken {
            access_token: Token::new(res.access_token),
            created_at,
            expires_in: res.expires_in,
        })
    }
}

/// A cached access token together with its issuance data.
struct CachedToken {
    access_token: Token,
    created_at: DateTime<Utc>,
    expires_in: i64,
}

impl CachedToken {
    fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS)
            < self.created_at + Duration::seconds(self.expires_in)
    }
}

/// Successful response of a token exchange.
#[derive(Deserialize)]
struct RawTokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    created_at: Option<i64>,
}

// Select an implementation of `now()` depending on whether we are testing or not
#[cfg(not(test))]
fn now() -> DateTime<Utc> {
    Utc::now()
}
#[cfg(test)]
use tests::mocked_time::now;

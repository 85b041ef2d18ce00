//! Authenticated request dispatch shared by every resource client.

use crate::{authenticator::Authenticator, error::Error};
use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    Method, StatusCode, Url,
};
use reqwest_middleware::ClientWithMiddleware;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        RwLock,
    },
    time::Duration,
};

pub(crate) const SDK_HEADER: &str = "x-inter-sdk";
pub(crate) const SDK_VERSION_HEADER: &str = "x-inter-sdk-version";
/// Selects the checking account for applications registered with more than one.
pub(crate) const ACCOUNT_HEADER: &str = "x-conta-corrente";

/// How long to wait before retrying a rate-limited request. The Inter APIs
/// enforce per-minute quotas, so shorter waits would only burn attempts.
const RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(60);
/// Ceiling on rate-limit retries. The last 429 is surfaced to the caller.
const MAX_RATE_LIMIT_RETRIES: u32 = 5;
/// Statuses whose (absent) body must not be parsed.
const NO_CONTENT_STATUSES: [u16; 2] = [202, 204];

/// Issues a single authenticated HTTP call: obtains a bearer token for the
/// requested scope, attaches the SDK and account headers, and sends the
/// request over the mutual-TLS client stack.
///
/// A 429 is retried transparently (fixed 60s interval, fresh token lookup per
/// attempt, at most [`MAX_RATE_LIMIT_RETRIES`] retries) when rate-limit
/// control is enabled; every other failure maps to exactly one typed error.
/// Callers that need a hard latency bound can wrap calls in
/// `tokio::time::timeout`.
pub(crate) struct Gateway {
    client: ClientWithMiddleware,
    authenticator: Authenticator,
    account: RwLock<Option<String>>,
    debug: AtomicBool,
    rate_limit_control: AtomicBool,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("account", &self.account.read().unwrap().clone())
            .field("rate_limit_control", &self.rate_limit_control)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    pub(crate) fn new(client: ClientWithMiddleware, authenticator: Authenticator) -> Self {
        Self {
            client,
            authenticator,
            account: RwLock::new(None),
            debug: AtomicBool::new(false),
            rate_limit_control: AtomicBool::new(true),
        }
    }

    pub(crate) fn select_account(&self, account: Option<String>) {
        *self.account.write().unwrap() = account;
    }

    pub(crate) fn account(&self) -> Option<String> {
        self.account.read().unwrap().clone()
    }

    pub(crate) fn set_debug(&self, debug: bool) {
        self.debug.store(debug, Ordering::Relaxed);
    }

    pub(crate) fn set_rate_limit_control(&self, control: bool) {
        self.rate_limit_control.store(control, Ordering::Relaxed);
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url, scope: &str) -> Result<T, Error> {
        let value = self.execute(Method::GET, url, scope, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub(crate) async fn post<B, T>(&self, url: Url, scope: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let value = self.execute(Method::POST, url, scope, Some(&body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub(crate) async fn put<B, T>(&self, url: Url, scope: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let value = self.execute(Method::PUT, url, scope, Some(&body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub(crate) async fn patch<B, T>(&self, url: Url, scope: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let value = self.execute(Method::PATCH, url, scope, Some(&body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        url: Url,
        scope: &str,
    ) -> Result<T, Error> {
        let value = self.execute(Method::DELETE, url, scope, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Sends one logical request, retrying on 429 as configured. Statuses in
    /// the no-content set yield `Value::Null`, which deserializes to `()` or
    /// `Option::None` in the typed wrappers.
    pub(crate) async fn execute(
        &self,
        method: Method,
        url: Url,
        scope: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, Error> {
        let mut retries = 0u32;

        loop {
            // A fresh token lookup on every attempt: the credential's
            // rate-limit window resets independently of token expiry.
            let token = self.authenticator.access_token(scope).await?;
            let mut auth_value =
                HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                    .map_err(|e| Error::Other(e.into()))?;
            auth_value.set_sensitive(true);

            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .header(AUTHORIZATION, auth_value)
                .header(SDK_HEADER, "rust")
                .header(SDK_VERSION_HEADER, env!("CARGO_PKG_VERSION"));
            if let Some(account) = self.account() {
                request = request.header(ACCOUNT_HEADER, account);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await.map_err(Error::from) {
                Ok(response) => {
                    if NO_CONTENT_STATUSES.contains(&response.status().as_u16()) {
                        return Ok(serde_json::Value::Null);
                    }

                    let value: serde_json::Value = response.json().await?;
                    if self.debug.load(Ordering::Relaxed) {
                        tracing::info!(body = %value, "http response");
                    }
                    return Ok(value);
                }
                Err(Error::Api(api_error))
                    if api_error.status == StatusCode::TOO_MANY_REQUESTS.as_u16()
                        && self.rate_limit_control.load(Ordering::Relaxed)
                        && retries < MAX_RATE_LIMIT_RETRIES =>
                {
                    retries += 1;
                    tracing::warn!(retries, "rate limited, waiting before retrying");
                    tokio::time::sleep(RATE_LIMIT_INTERVAL).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{authenticator::Token, middlewares::error_handling::ErrorHandlingMiddleware};
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    static MOCK_ACCESS_TOKEN: &str = "mock-access-token";

    async fn mock_gateway_and_server() -> (Gateway, MockServer) {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/v2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "access_token": MOCK_ACCESS_TOKEN,
                "expires_in": 3600,
                "scope": "extrato.read"
            })))
            .mount(&mock_server)
            .await;

        let base = Url::parse(&mock_server.uri()).unwrap();
        let authenticator = Authenticator::new(
            reqwest::Client::new().into(),
            base.join("/oauth/v2/token").unwrap(),
            "client-id".to_string(),
            Token::new("client-secret"),
        );
        let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
            .with(ErrorHandlingMiddleware)
            .build();

        (Gateway::new(client, authenticator), mock_server)
    }

    fn resource_url(mock_server: &MockServer) -> Url {
        Url::parse(&mock_server.uri())
            .and_then(|u| u.join("/banking/v2/saldo"))
            .unwrap()
    }

    #[tokio::test]
    async fn attaches_bearer_and_sdk_headers() {
        let (gateway, mock_server) = mock_gateway_and_server().await;

        Mock::given(method("GET"))
            .and(path("/banking/v2/saldo"))
            .and(header(
                "Authorization",
                format!("Bearer {}", MOCK_ACCESS_TOKEN).as_str(),
            ))
            .and(header(SDK_HEADER, "rust"))
            .and(header(SDK_VERSION_HEADER, env!("CARGO_PKG_VERSION")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let value = gateway
            .execute(
                Method::GET,
                resource_url(&mock_server),
                "extrato.read",
                None,
            )
            .await
            .unwrap();
        assert_eq!(value, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn attaches_the_account_header_when_an_account_is_selected() {
        let (gateway, mock_server) = mock_gateway_and_server().await;
        gateway.select_account(Some("12345678".to_string()));

        Mock::given(method("GET"))
            .and(path("/banking/v2/saldo"))
            .and(header(ACCOUNT_HEADER, "12345678"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        gateway
            .execute(
                Method::GET,
                resource_url(&mock_server),
                "extrato.read",
                None,
            )
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn retries_once_after_a_single_rate_limit_response() {
        let (gateway, mock_server) = mock_gateway_and_server().await;

        Mock::given(method("GET"))
            .and(path("/banking/v2/saldo"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/banking/v2/saldo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "after": "retry" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        // The paused clock auto-advances through the 60s wait.
        let value = gateway
            .execute(
                Method::GET,
                resource_url(&mock_server),
                "extrato.read",
                None,
            )
            .await
            .unwrap();
        assert_eq!(value, json!({ "after": "retry" }));
    }

    #[tokio::test(start_paused = true)]
    async fn sustained_rate_limiting_eventually_surfaces_the_429() {
        let (gateway, mock_server) = mock_gateway_and_server().await;

        Mock::given(method("GET"))
            .and(path("/banking/v2/saldo"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1 + MAX_RATE_LIMIT_RETRIES as u64)
            .mount(&mock_server)
            .await;

        let err = gateway
            .execute(
                Method::GET,
                resource_url(&mock_server),
                "extrato.read",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(e) if e.status == 429));
    }

    #[tokio::test]
    async fn rate_limit_control_can_be_disabled() {
        let (gateway, mock_server) = mock_gateway_and_server().await;
        gateway.set_rate_limit_control(false);

        Mock::given(method("GET"))
            .and(path("/banking/v2/saldo"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = gateway
            .execute(
                Method::GET,
                resource_url(&mock_server),
                "extrato.read",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(e) if e.status == 429));
    }

    #[tokio::test]
    async fn no_content_statuses_yield_an_empty_result() {
        let (gateway, mock_server) = mock_gateway_and_server().await;

        Mock::given(method("DELETE"))
            .and(path("/banking/v2/saldo"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let () = gateway
            .delete(resource_url(&mock_server), "extrato.read")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn server_errors_are_not_retried() {
        let (gateway, mock_server) = mock_gateway_and_server().await;

        Mock::given(method("GET"))
            .and(path("/banking/v2/saldo"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "title": "Erro interno",
                "detail": "Tente novamente mais tarde"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = gateway
            .execute(
                Method::GET,
                resource_url(&mock_server),
                "extrato.read",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Server(e) if e.title == "Erro interno"));
    }

    #[tokio::test]
    async fn connection_failures_surface_as_transport_errors() {
        let (gateway, _mock_server) = mock_gateway_and_server().await;

        // Nothing listens on this port.
        let err = gateway
            .execute(
                Method::GET,
                Url::parse("http://127.0.0.1:9/banking/v2/saldo").unwrap(),
                "extrato.read",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}

//! Clients for the Inter API families.

use crate::{client::Environment, gateway::Gateway};
use std::fmt::{Debug, Formatter};

pub mod banking;
pub mod billing;
pub mod pix;
pub mod webhooks;

pub(crate) struct InterClientInner {
    pub(crate) gateway: Gateway,
    pub(crate) environment: Environment,
}

impl Debug for InterClientInner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterClientInner")
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::InterClientInner;
    use crate::{
        authenticator::{Authenticator, Token},
        client::Environment,
        gateway::Gateway,
        middlewares::error_handling::ErrorHandlingMiddleware,
    };
    use reqwest::Url;
    use std::sync::Arc;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    /// Starts a mock server with a working token endpoint and builds an
    /// `InterClientInner` pointed at it.
    pub(crate) async fn mock_inner_and_server() -> (Arc<InterClientInner>, MockServer) {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/v2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "access_token": "mock-access-token",
                "expires_in": 3600,
                "scope": "mock"
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
        let gateway = Gateway::new(
            reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
                .with(ErrorHandlingMiddleware)
                .build(),
            authenticator,
        );

        let inner = Arc::new(InterClientInner {
            gateway,
            environment: Environment::from_single_url(&base),
        });

        (inner, mock_server)
    }
}

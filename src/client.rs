//! Module containing the main Inter API client.

use crate::{
    apis::{banking::BankingApi, billing::BillingApi, pix::PixApi, InterClientInner},
    authenticator::{Authenticator, Token},
    error::Error,
    gateway::Gateway,
    identity::TlsIdentity,
    middlewares::error_handling::ErrorHandlingMiddleware,
};
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use reqwest_tracing::TracingMiddleware;
use std::{path::PathBuf, sync::Arc};

static PRODUCTION_BASE_URL: &str = "https://cdpj.partners.bancointer.com.br";
static UAT_BASE_URL: &str = "https://cdpj-uat.partners.uatinter.co";
static SANDBOX_BASE_URL: &str = "https://cdpj-sandbox.partners.uatinter.co";

static TOKEN_PATH: &str = "/oauth/v2/token";

/// Certificates within this many days of expiry produce a construction-time
/// warning.
const EXPIRY_WARN_THRESHOLD_DAYS: i64 = 30;

/// The environment an [`InterClient`] talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Production,
    Uat,
    Sandbox,
    /// Custom base URL, mainly useful for tests.
    Custom { base_url: Url },
}

impl Environment {
    /// Base URL of all API families in this environment.
    pub fn base_url(&self) -> Url {
        match self {
            Environment::Production => Url::parse(PRODUCTION_BASE_URL).unwrap(),
            Environment::Uat => Url::parse(UAT_BASE_URL).unwrap(),
            Environment::Sandbox => Url::parse(SANDBOX_BASE_URL).unwrap(),
            Environment::Custom { base_url } => base_url.clone(),
        }
    }

    pub fn from_single_url(base_url: &Url) -> Self {
        Environment::Custom {
            base_url: base_url.clone(),
        }
    }
}

/// Client for the Inter PJ public APIs.
///
/// Construction loads the application's PKCS#12 identity, refuses to start
/// with an expired certificate, and records a warning (see
/// [`warnings`](InterClient::warnings)) when the certificate is close to
/// expiry. All requests are sent over mutual TLS with per-scope bearer tokens
/// acquired and cached transparently.
#[derive(Debug, Clone)]
pub struct InterClient {
    /// Banking APIs client: balance, statements, payments, webhooks.
    pub banking: BankingApi,
    /// Billing (boleto) APIs client.
    pub billing: BillingApi,
    /// PIX APIs client.
    pub pix: PixApi,
    inner: Arc<InterClientInner>,
    warnings: Arc<Vec<String>>,
}

impl InterClient {
    /// Returns a new builder to configure an [`InterClient`].
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> InterClientBuilder {
        InterClientBuilder::new(client_id, client_secret)
    }

    /// Non-fatal warnings collected while the client was built, such as a
    /// certificate close to expiry.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Selects the checking account to operate on. Only needed when the
    /// application is registered with more than one account.
    pub fn select_account(&self, account: impl Into<String>) {
        self.inner.gateway.select_account(Some(account.into()));
    }

    /// Clears the selected checking account.
    pub fn clear_account(&self) {
        self.inner.gateway.select_account(None);
    }

    /// The currently selected checking account, if any.
    pub fn account(&self) -> Option<String> {
        self.inner.gateway.account()
    }

    /// In debug mode, response bodies are logged through `tracing`.
    pub fn set_debug(&self, debug: bool) {
        self.inner.gateway.set_debug(debug);
    }

    /// Enables or disables the automatic wait-and-retry on HTTP 429. Enabled
    /// by default; when disabled, a 429 surfaces like any other client error.
    pub fn set_rate_limit_control(&self, control: bool) {
        self.inner.gateway.set_rate_limit_control(control);
    }
}

#[derive(Debug)]
enum CertificateSource {
    File(PathBuf),
    Der(Vec<u8>),
}

/// Builder for an [`InterClient`].
#[derive(Debug)]
pub struct InterClientBuilder {
    client_id: String,
    client_secret: Token,
    certificate: Option<(CertificateSource, String)>,
    environment: Environment,
}

impl InterClientBuilder {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Token::new(client_secret),
            certificate: None,
            environment: Environment::Production,
        }
    }

    /// Sets the PKCS#12 certificate bundle to load the mutual-TLS identity
    /// from, e.g. `certs/inter.pfx`.
    pub fn with_certificate_file(
        mut self,
        path: impl Into<PathBuf>,
        password: impl Into<String>,
    ) -> Self {
        self.certificate = Some((CertificateSource::File(path.into()), password.into()));
        self
    }

    /// Sets an in-memory PKCS#12 certificate bundle.
    pub fn with_certificate_der(
        mut self,
        der: impl Into<Vec<u8>>,
        password: impl Into<String>,
    ) -> Self {
        self.certificate = Some((CertificateSource::Der(der.into()), password.into()));
        self
    }

    /// Selects the environment to connect to. Defaults to production.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Consumes the builder and builds a new [`InterClient`].
    ///
    /// Fails if the certificate bundle cannot be loaded or is already
    /// expired.
    pub fn build(self) -> Result<InterClient, Error> {
        let (source, password) = self.certificate.ok_or_else(|| {
            Error::Other(anyhow::anyhow!(
                "a PKCS#12 certificate bundle is required, see with_certificate_file"
            ))
        })?;
        let identity = match source {
            CertificateSource::File(path) => TlsIdentity::from_pkcs12_file(path, &password)?,
            CertificateSource::Der(der) => TlsIdentity::from_pkcs12_der(&der, &password)?,
        };

        let mut warnings = Vec::new();
        let status = identity.check_expiry(EXPIRY_WARN_THRESHOLD_DAYS)?;
        if status.expiring_soon {
            warnings.push(format!(
                "Certificate nearing expiration: {} days left, expires on {}",
                status.days_remaining,
                identity.not_after()
            ));
        }

        let http_client = reqwest::Client::builder()
            .identity(identity.identity())
            .build()?;

        let base_url = self.environment.base_url();
        let token_url = base_url
            .join(TOKEN_PATH)
            .map_err(|e| Error::Other(e.into()))?;

        // The token exchange authenticates through the TLS handshake alone,
        // so its client carries the identity but no bearer-token machinery.
        let authenticator = Authenticator::new(
            build_client_with_middleware(http_client.clone()),
            token_url,
            self.client_id,
            self.client_secret,
        );

        let gateway = Gateway::new(build_client_with_middleware(http_client), authenticator);

        let inner = Arc::new(InterClientInner {
            gateway,
            environment: self.environment,
        });

        Ok(InterClient {
            banking: BankingApi::new(inner.clone()),
            billing: BillingApi::new(inner.clone()),
            pix: PixApi::new(inner.clone()),
            inner,
            warnings: Arc::new(warnings),
        })
    }
}

fn build_client_with_middleware(client: reqwest::Client) -> ClientWithMiddleware {
    reqwest_middleware::ClientBuilder::new(client)
        .with(TracingMiddleware::default())
        .with(ErrorHandlingMiddleware)
        .build()
}

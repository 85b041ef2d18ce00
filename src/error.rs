//! Standard errors used by all functions in the crate.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::{fmt, path::PathBuf};

/// Error collecting all possible failures of the Inter client.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The PKCS#12 certificate bundle could not be read from disk.
    #[error("certificate bundle not found: {}", .0.display())]
    CertificateNotFound(PathBuf),
    /// The PKCS#12 certificate bundle could not be decoded.
    ///
    /// Usually a wrong password or a malformed container.
    #[error("could not decode certificate bundle: {0}")]
    CertificateDecode(#[from] openssl::error::ErrorStack),
    /// The client certificate is already expired. The SDK refuses to start
    /// with an expired identity.
    #[error("client certificate expired on {expired_at}")]
    CertificateExpired { expired_at: DateTime<Utc> },
    /// The token endpoint rejected the client credentials, or the mutual-TLS
    /// handshake to it failed.
    ///
    /// Distinct from [`Error::Api`] so callers can tell "my app registration
    /// is wrong" apart from "this particular call failed".
    #[error("could not obtain an access token for scope \"{scope}\": {detail}")]
    Credentials {
        scope: String,
        detail: String,
        /// The structured error body returned by the token endpoint, when it
        /// sent one.
        api_error: Option<ApiError>,
    },
    /// Client error (4xx) returned by an Inter API endpoint.
    #[error("{0}")]
    Api(#[source] ApiError),
    /// Server error (5xx) returned by an Inter API endpoint.
    #[error("{0}")]
    Server(#[source] ApiError),
    /// Transport-level failure: no HTTP response was received at all.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// A response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Json(#[from] serde_json::Error),
    /// Catch-all variant for unexpected errors.
    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<reqwest_middleware::Error> for Error {
    fn from(e: reqwest_middleware::Error) -> Self {
        match e {
            reqwest_middleware::Error::Reqwest(e) => Error::Http(e),
            reqwest_middleware::Error::Middleware(e) => {
                e.downcast::<Error>().unwrap_or_else(Error::Other)
            }
        }
    }
}

impl From<Error> for reqwest_middleware::Error {
    fn from(e: Error) -> Self {
        reqwest_middleware::Error::Middleware(e.into())
    }
}

/// Structured error returned by the Inter APIs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Concise description of the error.
    pub title: String,
    /// A human readable explanation specific to this occurrence.
    pub detail: Option<String>,
    /// When the server produced the error.
    pub timestamp: Option<String>,
    /// HTTP status returned by the server.
    pub status: u16,
    /// Per-field validation failures, in the order the server reported them.
    pub violations: Vec<Violation>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Inter HTTP error {}: {}", self.status, self.title)?;

        if let Some(ref detail) = self.detail {
            write!(f, "\nAdditional details: {}", detail)?;
        }

        if let Some(ref timestamp) = self.timestamp {
            write!(f, "\nTimestamp: {}", timestamp)?;
        }

        if !self.violations.is_empty() {
            write!(f, "\nViolations:")?;
            for v in &self.violations {
                write!(f, "\n- {}: {} ({})", v.property, v.reason, v.value)?;
            }
        }

        Ok(())
    }
}

/// A single field validation failure reported by the server.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Why the field was rejected.
    #[serde(rename = "razao")]
    pub reason: String,
    /// The offending field.
    #[serde(rename = "propriedade")]
    pub property: String,
    /// The value the server saw.
    #[serde(rename = "valor", default)]
    pub value: String,
}

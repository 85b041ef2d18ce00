use crate::error::{ApiError, Error, Violation};
use async_trait::async_trait;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use task_local_extensions::Extensions;

/// Reqwest middleware which translates non-success responses from the Inter
/// APIs into typed errors: [`Error::Api`] for 4xx, [`Error::Server`] for 5xx.
///
/// If the error body cannot be parsed (or is empty), a fallback [`ApiError`]
/// is built from the status code and the HTTP reason phrase, so every failure
/// carries the same `(title, detail, violations)` shape.
pub struct ErrorHandlingMiddleware;

#[async_trait]
impl Middleware for ErrorHandlingMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let response = next.run(req, extensions).await?;

        let status = response.status();
        if status.as_u16() < 400 {
            return Ok(response);
        }

        let reason = status.canonical_reason().unwrap_or("Unknown Error");
        let bytes = response.bytes().await?;

        tracing::debug!("Failed HTTP request. Status code: {}", status);

        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_else(|_| ErrorBody {
            title: status.as_u16().to_string(),
            detail: Some(if bytes.is_empty() {
                reason.to_string()
            } else {
                String::from_utf8_lossy(&bytes).into_owned()
            }),
            timestamp: None,
            violations: Vec::new(),
        });

        let api_error = ApiError {
            title: body.title,
            detail: body.detail,
            timestamp: body.timestamp,
            status: status.as_u16(),
            violations: body.violations,
        };

        let error = if status.is_server_error() {
            Error::Server(api_error)
        } else {
            Error::Api(api_error)
        };

        Err(error.into())
    }
}

/// Error body shape returned by the Inter APIs.
#[derive(serde::Deserialize, Debug)]
struct ErrorBody {
    title: String,
    detail: Option<String>,
    timestamp: Option<String>,
    #[serde(rename = "violacoes", default)]
    violations: Vec<Violation>,
}

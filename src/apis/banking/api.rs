use super::model::*;
use crate::{
    apis::{
        webhooks::{CallbacksPage, IncludeWebhookRequest, Webhook, WebhookCallback},
        InterClientInner,
    },
    error::Error,
    pagination::{collect_all, Page},
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use reqwest::Url;
use std::sync::Arc;
use urlencoding::encode;

const READ_STATEMENT_SCOPE: &str = "extrato.read";
const READ_PAYMENT_SCOPE: &str = "pagamento-boleto.read";
const WRITE_PAYMENT_SCOPE: &str = "pagamento-boleto.write";
const READ_WEBHOOK_SCOPE: &str = "webhook-banking.read";
const WRITE_WEBHOOK_SCOPE: &str = "webhook-banking.write";

/// Client for the banking APIs.
#[derive(Debug, Clone)]
pub struct BankingApi {
    inner: Arc<InterClientInner>,
}

impl BankingApi {
    pub(crate) fn new(inner: Arc<InterClientInner>) -> Self {
        Self { inner }
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        self.inner
            .environment
            .base_url()
            .join(path)
            .map_err(|e| Error::Other(e.into()))
    }

    /// Retrieves the checking account balance, today's unless `balance_date`
    /// says otherwise.
    #[tracing::instrument(name = "Retrieve Balance", skip(self))]
    pub async fn balance(&self, balance_date: Option<NaiveDate>) -> Result<Balance, Error> {
        let mut url = self.url("/banking/v2/saldo")?;
        if let Some(date) = balance_date {
            url.query_pairs_mut()
                .append_pair("dataSaldo", &date.to_string());
        }
        self.inner.gateway.get(url, READ_STATEMENT_SCOPE).await
    }

    /// Retrieves the plain statement for the given date range (both ends
    /// inclusive).
    #[tracing::instrument(name = "Retrieve Statement", skip(self))]
    pub async fn statement(
        &self,
        initial_date: NaiveDate,
        final_date: NaiveDate,
    ) -> Result<BankStatement, Error> {
        let mut url = self.url("/banking/v2/extrato")?;
        url.query_pairs_mut()
            .append_pair("dataInicio", &initial_date.to_string())
            .append_pair("dataFim", &final_date.to_string());
        self.inner.gateway.get(url, READ_STATEMENT_SCOPE).await
    }

    /// Retrieves one page of the enriched statement.
    #[tracing::instrument(name = "Retrieve Enriched Statement Page", skip(self, filter))]
    pub async fn enriched_statement_page(
        &self,
        initial_date: NaiveDate,
        final_date: NaiveDate,
        page: u32,
        page_size: Option<u32>,
        filter: Option<&StatementFilter>,
    ) -> Result<Page<EnrichedTransaction>, Error> {
        let mut url = self.url("/banking/v2/extrato/completo")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("dataInicio", &initial_date.to_string())
                .append_pair("dataFim", &final_date.to_string())
                .append_pair("pagina", &page.to_string());
            if let Some(size) = page_size {
                query.append_pair("tamanhoPagina", &size.to_string());
            }
            if let Some(filter) = filter {
                if let Some(operation_type) = filter.operation_type {
                    query.append_pair("tipoOperacao", operation_type.as_str());
                }
                if let Some(transaction_type) = &filter.transaction_type {
                    query.append_pair("tipoTransacao", transaction_type);
                }
            }
        }

        let wire: EnrichedStatementPage = self.inner.gateway.get(url, READ_STATEMENT_SCOPE).await?;
        Ok(wire.into_page(page))
    }

    /// Retrieves the complete enriched statement for the given date range,
    /// walking every page.
    #[tracing::instrument(name = "Retrieve Enriched Statement", skip(self, filter))]
    pub async fn enriched_statement(
        &self,
        initial_date: NaiveDate,
        final_date: NaiveDate,
        filter: Option<&StatementFilter>,
    ) -> Result<Vec<EnrichedTransaction>, Error> {
        collect_all(|page| self.enriched_statement_page(initial_date, final_date, page, None, filter))
            .await
    }

    /// Pays a boleto identified by its barcode or typeable line.
    #[tracing::instrument(name = "Include Payment", skip(self, request))]
    pub async fn include_payment(
        &self,
        request: &IncludePaymentRequest,
    ) -> Result<IncludePaymentResponse, Error> {
        let url = self.url("/banking/v2/pagamento")?;
        self.inner
            .gateway
            .post(url, WRITE_PAYMENT_SCOPE, request)
            .await
    }

    /// Retrieves boleto payments included in the given date range.
    #[tracing::instrument(name = "Retrieve Payments", skip(self, filter))]
    pub async fn payments(
        &self,
        initial_date: NaiveDate,
        final_date: NaiveDate,
        filter: Option<&PaymentSearchFilter>,
    ) -> Result<Vec<Payment>, Error> {
        let mut url = self.url("/banking/v2/pagamento")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("dataInicio", &initial_date.to_string())
                .append_pair("dataFim", &final_date.to_string());
            if let Some(filter) = filter {
                if let Some(barcode) = &filter.barcode {
                    query.append_pair("codBarraLinhaDigitavel", barcode);
                }
                if let Some(code) = &filter.transaction_code {
                    query.append_pair("codigoTransacao", code);
                }
            }
        }
        self.inner.gateway.get(url, READ_PAYMENT_SCOPE).await
    }

    /// Registers the webhook endpoint for the given event type, replacing any
    /// previous registration.
    #[tracing::instrument(name = "Include Banking Webhook", skip(self))]
    pub async fn include_webhook(
        &self,
        webhook_type: &str,
        webhook_url: impl Into<String> + std::fmt::Debug,
    ) -> Result<(), Error> {
        let url = self.url(&format!("/banking/v3/webhooks/{}", encode(webhook_type)))?;
        let request = IncludeWebhookRequest {
            webhook_url: webhook_url.into(),
        };
        self.inner
            .gateway
            .put(url, WRITE_WEBHOOK_SCOPE, &request)
            .await
    }

    /// Retrieves the webhook registered for the given event type.
    #[tracing::instrument(name = "Retrieve Banking Webhook", skip(self))]
    pub async fn webhook(&self, webhook_type: &str) -> Result<Webhook, Error> {
        let url = self.url(&format!("/banking/v3/webhooks/{}", encode(webhook_type)))?;
        self.inner.gateway.get(url, READ_WEBHOOK_SCOPE).await
    }

    /// Deletes the webhook registered for the given event type.
    #[tracing::instrument(name = "Delete Banking Webhook", skip(self))]
    pub async fn delete_webhook(&self, webhook_type: &str) -> Result<(), Error> {
        let url = self.url(&format!("/banking/v3/webhooks/{}", encode(webhook_type)))?;
        self.inner.gateway.delete(url, WRITE_WEBHOOK_SCOPE).await
    }

    /// Retrieves one page of delivery attempts of the given webhook type.
    #[tracing::instrument(name = "Retrieve Banking Callbacks Page", skip(self))]
    pub async fn webhook_callbacks_page(
        &self,
        webhook_type: &str,
        initial_date_hour: DateTime<Utc>,
        final_date_hour: DateTime<Utc>,
        page: u32,
        page_size: Option<u32>,
    ) -> Result<Page<WebhookCallback>, Error> {
        let mut url = self.url(&format!(
            "/banking/v3/webhooks/{}/callbacks",
            encode(webhook_type)
        ))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair(
                    "dataHoraInicio",
                    &initial_date_hour.to_rfc3339_opts(SecondsFormat::Secs, true),
                )
                .append_pair(
                    "dataHoraFim",
                    &final_date_hour.to_rfc3339_opts(SecondsFormat::Secs, true),
                )
                .append_pair("pagina", &page.to_string());
            if let Some(size) = page_size {
                query.append_pair("tamanhoPagina", &size.to_string());
            }
        }

        let wire: CallbacksPage = self.inner.gateway.get(url, READ_WEBHOOK_SCOPE).await?;
        Ok(wire.into_page(page))
    }

    /// Retrieves every delivery attempt of the given webhook type in the date
    /// range, walking every page.
    #[tracing::instrument(name = "Retrieve Banking Callbacks", skip(self))]
    pub async fn webhook_callbacks(
        &self,
        webhook_type: &str,
        initial_date_hour: DateTime<Utc>,
        final_date_hour: DateTime<Utc>,
    ) -> Result<Vec<WebhookCallback>, Error> {
        collect_all(|page| {
            self.webhook_callbacks_page(webhook_type, initial_date_hour, final_date_hour, page, None)
        })
        .await
    }
}

use super::model::*;
use crate::{
    apis::{
        webhooks::{CallbacksPage, IncludeWebhookRequest, Webhook, WebhookCallback},
        InterClientInner,
    },
    error::Error,
    pagination::{collect_all, Page},
};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use std::sync::Arc;
use urlencoding::encode;

const READ_COB_SCOPE: &str = "cob.read";
const WRITE_COB_SCOPE: &str = "cob.write";
const READ_PIX_SCOPE: &str = "pix.read";
const WRITE_PIX_SCOPE: &str = "pix.write";
const READ_WEBHOOK_SCOPE: &str = "webhook.read";
const WRITE_WEBHOOK_SCOPE: &str = "webhook.write";

/// Client for the PIX APIs.
#[derive(Debug, Clone)]
pub struct PixApi {
    inner: Arc<InterClientInner>,
}

impl PixApi {
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

    fn rfc3339(time: DateTime<Utc>) -> String {
        time.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Creates an immediate billing under a caller-chosen `txid`.
    #[tracing::instrument(name = "Include Immediate Billing", skip(self, billing))]
    pub async fn include_immediate_billing(
        &self,
        txid: &str,
        billing: &PixBilling,
    ) -> Result<DetailedImmediateBilling, Error> {
        let url = self.url(&format!("/pix/v2/cob/{}", encode(txid)))?;
        self.inner.gateway.put(url, WRITE_COB_SCOPE, billing).await
    }

    /// Creates an immediate billing under a server-assigned `txid`.
    #[tracing::instrument(name = "Include Immediate Billing", skip(self, billing))]
    pub async fn include_immediate_billing_with_generated_txid(
        &self,
        billing: &PixBilling,
    ) -> Result<DetailedImmediateBilling, Error> {
        let url = self.url("/pix/v2/cob")?;
        self.inner.gateway.post(url, WRITE_COB_SCOPE, billing).await
    }

    /// Updates an active immediate billing, bumping its revision.
    #[tracing::instrument(name = "Review Immediate Billing", skip(self, billing))]
    pub async fn review_immediate_billing(
        &self,
        txid: &str,
        billing: &PixBilling,
    ) -> Result<DetailedImmediateBilling, Error> {
        let url = self.url(&format!("/pix/v2/cob/{}", encode(txid)))?;
        self.inner.gateway.patch(url, WRITE_COB_SCOPE, billing).await
    }

    /// Retrieves an immediate billing by its `txid`.
    #[tracing::instrument(name = "Retrieve Immediate Billing", skip(self))]
    pub async fn immediate_billing(&self, txid: &str) -> Result<DetailedImmediateBilling, Error> {
        let url = self.url(&format!("/pix/v2/cob/{}", encode(txid)))?;
        self.inner.gateway.get(url, READ_COB_SCOPE).await
    }

    /// Retrieves one page of immediate billings created in the given time
    /// range.
    #[tracing::instrument(name = "Retrieve Immediate Billing Page", skip(self))]
    pub async fn immediate_billing_page(
        &self,
        initial_date_hour: DateTime<Utc>,
        final_date_hour: DateTime<Utc>,
        page: u32,
        page_size: Option<u32>,
    ) -> Result<Page<DetailedImmediateBilling>, Error> {
        let mut url = self.url("/pix/v2/cob")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("inicio", &Self::rfc3339(initial_date_hour))
                .append_pair("fim", &Self::rfc3339(final_date_hour))
                .append_pair("paginacao.paginaAtual", &page.to_string());
            if let Some(size) = page_size {
                query.append_pair("paginacao.itensPorPagina", &size.to_string());
            }
        }

        let wire: ImmediateBillingPageWire = self.inner.gateway.get(url, READ_COB_SCOPE).await?;
        Ok(wire.into_page())
    }

    /// Retrieves every immediate billing created in the given time range,
    /// walking every page.
    #[tracing::instrument(name = "Retrieve Immediate Billings", skip(self))]
    pub async fn immediate_billings(
        &self,
        initial_date_hour: DateTime<Utc>,
        final_date_hour: DateTime<Utc>,
    ) -> Result<Vec<DetailedImmediateBilling>, Error> {
        collect_all(|page| {
            self.immediate_billing_page(initial_date_hour, final_date_hour, page, None)
        })
        .await
    }

    /// Retrieves a received PIX payment by its end-to-end id.
    #[tracing::instrument(name = "Retrieve Pix", skip(self))]
    pub async fn pix(&self, end_to_end_id: &str) -> Result<Pix, Error> {
        let url = self.url(&format!("/pix/v2/pix/{}", encode(end_to_end_id)))?;
        self.inner.gateway.get(url, READ_PIX_SCOPE).await
    }

    /// Retrieves one page of PIX payments received in the given time range.
    #[tracing::instrument(name = "Retrieve Pix Page", skip(self))]
    pub async fn pix_page(
        &self,
        initial_date_hour: DateTime<Utc>,
        final_date_hour: DateTime<Utc>,
        page: u32,
        page_size: Option<u32>,
    ) -> Result<Page<Pix>, Error> {
        let mut url = self.url("/pix/v2/pix")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("inicio", &Self::rfc3339(initial_date_hour))
                .append_pair("fim", &Self::rfc3339(final_date_hour))
                .append_pair("paginacao.paginaAtual", &page.to_string());
            if let Some(size) = page_size {
                query.append_pair("paginacao.itensPorPagina", &size.to_string());
            }
        }

        let wire: PixPageWire = self.inner.gateway.get(url, READ_PIX_SCOPE).await?;
        Ok(wire.into_page())
    }

    /// Retrieves every PIX payment received in the given time range, walking
    /// every page.
    #[tracing::instrument(name = "Retrieve Pix List", skip(self))]
    pub async fn pix_list(
        &self,
        initial_date_hour: DateTime<Utc>,
        final_date_hour: DateTime<Utc>,
    ) -> Result<Vec<Pix>, Error> {
        collect_all(|page| self.pix_page(initial_date_hour, final_date_hour, page, None)).await
    }

    /// Requests a devolution of a received payment under a caller-chosen
    /// devolution id.
    #[tracing::instrument(name = "Request Devolution", skip(self))]
    pub async fn request_devolution(
        &self,
        end_to_end_id: &str,
        devolution_id: &str,
        amount: impl Into<String> + std::fmt::Debug,
    ) -> Result<Devolution, Error> {
        let url = self.url(&format!(
            "/pix/v2/pix/{}/devolucao/{}",
            encode(end_to_end_id),
            encode(devolution_id)
        ))?;
        let request = DevolutionRequest {
            amount: amount.into(),
        };
        self.inner
            .gateway
            .put(url, WRITE_PIX_SCOPE, &request)
            .await
    }

    /// Retrieves a previously requested devolution.
    #[tracing::instrument(name = "Retrieve Devolution", skip(self))]
    pub async fn devolution(
        &self,
        end_to_end_id: &str,
        devolution_id: &str,
    ) -> Result<Devolution, Error> {
        let url = self.url(&format!(
            "/pix/v2/pix/{}/devolucao/{}",
            encode(end_to_end_id),
            encode(devolution_id)
        ))?;
        self.inner.gateway.get(url, READ_PIX_SCOPE).await
    }

    /// Registers the webhook endpoint for the given PIX key, replacing any
    /// previous registration.
    #[tracing::instrument(name = "Include Pix Webhook", skip(self))]
    pub async fn include_webhook(
        &self,
        key: &str,
        webhook_url: impl Into<String> + std::fmt::Debug,
    ) -> Result<(), Error> {
        let url = self.url(&format!("/pix/v2/webhook/{}", encode(key)))?;
        let request = IncludeWebhookRequest {
            webhook_url: webhook_url.into(),
        };
        self.inner
            .gateway
            .put(url, WRITE_WEBHOOK_SCOPE, &request)
            .await
    }

    /// Retrieves the webhook registered for the given PIX key.
    #[tracing::instrument(name = "Retrieve Pix Webhook", skip(self))]
    pub async fn webhook(&self, key: &str) -> Result<Webhook, Error> {
        let url = self.url(&format!("/pix/v2/webhook/{}", encode(key)))?;
        self.inner.gateway.get(url, READ_WEBHOOK_SCOPE).await
    }

    /// Deletes the webhook registered for the given PIX key.
    #[tracing::instrument(name = "Delete Pix Webhook", skip(self))]
    pub async fn delete_webhook(&self, key: &str) -> Result<(), Error> {
        let url = self.url(&format!("/pix/v2/webhook/{}", encode(key)))?;
        self.inner.gateway.delete(url, WRITE_WEBHOOK_SCOPE).await
    }

    /// Retrieves one page of PIX webhook delivery attempts.
    #[tracing::instrument(name = "Retrieve Pix Callbacks Page", skip(self))]
    pub async fn webhook_callbacks_page(
        &self,
        initial_date_hour: DateTime<Utc>,
        final_date_hour: DateTime<Utc>,
        page: u32,
        page_size: Option<u32>,
    ) -> Result<Page<WebhookCallback>, Error> {
        let mut url = self.url("/pix/v2/webhook/callbacks")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("dataHoraInicio", &Self::rfc3339(initial_date_hour))
                .append_pair("dataHoraFim", &Self::rfc3339(final_date_hour))
                .append_pair("pagina", &page.to_string());
            if let Some(size) = page_size {
                query.append_pair("tamanhoPagina", &size.to_string());
            }
        }

        let wire: CallbacksPage = self.inner.gateway.get(url, READ_WEBHOOK_SCOPE).await?;
        Ok(wire.into_page(page))
    }

    /// Retrieves every PIX webhook delivery attempt in the time range,
    /// walking every page.
    #[tracing::instrument(name = "Retrieve Pix Callbacks", skip(self))]
    pub async fn webhook_callbacks(
        &self,
        initial_date_hour: DateTime<Utc>,
        final_date_hour: DateTime<Utc>,
    ) -> Result<Vec<WebhookCallback>, Error> {
        collect_all(|page| {
            self.webhook_callbacks_page(initial_date_hour, final_date_hour, page, None)
        })
        .await
    }
}

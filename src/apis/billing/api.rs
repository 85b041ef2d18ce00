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

const READ_BILLING_SCOPE: &str = "boleto-cobranca.read";
const WRITE_BILLING_SCOPE: &str = "boleto-cobranca.write";

/// Client for the billing APIs.
#[derive(Debug, Clone)]
pub struct BillingApi {
    inner: Arc<InterClientInner>,
}

impl BillingApi {
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

    /// Issues a billing. The returned request code identifies it in every
    /// other billing operation.
    #[tracing::instrument(name = "Issue Billing", skip(self, request))]
    pub async fn issue_billing(
        &self,
        request: &IssueBillingRequest,
    ) -> Result<IssueBillingResponse, Error> {
        let url = self.url("/cobranca/v3/cobrancas")?;
        self.inner
            .gateway
            .post(url, WRITE_BILLING_SCOPE, request)
            .await
    }

    /// Retrieves a billing with its boleto and PIX legs.
    #[tracing::instrument(name = "Retrieve Billing", skip(self))]
    pub async fn billing(&self, request_code: &str) -> Result<RetrievedBilling, Error> {
        let url = self.url(&format!("/cobranca/v3/cobrancas/{}", encode(request_code)))?;
        self.inner.gateway.get(url, READ_BILLING_SCOPE).await
    }

    /// Cancels a billing that has not been settled yet.
    #[tracing::instrument(name = "Cancel Billing", skip(self))]
    pub async fn cancel_billing(
        &self,
        request_code: &str,
        cancellation_reason: impl Into<String> + std::fmt::Debug,
    ) -> Result<(), Error> {
        let url = self.url(&format!(
            "/cobranca/v3/cobrancas/{}/cancelar",
            encode(request_code)
        ))?;
        let request = CancelBillingRequest {
            cancellation_reason: cancellation_reason.into(),
        };
        self.inner
            .gateway
            .post(url, WRITE_BILLING_SCOPE, &request)
            .await
    }

    /// Retrieves one page of billings issued in the given date range.
    #[tracing::instrument(name = "Retrieve Billing Page", skip(self, filter))]
    pub async fn billing_page(
        &self,
        initial_date: NaiveDate,
        final_date: NaiveDate,
        page: u32,
        page_size: Option<u32>,
        filter: Option<&BillingSearchFilter>,
    ) -> Result<Page<RetrievedBilling>, Error> {
        let mut url = self.url("/cobranca/v3/cobrancas")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("dataInicial", &initial_date.to_string())
                .append_pair("dataFinal", &final_date.to_string())
                .append_pair("paginaAtual", &page.to_string());
            if let Some(size) = page_size {
                query.append_pair("itensPorPagina", &size.to_string());
            }
            if let Some(filter) = filter {
                if let Some(cpf_cnpj) = &filter.payer_cpf_cnpj {
                    query.append_pair("pessoaPagadora", cpf_cnpj);
                }
                if let Some(situation) = &filter.situation {
                    query.append_pair("situacao", situation);
                }
                if let Some(your_number) = &filter.your_number {
                    query.append_pair("seuNumero", your_number);
                }
            }
        }

        let wire: BillingPageWire = self.inner.gateway.get(url, READ_BILLING_SCOPE).await?;
        Ok(wire.into_page(page))
    }

    /// Retrieves every billing issued in the given date range, walking every
    /// page.
    #[tracing::instrument(name = "Retrieve Billings", skip(self, filter))]
    pub async fn billings(
        &self,
        initial_date: NaiveDate,
        final_date: NaiveDate,
        filter: Option<&BillingSearchFilter>,
    ) -> Result<Vec<RetrievedBilling>, Error> {
        collect_all(|page| self.billing_page(initial_date, final_date, page, None, filter)).await
    }

    /// Retrieves the billing summary for the given date range, one line per
    /// lifecycle state.
    #[tracing::instrument(name = "Retrieve Billing Summary", skip(self, filter))]
    pub async fn summary(
        &self,
        initial_date: NaiveDate,
        final_date: NaiveDate,
        filter: Option<&BillingSearchFilter>,
    ) -> Result<Vec<SummaryItem>, Error> {
        let mut url = self.url("/cobranca/v3/cobrancas/sumario")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("dataInicial", &initial_date.to_string())
                .append_pair("dataFinal", &final_date.to_string());
            if let Some(filter) = filter {
                if let Some(situation) = &filter.situation {
                    query.append_pair("situacao", situation);
                }
            }
        }
        self.inner.gateway.get(url, READ_BILLING_SCOPE).await
    }

    /// Registers the billing webhook endpoint, replacing any previous
    /// registration.
    #[tracing::instrument(name = "Include Billing Webhook", skip(self))]
    pub async fn include_webhook(
        &self,
        webhook_url: impl Into<String> + std::fmt::Debug,
    ) -> Result<(), Error> {
        let url = self.url("/cobranca/v3/cobrancas/webhook")?;
        let request = IncludeWebhookRequest {
            webhook_url: webhook_url.into(),
        };
        self.inner
            .gateway
            .put(url, WRITE_BILLING_SCOPE, &request)
            .await
    }

    /// Retrieves the registered billing webhook.
    #[tracing::instrument(name = "Retrieve Billing Webhook", skip(self))]
    pub async fn webhook(&self) -> Result<Webhook, Error> {
        let url = self.url("/cobranca/v3/cobrancas/webhook")?;
        self.inner.gateway.get(url, READ_BILLING_SCOPE).await
    }

    /// Deletes the registered billing webhook.
    #[tracing::instrument(name = "Delete Billing Webhook", skip(self))]
    pub async fn delete_webhook(&self) -> Result<(), Error> {
        let url = self.url("/cobranca/v3/cobrancas/webhook")?;
        self.inner.gateway.delete(url, WRITE_BILLING_SCOPE).await
    }

    /// Retrieves one page of billing webhook delivery attempts.
    #[tracing::instrument(name = "Retrieve Billing Callbacks Page", skip(self))]
    pub async fn webhook_callbacks_page(
        &self,
        initial_date_hour: DateTime<Utc>,
        final_date_hour: DateTime<Utc>,
        page: u32,
        page_size: Option<u32>,
    ) -> Result<Page<WebhookCallback>, Error> {
        let mut url = self.url("/cobranca/v3/cobrancas/webhook/callbacks")?;
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
                .append_pair("paginaAtual", &page.to_string());
            if let Some(size) = page_size {
                query.append_pair("itensPorPagina", &size.to_string());
            }
        }

        let wire: CallbacksPage = self.inner.gateway.get(url, READ_BILLING_SCOPE).await?;
        Ok(wire.into_page(page))
    }

    /// Retrieves every billing webhook delivery attempt in the date range,
    /// walking every page.
    #[tracing::instrument(name = "Retrieve Billing Callbacks", skip(self))]
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::testutil::mock_inner_and_server;
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, method, path, query_param},
        Mock, ResponseTemplate,
    };

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn payer() -> Payer {
        Payer {
            cpf_cnpj: "12345678901".to_string(),
            person_type: PersonType::Natural,
            name: "Maria da Silva".to_string(),
            address: "Rua das Flores".to_string(),
            number: Some("100".to_string()),
            complement: None,
            neighborhood: Some("Centro".to_string()),
            city: "Belo Horizonte".to_string(),
            state: "MG".to_string(),
            zip_code: "30110000".to_string(),
            email: None,
            area_code: None,
            phone: None,
        }
    }

    fn retrieved_billing(code: &str) -> serde_json::Value {
        json!({
            "cobranca": {
                "codigoSolicitacao": code,
                "seuNumero": "INV-1",
                "dataVencimento": "2024-04-10",
                "valorNominal": 120.5,
                "situacao": "A_RECEBER"
            }
        })
    }

    #[tokio::test]
    async fn issues_a_billing_and_returns_the_request_code() {
        let (inner, mock_server) = mock_inner_and_server().await;
        let api = BillingApi::new(inner);

        Mock::given(method("POST"))
            .and(path("/cobranca/v3/cobrancas"))
            .and(body_partial_json(json!({
                "seuNumero": "INV-1",
                "valorNominal": 120.5,
                "dataVencimento": "2024-04-10",
                "numDiasAgenda": 30,
                "pagador": { "cpfCnpj": "12345678901", "tipoPessoa": "FISICA" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "codigoSolicitacao": "b4a9e1c0-1111-2222-3333-444455556666"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = api
            .issue_billing(&IssueBillingRequest {
                your_number: "INV-1".to_string(),
                nominal_amount: 120.5,
                due_date: date("2024-04-10"),
                schedule_days: 30,
                payer: payer(),
                message: None,
            })
            .await
            .unwrap();
        assert_eq!(response.request_code, "b4a9e1c0-1111-2222-3333-444455556666");
    }

    #[tokio::test]
    async fn retrieves_a_billing_with_its_legs() {
        let (inner, mock_server) = mock_inner_and_server().await;
        let api = BillingApi::new(inner);

        Mock::given(method("GET"))
            .and(path("/cobranca/v3/cobrancas/abc-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cobranca": {
                    "codigoSolicitacao": "abc-123",
                    "seuNumero": "INV-1",
                    "dataVencimento": "2024-04-10",
                    "valorNominal": 120.5,
                    "situacao": "A_RECEBER"
                },
                "boleto": {
                    "nossoNumero": "00123456789",
                    "codigoBarras": "34191...",
                    "linhaDigitavel": "34191.79001..."
                },
                "pix": {
                    "txid": "tx-1",
                    "pixCopiaECola": "00020126..."
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let retrieved = api.billing("abc-123").await.unwrap();
        assert_eq!(retrieved.billing.situation, "A_RECEBER");
        assert_eq!(retrieved.boleto.unwrap().our_number, "00123456789");
        assert_eq!(retrieved.pix.unwrap().txid, "tx-1");
    }

    #[tokio::test]
    async fn cancels_a_billing_with_a_reason() {
        let (inner, mock_server) = mock_inner_and_server().await;
        let api = BillingApi::new(inner);

        Mock::given(method("POST"))
            .and(path("/cobranca/v3/cobrancas/abc-123/cancelar"))
            .and(body_partial_json(json!({
                "motivoCancelamento": "Pedido do cliente"
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&mock_server)
            .await;

        api.cancel_billing("abc-123", "Pedido do cliente")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn billings_walks_every_page() {
        let (inner, mock_server) = mock_inner_and_server().await;
        let api = BillingApi::new(inner);

        Mock::given(method("GET"))
            .and(path("/cobranca/v3/cobrancas"))
            .and(query_param("dataInicial", "2024-03-01"))
            .and(query_param("dataFinal", "2024-03-31"))
            .and(query_param("paginaAtual", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalPaginas": 2,
                "totalElementos": 3,
                "primeiraPagina": true,
                "ultimaPagina": false,
                "cobrancas": [retrieved_billing("c1"), retrieved_billing("c2")]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cobranca/v3/cobrancas"))
            .and(query_param("paginaAtual", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalPaginas": 2,
                "totalElementos": 3,
                "primeiraPagina": false,
                "ultimaPagina": true,
                "cobrancas": [retrieved_billing("c3")]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let billings = api
            .billings(date("2024-03-01"), date("2024-03-31"), None)
            .await
            .unwrap();

        let codes: Vec<_> = billings
            .iter()
            .map(|b| b.billing.request_code.as_str())
            .collect();
        assert_eq!(codes, vec!["c1", "c2", "c3"]);
    }

    #[tokio::test]
    async fn retrieves_the_summary() {
        let (inner, mock_server) = mock_inner_and_server().await;
        let api = BillingApi::new(inner);

        Mock::given(method("GET"))
            .and(path("/cobranca/v3/cobrancas/sumario"))
            .and(query_param("dataInicial", "2024-03-01"))
            .and(query_param("dataFinal", "2024-03-31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "situacao": "RECEBIDO", "quantidade": 12, "valor": 1500.0 },
                { "situacao": "A_RECEBER", "quantidade": 3, "valor": 400.0 }
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let summary = api
            .summary(date("2024-03-01"), date("2024-03-31"), None)
            .await
            .unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].situation, "RECEBIDO");
        assert_eq!(summary[0].quantity, 12);
    }

    #[tokio::test]
    async fn registers_and_retrieves_the_webhook() {
        let (inner, mock_server) = mock_inner_and_server().await;
        let api = BillingApi::new(inner);

        Mock::given(method("PUT"))
            .and(path("/cobranca/v3/cobrancas/webhook"))
            .and(body_partial_json(json!({
                "webhookUrl": "https://example.com/hooks/billing"
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cobranca/v3/cobrancas/webhook"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "webhookUrl": "https://example.com/hooks/billing",
                "criacao": "2024-03-01T12:00:00Z"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        api.include_webhook("https://example.com/hooks/billing")
            .await
            .unwrap();
        let webhook = api.webhook().await.unwrap();
        assert_eq!(webhook.webhook_url, "https://example.com/hooks/billing");
    }
}

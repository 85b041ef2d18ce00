//! Webhook models shared by the banking, billing and PIX families.

use crate::pagination::Page;
use serde::{Deserialize, Serialize};

/// Request to register a webhook endpoint.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IncludeWebhookRequest {
    #[serde(rename = "webhookUrl")]
    pub webhook_url: String,
}

/// A registered webhook endpoint.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    #[serde(rename = "webhookUrl")]
    pub webhook_url: String,
    /// When the webhook was registered.
    #[serde(rename = "criacao", default)]
    pub created_at: Option<String>,
}

/// One delivery attempt of a webhook callback.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WebhookCallback {
    #[serde(rename = "webhookUrl")]
    pub webhook_url: String,
    #[serde(rename = "numeroTentativa")]
    pub attempt_number: u32,
    #[serde(rename = "dataHoraDisparo")]
    pub triggered_at: String,
    #[serde(rename = "sucesso")]
    pub success: bool,
    #[serde(rename = "httpStatus")]
    pub http_status: u16,
    #[serde(rename = "mensagemErro", default)]
    pub error_message: Option<String>,
}

/// Wire shape of one page of webhook callback attempts, identical across the
/// API families.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct CallbacksPage {
    #[serde(rename = "totalPaginas", default)]
    pub(crate) total_pages: u32,
    #[serde(rename = "totalElementos", default)]
    pub(crate) total_elements: u64,
    #[serde(rename = "primeiraPagina", default)]
    pub(crate) first_page: bool,
    #[serde(rename = "ultimaPagina", default)]
    pub(crate) last_page: bool,
    #[serde(rename = "data", default)]
    pub(crate) callbacks: Vec<WebhookCallback>,
}

impl CallbacksPage {
    pub(crate) fn into_page(self, page_number: u32) -> Page<WebhookCallback> {
        Page {
            items: self.callbacks,
            page_number,
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            first: self.first_page,
            last: self.last_page,
        }
    }
}

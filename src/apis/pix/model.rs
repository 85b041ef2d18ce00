use crate::pagination::Page;
use serde::{Deserialize, Serialize};

/// Expiry window of an immediate billing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    /// Seconds the billing stays payable after creation.
    #[serde(rename = "expiracao")]
    pub expiration: u32,
    #[serde(rename = "criacao", skip_serializing_if = "Option::is_none", default)]
    pub creation: Option<String>,
}

/// The debtor of an immediate billing. At most one of `cpf` and `cnpj` is
/// set.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Debtor {
    #[serde(rename = "cpf", skip_serializing_if = "Option::is_none", default)]
    pub cpf: Option<String>,
    #[serde(rename = "cnpj", skip_serializing_if = "Option::is_none", default)]
    pub cnpj: Option<String>,
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
}

/// Amount of an immediate billing. PIX amounts travel as decimal strings,
/// e.g. `"10.00"`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PixValue {
    #[serde(rename = "original")]
    pub original: String,
    /// 1 when the payer may change the amount.
    #[serde(
        rename = "modalidadeAlteracao",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub modification_modality: Option<u8>,
}

/// A free-form key/value pair shown to the payer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AdditionalInfo {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "valor")]
    pub value: String,
}

/// Request to create or update an immediate billing.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PixBilling {
    #[serde(rename = "calendario")]
    pub calendar: Calendar,
    #[serde(rename = "devedor", skip_serializing_if = "Option::is_none")]
    pub debtor: Option<Debtor>,
    #[serde(rename = "valor")]
    pub value: PixValue,
    /// The receiving PIX key.
    #[serde(rename = "chave")]
    pub key: String,
    #[serde(rename = "solicitacaoPagador", skip_serializing_if = "Option::is_none")]
    pub payer_request: Option<String>,
    #[serde(rename = "infoAdicionais", skip_serializing_if = "Vec::is_empty", default)]
    pub additional_info: Vec<AdditionalInfo>,
}

/// An immediate billing as stored by the server.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DetailedImmediateBilling {
    #[serde(rename = "txid")]
    pub txid: String,
    #[serde(rename = "revisao", default)]
    pub revision: u32,
    #[serde(rename = "calendario")]
    pub calendar: Calendar,
    #[serde(rename = "devedor", default)]
    pub debtor: Option<Debtor>,
    #[serde(rename = "valor")]
    pub value: PixValue,
    #[serde(rename = "chave")]
    pub key: String,
    /// Lifecycle state, e.g. `ATIVA`, `CONCLUIDA`, `REMOVIDA_PELO_USUARIO_RECEBEDOR`.
    #[serde(rename = "status")]
    pub status: String,
    #[serde(rename = "solicitacaoPagador", default)]
    pub payer_request: Option<String>,
    /// EMV payload the payer scans or pastes.
    #[serde(rename = "pixCopiaECola", default)]
    pub copy_and_paste: Option<String>,
}

/// A received PIX payment.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Pix {
    #[serde(rename = "endToEndId")]
    pub end_to_end_id: String,
    #[serde(rename = "txid", default)]
    pub txid: Option<String>,
    #[serde(rename = "valor")]
    pub amount: String,
    #[serde(rename = "horario")]
    pub time: String,
    #[serde(rename = "chave", default)]
    pub key: Option<String>,
    #[serde(rename = "infoPagador", default)]
    pub payer_info: Option<String>,
    #[serde(rename = "devolucoes", default)]
    pub devolutions: Vec<Devolution>,
}

/// When a devolution was requested and settled.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DevolutionTime {
    #[serde(rename = "solicitacao", default)]
    pub requested_at: Option<String>,
    #[serde(rename = "liquidacao", default)]
    pub settled_at: Option<String>,
}

/// A devolution (refund) of a received PIX payment.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Devolution {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "rtrId", default)]
    pub rtr_id: Option<String>,
    #[serde(rename = "valor")]
    pub amount: String,
    /// Lifecycle state, e.g. `EM_PROCESSAMENTO`, `DEVOLVIDO`.
    #[serde(rename = "status")]
    pub status: String,
    #[serde(rename = "horario", default)]
    pub time: DevolutionTime,
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct DevolutionRequest {
    #[serde(rename = "valor")]
    pub(crate) amount: String,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct PaginationInfo {
    #[serde(rename = "paginaAtual", default)]
    pub(crate) current_page: u32,
    #[serde(rename = "quantidadeDePaginas", default)]
    pub(crate) page_count: u32,
    #[serde(rename = "quantidadeTotalDeItens", default)]
    pub(crate) total_items: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct PageParameters {
    #[serde(rename = "paginacao")]
    pub(crate) pagination: PaginationInfo,
}

/// Wire shape of one page of immediate billings.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct ImmediateBillingPageWire {
    #[serde(rename = "parametros")]
    pub(crate) parameters: PageParameters,
    #[serde(rename = "cobs", default)]
    pub(crate) billings: Vec<DetailedImmediateBilling>,
}

impl ImmediateBillingPageWire {
    pub(crate) fn into_page(self) -> Page<DetailedImmediateBilling> {
        paged(self.parameters.pagination, self.billings)
    }
}

/// Wire shape of one page of received PIX payments.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct PixPageWire {
    #[serde(rename = "parametros")]
    pub(crate) parameters: PageParameters,
    #[serde(rename = "pix", default)]
    pub(crate) pix: Vec<Pix>,
}

impl PixPageWire {
    pub(crate) fn into_page(self) -> Page<Pix> {
        paged(self.parameters.pagination, self.pix)
    }
}

fn paged<T>(pagination: PaginationInfo, items: Vec<T>) -> Page<T> {
    Page {
        items,
        page_number: pagination.current_page,
        total_pages: pagination.page_count,
        total_elements: pagination.total_items,
        first: pagination.current_page == 0,
        last: pagination.current_page + 1 >= pagination.page_count,
    }
}

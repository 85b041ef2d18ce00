use crate::pagination::Page;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a payer is a natural or a legal person.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonType {
    #[serde(rename = "FISICA")]
    Natural,
    #[serde(rename = "JURIDICA")]
    Legal,
}

/// The party a billing is issued against.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Payer {
    #[serde(rename = "cpfCnpj")]
    pub cpf_cnpj: String,
    #[serde(rename = "tipoPessoa")]
    pub person_type: PersonType,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "endereco")]
    pub address: String,
    #[serde(rename = "numero", skip_serializing_if = "Option::is_none", default)]
    pub number: Option<String>,
    #[serde(rename = "complemento", skip_serializing_if = "Option::is_none", default)]
    pub complement: Option<String>,
    #[serde(rename = "bairro", skip_serializing_if = "Option::is_none", default)]
    pub neighborhood: Option<String>,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "uf")]
    pub state: String,
    #[serde(rename = "cep")]
    pub zip_code: String,
    #[serde(rename = "email", skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(rename = "ddd", skip_serializing_if = "Option::is_none", default)]
    pub area_code: Option<String>,
    #[serde(rename = "telefone", skip_serializing_if = "Option::is_none", default)]
    pub phone: Option<String>,
}

/// Up to five free-text lines printed on the boleto.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    #[serde(rename = "linha1", skip_serializing_if = "Option::is_none", default)]
    pub line1: Option<String>,
    #[serde(rename = "linha2", skip_serializing_if = "Option::is_none", default)]
    pub line2: Option<String>,
    #[serde(rename = "linha3", skip_serializing_if = "Option::is_none", default)]
    pub line3: Option<String>,
    #[serde(rename = "linha4", skip_serializing_if = "Option::is_none", default)]
    pub line4: Option<String>,
    #[serde(rename = "linha5", skip_serializing_if = "Option::is_none", default)]
    pub line5: Option<String>,
}

/// Request to issue a billing (boleto with embedded PIX).
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IssueBillingRequest {
    /// Caller-chosen identifier, echoed back on retrieval.
    #[serde(rename = "seuNumero")]
    pub your_number: String,
    #[serde(rename = "valorNominal")]
    pub nominal_amount: f64,
    #[serde(rename = "dataVencimento")]
    pub due_date: NaiveDate,
    /// How many days past due the billing stays payable.
    #[serde(rename = "numDiasAgenda")]
    pub schedule_days: u32,
    #[serde(rename = "pagador")]
    pub payer: Payer,
    #[serde(rename = "mensagem", skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// Outcome of a billing issuance.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IssueBillingResponse {
    /// Server-assigned identifier used by every other billing operation.
    #[serde(rename = "codigoSolicitacao")]
    pub request_code: String,
}

/// Core state of an issued billing.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Billing {
    #[serde(rename = "codigoSolicitacao")]
    pub request_code: String,
    #[serde(rename = "seuNumero")]
    pub your_number: String,
    #[serde(rename = "dataEmissao", default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(rename = "dataVencimento")]
    pub due_date: NaiveDate,
    #[serde(rename = "valorNominal")]
    pub nominal_amount: f64,
    /// Lifecycle state, e.g. `A_RECEBER`, `RECEBIDO`, `CANCELADO`.
    #[serde(rename = "situacao")]
    pub situation: String,
    #[serde(rename = "dataSituacao", default)]
    pub situation_date: Option<String>,
    #[serde(rename = "pagador", default)]
    pub payer: Option<Payer>,
}

/// The boleto leg of an issued billing.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BillingBoleto {
    #[serde(rename = "nossoNumero")]
    pub our_number: String,
    #[serde(rename = "codigoBarras")]
    pub barcode: String,
    #[serde(rename = "linhaDigitavel")]
    pub typeable_line: String,
}

/// The PIX leg of an issued billing.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BillingPix {
    #[serde(rename = "txid")]
    pub txid: String,
    #[serde(rename = "pixCopiaECola")]
    pub copy_and_paste: String,
}

/// A billing together with its boleto and PIX legs.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RetrievedBilling {
    #[serde(rename = "cobranca")]
    pub billing: Billing,
    #[serde(rename = "boleto", default)]
    pub boleto: Option<BillingBoleto>,
    #[serde(rename = "pix", default)]
    pub pix: Option<BillingPix>,
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct CancelBillingRequest {
    #[serde(rename = "motivoCancelamento")]
    pub(crate) cancellation_reason: String,
}

/// Optional billing search filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingSearchFilter {
    pub payer_cpf_cnpj: Option<String>,
    pub situation: Option<String>,
    pub your_number: Option<String>,
}

/// Wire shape of one billing search page.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct BillingPageWire {
    #[serde(rename = "totalPaginas", default)]
    pub(crate) total_pages: u32,
    #[serde(rename = "totalElementos", default)]
    pub(crate) total_elements: u64,
    #[serde(rename = "primeiraPagina", default)]
    pub(crate) first_page: bool,
    #[serde(rename = "ultimaPagina", default)]
    pub(crate) last_page: bool,
    #[serde(rename = "cobrancas", default)]
    pub(crate) billings: Vec<RetrievedBilling>,
}

impl BillingPageWire {
    pub(crate) fn into_page(self, page_number: u32) -> Page<RetrievedBilling> {
        Page {
            items: self.billings,
            page_number,
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            first: self.first_page,
            last: self.last_page,
        }
    }
}

/// One line of the billing summary, aggregating a lifecycle state over a date
/// range.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SummaryItem {
    #[serde(rename = "situacao")]
    pub situation: String,
    #[serde(rename = "quantidade")]
    pub quantity: u64,
    #[serde(rename = "valor")]
    pub amount: f64,
}

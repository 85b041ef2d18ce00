use crate::pagination::Page;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The checking account balance at a point in time.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Balance {
    /// Amount available for use.
    #[serde(rename = "disponivel")]
    pub available: f64,
    #[serde(rename = "bloqueadoCheque", default)]
    pub blocked_cheque: f64,
    #[serde(rename = "bloqueadoJudicialmente", default)]
    pub blocked_judicially: f64,
    #[serde(rename = "bloqueadoAdministrativo", default)]
    pub blocked_administratively: f64,
    /// Contracted credit limit.
    #[serde(rename = "limite", default)]
    pub credit_limit: f64,
}

/// Whether a statement entry credits or debits the account.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    #[serde(rename = "C")]
    Credit,
    #[serde(rename = "D")]
    Debit,
}

impl OperationType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            OperationType::Credit => "C",
            OperationType::Debit => "D",
        }
    }
}

/// The plain (non-paginated) account statement for a date range.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BankStatement {
    #[serde(rename = "transacoes", default)]
    pub transactions: Vec<Transaction>,
}

/// One entry of the plain statement.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    #[serde(rename = "dataEntrada")]
    pub entry_date: NaiveDate,
    #[serde(rename = "tipoTransacao")]
    pub transaction_type: String,
    #[serde(rename = "tipoOperacao")]
    pub operation_type: OperationType,
    /// Decimal amount as sent on the wire, e.g. `"150.00"`.
    #[serde(rename = "valor")]
    pub amount: String,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
}

/// One entry of the enriched statement, carrying the transaction id and
/// type-specific detail payload on top of the plain fields.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct EnrichedTransaction {
    #[serde(rename = "idTransacao")]
    pub transaction_id: String,
    #[serde(rename = "dataInclusao", default)]
    pub inclusion_date: Option<String>,
    #[serde(rename = "dataTransacao")]
    pub transaction_date: NaiveDate,
    #[serde(rename = "tipoTransacao")]
    pub transaction_type: String,
    #[serde(rename = "tipoOperacao")]
    pub operation_type: OperationType,
    #[serde(rename = "valor")]
    pub amount: String,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    /// Free-form details whose shape depends on `transaction_type`.
    #[serde(rename = "detalhes", default)]
    pub details: Option<serde_json::Value>,
}

/// Wire shape of one enriched statement page.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct EnrichedStatementPage {
    #[serde(rename = "totalPaginas", default)]
    pub(crate) total_pages: u32,
    #[serde(rename = "totalElementos", default)]
    pub(crate) total_elements: u64,
    #[serde(rename = "primeiraPagina", default)]
    pub(crate) first_page: bool,
    #[serde(rename = "ultimaPagina", default)]
    pub(crate) last_page: bool,
    #[serde(rename = "transacoes", default)]
    pub(crate) transactions: Vec<EnrichedTransaction>,
}

impl EnrichedStatementPage {
    pub(crate) fn into_page(self, page_number: u32) -> Page<EnrichedTransaction> {
        Page {
            items: self.transactions,
            page_number,
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            first: self.first_page,
            last: self.last_page,
        }
    }
}

/// Optional statement filters, applied server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementFilter {
    pub operation_type: Option<OperationType>,
    pub transaction_type: Option<String>,
}

/// Request to pay a boleto identified by its barcode or typeable line.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IncludePaymentRequest {
    #[serde(rename = "codBarraLinhaDigitavel")]
    pub barcode: String,
    #[serde(rename = "valorPagar")]
    pub amount: f64,
    /// When to pay. Omitted, the payment happens today.
    #[serde(rename = "dataPagamento", skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    #[serde(rename = "dataVencimento")]
    pub due_date: NaiveDate,
}

/// Outcome of a payment inclusion.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IncludePaymentResponse {
    /// How many approvals the payment still needs before execution.
    #[serde(rename = "quantidadeAprovadores")]
    pub approver_count: u32,
    #[serde(rename = "statusPagamento")]
    pub payment_status: String,
    #[serde(rename = "codigoTransacao")]
    pub transaction_code: String,
    #[serde(rename = "dataAgendamento", default)]
    pub scheduled_date: Option<NaiveDate>,
}

/// A previously included boleto payment.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Payment {
    #[serde(rename = "codigoTransacao")]
    pub transaction_code: String,
    #[serde(rename = "codigoBarra")]
    pub barcode: String,
    #[serde(rename = "tipo")]
    pub payment_type: String,
    #[serde(rename = "dataPagamento", default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(rename = "valorPago")]
    pub amount_paid: f64,
    #[serde(rename = "valorNominal", default)]
    pub nominal_amount: Option<f64>,
    #[serde(rename = "statusPagamento")]
    pub payment_status: String,
    #[serde(rename = "aprovacoesNecessarias", default)]
    pub required_approvals: Option<u32>,
    #[serde(rename = "aprovacoesRealizadas", default)]
    pub completed_approvals: Option<u32>,
}

/// Optional payment search filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentSearchFilter {
    pub barcode: Option<String>,
    pub transaction_code: Option<String>,
}

//! Billing APIs: boleto issuance, retrieval, cancellation and webhooks.

mod api;
mod model;

pub use api::BillingApi;
pub use model::*;

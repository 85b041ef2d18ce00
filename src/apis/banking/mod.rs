//! Banking APIs: balance, statements, barcode payments and banking webhooks.

mod api;
mod model;

pub use api::BankingApi;
pub use model::*;

//! PIX APIs: immediate billings, received payments, devolutions and webhooks.

mod api;
mod model;

pub use api::PixApi;
pub use model::*;

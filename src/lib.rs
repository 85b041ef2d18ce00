//! # inter-rust
//!
//! The Rust client for the Banco Inter PJ public APIs.
//!
//! The client authenticates with the application's PKCS#12 certificate over
//! mutual TLS and transparently acquires and caches per-scope OAuth tokens.
//! Each API family lives behind its own field of [`InterClient`]:
//!
//! ```rust,no_run
//! use inter_rust::{client::Environment, InterClient};
//!
//! # async fn run() -> Result<(), inter_rust::Error> {
//! let client = InterClient::builder("client-id", "client-secret")
//!     .with_certificate_file("certs/inter.pfx", "pfx-password")
//!     .with_environment(Environment::Sandbox)
//!     .build()?;
//!
//! let balance = client.banking.balance(None).await?;
//! println!("available: {}", balance.available);
//! # Ok(())
//! # }
//! ```
#![deny(missing_debug_implementations)]
#![forbid(unsafe_code)]

pub mod apis;
pub(crate) mod authenticator;
pub mod client;
pub mod error;
pub(crate) mod gateway;
pub mod identity;
pub(crate) mod middlewares;
pub mod pagination;

pub use client::{InterClient, InterClientBuilder};
pub use error::{ApiError, Error, Violation};

pub(crate) mod error_handling;

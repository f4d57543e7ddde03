//! WePay v2 processor module.

pub mod client;

pub use client::WePayClient;

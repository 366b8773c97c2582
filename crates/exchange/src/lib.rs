//! Connector boundary for the futures execution bot.
//!
//! Transport, authentication, and signing are the concern of whichever
//! connector implements [`futures_bot_core::ExchangeClient`]. This crate
//! ships the paper connector: a fully local venue used for dry runs and
//! tests, in the spirit of a paper-trading execution handler — zero network
//! calls, real order lifecycle.

pub mod paper;

pub use paper::PaperExchange;

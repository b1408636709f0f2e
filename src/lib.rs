//! Voiceflow billing service.
//!
//! Subscription lifecycle reconciliation driven by payment-gateway
//! webhooks, plus order creation, synchronous payment verification,
//! the plan catalog, usage-limit checks, and profile tier sync.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

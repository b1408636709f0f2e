//! HTTP adapters (Axum routers, handlers, DTOs).

pub mod billing;

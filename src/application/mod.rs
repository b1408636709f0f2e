//! Application layer: use-case handlers wiring domain rules to ports.

pub mod handlers;

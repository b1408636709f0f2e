//! Domain layer: pure business types and rules, free of I/O.

pub mod billing;
pub mod foundation;

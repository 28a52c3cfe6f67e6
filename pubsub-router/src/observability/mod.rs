//! Structured observability vocabulary shared by all layers.
//!
//! Library code only emits `tracing` events; subscriber installation is left to
//! binaries and tests.

pub mod events;
pub mod fields;

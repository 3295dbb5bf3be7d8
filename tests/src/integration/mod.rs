//! Cross-subsystem scenarios.

pub mod signing_flow;

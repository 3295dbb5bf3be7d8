//! # Warp-Signer Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Real BLS validator keys and conversion transactions
//! └── integration/      # Derivation → aggregation scenarios
//! tests/benches/
//! └── aggregation_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ws-tests
//! cargo test -p ws-tests integration::
//! cargo bench -p ws-tests
//! ```

pub mod fixtures;
pub mod integration;

//! # Chaincode Gateway Test Suite
//!
//! Cross-subsystem scenarios run against `ledger-simnet` through a fully
//! wired `GatewayContainer`.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs        # Gateway + simulated network wiring
//!     ├── e2e_chaincode.rs   # install -> instantiate -> invoke -> query
//!     ├── properties.rs      # registry, discovery and ordering guarantees
//!     └── lifecycle.rs       # CA enrollment, descriptors, disconnect
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cg-tests
//! cargo test -p cg-tests integration::properties::
//! ```

pub mod integration;

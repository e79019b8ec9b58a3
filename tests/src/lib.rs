//! # Ledger-Pipeline Test Suite
//!
//! ```text
//! tests/src/
//! ├── network.rs        # Shared fixture: in-process network + client
//! └── integration/
//!     ├── key_space.rs       # Key encoding against a real store
//!     ├── entity_store.rs    # CRUD through the full pipeline
//!     ├── cross_contract.rs  # Nested calls and atomicity
//!     └── submission.rs      # Phase timeouts, policy, retries
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lp-tests
//! cargo test -p lp-tests integration::submission::
//! ```

pub mod integration;
pub mod network;

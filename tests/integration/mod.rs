//! Integration test suite for vmwiz
//!
//! End-to-end tests of the `vmwiz` binary and of the VM settings page driven
//! through its public API.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **catalog_server**: a local HTTP stand-in for the Resource Manager API
//! - **cli**: `vmwiz validate` and `vmwiz options` as a user runs them
//! - **page**: cascades, stale responses and the navigation checkpoint

mod catalog_server;
mod cli;
mod page;

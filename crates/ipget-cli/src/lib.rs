//! # ipget — Verified Retrieval from Untrusted Gateways
//!
//! Ties the workspace together: resolve an IPFS path to a root CID, fetch
//! the CAR export from the configured gateway, and walk the DAG through a
//! verifying block source while materializing entries to local disk.
//!
//! The pipeline is one state progression per invocation —
//! resolve, fetch, walk, done — and every error short-circuits it. Nothing
//! already written to disk is rolled back; a rerun overwrites idempotently.

mod error;
mod extract;
mod fetch;
mod source;

pub use error::GetError;
pub use extract::extract_tree;
pub use fetch::{ipfs_get, GetOptions, Summary};
pub use source::VerifyingSource;

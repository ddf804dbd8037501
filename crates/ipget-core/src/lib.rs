//! # ipget-core — Foundational Types for ipget
//!
//! This crate is the leaf of the workspace DAG. It defines the
//! self-describing content identifier ([`Cid`]), the closed multihash
//! dispatch table, and the integrity check that everything else builds on:
//! a block of bytes is trusted iff its recomputed digest equals the digest
//! embedded in its address.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ipget-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Unknown hash functions and malformed identifiers are hard errors,
//!   never silently skipped.

pub mod cid;
pub mod error;
pub mod multihash;
pub mod varint;

// Re-export primary types for ergonomic imports.
pub use cid::{Cid, DAG_PB, RAW};
pub use error::CidError;
pub use multihash::{verify, Multihash, SHA2_256, SHA2_512};

//! # ipget-car — CARv1 Container Reading
//!
//! A CAR (Content Addressable aRchive) bundles an object graph into one
//! byte stream: a dag-cbor header naming the root CIDs, followed by
//! length-prefixed sections of `CID || block bytes`.
//!
//! This crate only reads. [`CarDecoder`] walks the sections lazily as a
//! `(Cid, Bytes)` iterator; [`CarReader`] drains one into a keyed index so
//! a DAG walk can fetch blocks in whatever order it needs. Nothing here
//! verifies digests — blocks come out exactly as untrusted as they went
//! in, and the verifying layer sits above.

mod error;
mod header;
mod reader;

pub use error::CarError;
pub use header::CarHeader;
pub use reader::{CarDecoder, CarReader};

//! # Verifying Block Source
//!
//! The decorator that upgrades the CAR index's raw `get` into the trusted
//! capability the DAG walk runs on: every block is re-hashed and compared
//! to its CID before a single byte leaves this layer.
//!
//! ## Security Invariant
//!
//! No caller of [`BlockSource::get`] can observe bytes whose digest does
//! not match the requested CID. A mismatch aborts the whole extraction —
//! there is no partial-trust mode.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use ipget_car::CarReader;
use ipget_core::{verify, Cid};
use ipget_unixfs::{BlockSource, ExportError};

/// A [`BlockSource`] over a CAR index that verifies on every fetch and
/// counts the blocks it has vouched for.
///
/// The counter is scoped to one extraction; the walk fetches each address
/// at most once and nothing is cached across calls.
pub struct VerifyingSource<'a> {
    car: &'a CarReader,
    verified: AtomicU64,
}

impl<'a> VerifyingSource<'a> {
    pub fn new(car: &'a CarReader) -> Self {
        Self {
            car,
            verified: AtomicU64::new(0),
        }
    }

    /// How many blocks have been fetched and verified so far.
    pub fn blocks_verified(&self) -> u64 {
        self.verified.load(Ordering::Relaxed)
    }
}

impl BlockSource for VerifyingSource<'_> {
    fn get(&self, cid: &Cid) -> Result<Bytes, ExportError> {
        let bytes = self
            .car
            .get(cid)
            .ok_or_else(|| ExportError::BlockNotFound(cid.clone()))?;
        if !verify(cid, &bytes)? {
            return Err(ExportError::BlockDigestMismatch(cid.clone()));
        }
        self.verified.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(%cid, "block verified");
        Ok(bytes)
    }
}

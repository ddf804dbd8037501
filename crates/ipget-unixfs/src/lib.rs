//! # ipget-unixfs — DAG Decoding and Tree Export
//!
//! Decodes dag-pb blocks and their embedded UnixFS envelopes, and walks a
//! DAG rooted at a CID into a lazy sequence of path-labeled file-system
//! entries.
//!
//! The walk's only data access is the one-method [`BlockSource`] trait; it
//! never touches the network or local storage itself. Callers supply a
//! source whose `get` has already verified the bytes against their CID —
//! nothing in this crate re-checks digests, and nothing below a
//! [`BlockSource`] should hand out unverified bytes.

mod data;
mod dagpb;
mod error;
mod export;
mod pb;

pub use data::{UnixFsData, UnixFsType};
pub use dagpb::{PbLink, PbNode};
pub use error::ExportError;
pub use export::{export, BlockSource, Entry, EntryKind, Exporter, FileContent};

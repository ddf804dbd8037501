//! # File Materialization
//!
//! Consumes the exporter's entry stream strictly in order and mirrors it
//! under a base directory. The walk guarantees every directory is yielded
//! before its descendants, so materialization never has to create a
//! file's parent out of thin air — but it does anyway for file entries,
//! because a raw-leaf root arrives with no preceding directory entry.
//!
//! Failures abort immediately. A partially written file may remain; the
//! operation is safe to retry by rerunning (directories are idempotent,
//! files are overwritten).

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use ipget_core::Cid;
use ipget_unixfs::{export, BlockSource, EntryKind};

use crate::error::GetError;

/// Walk the DAG rooted at `root` and write it out under `base`.
///
/// When `output` is given it replaces the first segment of every entry
/// path; all other segments are preserved verbatim. Returns the label the
/// tree was written under (`output`, or the root CID string).
pub fn extract_tree(
    root: &Cid,
    source: &dyn BlockSource,
    output: Option<&str>,
    base: &Path,
) -> Result<String, GetError> {
    for entry in export(root, source) {
        let mut entry = entry?;
        let relative = rewrite_first_segment(&entry.path, output);
        let target = base.join(&relative);
        match entry.kind {
            EntryKind::Directory => fs::create_dir_all(&target)?,
            EntryKind::File | EntryKind::RawLeaf => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut file = File::create(&target)?;
                if let Some(content) = entry.content.as_mut() {
                    for chunk in content {
                        file.write_all(&chunk?)?;
                    }
                }
            }
        }
        tracing::info!(path = %relative, "wrote entry");
    }
    Ok(output.map(str::to_string).unwrap_or_else(|| root.to_string()))
}

/// Replace the first path segment with `output`, when supplied.
fn rewrite_first_segment(path: &str, output: Option<&str>) -> String {
    match (output, path.split_once('/')) {
        (None, _) => path.to_string(),
        (Some(output), Some((_, rest))) => format!("{output}/{rest}"),
        (Some(output), None) => output.to_string(),
    }
}

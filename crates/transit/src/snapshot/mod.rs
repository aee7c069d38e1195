//! Binary snapshots of the catalogue and its routing graph.

pub mod codec;
pub mod proto;

pub use codec::{deserialize, serialize, Snapshot, SnapshotError};

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::models::Result;

/// Write snapshot bytes to `path`.
///
/// The bytes go to a uniquely named temporary file in the same directory
/// which is then renamed over `path`, so readers see either the previous
/// file or the complete new one, and concurrent writers never share a
/// temporary file.
pub fn write_snapshot(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote snapshot");
    Ok(())
}

/// Read and decode the snapshot stored at `path`.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let bytes = fs::read(path)?;
    info!(path = %path.display(), bytes = bytes.len(), "read snapshot");
    deserialize(&bytes)
}

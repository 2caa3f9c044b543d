//! Terminal sink for a drained data message: render it or persist it

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::TransferError;

/// Appended (repeatedly) to a requested name until it no longer collides
/// with an existing filesystem entry.
const COLLISION_SUFFIX: &str = "_1";

/// Write the listing text to the output surface verbatim, no transformation.
pub fn render_listing<W: Write>(out: &mut W, payload: &str) -> Result<(), TransferError> {
    out.write_all(payload.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| TransferError::transport("render listing", e))
}

/// Persist `payload` under `requested` inside `dir`, probing with the fixed
/// suffix until the name is free, then writing in one operation. Returns
/// the path actually used; an existing file is never overwritten.
///
/// Linear probe, not atomic against concurrent writers. Fine for the
/// single-user, single-invocation execution model this client assumes.
pub fn persist(dir: &Path, requested: &str, payload: &str) -> Result<PathBuf, TransferError> {
    let mut name = requested.to_string();
    while dir.join(&name).exists() {
        name.push_str(COLLISION_SUFFIX);
    }
    let path = dir.join(name);
    fs::write(&path, payload).map_err(|e| TransferError::Filesystem {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

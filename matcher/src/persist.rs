use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::fraud::MatchHistoryEntry;
use crate::store::Record;
use crate::MatchError;

/// Snapshot layout version written by [`save_snapshot`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// Full engine state, persisted as one MessagePack blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub version: u32,
    /// Main store records (fingerprint and metadata) in insertion order.
    pub samples: Vec<Record>,
    pub fraudsters: Vec<Record>,
    pub match_history: Vec<MatchHistoryEntry>,
}

/// Writes the snapshot to `path`.
///
/// The blob is written to a sibling temporary file, synced, and renamed
/// over `path`, so readers see either the old or the new snapshot.
pub fn save_snapshot(snapshot: &EngineSnapshot, path: &Path) -> Result<(), MatchError> {
    let data = rmp_serde::to_vec_named(snapshot).map_err(|e| MatchError::Encode(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(path);
    {
        let file = File::create(&tmp)?;
        let mut w = BufWriter::new(file);
        w.write_all(&data)?;
        w.flush()?;
        w.get_ref().sync_all()?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    info!(
        path = %path.display(),
        bytes = data.len(),
        samples = snapshot.samples.len(),
        fraudsters = snapshot.fraudsters.len(),
        history = snapshot.match_history.len(),
        "snapshot saved"
    );
    Ok(())
}

/// Reads a snapshot from `path`. A missing file yields `Ok(None)`.
pub fn load_snapshot(path: &Path) -> Result<Option<EngineSnapshot>, MatchError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut data = Vec::new();
    BufReader::new(file).read_to_end(&mut data)?;

    let snapshot: EngineSnapshot =
        rmp_serde::from_slice(&data).map_err(|e| MatchError::Decode(e.to_string()))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(MatchError::Decode(format!(
            "unsupported snapshot version {}",
            snapshot.version
        )));
    }

    info!(
        path = %path.display(),
        samples = snapshot.samples.len(),
        fraudsters = snapshot.fraudsters.len(),
        history = snapshot.match_history.len(),
        "snapshot loaded"
    );
    Ok(Some(snapshot))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

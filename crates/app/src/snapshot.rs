//! Room snapshots on disk.
//!
//! The store lives in memory; a JSON file keeps rooms across restarts.

use std::{
    fs,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use engine::Room;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read rooms from `path`. A missing file is an empty store.
pub fn load(path: &Path) -> Result<Vec<Room>, SnapshotError> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Write rooms to `path`, replacing it atomically.
pub fn save(path: &Path, rooms: &[Room]) -> Result<(), SnapshotError> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(fs::File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, rooms)?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

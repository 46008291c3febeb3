//! Disk side of a download: mods-directory paths and the streaming file writer.
//!
//! A download writes straight to `<mods_dir>/<fileName>`, truncating any old
//! copy once the writer is created. On failure the writer is discarded, which
//! removes the partial file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

/// Resolve `file_name` under `mods_dir`. Names that are empty, absolute, or
/// contain separators / `..` are refused so a download can't land outside the directory.
pub fn mod_path(mods_dir: &Path, file_name: &str) -> io::Result<PathBuf> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if !file_name.contains(['/', '\\']) => {
            Ok(mods_dir.join(name))
        }
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsafe file name: {:?}", file_name),
        )),
    }
}

/// Sequential writer for one downloaded file.
pub struct StorageWriter {
    file: BufWriter<File>,
    path: PathBuf,
    written: u64,
}

impl StorageWriter {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(StorageWriter {
            file: BufWriter::new(file),
            path: path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and sync to disk. Consumes the writer and closes the file.
    pub fn finish(self) -> io::Result<u64> {
        let file = self.file.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(self.written)
    }

    /// Close and remove the partially written file.
    pub fn discard(self) {
        let path = self.path;
        drop(self.file);
        remove_partial(&path);
    }
}

/// Remove a partial file; a missing file is not an error.
pub fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("removed partial file {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("could not remove partial file {}: {}", path.display(), e),
    }
}

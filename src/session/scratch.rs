use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

/// A local file that is removed when the guard is dropped.
#[derive(Debug)]
pub struct ScratchFile {
  path: PathBuf,
  removed: bool,
}

impl ScratchFile {
  /// Creates `path` and writes `chunks` to it in order. If any write fails
  /// the partially written file is removed before the error is returned.
  pub fn write(path: PathBuf, chunks: &[&[u8]]) -> io::Result<Self> {
    let mut file = File::create(&path)?;
    let guard = Self { path, removed: false };
    for chunk in chunks {
      file.write_all(chunk)?;
    }
    file.sync_all()?;
    Ok(guard)
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn read(&self) -> io::Result<Vec<u8>> {
    std::fs::read(&self.path)
  }

  /// Removes the file, reporting failures the drop path would swallow. A file
  /// already gone counts as removed.
  pub fn remove(mut self) -> io::Result<()> {
    self.removed = true;
    match std::fs::remove_file(&self.path) {
      Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
      _ => Ok(()),
    }
  }
}

impl Drop for ScratchFile {
  fn drop(&mut self) {
    if self.removed {
      return;
    }
    if let Err(e) = std::fs::remove_file(&self.path)
      && e.kind() != io::ErrorKind::NotFound
    {
      warn!(path = %self.path.display(), error = %e, "failed to remove scratch file");
    }
  }
}

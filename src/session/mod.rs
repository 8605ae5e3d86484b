//! The view/edit round trip: download an object into a scratch file, hand the
//! terminal to an external program, then upload (edit) and clean up.

pub mod scratch;

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use self::scratch::ScratchFile;
use crate::bucket::{DELIMITER, Entry};
use crate::format::{format_size, format_time};
use crate::store::{ObjectStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
  View,
  Edit,
}

#[derive(Debug, Error)]
pub enum SessionError {
  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("scratch file: {0}")]
  Io(#[from] io::Error),

  #[error("no program configured")]
  NoProgram,

  #[error("failed to launch {program}: {source}")]
  Launch {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("{program} exited with {}", .status.map_or("a signal".to_string(), |c| format!("status {c}")))]
  Exit { program: String, status: Option<i32> },
}

/// A downloaded object waiting for, or returning from, an external program.
#[derive(Debug)]
pub struct Session {
  pub key: String,
  pub mode: SessionMode,
  file: ScratchFile,
}

impl Session {
  pub fn path(&self) -> &Path {
    self.file.path()
  }

  /// Ends the session, removing the scratch file.
  pub fn finish(self) -> io::Result<()> {
    debug!(key = %self.key, path = %self.path().display(), "session finished");
    self.file.remove()
  }
}

/// `{dir}/{bucket}-{key}` with delimiters in the key flattened so the file
/// sits directly in `dir`.
pub fn scratch_path(dir: &Path, bucket: &str, key: &str) -> PathBuf {
  let flat = key.replace(DELIMITER, "_");
  dir.join(format!("{bucket}-{flat}"))
}

/// Location and metadata block shown above an object's body.
pub fn compose_header(
  bucket: &str,
  key: &str,
  metadata: &BTreeMap<String, String>,
  size: u64,
  modified: Option<&DateTime<Utc>>,
  width: u16,
) -> String {
  let meta = if metadata.is_empty() {
    "-".to_string()
  } else {
    metadata
      .iter()
      .map(|(k, v)| format!("{k}={v}"))
      .collect::<Vec<_>>()
      .join(", ")
  };
  format!(
    "s3://{bucket}/{key}\nMetadata: {meta}\nSize: {}\nLast-Modified: {}\n{}\n\n",
    format_size(size),
    format_time(modified),
    "-".repeat((width as usize).saturating_sub(10)),
  )
}

/// Header and body as the viewer and the pager show them.
pub async fn fetch_text(
  store: &dyn ObjectStore,
  bucket: &str,
  entry: &Entry,
  width: u16,
) -> Result<String, StoreError> {
  let object = store.get(&entry.key).await?;
  let header = compose_header(
    bucket,
    &entry.key,
    &object.metadata,
    object.bytes.len() as u64,
    object.modified.as_ref().or(entry.modified.as_ref()),
    width,
  );
  Ok(header + &String::from_utf8_lossy(&object.bytes))
}

/// Downloads `entry` into a scratch file under `scratch_dir`. View sessions
/// get the header prepended; edit sessions hold the raw body only.
pub async fn download(
  store: &dyn ObjectStore,
  bucket: &str,
  scratch_dir: &Path,
  entry: &Entry,
  mode: SessionMode,
  width: u16,
) -> Result<Session, SessionError> {
  let object = store.get(&entry.key).await?;
  let header = match mode {
    SessionMode::View => compose_header(
      bucket,
      &entry.key,
      &object.metadata,
      object.bytes.len() as u64,
      object.modified.as_ref().or(entry.modified.as_ref()),
      width,
    ),
    SessionMode::Edit => String::new(),
  };

  let path = scratch_path(scratch_dir, bucket, &entry.key);
  let file = ScratchFile::write(path, &[header.as_bytes(), &object.bytes])?;
  info!(key = %entry.key, path = %file.path().display(), ?mode, "downloaded for session");
  Ok(Session {
    key: entry.key.clone(),
    mode,
    file,
  })
}

/// Uploads the scratch file's current contents over the session's key.
pub async fn upload(store: &dyn ObjectStore, session: &Session) -> Result<(), SessionError> {
  let body = session.file.read()?;
  store.put(&session.key, body).await?;
  info!(key = %session.key, "uploaded edited object");
  Ok(())
}

/// Runs `program` (which may carry its own arguments) on `path` and waits for
/// it to exit. The caller owns the terminal hand-off.
pub fn run_external(program: &str, path: &Path) -> Result<(), SessionError> {
  let mut parts = program.split_whitespace();
  let Some(cmd) = parts.next() else {
    return Err(SessionError::NoProgram);
  };
  debug!(program, path = %path.display(), "launching external program");
  let status = Command::new(cmd)
    .args(parts)
    .arg(path)
    .status()
    .map_err(|source| SessionError::Launch {
      program: cmd.to_string(),
      source,
    })?;
  if status.success() {
    Ok(())
  } else {
    Err(SessionError::Exit {
      program: cmd.to_string(),
      status: status.code(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::memory::MemoryStore;

  fn entry(key: &str) -> Entry {
    Entry::file(key, "", 0, None)
  }

  #[test]
  fn test_scratch_path_flattens_key() {
    let dir = Path::new("/tmp");
    assert_eq!(scratch_path(dir, "bkt", "notes.txt"), PathBuf::from("/tmp/bkt-notes.txt"));
    assert_eq!(scratch_path(dir, "bkt", "a/b/c.json"), PathBuf::from("/tmp/bkt-a_b_c.json"));
  }

  #[test]
  fn test_compose_header() {
    let mut meta = BTreeMap::new();
    meta.insert("owner".to_string(), "ops".to_string());
    let header = compose_header("bkt", "a/notes.txt", &meta, 2048, None, 20);
    assert_eq!(
      header,
      "s3://bkt/a/notes.txt\nMetadata: owner=ops\nSize: 2.0 KB\nLast-Modified: -\n----------\n\n"
    );
  }

  #[test]
  fn test_compose_header_narrow_terminal() {
    let header = compose_header("b", "k", &BTreeMap::new(), 0, None, 4);
    assert!(header.ends_with("Last-Modified: -\n\n\n"));
  }

  #[tokio::test]
  async fn test_download_view_prepends_header() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::default();
    store.insert("notes.txt", b"hello");
    let session = download(&store, "bkt", dir.path(), &entry("notes.txt"), SessionMode::View, 30)
      .await
      .unwrap();
    let written = std::fs::read_to_string(session.path()).unwrap();
    assert!(written.starts_with("s3://bkt/notes.txt\n"));
    assert!(written.ends_with("\n\nhello"));
    let path = session.path().to_path_buf();
    session.finish().unwrap();
    assert!(!path.exists());
  }

  #[tokio::test]
  async fn test_download_edit_is_raw_body() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::default();
    store.insert("notes.txt", b"hello");
    let session = download(&store, "bkt", dir.path(), &entry("notes.txt"), SessionMode::Edit, 30)
      .await
      .unwrap();
    assert_eq!(std::fs::read(session.path()).unwrap(), b"hello");
  }

  #[tokio::test]
  async fn test_download_failure_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = MemoryStore::default();
    store.fail_get = true;
    store.insert("notes.txt", b"hello");
    let result = download(&store, "bkt", dir.path(), &entry("notes.txt"), SessionMode::Edit, 30).await;
    assert!(matches!(result, Err(SessionError::Store(_))));
    assert!(!scratch_path(dir.path(), "bkt", "notes.txt").exists());
  }

  #[tokio::test]
  async fn test_upload_sends_current_contents() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::default();
    store.insert("notes.txt", b"hello");
    let session = download(&store, "bkt", dir.path(), &entry("notes.txt"), SessionMode::Edit, 30)
      .await
      .unwrap();
    std::fs::write(session.path(), b"edited").unwrap();
    upload(&store, &session).await.unwrap();
    assert_eq!(store.body("notes.txt").unwrap(), b"edited");
  }

  #[tokio::test]
  async fn test_fetch_text() {
    let store = MemoryStore::default();
    store.insert("data.csv", b"a,b\n1,2\n");
    let text = fetch_text(&store, "bkt", &entry("data.csv"), 20).await.unwrap();
    assert!(text.starts_with("s3://bkt/data.csv\n"));
    assert!(text.ends_with("a,b\n1,2\n"));
  }

  #[test]
  fn test_run_external_statuses() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f");
    std::fs::write(&path, "x").unwrap();
    assert!(run_external("true", &path).is_ok());
    assert!(matches!(run_external("false", &path), Err(SessionError::Exit { .. })));
    assert!(matches!(
      run_external("s3n-no-such-program", &path),
      Err(SessionError::Launch { .. })
    ));
    assert!(matches!(run_external("  ", &path), Err(SessionError::NoProgram)));
  }
}

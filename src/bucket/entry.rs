use chrono::{DateTime, Utc};

use super::{DELIMITER, relative};
use crate::format::{format_size, format_time};

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
  /// Full object key. Directories keep their trailing delimiter.
  pub key: String,
  pub display_key: String,
  pub is_dir: bool,
  pub size: u64,
  pub modified: Option<DateTime<Utc>>,
  /// Empty unless content types were requested for the listing.
  pub content_type: String,
}

impl Entry {
  pub fn dir(key: &str, prefix: &str) -> Self {
    let display_key = relative(key, prefix).trim_end_matches(DELIMITER).to_string();
    Self {
      key: key.to_string(),
      display_key,
      is_dir: true,
      size: 0,
      modified: None,
      content_type: String::new(),
    }
  }

  pub fn file(key: &str, prefix: &str, size: u64, modified: Option<DateTime<Utc>>) -> Self {
    Self {
      key: key.to_string(),
      display_key: relative(key, prefix).to_string(),
      is_dir: false,
      size,
      modified,
      content_type: String::new(),
    }
  }

  pub fn description(&self) -> String {
    if self.is_dir {
      return "Directory".to_string();
    }
    let mut d = format!(
      "{}, Modified: {}",
      format_size(self.size),
      format_time(self.modified.as_ref())
    );
    if !self.content_type.is_empty() {
      d.push_str(&format!(", Content-Type: {}", self.content_type));
    }
    d
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_dir_entry_strips_prefix_and_delimiter() {
    let entry = Entry::dir("logs/2024/", "logs/");
    assert_eq!(entry.key, "logs/2024/");
    assert_eq!(entry.display_key, "2024");
    assert!(entry.is_dir);
  }

  #[test]
  fn test_file_entry_keeps_full_key() {
    let entry = Entry::file("logs/app.log", "logs/", 42, None);
    assert_eq!(entry.key, "logs/app.log");
    assert_eq!(entry.display_key, "app.log");
    assert!(!entry.is_dir);
    assert_eq!(entry.size, 42);
  }

  #[test]
  fn test_description() {
    assert_eq!(Entry::dir("a/", "").description(), "Directory");

    let modified = DateTime::from_timestamp(0, 0);
    let mut entry = Entry::file("a.txt", "", 2048, modified);
    assert_eq!(entry.description(), "2.0 KB, Modified: 1970-01-01 00:00:00");

    entry.content_type = "text/plain".to_string();
    assert_eq!(
      entry.description(),
      "2.0 KB, Modified: 1970-01-01 00:00:00, Content-Type: text/plain"
    );
  }
}

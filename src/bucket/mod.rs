pub mod entry;
pub mod listing;

pub use entry::Entry;
pub use listing::{Listing, PageCursor, PageTarget};

pub const DELIMITER: char = '/';

/// Drops the last segment of `prefix`, which may be empty when keys contain
/// doubled delimiters. The result is `""` at the root and otherwise ends with
/// the delimiter.
pub fn parent_prefix(prefix: &str) -> String {
  let trimmed = prefix.strip_suffix(DELIMITER).unwrap_or(prefix);
  let mut parts: Vec<&str> = trimmed.split(DELIMITER).collect();
  parts.pop();
  if parts.is_empty() {
    return String::new();
  }
  let mut parent = parts.join("/");
  parent.push(DELIMITER);
  parent
}

/// `key` relative to `prefix`. Keys outside the prefix are returned whole.
pub fn relative<'a>(key: &'a str, prefix: &str) -> &'a str {
  key.strip_prefix(prefix).unwrap_or(key)
}

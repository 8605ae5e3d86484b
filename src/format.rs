use chrono::{DateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn format_size(bytes: u64) -> String {
  const KB: u64 = 1024;
  const MB: u64 = 1024 * KB;
  const GB: u64 = 1024 * MB;

  if bytes >= GB {
    format!("{:.1} GB", bytes as f64 / GB as f64)
  } else if bytes >= MB {
    format!("{:.1} MB", bytes as f64 / MB as f64)
  } else if bytes >= KB {
    format!("{:.1} KB", bytes as f64 / KB as f64)
  } else {
    format!("{bytes} B")
  }
}

pub fn format_time(time: Option<&DateTime<Utc>>) -> String {
  time
    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
    .unwrap_or_else(|| "-".to_string())
}

/// Cuts `s` to at most `max` terminal columns, marking the cut with `…`.
pub fn truncate(s: &str, max: usize) -> String {
  if s.width() <= max {
    return s.to_string();
  }
  if max == 0 {
    return String::new();
  }
  let mut out = String::new();
  let mut used = 0;
  for c in s.chars() {
    let w = c.width().unwrap_or(0);
    if used + w + 1 > max {
      break;
    }
    out.push(c);
    used += w;
  }
  out.push('…');
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_format_size() {
    assert_eq!(format_size(0), "0 B");
    assert_eq!(format_size(512), "512 B");
    assert_eq!(format_size(1024), "1.0 KB");
    assert_eq!(format_size(1536), "1.5 KB");
    assert_eq!(format_size(1024 * 1024), "1.0 MB");
    assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
  }

  #[test]
  fn test_format_time() {
    let t = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    assert_eq!(format_time(Some(&t)), "2023-11-14 22:13:20");
    assert_eq!(format_time(None), "-");
  }

  #[test]
  fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a-long-key.txt", 6), "a-lon…");
    // Wide characters take two columns each
    assert_eq!(truncate("日本語.txt", 5), "日本…");
    assert_eq!(truncate("abc", 0), "");
  }
}

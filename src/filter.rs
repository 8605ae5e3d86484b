use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Byte ranges of every case-insensitive occurrence of `query` in `text`,
/// scanned left to right without overlap. An empty query matches nothing.
pub fn match_ranges(text: &str, query: &str) -> Vec<(usize, usize)> {
  if query.is_empty() {
    return Vec::new();
  }
  let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();

  let mut ranges = Vec::new();
  let mut start = 0;
  while start < text.len() {
    match match_len(&text[start..], &needle) {
      Some(len) => {
        ranges.push((start, start + len));
        start += len;
      }
      None => {
        start += text[start..].chars().next().map_or(1, char::len_utf8);
      }
    }
  }
  ranges
}

/// Length in bytes of the prefix of `haystack` matching `needle`, if any.
fn match_len(haystack: &str, needle: &[char]) -> Option<usize> {
  let mut matched = 0;
  for (offset, c) in haystack.char_indices() {
    for lower in c.to_lowercase() {
      if needle.get(matched) != Some(&lower) {
        return None;
      }
      matched += 1;
    }
    if matched == needle.len() {
      return Some(offset + c.len_utf8());
    }
  }
  None
}

/// Splits `text` into spans, emphasizing the matches of `query`.
pub fn highlight<'a>(text: &'a str, query: &str, base: Style, emphasis: Style) -> Line<'a> {
  let ranges = match_ranges(text, query);
  if ranges.is_empty() {
    return Line::from(Span::styled(text, base));
  }

  let mut spans = Vec::with_capacity(ranges.len() * 2 + 1);
  let mut last_end = 0;
  for (start, end) in ranges {
    if last_end < start {
      spans.push(Span::styled(&text[last_end..start], base));
    }
    spans.push(Span::styled(&text[start..end], emphasis));
    last_end = end;
  }
  if last_end < text.len() {
    spans.push(Span::styled(&text[last_end..], base));
  }
  Line::from(spans)
}

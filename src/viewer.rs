use crate::filter::match_ranges;

/// In-app object viewer with an optional highlight filter.
pub struct Viewer {
  pub title: String,
  lines: Vec<String>,
  pub scroll: usize,
  pub height: usize,
  pub filter_enabled: bool,
  pub filter: String,
}

impl Viewer {
  pub fn new(title: String, text: &str) -> Self {
    Self {
      title,
      lines: text.lines().map(str::to_string).collect(),
      scroll: 0,
      height: 20,
      filter_enabled: false,
      filter: String::new(),
    }
  }

  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  /// The query to emphasize, empty when filtering is off.
  pub fn active_query(&self) -> &str {
    if self.filter_enabled { &self.filter } else { "" }
  }

  fn max_scroll(&self) -> usize {
    self.lines.len().saturating_sub(self.height.max(1))
  }

  pub fn scroll_down(&mut self, amount: usize) {
    self.scroll = (self.scroll + amount).min(self.max_scroll());
  }

  pub fn scroll_up(&mut self, amount: usize) {
    self.scroll = self.scroll.saturating_sub(amount);
  }

  pub fn page_down(&mut self) {
    self.scroll_down(self.height.max(1));
  }

  pub fn page_up(&mut self) {
    self.scroll_up(self.height.max(1));
  }

  pub fn top(&mut self) {
    self.scroll = 0;
  }

  pub fn bottom(&mut self) {
    self.scroll = self.max_scroll();
  }

  pub fn set_height(&mut self, height: usize) {
    self.height = height;
    self.scroll = self.scroll.min(self.max_scroll());
  }

  pub fn scroll_percent(&self) -> u16 {
    let max = self.max_scroll();
    if max == 0 {
      return 100;
    }
    (self.scroll * 100 / max) as u16
  }

  pub fn start_filter(&mut self) {
    self.filter_enabled = true;
  }

  pub fn push_filter(&mut self, c: char) {
    self.filter.push(c);
  }

  pub fn pop_filter(&mut self) {
    self.filter.pop();
  }

  pub fn clear_filter(&mut self) {
    self.filter_enabled = false;
    self.filter.clear();
  }

  pub fn match_count(&self) -> usize {
    let query = self.active_query();
    self.lines.iter().map(|l| match_ranges(l, query).len()).sum()
  }

  /// Scrolls to the first line at or below the current position containing a
  /// match, wrapping to the top.
  pub fn jump_to_match(&mut self) {
    let query = self.active_query();
    if query.is_empty() {
      return;
    }
    let len = self.lines.len();
    let found = (0..len)
      .map(|i| (self.scroll + i) % len)
      .find(|&i| !match_ranges(&self.lines[i], query).is_empty());
    if let Some(line) = found {
      self.scroll = line.min(self.max_scroll());
    }
  }
}

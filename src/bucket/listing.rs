use super::{DELIMITER, Entry, relative};
use crate::store::RawListing;

/// One projected page of a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
  pub entries: Vec<Entry>,
  pub has_more: bool,
  pub next_token: Option<String>,
}

/// Projects a raw listing onto the directory level at `prefix`.
///
/// Common prefixes become directories and come first; objects whose relative
/// path still contains a delimiter belong to a deeper level and are dropped.
/// Both groups keep the store's order.
pub fn project(prefix: &str, raw: RawListing) -> Listing {
  let mut entries = Vec::with_capacity(raw.common_prefixes.len() + raw.contents.len());

  for common in &raw.common_prefixes {
    if common.is_empty() || common == prefix {
      continue;
    }
    entries.push(Entry::dir(common, prefix));
  }

  for object in &raw.contents {
    if object.key.is_empty() || object.key == prefix {
      continue;
    }
    if relative(&object.key, prefix).contains(DELIMITER) {
      continue;
    }
    entries.push(Entry::file(&object.key, prefix, object.size, object.modified));
  }

  let next_token = if raw.is_truncated { raw.next_token } else { None };
  Listing {
    entries,
    has_more: raw.is_truncated,
    next_token,
  }
}

/// Where a listing fetch starts, plus the page history it implies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTarget {
  pub token: Option<String>,
  pub history: Vec<Option<String>>,
}

/// Pagination state for the current prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
  /// Token for the page after the one shown.
  pub continuation_token: Option<String>,
  pub has_more: bool,
  /// Token that produced the page shown; `None` for the first page.
  page_token: Option<String>,
  /// Starting tokens of the pages before the one shown.
  history: Vec<Option<String>>,
}

impl PageCursor {
  pub fn reset(&mut self) {
    *self = Self::default();
  }

  /// 1-based number of the page shown.
  pub fn page_number(&self) -> usize {
    self.history.len() + 1
  }

  pub fn first() -> PageTarget {
    PageTarget::default()
  }

  /// The page currently shown.
  pub fn current(&self) -> PageTarget {
    PageTarget {
      token: self.page_token.clone(),
      history: self.history.clone(),
    }
  }

  pub fn next(&self) -> Option<PageTarget> {
    if !self.has_more {
      return None;
    }
    let token = self.continuation_token.clone()?;
    let mut history = self.history.clone();
    history.push(self.page_token.clone());
    Some(PageTarget {
      token: Some(token),
      history,
    })
  }

  pub fn previous(&self) -> Option<PageTarget> {
    let mut history = self.history.clone();
    let token = history.pop()?;
    Some(PageTarget { token, history })
  }

  /// Records a successful fetch of `target`.
  pub fn advance(&mut self, target: PageTarget, listing: &Listing) {
    self.page_token = target.token;
    self.history = target.history;
    self.has_more = listing.has_more;
    self.continuation_token = listing.next_token.clone();
  }
}

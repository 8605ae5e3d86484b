use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::bucket::{Entry, PageCursor, PageTarget, parent_prefix};
use crate::config::Config;
use crate::event::InputMode;
use crate::session::{Session, SessionError, SessionMode};
use crate::viewer::Viewer;
use crate::worker::{Task, TaskEvent};

/// Object work in flight. At most one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
  Download(SessionMode),
  Preview,
  /// A pager or editor owns the terminal.
  External(SessionMode),
  Upload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
  pub text: String,
  id: u64,
}

pub struct App {
  pub bucket: String,
  pub current_prefix: String,
  pub entries: Vec<Entry>,
  pub cursor: usize,
  pub scroll_offset: usize,
  pub page: PageCursor,
  pub loading: bool,
  generation: u64,
  pub pending: Option<Pending>,
  pub viewer: Option<Viewer>,
  pub input_mode: InputMode,
  pub status: Option<StatusMessage>,
  status_seq: u64,
  pub show_content_type: bool,
  page_size: i32,
  status_timeout: Duration,
  pager: String,
  editor: String,
  pub width: u16,
  pub viewport_height: usize,
  pub spinner: usize,
  pub should_quit: bool,
  pub should_suspend: Option<Session>,
  tasks: Vec<Task>,
}

impl App {
  pub fn new(bucket: String, config: &Config) -> Self {
    Self {
      bucket,
      current_prefix: String::new(),
      entries: Vec::new(),
      cursor: 0,
      scroll_offset: 0,
      page: PageCursor::default(),
      loading: false,
      generation: 0,
      pending: None,
      viewer: None,
      input_mode: InputMode::Normal,
      status: None,
      status_seq: 0,
      show_content_type: config.show_content_type,
      page_size: config.page_size,
      status_timeout: Duration::from_secs(config.status_timeout_secs),
      pager: config.pager.clone(),
      editor: config.editor.clone(),
      width: 80,
      viewport_height: 20,
      spinner: 0,
      should_quit: false,
      should_suspend: None,
      tasks: Vec::new(),
    }
  }

  /// Issues the first listing of the bucket root.
  pub fn start(&mut self) {
    info!(bucket = %self.bucket, "starting");
    self.fetch(PageCursor::first());
  }

  pub fn update(&mut self, action: Action) -> Result<()> {
    match action {
      Action::Quit => {
        // Dropping the runtime now would cancel the upload and lose the edit
        if self.pending == Some(Pending::Upload) {
          self.set_status("Upload in progress, quit once it finishes".to_string());
        } else {
          self.should_quit = true;
        }
      }
      Action::MoveDown => self.move_cursor(1),
      Action::MoveUp => self.move_cursor(-1),
      Action::GoToTop => {
        self.cursor = 0;
        self.scroll_offset = 0;
      }
      Action::GoToBottom => {
        if !self.entries.is_empty() {
          self.cursor = self.entries.len() - 1;
          self.adjust_scroll();
        }
      }
      Action::Open => self.open(),
      Action::Back => self.back(),
      Action::Reload => {
        if !self.busy() {
          self.fetch(self.page.current());
        }
      }
      Action::Edit => self.start_session(SessionMode::Edit),
      Action::Preview => self.preview(),
      Action::NextPage => {
        if self.busy() {
          return Ok(());
        }
        match self.page.next() {
          Some(target) => self.fetch(target),
          None => {
            self.set_status("Already on the last page".to_string());
          }
        }
      }
      Action::PrevPage => {
        if self.busy() {
          return Ok(());
        }
        match self.page.previous() {
          Some(target) => self.fetch(target),
          None => {
            self.set_status("Already on the first page".to_string());
          }
        }
      }
      Action::FirstPage => {
        if !self.busy() {
          self.fetch(PageCursor::first());
        }
      }
      Action::ToggleContentType => {
        if !self.busy() {
          self.show_content_type = !self.show_content_type;
          self.fetch(self.page.current());
        }
      }
      Action::ViewerScrollDown => self.with_viewer(|v| v.scroll_down(1)),
      Action::ViewerScrollUp => self.with_viewer(|v| v.scroll_up(1)),
      Action::ViewerPageDown => self.with_viewer(Viewer::page_down),
      Action::ViewerPageUp => self.with_viewer(Viewer::page_up),
      Action::ViewerTop => self.with_viewer(Viewer::top),
      Action::ViewerBottom => self.with_viewer(Viewer::bottom),
      Action::ViewerBack => {
        if self.viewer.as_ref().is_some_and(|v| v.filter_enabled) {
          self.with_viewer(Viewer::clear_filter);
        } else {
          self.close_viewer();
        }
      }
      Action::ViewerClose => self.close_viewer(),
      Action::FilterStart => {
        if let Some(viewer) = self.viewer.as_mut() {
          viewer.start_filter();
          self.input_mode = InputMode::ViewerFilter;
        }
      }
      Action::FilterInput(c) => self.with_viewer(|v| {
        v.push_filter(c);
        v.jump_to_match();
      }),
      Action::FilterBackspace => self.with_viewer(Viewer::pop_filter),
      Action::FilterConfirm => {
        self.with_viewer(Viewer::jump_to_match);
        self.input_mode = InputMode::Viewer;
      }
      Action::FilterCancel => {
        self.with_viewer(Viewer::clear_filter);
        self.input_mode = InputMode::Viewer;
      }
      Action::Resize(w, h) => {
        self.width = w;
        // Header and status lines sit outside the list
        self.viewport_height = (h as usize).saturating_sub(2);
        let height = self.viewer_height();
        self.with_viewer(|v| v.set_height(height));
        self.adjust_scroll();
      }
      Action::Tick => {
        if self.loading || self.pending.is_some() {
          self.spinner = self.spinner.wrapping_add(1);
        }
      }
      Action::None => {}
    }
    Ok(())
  }

  /// Applies a finished background task.
  pub fn complete(&mut self, event: TaskEvent) {
    match event {
      TaskEvent::Listed {
        generation,
        prefix,
        target,
        result,
      } => {
        if generation != self.generation {
          debug!(generation, current = self.generation, %prefix, "dropping stale listing");
          return;
        }
        self.loading = false;
        match result {
          Ok(listing) => {
            debug!(%prefix, entries = listing.entries.len(), has_more = listing.has_more, "listing applied");
            self.page.advance(target, &listing);
            self.entries = listing.entries;
            self.cursor = 0;
            self.scroll_offset = 0;
            let status = self.listing_status();
            self.set_status(status);
          }
          Err(e) => {
            warn!(%prefix, "listing failed: {e}");
            self.set_status(format!("Error: {e}"));
          }
        }
      }
      TaskEvent::Downloaded { key, result } => match result {
        Ok(session) => {
          self.pending = Some(Pending::External(session.mode));
          self.should_suspend = Some(session);
        }
        Err(e) => {
          warn!(%key, "download failed: {e}");
          self.pending = None;
          self.set_status(format!("Error: {e}"));
        }
      },
      TaskEvent::Previewed { key, result } => {
        self.pending = None;
        match result {
          Ok(text) => {
            let mut viewer = Viewer::new(format!("s3://{}/{key}", self.bucket), &text);
            viewer.set_height(self.viewer_height());
            self.viewer = Some(viewer);
            self.input_mode = InputMode::Viewer;
          }
          Err(e) => {
            warn!(%key, "preview failed: {e}");
            self.set_status(format!("Error: {e}"));
          }
        }
      }
      TaskEvent::Uploaded { key, file, result } => {
        self.pending = None;
        match result {
          Ok(()) => {
            let id = self.set_status(format!(" → Uploaded {file} to {}/{key}!", self.bucket));
            self.tasks.push(Task::ClearStatus {
              id,
              after: self.status_timeout,
            });
          }
          Err(e) => {
            warn!(%key, "upload failed: {e}");
            self.set_status(format!("Error: {e}"));
          }
        }
      }
      TaskEvent::StatusExpired { id } => {
        if self.status.as_ref().is_some_and(|s| s.id == id) {
          self.status = None;
        }
      }
    }
  }

  pub fn handle_suspend(&mut self) -> Option<Session> {
    self.should_suspend.take()
  }

  /// The pager for views, the editor for edits.
  pub fn program_for(&self, mode: SessionMode) -> &str {
    match mode {
      SessionMode::View => &self.pager,
      SessionMode::Edit => &self.editor,
    }
  }

  /// Called once the external program has returned the terminal.
  pub fn external_exited(&mut self, session: Session, result: Result<(), SessionError>) {
    let mode = session.mode;
    if mode == SessionMode::Edit && result.is_ok() {
      self.pending = Some(Pending::Upload);
      self.tasks.push(Task::Upload { session });
      return;
    }

    self.pending = None;
    let key = session.key.clone();
    let finished = session.finish();
    if let Err(e) = result {
      warn!(%key, ?mode, "external program failed: {e}");
      self.set_status(format!("Error: {e}"));
    } else if let Err(e) = finished {
      warn!(%key, "scratch cleanup failed: {e}");
      self.set_status(format!("Error: {}", SessionError::from(e)));
    }
  }

  pub fn take_tasks(&mut self) -> Vec<Task> {
    std::mem::take(&mut self.tasks)
  }

  pub fn show_errors(&mut self, errors: Vec<String>) {
    if !errors.is_empty() {
      self.set_status(format!("Error: {}", errors.join("; ")));
    }
  }

  pub fn title(&self) -> String {
    if self.current_prefix.is_empty() {
      self.bucket.clone()
    } else {
      format!("{}/{}", self.bucket, self.current_prefix)
    }
  }

  pub fn selected_entry(&self) -> Option<&Entry> {
    self.entries.get(self.cursor)
  }

  /// Anything that would race a navigation or session.
  pub fn busy(&self) -> bool {
    self.loading || self.pending.is_some() || self.should_suspend.is_some()
  }

  /// Lines available to the viewer body: the list area less borders and the
  /// footer.
  pub fn viewer_height(&self) -> usize {
    self.viewport_height.saturating_sub(3)
  }

  fn fetch(&mut self, target: PageTarget) {
    self.generation += 1;
    self.loading = true;
    debug!(generation = self.generation, prefix = %self.current_prefix, token = ?target.token, "fetching");
    self.tasks.push(Task::List {
      generation: self.generation,
      prefix: self.current_prefix.clone(),
      target,
      page_size: self.page_size,
      content_types: self.show_content_type,
    });
  }

  fn open(&mut self) {
    if self.busy() {
      return;
    }
    let Some(entry) = self.selected_entry() else {
      return;
    };
    if entry.is_dir {
      self.current_prefix = entry.key.clone();
      self.page.reset();
      self.fetch(PageCursor::first());
    } else {
      self.start_session(SessionMode::View);
    }
  }

  fn back(&mut self) {
    if self.busy() || self.current_prefix.is_empty() {
      return;
    }
    self.current_prefix = parent_prefix(&self.current_prefix);
    self.page.reset();
    self.fetch(PageCursor::first());
  }

  fn start_session(&mut self, mode: SessionMode) {
    if self.busy() {
      return;
    }
    let Some(entry) = self.selected_entry().filter(|e| !e.is_dir).cloned() else {
      return;
    };
    info!(key = %entry.key, ?mode, "starting session");
    self.pending = Some(Pending::Download(mode));
    self.tasks.push(Task::Download {
      entry,
      mode,
      width: self.width,
    });
  }

  fn preview(&mut self) {
    if self.busy() {
      return;
    }
    let Some(entry) = self.selected_entry().filter(|e| !e.is_dir).cloned() else {
      return;
    };
    self.pending = Some(Pending::Preview);
    self.tasks.push(Task::Preview {
      entry,
      width: self.width,
    });
  }

  fn close_viewer(&mut self) {
    self.viewer = None;
    self.input_mode = InputMode::Normal;
  }

  fn with_viewer(&mut self, f: impl FnOnce(&mut Viewer)) {
    if let Some(viewer) = self.viewer.as_mut() {
      f(viewer);
    }
  }

  fn listing_status(&self) -> String {
    let n = self.entries.len();
    if n == 0 {
      return "Directory is empty".to_string();
    }
    let page = match self.page.page_number() {
      1 => String::new(),
      k => format!(" on page {k}"),
    };
    if self.page.has_more {
      format!("Showing {n} items{page} (More available - press 'n' for next page)")
    } else {
      format!("Showing {n} items{page} (End of list)")
    }
  }

  fn set_status(&mut self, text: String) -> u64 {
    self.status_seq += 1;
    self.status = Some(StatusMessage {
      text,
      id: self.status_seq,
    });
    self.status_seq
  }

  fn move_cursor(&mut self, delta: i32) {
    if self.entries.is_empty() {
      return;
    }
    let len = self.entries.len();
    if delta > 0 {
      self.cursor = (self.cursor + delta as usize).min(len - 1);
    } else {
      self.cursor = self.cursor.saturating_sub((-delta) as usize);
    }
    self.adjust_scroll();
  }

  fn adjust_scroll(&mut self) {
    let visible = self.viewport_height.saturating_sub(2); // borders
    if visible == 0 {
      return;
    }
    if self.cursor < self.scroll_offset {
      self.scroll_offset = self.cursor;
    } else if self.cursor >= self.scroll_offset + visible {
      self.scroll_offset = self.cursor - visible + 1;
    }
  }
}

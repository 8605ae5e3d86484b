//! Background store work. The UI thread hands [`Task`]s to the [`Worker`],
//! which runs them on its tokio runtime and posts a [`TaskEvent`] back into
//! the event queue when each one completes.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::bucket::listing::project;
use crate::bucket::{Entry, Listing, PageTarget};
use crate::event::Event;
use crate::session::{self, Session, SessionError, SessionMode};
use crate::store::{ListRequest, ObjectStore, StoreError};

#[derive(Debug)]
pub enum Task {
  List {
    generation: u64,
    prefix: String,
    target: PageTarget,
    page_size: i32,
    content_types: bool,
  },
  Download {
    entry: Entry,
    mode: SessionMode,
    width: u16,
  },
  Preview {
    entry: Entry,
    width: u16,
  },
  /// Uploads the edited scratch file, then ends the session.
  Upload {
    session: Session,
  },
  ClearStatus {
    id: u64,
    after: Duration,
  },
}

#[derive(Debug)]
pub enum TaskEvent {
  Listed {
    generation: u64,
    prefix: String,
    target: PageTarget,
    result: Result<Listing, StoreError>,
  },
  Downloaded {
    key: String,
    result: Result<Session, SessionError>,
  },
  Previewed {
    key: String,
    result: Result<String, StoreError>,
  },
  Uploaded {
    key: String,
    file: String,
    result: Result<(), SessionError>,
  },
  StatusExpired {
    id: u64,
  },
}

/// What every task needs to reach the bucket.
#[derive(Clone)]
pub struct TaskContext {
  pub store: Arc<dyn ObjectStore>,
  pub bucket: String,
  pub scratch_dir: PathBuf,
}

pub async fn perform(ctx: &TaskContext, task: Task) -> TaskEvent {
  match task {
    Task::List {
      generation,
      prefix,
      target,
      page_size,
      content_types,
    } => {
      let result = list(ctx, &prefix, &target, page_size, content_types).await;
      TaskEvent::Listed {
        generation,
        prefix,
        target,
        result,
      }
    }
    Task::Download { entry, mode, width } => {
      let result =
        session::download(ctx.store.as_ref(), &ctx.bucket, &ctx.scratch_dir, &entry, mode, width).await;
      TaskEvent::Downloaded { key: entry.key, result }
    }
    Task::Preview { entry, width } => {
      let result = session::fetch_text(ctx.store.as_ref(), &ctx.bucket, &entry, width).await;
      TaskEvent::Previewed { key: entry.key, result }
    }
    Task::Upload { session } => {
      let key = session.key.clone();
      let file = session
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
      let uploaded = session::upload(ctx.store.as_ref(), &session).await;
      let finished = session.finish().map_err(SessionError::from);
      TaskEvent::Uploaded {
        key,
        file,
        result: uploaded.and(finished),
      }
    }
    Task::ClearStatus { id, after } => {
      tokio::time::sleep(after).await;
      TaskEvent::StatusExpired { id }
    }
  }
}

async fn list(
  ctx: &TaskContext,
  prefix: &str,
  target: &PageTarget,
  page_size: i32,
  content_types: bool,
) -> Result<Listing, StoreError> {
  let request = ListRequest {
    prefix: prefix.to_string(),
    continuation_token: target.token.clone(),
    max_keys: page_size,
  };
  let raw = ctx.store.list(&request).await?;
  let mut listing = project(prefix, raw);

  if content_types {
    for entry in listing.entries.iter_mut().filter(|e| !e.is_dir) {
      match ctx.store.head(&entry.key).await {
        Ok(content_type) => entry.content_type = content_type.unwrap_or_default(),
        Err(e) => warn!(key = %entry.key, "head failed: {e}"),
      }
    }
  }

  Ok(listing)
}

pub struct Worker {
  runtime: Runtime,
  ctx: TaskContext,
  tx: Sender<Event>,
}

impl Worker {
  pub fn new(runtime: Runtime, ctx: TaskContext, tx: Sender<Event>) -> Self {
    Self { runtime, ctx, tx }
  }

  pub fn spawn(&self, task: Task) {
    debug!(?task, "spawning task");
    let ctx = self.ctx.clone();
    let tx = self.tx.clone();
    self.runtime.spawn(async move {
      let event = perform(&ctx, task).await;
      // The receiver only goes away on shutdown
      let _ = tx.send(Event::Task(event));
    });
  }
}

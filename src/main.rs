mod action;
mod app;
mod bucket;
mod config;
mod event;
mod filter;
mod format;
mod logging;
mod session;
mod store;
mod theme;
mod ui;
mod viewer;
mod worker;

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{
  EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{error, info};

use crate::action::Action;
use crate::app::App;
use crate::event::{Event, EventLoop, map_key};
use crate::session::run_external;
use crate::store::s3::S3Store;
use crate::theme::Theme;
use crate::worker::{TaskContext, Worker};

const USAGE: &str = "\
s3n - terminal browser for S3 buckets

Usage: s3n [options] <bucket>

Options:
  --init                   Write the default config file to ~/.config/s3n/
  -h, --help               Print this help message
  -V, --version            Print version

Environment:
  EDITOR                   Editor for ctrl+e (falls back to the config, then vi)
  PAGER                    Pager for enter (falls back to the config, then less)
  DEBUG=true               Log to ./s3n.log, filtered by RUST_LOG";

fn main() -> Result<()> {
  let args: Vec<String> = std::env::args().skip(1).collect();

  let mut show_help = false;
  let mut show_version = false;
  let mut show_init = false;
  let mut bucket: Option<String> = None;

  for arg in &args {
    match arg.as_str() {
      "--help" | "-h" => show_help = true,
      "--version" | "-V" => show_version = true,
      "--init" => show_init = true,
      a if !a.starts_with('-') => bucket = Some(a.to_string()),
      _ => {
        eprintln!("s3n: unknown option '{arg}'");
        std::process::exit(1);
      }
    }
  }

  if show_help {
    println!("{USAGE}");
    return Ok(());
  }

  if show_version {
    println!("s3n {}", env!("CARGO_PKG_VERSION"));
    return Ok(());
  }

  if show_init {
    return init_config();
  }

  let Some(bucket) = bucket else {
    eprintln!("{USAGE}");
    std::process::exit(1);
  };

  let _log_guard = match logging::init() {
    Ok(guard) => guard,
    Err(e) => {
      eprintln!("s3n: {e}");
      None
    }
  };

  let (mut config, config_errors) = config::Config::load();
  config.apply_env(std::env::var("EDITOR").ok(), std::env::var("PAGER").ok());
  let theme = Theme::from_config(config.light_theme);

  let runtime = tokio::runtime::Runtime::new()?;
  let store = match runtime.block_on(S3Store::connect(&bucket, &config.store)) {
    Ok(store) => store,
    Err(e) => {
      error!("{e}");
      eprintln!("s3n: {e}");
      std::process::exit(1);
    }
  };

  let events = EventLoop::new(Duration::from_millis(config.tick_rate_ms));
  let worker = Worker::new(
    runtime,
    TaskContext {
      store: Arc::new(store),
      bucket: bucket.clone(),
      scratch_dir: config.scratch_dir.clone(),
    },
    events.sender(),
  );

  // Install panic hook that restores terminal
  let original_hook = panic::take_hook();
  panic::set_hook(Box::new(move |info| {
    let _ = restore_terminal();
    original_hook(info);
  }));

  setup_terminal()?;
  let backend = CrosstermBackend::new(io::stdout());
  let mut terminal = Terminal::new(backend)?;

  let mut app = App::new(bucket, &config);
  app.show_errors(config_errors);
  let size = terminal.size()?;
  app.update(Action::Resize(size.width, size.height))?;
  app.start();

  loop {
    for task in app.take_tasks() {
      worker.spawn(task);
    }

    terminal.draw(|frame| ui::draw(frame, &app, &theme))?;

    match events.next()? {
      Event::Key(key) => {
        let action = map_key(key, app.input_mode, &config);
        app.update(action)?;
      }
      Event::Resize(w, h) => app.update(Action::Resize(w, h))?,
      Event::Tick => app.update(Action::Tick)?,
      Event::Task(done) => app.complete(done),
    }

    // Hand the terminal to the pager or editor
    if let Some(session) = app.handle_suspend() {
      let program = app.program_for(session.mode).to_string();
      events.pause();
      restore_terminal()?;
      drop(terminal);
      let result = run_external(&program, session.path());
      terminal = resume_terminal()?;
      events.resume();
      app.external_exited(session, result);
    }

    if app.should_quit {
      break;
    }
  }

  restore_terminal()?;
  info!("exiting");
  Ok(())
}

fn init_config() -> Result<()> {
  let config_path = match config::Config::config_path() {
    Ok(p) => p,
    Err(e) => {
      eprintln!("s3n: {e}");
      std::process::exit(1);
    }
  };

  if config_path.exists() {
    eprint!("{} already exists. Overwrite? [y/N] ", config_path.display());
    let mut answer = String::new();
    io::stdin().read_line(&mut answer).unwrap_or(0);
    if !answer.trim().eq_ignore_ascii_case("y") {
      return Ok(());
    }
  }

  match config::Config::dump_default_config(&config_path) {
    Ok(()) => println!("{}", config_path.display()),
    Err(e) => {
      eprintln!("s3n: {e}");
      std::process::exit(1);
    }
  }
  Ok(())
}

fn setup_terminal() -> Result<()> {
  enable_raw_mode()?;
  execute!(io::stdout(), EnterAlternateScreen)?;
  Ok(())
}

fn restore_terminal() -> Result<()> {
  disable_raw_mode()?;
  execute!(io::stdout(), LeaveAlternateScreen)?;
  Ok(())
}

/// Reacquires the terminal after a subprocess, whatever its exit status.
fn resume_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
  setup_terminal()?;
  // Drain stale keystrokes buffered in the TTY while the subprocess ran
  while crossterm::event::poll(Duration::ZERO).unwrap_or(false) {
    let _ = crossterm::event::read();
  }
  let backend = CrosstermBackend::new(io::stdout());
  let mut terminal = Terminal::new(backend)?;
  terminal.clear()?;
  Ok(terminal)
}

use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::action::Action;
use crate::config::{Config, normalize_key_event};
use crate::worker::TaskEvent;

pub enum Event {
  Key(KeyEvent),
  Resize(u16, u16),
  Tick,
  Task(TaskEvent),
}

enum Control {
  Pause,
  Resume,
}

pub struct EventLoop {
  tx: mpsc::Sender<Event>,
  rx: mpsc::Receiver<Event>,
  control: mpsc::Sender<Control>,
  paused: mpsc::Receiver<()>,
}

impl EventLoop {
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::channel();
    let (control, control_rx) = mpsc::channel();
    let (paused_tx, paused) = mpsc::channel();
    let input_tx = tx.clone();

    thread::spawn(move || loop {
      match control_rx.try_recv() {
        Ok(Control::Pause) => {
          if paused_tx.send(()).is_err() {
            break;
          }
          // Stay off the terminal until told otherwise
          loop {
            match control_rx.recv() {
              Ok(Control::Resume) => break,
              Ok(Control::Pause) => {
                let _ = paused_tx.send(());
              }
              Err(_) => return,
            }
          }
          continue;
        }
        Ok(Control::Resume) | Err(TryRecvError::Empty) => {}
        Err(TryRecvError::Disconnected) => break,
      }

      if event::poll(tick_rate).unwrap_or(false) {
        match event::read() {
          Ok(CrosstermEvent::Key(key)) if key.kind != KeyEventKind::Release => {
            if input_tx.send(Event::Key(key)).is_err() {
              break;
            }
          }
          Ok(CrosstermEvent::Resize(w, h)) => {
            if input_tx.send(Event::Resize(w, h)).is_err() {
              break;
            }
          }
          _ => {}
        }
      } else if input_tx.send(Event::Tick).is_err() {
        break;
      }
    });

    Self { tx, rx, control, paused }
  }

  /// Channel for background tasks to report back on.
  pub fn sender(&self) -> mpsc::Sender<Event> {
    self.tx.clone()
  }

  /// Blocks until the input thread has stopped reading the terminal.
  pub fn pause(&self) {
    if self.control.send(Control::Pause).is_ok() {
      let _ = self.paused.recv();
    }
  }

  pub fn resume(&self) {
    let _ = self.control.send(Control::Resume);
  }

  pub fn next(&self) -> Result<Event> {
    Ok(self.rx.recv()?)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
  Normal,
  Viewer,
  ViewerFilter,
}

pub fn map_key(key: KeyEvent, mode: InputMode, config: &Config) -> Action {
  match mode {
    InputMode::ViewerFilter => match key.code {
      KeyCode::Esc => Action::FilterCancel,
      KeyCode::Enter => Action::FilterConfirm,
      KeyCode::Backspace => Action::FilterBackspace,
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
      KeyCode::Char(_) if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => Action::None,
      KeyCode::Char(c) => Action::FilterInput(c),
      _ => Action::None,
    },
    InputMode::Viewer => {
      let kb = normalize_key_event(key);
      config.viewer_keys.get(&kb).cloned().unwrap_or(Action::None)
    }
    InputMode::Normal => {
      let kb = normalize_key_event(key);
      config.normal_keys.get(&kb).cloned().unwrap_or(Action::None)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

  fn key(code: KeyCode) -> KeyEvent {
    key_with_mod(code, KeyModifiers::NONE)
  }

  fn key_with_mod(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
      code,
      modifiers,
      kind: KeyEventKind::Press,
      state: KeyEventState::NONE,
    }
  }

  fn cfg() -> Config {
    Config::default()
  }

  #[test]
  fn test_normal_mode_quit() {
    let c = cfg();
    assert_eq!(map_key(key(KeyCode::Char('q')), InputMode::Normal, &c), Action::Quit);
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('c'), KeyModifiers::CONTROL), InputMode::Normal, &c),
      Action::Quit
    );
  }

  #[test]
  fn test_normal_mode_navigation() {
    let c = cfg();
    assert_eq!(map_key(key(KeyCode::Char('j')), InputMode::Normal, &c), Action::MoveDown);
    assert_eq!(map_key(key(KeyCode::Up), InputMode::Normal, &c), Action::MoveUp);
    assert_eq!(map_key(key(KeyCode::Enter), InputMode::Normal, &c), Action::Open);
    assert_eq!(map_key(key(KeyCode::Backspace), InputMode::Normal, &c), Action::Back);
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('G'), KeyModifiers::SHIFT), InputMode::Normal, &c),
      Action::GoToBottom
    );
  }

  #[test]
  fn test_normal_mode_object_actions() {
    let c = cfg();
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('e'), KeyModifiers::CONTROL), InputMode::Normal, &c),
      Action::Edit
    );
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('r'), KeyModifiers::CONTROL), InputMode::Normal, &c),
      Action::Reload
    );
    assert_eq!(map_key(key(KeyCode::Char(' ')), InputMode::Normal, &c), Action::Preview);
    assert_eq!(map_key(key(KeyCode::Char('n')), InputMode::Normal, &c), Action::NextPage);
    assert_eq!(map_key(key(KeyCode::Char('p')), InputMode::Normal, &c), Action::PrevPage);
  }

  #[test]
  fn test_unbound_key_is_none() {
    let c = cfg();
    assert_eq!(map_key(key(KeyCode::Char('z')), InputMode::Normal, &c), Action::None);
    assert_eq!(map_key(key(KeyCode::Char('z')), InputMode::Viewer, &c), Action::None);
  }

  #[test]
  fn test_viewer_mode() {
    let c = cfg();
    assert_eq!(map_key(key(KeyCode::Char('j')), InputMode::Viewer, &c), Action::ViewerScrollDown);
    assert_eq!(map_key(key(KeyCode::Char('/')), InputMode::Viewer, &c), Action::FilterStart);
    assert_eq!(map_key(key(KeyCode::Esc), InputMode::Viewer, &c), Action::ViewerBack);
    assert_eq!(map_key(key(KeyCode::Char('q')), InputMode::Viewer, &c), Action::ViewerClose);
  }

  #[test]
  fn test_filter_mode_takes_raw_input() {
    let c = cfg();
    assert_eq!(map_key(key(KeyCode::Char('q')), InputMode::ViewerFilter, &c), Action::FilterInput('q'));
    assert_eq!(map_key(key(KeyCode::Enter), InputMode::ViewerFilter, &c), Action::FilterConfirm);
    assert_eq!(map_key(key(KeyCode::Esc), InputMode::ViewerFilter, &c), Action::FilterCancel);
    assert_eq!(map_key(key(KeyCode::Backspace), InputMode::ViewerFilter, &c), Action::FilterBackspace);
    assert_eq!(map_key(key(KeyCode::Tab), InputMode::ViewerFilter, &c), Action::None);
  }

  #[test]
  fn test_filter_mode_control_chords() {
    let c = cfg();
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('c'), KeyModifiers::CONTROL), InputMode::ViewerFilter, &c),
      Action::Quit
    );
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('w'), KeyModifiers::CONTROL), InputMode::ViewerFilter, &c),
      Action::None
    );
    assert_eq!(
      map_key(key_with_mod(KeyCode::Char('C'), KeyModifiers::SHIFT), InputMode::ViewerFilter, &c),
      Action::FilterInput('C')
    );
  }

  #[test]
  fn test_custom_config_remaps_key() {
    let mut c = cfg();
    let kb = crate::config::KeyBinding {
      code: KeyCode::Char('j'),
      modifiers: KeyModifiers::NONE,
    };
    c.normal_keys.insert(kb, Action::Quit);
    assert_eq!(map_key(key(KeyCode::Char('j')), InputMode::Normal, &c), Action::Quit);
  }
}

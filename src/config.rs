use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::action::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
  pub code: KeyCode,
  pub modifiers: KeyModifiers,
}

/// Overrides for the S3 client; credentials always come from the ambient
/// AWS configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
  pub endpoint_url: Option<String>,
  pub force_path_style: bool,
  pub region: Option<String>,
}

pub struct Config {
  pub tick_rate_ms: u64,
  pub page_size: i32,
  pub show_content_type: bool,
  pub status_timeout_secs: u64,
  pub pager: String,
  pub editor: String,
  pub scratch_dir: PathBuf,
  pub light_theme: bool,
  pub store: StoreConfig,
  pub normal_keys: HashMap<KeyBinding, Action>,
  pub viewer_keys: HashMap<KeyBinding, Action>,
}

#[derive(Deserialize, Default)]
struct TomlConfig {
  general: Option<GeneralConfig>,
  store: Option<TomlStoreConfig>,
  keys: Option<KeysConfig>,
}

#[derive(Deserialize, Default)]
struct GeneralConfig {
  tick_rate_ms: Option<u64>,
  page_size: Option<i32>,
  show_content_type: Option<bool>,
  status_timeout_secs: Option<u64>,
  pager: Option<String>,
  editor: Option<String>,
  scratch_dir: Option<PathBuf>,
  theme: Option<String>,
}

#[derive(Deserialize, Default)]
struct TomlStoreConfig {
  endpoint_url: Option<String>,
  force_path_style: Option<bool>,
  region: Option<String>,
}

#[derive(Deserialize, Default)]
struct KeysConfig {
  normal: Option<HashMap<String, String>>,
  viewer: Option<HashMap<String, String>>,
}

pub fn parse_key_binding(s: &str) -> Option<KeyBinding> {
  if s.is_empty() {
    return None;
  }

  let parts: Vec<&str> = s.split('+').collect();

  if parts.len() == 1 {
    let key = parts[0];
    if let Some(code) = named_key(key) {
      return Some(KeyBinding { code, modifiers: KeyModifiers::NONE });
    }
    let mut chars = key.chars();
    return match (chars.next(), chars.next()) {
      (Some(c), None) => Some(KeyBinding { code: KeyCode::Char(c), modifiers: KeyModifiers::NONE }),
      _ => None,
    };
  }

  if parts.len() == 2 {
    let modifier_str = parts[0].to_lowercase();
    let key_str = parts[1];

    let modifiers = match modifier_str.as_str() {
      "ctrl" => KeyModifiers::CONTROL,
      "shift" => {
        let chars: Vec<char> = key_str.chars().collect();
        if chars.len() == 1 {
          let c = chars[0].to_uppercase().next().unwrap_or(chars[0]);
          return Some(KeyBinding { code: KeyCode::Char(c), modifiers: KeyModifiers::NONE });
        }
        return named_key(key_str).map(|code| KeyBinding { code, modifiers: KeyModifiers::SHIFT });
      }
      "alt" => KeyModifiers::ALT,
      _ => return None,
    };

    if let Some(code) = named_key(key_str) {
      return Some(KeyBinding { code, modifiers });
    }
    let chars: Vec<char> = key_str.chars().collect();
    if chars.len() == 1 {
      return Some(KeyBinding { code: KeyCode::Char(chars[0]), modifiers });
    }
  }

  None
}

fn named_key(s: &str) -> Option<KeyCode> {
  match s.to_lowercase().as_str() {
    "enter" => Some(KeyCode::Enter),
    "space" => Some(KeyCode::Char(' ')),
    "esc" => Some(KeyCode::Esc),
    "up" => Some(KeyCode::Up),
    "down" => Some(KeyCode::Down),
    "left" => Some(KeyCode::Left),
    "right" => Some(KeyCode::Right),
    "backspace" => Some(KeyCode::Backspace),
    "tab" => Some(KeyCode::Tab),
    "home" => Some(KeyCode::Home),
    "end" => Some(KeyCode::End),
    "pageup" => Some(KeyCode::PageUp),
    "pagedown" => Some(KeyCode::PageDown),
    s if s.starts_with('f') && s.len() > 1 => {
      s[1..].parse::<u8>().ok().filter(|&n| (1..=24).contains(&n)).map(KeyCode::F)
    }
    _ => None,
  }
}

pub fn normalize_key_event(key: KeyEvent) -> KeyBinding {
  let mut modifiers = key.modifiers;
  if let KeyCode::Char(c) = key.code
    && c.is_uppercase()
  {
    modifiers -= KeyModifiers::SHIFT;
  }
  KeyBinding { code: key.code, modifiers }
}

fn parse_bindings(table: &HashMap<String, String>, errors: &mut Vec<String>) -> HashMap<KeyBinding, Action> {
  let mut keys = HashMap::new();
  for (key_str, action_str) in table {
    let Some(kb) = parse_key_binding(key_str) else {
      errors.push(format!("invalid key binding: {key_str:?}"));
      continue;
    };
    let Some(action) = Action::from_name(action_str) else {
      errors.push(format!("invalid action: {action_str:?}"));
      continue;
    };
    keys.insert(kb, action);
  }
  keys
}

impl Default for Config {
  fn default() -> Self {
    let mut config = Config::empty();
    let mut errors = Vec::new();
    config.apply_toml_str(Config::default_toml(), &mut errors);
    config
  }
}

impl Config {
  fn empty() -> Self {
    Config {
      tick_rate_ms: 100,
      page_size: 100,
      show_content_type: false,
      status_timeout_secs: 2,
      pager: "less".to_string(),
      editor: "vi".to_string(),
      scratch_dir: std::env::temp_dir(),
      light_theme: false,
      store: StoreConfig::default(),
      normal_keys: HashMap::new(),
      viewer_keys: HashMap::new(),
    }
  }

  fn apply_toml_str(&mut self, s: &str, errors: &mut Vec<String>) {
    let toml_config: TomlConfig = match toml::from_str(s) {
      Ok(c) => c,
      Err(e) => {
        errors.push(format!("failed to parse config.toml: {e}"));
        return;
      }
    };

    if let Some(general) = toml_config.general {
      if let Some(tick) = general.tick_rate_ms {
        self.tick_rate_ms = tick;
      }
      if let Some(size) = general.page_size {
        if (1..=1000).contains(&size) {
          self.page_size = size;
        } else {
          errors.push(format!("page_size must be between 1 and 1000, got {size}"));
        }
      }
      if let Some(show) = general.show_content_type {
        self.show_content_type = show;
      }
      if let Some(secs) = general.status_timeout_secs {
        self.status_timeout_secs = secs;
      }
      if let Some(pager) = general.pager.filter(|p| !p.trim().is_empty()) {
        self.pager = pager;
      }
      if let Some(editor) = general.editor.filter(|e| !e.trim().is_empty()) {
        self.editor = editor;
      }
      if let Some(dir) = general.scratch_dir {
        self.scratch_dir = dir;
      }
      match general.theme.as_deref() {
        None | Some("dark") => {}
        Some("light") => self.light_theme = true,
        Some(other) => errors.push(format!("unknown theme: {other:?}")),
      }
    }

    if let Some(store) = toml_config.store {
      if store.endpoint_url.is_some() {
        self.store.endpoint_url = store.endpoint_url;
      }
      if let Some(path_style) = store.force_path_style {
        self.store.force_path_style = path_style;
      }
      if store.region.is_some() {
        self.store.region = store.region;
      }
    }

    if let Some(keys) = toml_config.keys {
      if let Some(normal) = keys.normal {
        self.normal_keys = parse_bindings(&normal, errors);
      }
      if let Some(viewer) = keys.viewer {
        self.viewer_keys = parse_bindings(&viewer, errors);
      }
    }
  }

  /// `$EDITOR` and `$PAGER` win over the config file.
  pub fn apply_env(&mut self, editor: Option<String>, pager: Option<String>) {
    if let Some(editor) = editor.filter(|e| !e.trim().is_empty()) {
      self.editor = editor;
    }
    if let Some(pager) = pager.filter(|p| !p.trim().is_empty()) {
      self.pager = pager;
    }
  }

  pub fn default_toml() -> &'static str {
    r#"[general]
tick_rate_ms = 100          # event loop tick rate in ms
page_size = 100             # keys requested per listing page
show_content_type = false   # issue a HEAD per file to show its content type
status_timeout_secs = 2     # how long upload confirmations stay visible
pager = "less"              # overridden by $PAGER
editor = "vi"               # overridden by $EDITOR
# scratch_dir = "/tmp"      # where objects are downloaded while viewed or edited
theme = "dark"              # "dark" or "light"

[store]
# endpoint_url = "http://localhost:4566"
force_path_style = false
# region = "us-east-1"

[keys.normal]
j = "move_down"
k = "move_up"
down = "move_down"
up = "move_up"
g = "go_to_top"
"shift+g" = "go_to_bottom"
enter = "open"
l = "open"
right = "open"
backspace = "back"
h = "back"
left = "back"
"ctrl+e" = "edit"
e = "edit"
"ctrl+r" = "reload"
r = "reload"
space = "preview"
n = "next_page"
p = "prev_page"
"0" = "first_page"
t = "toggle_content_type"
q = "quit"
"ctrl+c" = "quit"

[keys.viewer]
j = "scroll_down"
k = "scroll_up"
down = "scroll_down"
up = "scroll_up"
pagedown = "page_down"
space = "page_down"
pageup = "page_up"
g = "top"
"shift+g" = "bottom"
"/" = "filter"
esc = "viewer_back"
q = "close"
"ctrl+c" = "quit"
"#
  }

  pub fn config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
      .map(|d| d.join("s3n").join("config.toml"))
      .ok_or_else(|| "could not determine config directory".to_string())
  }

  pub fn dump_default_config(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
    }

    std::fs::write(path, Self::default_toml())
      .map_err(|e| format!("failed to write {}: {e}", path.display()))?;

    Ok(())
  }

  pub fn load() -> (Config, Vec<String>) {
    let mut errors = Vec::new();

    let content = Self::config_path()
      .ok()
      .and_then(|p| std::fs::read_to_string(p).ok());

    let config = match content {
      Some(s) => Self::load_from_str_with_errors(&s, &mut errors),
      None => Config::default(),
    };

    (config, errors)
  }

  #[cfg(test)]
  pub fn load_from_str(s: &str) -> Config {
    let mut errors = Vec::new();
    Self::load_from_str_with_errors(s, &mut errors)
  }

  fn load_from_str_with_errors(s: &str, errors: &mut Vec<String>) -> Config {
    let mut config = Config::default();
    config.apply_toml_str(s, errors);
    config
  }
}

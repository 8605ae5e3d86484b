use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "s3n=debug";
const LOG_FILE: &str = "s3n.log";

/// Whether `DEBUG` asks for file logging. Only `true` (any case) counts.
pub fn debug_enabled(value: Option<&str>) -> bool {
  value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Installs a file subscriber writing to `s3n.log` in the working directory
/// when `DEBUG=true`. The terminal belongs to the UI, so nothing is ever
/// logged there. Keep the returned guard alive to flush on exit.
pub fn init() -> Result<Option<WorkerGuard>> {
  if !debug_enabled(std::env::var("DEBUG").ok().as_deref()) {
    return Ok(None);
  }

  let file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(LOG_FILE)
    .with_context(|| format!("failed to open {LOG_FILE}"))?;
  let (writer, guard) = tracing_appender::non_blocking(file);

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

  tracing_subscriber::fmt()
    .with_writer(writer)
    .with_ansi(false)
    .with_env_filter(filter)
    .try_init()
    .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

  Ok(Some(guard))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_debug_enabled() {
    assert!(debug_enabled(Some("true")));
    assert!(debug_enabled(Some("TRUE")));
    assert!(!debug_enabled(Some("1")));
    assert!(!debug_enabled(Some("false")));
    assert!(!debug_enabled(None));
  }
}

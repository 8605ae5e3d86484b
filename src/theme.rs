use ratatui::style::Color;

/// Colors for the bucket list, status line and viewer overlay.
#[derive(Debug, Clone)]
pub struct Theme {
  pub accent: Color,
  pub text: Color,
  pub muted: Color,
  pub border: Color,
  pub selection: Color,
  pub overlay: Color,
  pub bar: Color,
  pub uploaded: Color,
  pub error: Color,
  pub notice: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
}

impl Theme {
  pub fn dark() -> Self {
    Self {
      accent: Color::Indexed(75),
      text: Color::Indexed(252),
      muted: Color::Indexed(243),
      border: Color::Indexed(240),
      selection: Color::Indexed(75),
      overlay: Color::Indexed(235),
      bar: Color::Indexed(236),
      uploaded: Color::Indexed(114),
      error: Color::Indexed(167),
      notice: Color::Indexed(150),
      highlight_fg: Color::Indexed(234),
      highlight_bg: Color::Indexed(214),
    }
  }

  pub fn light() -> Self {
    Self {
      accent: Color::Indexed(27),
      text: Color::Indexed(235),
      muted: Color::Indexed(244),
      border: Color::Indexed(250),
      selection: Color::Indexed(27),
      overlay: Color::Indexed(255),
      bar: Color::Indexed(253),
      uploaded: Color::Indexed(28),
      error: Color::Indexed(124),
      notice: Color::Indexed(30),
      highlight_fg: Color::Indexed(255),
      highlight_bg: Color::Indexed(172),
    }
  }

  pub fn from_config(light: bool) -> Self {
    if light { Self::light() } else { Self::dark() }
  }

  /// Errors and upload confirmations stand out from listing summaries.
  pub fn status_color(&self, text: &str) -> Color {
    if text.starts_with("Error") {
      self.error
    } else if text.contains("Uploaded") {
      self.uploaded
    } else {
      self.notice
    }
  }
}

impl Default for Theme {
  fn default() -> Self {
    Self::dark()
  }
}

pub mod entry_list;
pub mod status_bar;
pub mod viewer;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};
use ratatui::Frame;

use crate::app::App;
use crate::theme::Theme;

pub fn draw(frame: &mut Frame, app: &App, theme: &Theme) {
  let area = frame.area();

  // Vertical layout: header, main, status bar
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(3),   // main area
      Constraint::Length(1), // status bar
    ])
    .split(area);

  render_header(app, chunks[0], frame.buffer_mut(), theme);
  entry_list::render_entry_list(app, chunks[1], frame.buffer_mut(), theme);
  status_bar::render_status_bar(app, chunks[2], frame.buffer_mut(), theme);

  if let Some(ref v) = app.viewer {
    viewer::render_viewer(v, app.input_mode, chunks[1], frame.buffer_mut(), theme);
  }
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer, theme: &Theme) {
  let mut spans = vec![
    Span::styled(" s3://", Style::default().fg(theme.accent)),
    Span::styled(
      app.title(),
      Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    ),
  ];
  if app.show_content_type {
    spans.push(Span::styled("  [content types]", Style::default().fg(theme.muted)));
  }

  Paragraph::new(Line::from(spans))
    .style(Style::default().bg(theme.bar))
    .render(area, buf);
}

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::app::{App, Pending};
use crate::session::SessionMode;
use crate::theme::Theme;
use crate::ui::entry_list::SPINNER;

fn pending_text(pending: Pending) -> &'static str {
  match pending {
    Pending::Download(SessionMode::View) | Pending::Preview => "Downloading",
    Pending::Download(SessionMode::Edit) => "Downloading for edit",
    Pending::External(SessionMode::View) => "Viewing",
    Pending::External(SessionMode::Edit) => "Editing",
    Pending::Upload => "Uploading",
  }
}

pub fn render_status_bar(app: &App, area: Rect, buf: &mut Buffer, theme: &Theme) {
  let line = if let Some(pending) = app.pending {
    let spinner = SPINNER[app.spinner % SPINNER.len()];
    let key = app.selected_entry().map_or("", |e| e.key.as_str());
    Line::from(vec![
      Span::styled(format!(" {spinner} "), Style::default().fg(theme.accent)),
      Span::styled(format!("{} {key}...", pending_text(pending)), Style::default().fg(theme.text)),
    ])
  } else if let Some(ref status) = app.status {
    let color = theme.status_color(&status.text);
    Line::from(Span::styled(format!(" {}", status.text), Style::default().fg(color)))
  } else if let Some(entry) = app.selected_entry() {
    Line::from(vec![
      Span::styled(
        format!(" {}", entry.key),
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
      ),
      Span::styled(
        format!(" {}/{} ", app.cursor + 1, app.entries.len()),
        Style::default().fg(theme.muted),
      ),
    ])
  } else {
    Line::from(Span::styled(" No selection", Style::default().fg(theme.muted)))
  };

  Paragraph::new(line)
    .style(Style::default().bg(theme.bar))
    .render(area, buf);
}

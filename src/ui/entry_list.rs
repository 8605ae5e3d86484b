use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::app::App;
use crate::bucket::Entry;
use crate::format::truncate;
use crate::theme::Theme;

pub const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
const EMPTY_NAME: &str = "(empty)";

fn entry_line(entry: &Entry, selected: bool, width: usize, theme: &Theme) -> Line<'static> {
  let icon = if entry.is_dir { "📁 " } else { "📄 " };
  let (name_style, desc_style) = if selected {
    let sel = Style::default()
      .fg(theme.highlight_fg)
      .bg(theme.selection)
      .add_modifier(Modifier::BOLD);
    (sel, sel.remove_modifier(Modifier::BOLD))
  } else if entry.is_dir {
    (Style::default().fg(theme.accent), Style::default().fg(theme.muted))
  } else {
    (Style::default().fg(theme.text), Style::default().fg(theme.muted))
  };

  // Keys with doubled delimiters make nameless directories
  let name = if entry.display_key.is_empty() { EMPTY_NAME } else { entry.display_key.as_str() };

  Line::from(vec![
    // Icon plus padding take four columns
    Span::styled(format!(" {icon}{}", truncate(name, width.saturating_sub(4))), name_style),
    Span::styled(format!("  {}", entry.description()), desc_style),
  ])
}

pub fn render_entry_list(app: &App, area: Rect, buf: &mut Buffer, theme: &Theme) {
  let title = match app.page.page_number() {
    1 => format!(" {} objects ", app.entries.len()),
    k => format!(" {} objects, page {k} ", app.entries.len()),
  };
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(theme.border))
    .title(title)
    .title_style(Style::default().fg(theme.accent));

  let inner = block.inner(area);
  block.render(area, buf);

  if app.loading {
    let spinner = SPINNER[app.spinner % SPINNER.len()];
    let line = Line::from(Span::styled(
      format!("  Loading... {spinner}"),
      Style::default().fg(theme.muted),
    ));
    Paragraph::new(line).render(inner, buf);
    return;
  }

  let height = inner.height as usize;
  let start = app.scroll_offset.min(app.entries.len());
  let end = (start + height).min(app.entries.len());

  let lines: Vec<Line> = app.entries[start..end]
    .iter()
    .enumerate()
    .map(|(i, entry)| entry_line(entry, start + i == app.cursor, inner.width as usize, theme))
    .collect();

  Paragraph::new(lines).render(inner, buf);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_entry_line_shows_icon_and_description() {
    let theme = Theme::default();
    let dir = entry_line(&Entry::dir("a/", ""), false, 40, &theme);
    assert_eq!(dir.spans[0].content, " 📁 a");
    assert_eq!(dir.spans[1].content, "  Directory");

    let file = entry_line(&Entry::file("a/x.txt", "a/", 10, None), true, 40, &theme);
    assert_eq!(file.spans[0].content, " 📄 x.txt");
    assert_eq!(file.spans[0].style.bg, Some(theme.selection));
  }

  #[test]
  fn test_long_names_are_truncated() {
    let theme = Theme::default();
    let line = entry_line(&Entry::file("a-very-long-object-key.json", "", 1, None), false, 12, &theme);
    assert_eq!(line.spans[0].content, " 📄 a-very-…");
  }

  #[test]
  fn test_nameless_directory_gets_placeholder() {
    let theme = Theme::default();
    let dir = Entry::dir("a//", "a/");
    assert_eq!(dir.display_key, "");
    let line = entry_line(&dir, false, 40, &theme);
    assert_eq!(line.spans[0].content, " 📁 (empty)");
  }
}

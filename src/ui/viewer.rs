use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::event::InputMode;
use crate::filter::highlight;
use crate::theme::Theme;
use crate::viewer::Viewer;

fn footer<'a>(viewer: &'a Viewer, mode: InputMode, theme: &Theme) -> Line<'a> {
  let percent = Span::styled(
    format!("  {}%", viewer.scroll_percent()),
    Style::default().fg(theme.muted),
  );
  match mode {
    InputMode::ViewerFilter => Line::from(vec![
      Span::styled(" Filter: ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
      Span::styled(viewer.filter.as_str(), Style::default().fg(theme.text)),
      Span::styled("▌", Style::default().fg(theme.accent)),
    ]),
    _ if viewer.filter_enabled => Line::from(vec![
      Span::styled(
        format!(" Filter: {} ({} matches)", viewer.filter, viewer.match_count()),
        Style::default().fg(theme.notice),
      ),
      percent,
    ]),
    _ => Line::from(vec![
      Span::styled(" Press / to filter", Style::default().fg(theme.muted)),
      percent,
    ]),
  }
}

pub fn render_viewer(viewer: &Viewer, mode: InputMode, area: Rect, buf: &mut Buffer, theme: &Theme) {
  if area.width < 10 || area.height < 4 {
    return;
  }
  Clear.render(area, buf);

  let block = Block::default()
    .borders(Borders::ALL)
    .title(format!(" {} ", viewer.title))
    .title_style(Style::default().fg(theme.accent))
    .border_style(Style::default().fg(theme.border))
    .style(Style::default().bg(theme.overlay));
  let inner = block.inner(area);
  block.render(area, buf);

  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(1), Constraint::Length(1)])
    .split(inner);

  let base = Style::default().fg(theme.text);
  let emphasis = Style::default()
    .fg(theme.highlight_fg)
    .bg(theme.highlight_bg)
    .add_modifier(Modifier::BOLD);
  let query = viewer.active_query();

  let lines: Vec<Line> = viewer
    .lines()
    .iter()
    .skip(viewer.scroll)
    .take(chunks[0].height as usize)
    .map(|l| highlight(l, query, base, emphasis))
    .collect();

  Paragraph::new(lines).render(chunks[0], buf);
  Paragraph::new(footer(viewer, mode, theme)).render(chunks[1], buf);
}

#[cfg(test)]
mod tests {
  use super::*;

  fn text(buf: &Buffer) -> String {
    buf.content().iter().map(|c| c.symbol()).collect()
  }

  #[test]
  fn test_render_highlights_matches() {
    let theme = Theme::default();
    let mut viewer = Viewer::new("s3://b/k".to_string(), "alpha\nBeta gamma\nbeta");
    viewer.start_filter();
    viewer.filter = "beta".to_string();

    let area = Rect::new(0, 0, 40, 8);
    let mut buf = Buffer::empty(area);
    render_viewer(&viewer, InputMode::Viewer, area, &mut buf, &theme);

    let rendered = text(&buf);
    assert!(rendered.contains("s3://b/k"));
    assert!(rendered.contains("Beta gamma"));
    assert!(rendered.contains("(2 matches)"));
    // "Beta" on the second body line starts at column 1 of row 2
    assert_eq!(buf[(1, 2)].bg, theme.highlight_bg);
    assert_ne!(buf[(6, 2)].bg, theme.highlight_bg);
  }

  #[test]
  fn test_small_area_returns_early() {
    let viewer = Viewer::new("t".to_string(), "x");
    let area = Rect::new(0, 0, 5, 2);
    let mut buf = Buffer::empty(area);
    render_viewer(&viewer, InputMode::Viewer, area, &mut buf, &Theme::default());
  }
}

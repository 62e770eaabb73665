use crossterm::event::{KeyCode, KeyEvent};
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Scrollable markdown panel. The document is rendered into styled lines
/// once, at construction; scrolling just windows over them.
pub struct NotesViewer {
    pub lines: Vec<Line<'static>>,
    pub scroll: usize,
    pub title: String,
}

impl NotesViewer {
    pub fn new(markdown: &str, title: impl Into<String>) -> Self {
        Self {
            lines: markdown_lines(markdown),
            scroll: 0,
            title: title.into(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, area_height: u16) -> bool {
        let total = self.lines.len();
        let page = (area_height as usize).saturating_sub(2);
        match key.code {
            KeyCode::Up => {
                if self.scroll > 0 {
                    self.scroll -= 1;
                }
                true
            }
            KeyCode::Down => {
                if self.scroll < total.saturating_sub(page) {
                    self.scroll += 1;
                }
                true
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(page);
                true
            }
            KeyCode::PageDown => {
                self.scroll = (self.scroll + page).min(total.saturating_sub(page));
                true
            }
            KeyCode::Home => {
                self.scroll = 0;
                true
            }
            KeyCode::End => {
                self.scroll = total.saturating_sub(page);
                true
            }
            _ => false,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let total = self.lines.len();
        let shown: Vec<Line> = self
            .lines
            .iter()
            .skip(self.scroll)
            .take(visible)
            .cloned()
            .collect();

        let scroll_info = if total > visible {
            format!(
                " (Line {}-{} of {})",
                self.scroll + 1,
                (self.scroll + visible).min(total),
                total
            )
        } else {
            String::new()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{}{}", self.title, scroll_info));

        let paragraph = Paragraph::new(shown)
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }
}

fn flush(spans: &mut Vec<Span<'static>>, lines: &mut Vec<Line<'static>>) {
    if !spans.is_empty() {
        lines.push(Line::from(std::mem::take(spans)));
    }
}

fn blank(lines: &mut Vec<Line<'static>>) {
    if lines.last().map(|l| !l.spans.is_empty()).unwrap_or(false) {
        lines.push(Line::default());
    }
}

fn text_style(heading: Option<HeadingLevel>, bold: bool, italic: bool, code: bool) -> Style {
    if let Some(level) = heading {
        let base = Style::default().fg(Color::Yellow);
        return if matches!(level, HeadingLevel::H1 | HeadingLevel::H2) {
            base.add_modifier(Modifier::BOLD)
        } else {
            base
        };
    }
    if code {
        return Style::default().fg(Color::Cyan);
    }
    let mut style = Style::default();
    if bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    style
}

fn markdown_lines(markdown: &str) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut heading: Option<HeadingLevel> = None;
    let mut bold_depth = 0usize;
    let mut italic_depth = 0usize;
    let mut in_code_block = false;
    let mut link_url: Option<String> = None;
    let mut list_stack: Vec<Option<u64>> = Vec::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                flush(&mut spans, &mut lines);
                blank(&mut lines);
                heading = Some(level);
            }
            Event::End(TagEnd::Heading(_)) => {
                flush(&mut spans, &mut lines);
                blank(&mut lines);
                heading = None;
            }
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                flush(&mut spans, &mut lines);
                blank(&mut lines);
            }
            Event::Start(Tag::List(start)) => {
                flush(&mut spans, &mut lines);
                list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                list_stack.pop();
                if list_stack.is_empty() {
                    blank(&mut lines);
                }
            }
            Event::Start(Tag::Item) => {
                flush(&mut spans, &mut lines);
                let indent = "  ".repeat(list_stack.len().saturating_sub(1));
                let marker = match list_stack.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                spans.push(Span::styled(marker, Style::default().fg(Color::Green)));
            }
            Event::End(TagEnd::Item) => flush(&mut spans, &mut lines),
            Event::Start(Tag::CodeBlock(_)) => {
                flush(&mut spans, &mut lines);
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                flush(&mut spans, &mut lines);
                in_code_block = false;
                blank(&mut lines);
            }
            Event::Start(Tag::Strong) => bold_depth += 1,
            Event::End(TagEnd::Strong) => bold_depth = bold_depth.saturating_sub(1),
            Event::Start(Tag::Emphasis) => italic_depth += 1,
            Event::End(TagEnd::Emphasis) => italic_depth = italic_depth.saturating_sub(1),
            Event::Start(Tag::Link { dest_url, .. }) => {
                link_url = Some(dest_url.into_string());
            }
            Event::End(TagEnd::Link) => {
                if let Some(url) = link_url.take() {
                    spans.push(Span::styled(
                        format!(" ({url})"),
                        Style::default().fg(Color::Blue),
                    ));
                }
            }
            Event::Text(text) => {
                let style = text_style(
                    heading,
                    bold_depth > 0,
                    italic_depth > 0,
                    in_code_block,
                );
                // Code blocks carry embedded newlines in a single event.
                for (i, part) in text.split('\n').enumerate() {
                    if i > 0 {
                        flush(&mut spans, &mut lines);
                    }
                    if !part.is_empty() {
                        spans.push(Span::styled(part.to_string(), style));
                    }
                }
            }
            Event::Code(code) => {
                spans.push(Span::styled(
                    code.into_string(),
                    Style::default().fg(Color::Cyan),
                ));
            }
            Event::SoftBreak => spans.push(Span::raw(" ")),
            Event::HardBreak => flush(&mut spans, &mut lines),
            Event::Rule => {
                flush(&mut spans, &mut lines);
                lines.push(Line::from("────────────────────"));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                spans.push(Span::raw(html.into_string()));
            }
            _ => {}
        }
    }
    flush(&mut spans, &mut lines);
    while lines.last().map(|l| l.spans.is_empty()).unwrap_or(false) {
        lines.pop();
    }
    lines
}

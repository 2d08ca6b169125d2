use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::tree::{NodeState, RowKind};
use crate::tui::app::{ActivePane, Mode, TuiApp};

const ACCENT: Color = Color::Green;
const MUTED: Color = Color::DarkGray;

pub fn render(frame: &mut Frame, app: &mut TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[0]);

    render_tree_pane(frame, app, panes[0]);
    render_preview_pane(frame, app, panes[1]);
    render_status_bar(frame, app, chunks[1]);

    match &app.mode {
        Mode::Normal => {}
        Mode::Input { purpose, buffer } => render_input(frame, purpose.prompt(), buffer),
        Mode::ConfirmRemove { title, .. } => render_confirm(frame, title),
        Mode::Help => render_help(frame, &app.keybindings().help_entries()),
    }
}

fn border_style(active: bool) -> Style {
    if active {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(MUTED)
    }
}

fn row_marker(kind: &RowKind) -> &'static str {
    match kind {
        RowKind::Folder { open: true } => "▾ ",
        RowKind::Folder { open: false } => "▸ ",
        RowKind::Feed {
            state: NodeState::Loading { .. },
        } => "… ",
        RowKind::Feed {
            state: NodeState::Expanded,
        } => "- ",
        RowKind::Feed {
            state: NodeState::Collapsed,
        } => "+ ",
        RowKind::Item => "• ",
    }
}

fn render_tree_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect) {
    let is_active = app.active_pane == ActivePane::Tree;

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .map(|row| {
            let mut spans = vec![
                Span::raw("  ".repeat(row.depth)),
                Span::raw(row_marker(&row.kind)),
                Span::raw(row.label.clone()),
            ];
            let style = match row.kind {
                RowKind::Folder { .. } => Style::default().add_modifier(Modifier::BOLD),
                RowKind::Feed {
                    state: NodeState::Loading { .. },
                } => {
                    spans.push(Span::styled(" (loading)", Style::default().fg(MUTED)));
                    Style::default()
                }
                _ => Style::default(),
            };
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let title = format!(" Feeds ({}) ", app.tree.collection().feed_count());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_active));

    let highlight_style = if is_active {
        Style::default()
            .bg(ACCENT)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(MUTED)
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style)
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_preview_pane(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let is_active = app.active_pane == ActivePane::Preview;

    let content = match &app.preview {
        Some(preview) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    preview.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ];
            if let Some(date) = &preview.published {
                lines.push(Line::from(Span::styled(
                    format!("Date: {}", date),
                    Style::default().fg(MUTED),
                )));
            }
            if let Some(link) = &preview.link {
                lines.push(Line::from(Span::styled(
                    format!("Link: {}", link),
                    Style::default().fg(ACCENT),
                )));
            }
            lines.push(Line::from(
                "─".repeat(area.width.saturating_sub(2) as usize),
            ));
            lines.extend(html_to_text(&preview.body).lines().map(|l| Line::from(l.to_string())));
            Text::from(lines)
        }
        None => Text::from("Select an item to read it here."),
    };

    let block = Block::default()
        .title(" Preview ")
        .borders(Borders::ALL)
        .border_style(border_style(is_active));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let mut status = app.status_text().to_string();
    if app.tree.is_dirty() {
        status.push_str(" [unsaved]");
    }

    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::Black).bg(ACCENT));
    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, prompt: &str, buffer: &str) {
    let area = centered_rect(60, 3, frame.area());
    let block = Block::default()
        .title(format!(" {} (Enter: ok, Esc: cancel) ", prompt))
        .borders(Borders::ALL)
        .border_style(border_style(true));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(format!("{}_", buffer)).block(block), area);
}

fn render_confirm(frame: &mut Frame, title: &str) {
    let area = centered_rect(60, 3, frame.area());
    let block = Block::default()
        .title(" Remove feed ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(format!("Remove \"{}\"? (y/n)", title)).block(block),
        area,
    );
}

fn render_help(frame: &mut Frame, entries: &[(String, &str)]) {
    let area = centered_rect(60, entries.len() as u16 + 2, frame.area());
    let lines: Vec<Line> = entries
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{:<18}", keys), Style::default().fg(ACCENT)),
                Span::raw(*what),
            ])
        })
        .collect();
    let block = Block::default()
        .title(" Help (any key to close) ")
        .borders(Borders::ALL)
        .border_style(border_style(true));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x.min(100)) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Render an HTML fragment as plain text: tags dropped, entities decoded,
/// block-level tags turned into line breaks and runs of spaces collapsed.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::new();
    let mut tag = String::new();
    let mut in_tag = false;
    let mut last_was_space = false;

    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                if breaks_line(&tag) {
                    while out.ends_with(' ') {
                        out.pop();
                    }
                    if !out.ends_with("\n\n") && !out.is_empty() {
                        out.push('\n');
                    }
                    last_was_space = true;
                }
            }
            _ if in_tag => tag.push(c),
            '\n' | '\r' | '\t' | ' ' => {
                if !last_was_space {
                    out.push(' ');
                    last_was_space = true;
                }
            }
            _ => {
                out.push(c);
                last_was_space = false;
            }
        }
    }

    html_escape::decode_html_entities(out.trim()).into_owned()
}

fn breaks_line(tag: &str) -> bool {
    let name = tag
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    matches!(
        name.as_str(),
        "p" | "br" | "div" | "li" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
            | "blockquote" | "pre" | "tr"
    )
}

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{block::Title, Block, Borders, Paragraph, Wrap},
};
use std::time::Instant;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::format::{LinkAction, Run, Segment};
use crate::message::Role;
use crate::renderer::{LinkRef, RenderedEntry};

const MAX_INPUT_ROWS: usize = 5;
const ERROR_BG: Color = Color::Rgb(64, 24, 24);

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let input_rows = app
        .controller
        .input
        .text()
        .split('\n')
        .count()
        .clamp(1, MAX_INPUT_ROWS) as u16;

    // Main layout: header, transcript, status, input, footer
    let [header_area, transcript_area, status_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(input_rows + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_transcript(app, frame, transcript_area);
    render_status(app, frame, status_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::Black).fg(Color::White).bold();
    let title = Line::from(vec![
        Span::styled(" Chatbox ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
        Span::styled(" F2 ", key_style),
        Span::styled(" Discord ", Style::default().fg(Color::LightBlue)),
        Span::styled(" F3 ", key_style),
        Span::styled(" Telegram ", Style::default().fg(Color::LightCyan)),
        Span::styled(" F4 ", key_style),
        Span::styled(" Profile ", Style::default().fg(Color::LightMagenta)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    app.transcript_height = inner_height;

    let renderer = &mut app.controller.renderer;
    let selected = renderer.selected_link();

    let text = if renderer.entries().is_empty() {
        Text::from(Span::styled(
            "Say hello to start the conversation...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let lines: Vec<Line> = renderer
            .entries()
            .iter()
            .enumerate()
            .flat_map(|(idx, entry)| entry_lines(idx, entry, selected))
            .collect();
        Text::from(lines)
    };

    // Scroll requests are applied here, once the new entry has been measured
    // with the same word wrapping the paragraph renders with
    let transcript = Paragraph::new(text).wrap(Wrap { trim: false });
    let total = transcript.line_count(inner_width).min(u16::MAX as usize) as u16;
    let max_scroll = total.saturating_sub(inner_height);
    if renderer.take_scroll_request() {
        renderer.scroll = max_scroll;
    }
    renderer.scroll = renderer.scroll.min(max_scroll);

    let transcript = transcript.block(block).scroll((renderer.scroll, 0));
    frame.render_widget(transcript, area);
}

fn entry_lines(idx: usize, entry: &RenderedEntry, selected: Option<LinkRef>) -> Vec<Line<'static>> {
    let message = &entry.message;
    let name_color = match message.sender {
        Role::User => Color::Cyan,
        Role::Assistant => Color::Yellow,
    };

    let mut lines = vec![Line::from(vec![
        Span::raw(format!("{} ", message.sender.avatar())),
        Span::styled(
            message.sender.label(),
            Style::default().fg(name_color).add_modifier(Modifier::BOLD),
        ),
    ])];

    // Error entries get a red bar and a tinted background
    let (gutter, body_style) = if message.is_error {
        (
            Span::styled("▌ ", Style::default().fg(Color::LightRed).bg(ERROR_BG)),
            Style::default().fg(Color::LightRed).bg(ERROR_BG),
        )
    } else {
        (Span::raw("  "), Style::default())
    };

    let selected_ordinal = selected
        .filter(|s| s.entry == idx)
        .map(|s| s.link.ordinal);

    let mut current = vec![gutter.clone()];
    for segment in &entry.segments {
        match segment {
            Segment::Text(run) => {
                let style = body_style.patch(run_style(run, selected_ordinal));
                current.push(Span::styled(run.text.clone(), style));
            }
            Segment::LineBreak => {
                lines.push(Line::from(std::mem::replace(&mut current, vec![gutter.clone()])));
            }
        }
    }
    lines.push(Line::from(current));

    lines.push(Line::from(Span::styled(
        format!("  {}", message.timestamp),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::default());
    lines
}

fn run_style(run: &Run, selected_ordinal: Option<usize>) -> Style {
    let mut style = Style::default();
    if run.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if run.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if let Some(link) = run.link {
        let color = match link.action {
            LinkAction::CopyHandle => Color::LightBlue,
            LinkAction::OpenUrl => Color::LightCyan,
        };
        style = style.fg(color).add_modifier(Modifier::UNDERLINED);
        if selected_ordinal == Some(link.ordinal) {
            style = style.add_modifier(Modifier::REVERSED);
        }
    }
    style
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let now = Instant::now();

    let line = if app.controller.rate_limit.is_visible(now) {
        Line::from(Span::styled(
            " ⚠ Rate limit reached. Please wait a moment before sending another message.",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ))
    } else if app.contacts.copied.is_visible(now) {
        Line::from(Span::styled(
            format!(" ✓ Copied {} to clipboard", app.contacts.config.discord_handle),
            Style::default().fg(Color::Green),
        ))
    } else if app.controller.typing_visible() {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        Line::from(Span::styled(
            format!(" Assistant is typing{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        Line::default()
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let controller = &app.controller;
    let enabled = controller.input_enabled();

    let border_color = if enabled { Color::Yellow } else { Color::DarkGray };
    let send_style = if controller.send_enabled() {
        Style::default().fg(Color::Black).bg(Color::Green).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message ")
        .title(Title::from(Span::styled(" Send ", send_style)).alignment(Alignment::Right));

    let text = controller.input.text();
    let (cursor_row, cursor_col) = cursor_offset(text, controller.input.cursor());

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    // Scroll so the cursor stays visible
    let row_offset = (cursor_row + 1).saturating_sub(inner_height);
    let col_offset = if inner_width == 0 {
        0
    } else {
        (cursor_col + 1).saturating_sub(inner_width)
    };

    let visible: Vec<Line> = text
        .split('\n')
        .skip(row_offset)
        .take(inner_height)
        .map(|line| Line::from(visible_columns(line, col_offset, inner_width)))
        .collect();

    let text_style = if enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(visible).style(text_style).block(input_block);
    frame.render_widget(input, area);

    if enabled && !app.controller.renderer.has_selection() {
        frame.set_cursor_position((
            area.x + 1 + cursor_col.saturating_sub(col_offset) as u16,
            area.y + 1 + cursor_row.saturating_sub(row_offset) as u16,
        ));
    }
}

/// Row and display column of the cursor within the (possibly multi-line) input
fn cursor_offset(text: &str, cursor: usize) -> (usize, usize) {
    let before_cursor: String = text.chars().take(cursor).collect();
    let row = before_cursor.matches('\n').count();
    let col = before_cursor.rsplit('\n').next().map(UnicodeWidthStr::width).unwrap_or(0);
    (row, col)
}

/// The part of `line` that fits in `width` columns starting at column `offset`.
/// A wide character straddling either edge is left out.
fn visible_columns(line: &str, offset: usize, width: usize) -> String {
    let mut col = 0;
    let mut out = String::new();
    for c in line.chars() {
        let w = c.width().unwrap_or(0);
        if col + w > offset + width {
            break;
        }
        if col >= offset {
            out.push(c);
        }
        col += w;
    }
    out
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = if app.controller.renderer.has_selection() {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" open mention ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" next ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" cancel ", label_style),
        ]
    } else {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Shift+Enter ", key_style),
            Span::styled(" newline ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" mentions ", label_style),
        ]
    };
    hints.extend(vec![
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

//! Lightweight message formatting
//!
//! Turns raw message text into a flat list of styled segments. Only three
//! transforms exist: line breaks, `**strong**` and `*emphasis*` markers, and
//! (for assistant text) contact mentions. Everything else is shown literally.
//!
//! Markers are resolved the way a left-to-right, lazy regex substitution
//! would resolve them: the strong pass runs first over the whole text
//! (including across line breaks), then the emphasis pass runs over what is
//! left. Nothing backtracks, so `**a*` renders as `a*` (the first two stars
//! form an empty emphasis) and `***x***` ends up strong and emphasized.
//! This is not a markdown parser.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::message::Role;

static STRONG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\*\*(.*?)\*\*").expect("strong regex pattern is valid"));
static EMPHASIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\*(.*?)\*").expect("emphasis regex pattern is valid"));
static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(discord|telegram)\b").expect("mention regex pattern is valid"));

/// What activating a linked mention does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// Copy the contact handle to the clipboard
    CopyHandle,
    /// Open the contact URL in a browser
    OpenUrl,
}

/// A mention inside one message. `ordinal` counts mentions left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub ordinal: usize,
    pub action: LinkAction,
}

/// A run of text sharing the same style
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Run {
    pub text: String,
    pub strong: bool,
    pub emphasis: bool,
    pub link: Option<Link>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(Run),
    LineBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Marks {
    strong: bool,
    emphasis: bool,
    link: Option<Link>,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    ch: char,
    marks: Marks,
}

/// Drop control characters that could drive the terminal. Newlines survive,
/// tabs become four spaces.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push('\n'),
            '\t' => out.push_str("    "),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Format message text for display. Mentions are only linked in assistant text.
pub fn format_message(text: &str, sender: Role) -> Vec<Segment> {
    let cells: Vec<Cell> = sanitize(text)
        .chars()
        .map(|ch| Cell { ch, marks: Marks::default() })
        .collect();

    let cells = apply_markers(cells, &STRONG_RE, |m| m.strong = true);
    let mut cells = apply_markers(cells, &EMPHASIS_RE, |m| m.emphasis = true);

    if sender == Role::Assistant {
        link_mentions(&mut cells);
    }

    coalesce(cells)
}

/// Strip the delimiters of every match and mark the captured characters.
fn apply_markers(cells: Vec<Cell>, re: &Regex, mark: impl Fn(&mut Marks)) -> Vec<Cell> {
    let text: String = cells.iter().map(|c| c.ch).collect();
    let mut matches = re
        .captures_iter(&text)
        .filter_map(|caps| Some((caps.get(0)?.range(), caps.get(1)?.range())))
        .peekable();

    let mut out = Vec::with_capacity(cells.len());
    for ((offset, _), mut cell) in text.char_indices().zip(cells) {
        while matches.peek().is_some_and(|(whole, _)| whole.end <= offset) {
            matches.next();
        }
        match matches.peek() {
            Some((whole, inner)) if whole.contains(&offset) => {
                if inner.contains(&offset) {
                    mark(&mut cell.marks);
                    out.push(cell);
                }
            }
            _ => out.push(cell),
        }
    }
    out
}

fn link_mentions(cells: &mut [Cell]) {
    let text: String = cells.iter().map(|c| c.ch).collect();
    let mentions: Vec<(std::ops::Range<usize>, Link)> = MENTION_RE
        .find_iter(&text)
        .enumerate()
        .map(|(ordinal, m)| {
            let action = if m.as_str().eq_ignore_ascii_case("discord") {
                LinkAction::CopyHandle
            } else {
                LinkAction::OpenUrl
            };
            (m.range(), Link { ordinal, action })
        })
        .collect();

    for ((offset, _), cell) in text.char_indices().zip(cells.iter_mut()) {
        if let Some((_, link)) = mentions.iter().find(|(range, _)| range.contains(&offset)) {
            cell.marks.link = Some(*link);
        }
    }
}

fn coalesce(cells: Vec<Cell>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Option<(Marks, String)> = None;

    for cell in cells {
        if cell.ch == '\n' {
            if let Some((marks, text)) = current.take() {
                segments.push(Segment::Text(run_from(marks, text)));
            }
            segments.push(Segment::LineBreak);
            continue;
        }

        if let Some((marks, text)) = current.as_mut() {
            if *marks == cell.marks {
                text.push(cell.ch);
                continue;
            }
        }
        if let Some((marks, text)) = current.take() {
            segments.push(Segment::Text(run_from(marks, text)));
        }
        current = Some((cell.marks, cell.ch.to_string()));
    }

    if let Some((marks, text)) = current {
        segments.push(Segment::Text(run_from(marks, text)));
    }
    segments
}

fn run_from(marks: Marks, text: String) -> Run {
    Run {
        text,
        strong: marks.strong,
        emphasis: marks.emphasis,
        link: marks.link,
    }
}

/// Flatten segments back to display text, line breaks as `\n`
pub fn plain_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| match s {
            Segment::Text(run) => run.text.as_str(),
            Segment::LineBreak => "\n",
        })
        .collect()
}

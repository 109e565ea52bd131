use chrono::Local;

use crate::format::{format_message, Link, Segment};
use crate::message::{ClockStyle, Message, Role};

/// A message together with its formatted body
#[derive(Debug, Clone)]
pub struct RenderedEntry {
    pub message: Message,
    pub segments: Vec<Segment>,
}

impl RenderedEntry {
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        let mut last = None;
        self.segments.iter().filter_map(move |segment| match segment {
            Segment::Text(run) => {
                let link = run.link?;
                // A mention split across styles yields several runs with one link
                if last == Some(link.ordinal) {
                    return None;
                }
                last = Some(link.ordinal);
                Some(link)
            }
            Segment::LineBreak => None,
        })
    }
}

/// Position of a mention within the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRef {
    pub entry: usize,
    pub link: Link,
}

/// Appends formatted entries to the transcript and tracks its viewport
pub struct MessageRenderer {
    entries: Vec<RenderedEntry>,
    clock: ClockStyle,
    pub scroll: u16,
    scroll_to_bottom: bool,
    selected_link: Option<usize>,
}

impl MessageRenderer {
    pub fn new(clock: ClockStyle) -> Self {
        Self {
            entries: Vec::new(),
            clock,
            scroll: 0,
            scroll_to_bottom: false,
            selected_link: None,
        }
    }

    pub fn entries(&self) -> &[RenderedEntry] {
        &self.entries
    }

    /// Format and append a message, then ask for the view to follow it.
    ///
    /// The scroll itself happens on the next draw, after layout has measured
    /// the new entry.
    pub fn append(&mut self, text: &str, sender: Role, is_error: bool) {
        let message = Message {
            text: text.to_string(),
            sender,
            timestamp: self.clock.format(&Local::now()),
            is_error,
        };
        let segments = format_message(text, sender);
        tracing::debug!(?sender, is_error, "Appending message");

        self.entries.push(RenderedEntry { message, segments });
        self.scroll_to_bottom = true;
    }

    /// Consume a pending scroll-to-bottom request
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_bottom)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    /// Every mention in display order
    pub fn links(&self) -> Vec<LinkRef> {
        self.entries
            .iter()
            .enumerate()
            .flat_map(|(entry, e)| e.links().map(move |link| LinkRef { entry, link }))
            .collect()
    }

    /// Move the mention selection. With nothing selected, start at the newest.
    pub fn cycle_link(&mut self, backward: bool) {
        let count = self.links().len();
        if count == 0 {
            self.selected_link = None;
            return;
        }
        self.selected_link = Some(match self.selected_link {
            None => count - 1,
            Some(i) if backward => (i + count - 1) % count,
            Some(i) => (i + 1) % count,
        });
    }

    pub fn selected_link(&self) -> Option<LinkRef> {
        self.selected_link.and_then(|i| self.links().get(i).copied())
    }

    pub fn has_selection(&self) -> bool {
        self.selected_link.is_some()
    }

    pub fn clear_selection(&mut self) {
        self.selected_link = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{plain_text, LinkAction};

    #[test]
    fn test_append_records_message_and_scroll_request() {
        let mut renderer = MessageRenderer::new(ClockStyle::TwentyFourHour);
        renderer.append("**hi**", Role::User, false);

        let entry = &renderer.entries()[0];
        assert_eq!(entry.message.text, "**hi**");
        assert_eq!(entry.message.sender, Role::User);
        assert!(!entry.message.is_error);
        assert_eq!(entry.message.timestamp.len(), 5);
        assert_eq!(plain_text(&entry.segments), "hi");

        assert!(renderer.take_scroll_request());
        assert!(!renderer.take_scroll_request());
    }

    #[test]
    fn test_mention_scope_by_sender() {
        let mut renderer = MessageRenderer::new(ClockStyle::TwentyFourHour);
        renderer.append("Ping me on Discord", Role::User, false);
        assert!(renderer.links().is_empty());

        renderer.append("Ping me on Discord", Role::Assistant, false);
        let links = renderer.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].entry, 1);
        assert_eq!(links[0].link.action, LinkAction::CopyHandle);
    }

    #[test]
    fn test_split_mention_counts_once() {
        let mut renderer = MessageRenderer::new(ClockStyle::TwentyFourHour);
        renderer.append("Dis**cord**", Role::Assistant, false);
        assert_eq!(renderer.links().len(), 1);
    }

    #[test]
    fn test_cycle_links() {
        let mut renderer = MessageRenderer::new(ClockStyle::TwentyFourHour);
        renderer.cycle_link(false);
        assert!(!renderer.has_selection());

        renderer.append("Discord or Telegram", Role::Assistant, false);
        renderer.cycle_link(true);
        assert_eq!(renderer.selected_link().unwrap().link.action, LinkAction::OpenUrl);
        renderer.cycle_link(true);
        assert_eq!(renderer.selected_link().unwrap().link.action, LinkAction::CopyHandle);
        renderer.cycle_link(true);
        assert_eq!(renderer.selected_link().unwrap().link.action, LinkAction::OpenUrl);
        renderer.cycle_link(false);
        assert_eq!(renderer.selected_link().unwrap().link.action, LinkAction::CopyHandle);

        renderer.clear_selection();
        assert!(renderer.selected_link().is_none());
    }

    #[test]
    fn test_scroll_saturates() {
        let mut renderer = MessageRenderer::new(ClockStyle::TwentyFourHour);
        renderer.scroll_up(3);
        assert_eq!(renderer.scroll, 0);
        renderer.scroll_down(4);
        renderer.scroll_up(1);
        assert_eq!(renderer.scroll, 3);
    }
}

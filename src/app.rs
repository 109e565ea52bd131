use std::time::Instant;

use anyhow::Result;

use crate::client::ChatClient;
use crate::config::Config;
use crate::contact::Contacts;
use crate::controller::ConversationController;
use crate::renderer::MessageRenderer;

pub struct App {
    // Core state
    pub should_quit: bool,

    // Conversation (input, transcript, round-trip state)
    pub controller: ConversationController,

    // Contact bar and linked mentions
    pub contacts: Contacts,

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing indicator dots

    // Transcript viewport, updated during render
    pub transcript_height: u16,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let client = ChatClient::new(&config.base_url, config.request_timeout())?;
        let renderer = MessageRenderer::new(config.clock_style());

        Ok(Self::with_parts(
            ConversationController::new(client, renderer),
            Contacts::new(config.contacts.clone()),
        ))
    }

    pub fn with_parts(controller: ConversationController, contacts: Contacts) -> Self {
        Self {
            should_quit: false,
            controller,
            contacts,
            animation_frame: 0,
            transcript_height: 0,
        }
    }

    /// Advance the typing animation and clear expired notices (called by Tick event)
    pub fn tick(&mut self, now: Instant) {
        if self.controller.typing_visible() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.controller.rate_limit.expire(now);
        self.contacts.copied.expire(now);
    }

    /// Activate the selected mention, if any
    pub fn activate_selected_link(&mut self, now: Instant) -> bool {
        match self.controller.renderer.selected_link() {
            Some(link_ref) => self.contacts.activate(link_ref.link.action, now),
            None => false,
        }
    }

    pub fn scroll_page(&self) -> u16 {
        (self.transcript_height / 2).max(1)
    }
}

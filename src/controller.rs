//! The message send lifecycle
//!
//! One round-trip at a time: echo the user's text, post it, wait, render
//! whatever came back (reply, rate-limit advisory or generic advisory), then
//! return to idle. The request runs on its own task so the UI keeps drawing;
//! the controller only learns the result through [`ConversationController::wait_reply`].

use std::time::Instant;

use tokio::task::JoinHandle;

use crate::client::{ChatClient, ChatError, Outcome};
use crate::input::InputField;
use crate::message::Role;
use crate::notice::{TimedNotice, RATE_LIMIT_NOTICE_DURATION};
use crate::renderer::MessageRenderer;

pub const RATE_LIMIT_ADVISORY: &str =
    "Please wait before sending another message. You can send up to 5 messages per minute.";
pub const GENERIC_ADVISORY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub pending_request: bool,
}

pub struct ConversationController {
    client: ChatClient,
    state: ConversationState,
    in_flight: Option<JoinHandle<Result<String, ChatError>>>,
    pub input: InputField,
    pub renderer: MessageRenderer,
    pub rate_limit: TimedNotice,
}

impl ConversationController {
    pub fn new(client: ChatClient, renderer: MessageRenderer) -> Self {
        Self {
            client,
            state: ConversationState::default(),
            in_flight: None,
            input: InputField::new(),
            renderer,
            rate_limit: TimedNotice::new(RATE_LIMIT_NOTICE_DURATION),
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending_request
    }

    /// Send is possible only with non-blank input and no request in flight
    pub fn send_enabled(&self) -> bool {
        !self.input.is_blank() && !self.state.pending_request
    }

    pub fn input_enabled(&self) -> bool {
        !self.state.pending_request
    }

    pub fn typing_visible(&self) -> bool {
        self.state.pending_request
    }

    /// Submit whatever is in the input box
    pub fn submit_input(&mut self) -> bool {
        let raw = self.input.text().to_string();
        self.submit(&raw)
    }

    /// Start a round-trip. Returns false, without rendering or sending
    /// anything, when the text is blank or a request is already pending.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, raw: &str) -> bool {
        let message = raw.trim();
        if message.is_empty() {
            return false;
        }
        if self.state.pending_request {
            tracing::debug!("Submit ignored while a request is pending");
            return false;
        }

        // Echo first; this is never taken back
        self.renderer.append(message, Role::User, false);
        self.input.clear();

        self.state.pending_request = true;
        tracing::info!(chars = message.chars().count(), "Sending message");

        let client = self.client.clone();
        let message = message.to_string();
        self.in_flight = Some(tokio::spawn(async move { client.send(&message).await }));
        true
    }

    /// Wait for the in-flight request. Cancel safe: dropping this future
    /// leaves the request running.
    pub async fn wait_reply(&mut self) -> Outcome {
        let Some(task) = self.in_flight.as_mut() else {
            return std::future::pending().await;
        };

        let result = task.await;
        self.in_flight = None;

        match result {
            Ok(result) => Outcome::from(result),
            Err(e) => Outcome::Failed(format!("request task ended abnormally: {e}")),
        }
    }

    /// Render the outcome of a round-trip and return to idle
    pub fn complete(&mut self, outcome: Outcome, now: Instant) {
        if !self.state.pending_request {
            tracing::warn!(?outcome, "Dropping outcome with no request pending");
            return;
        }

        match outcome {
            Outcome::Reply(text) => {
                tracing::info!("Received reply");
                self.renderer.append(&text, Role::Assistant, false);
            }
            Outcome::RateLimited => {
                tracing::warn!("Rate limited by chat backend");
                self.rate_limit.show(now);
                self.renderer.append(RATE_LIMIT_ADVISORY, Role::Assistant, true);
            }
            Outcome::Failed(reason) => {
                tracing::warn!(%reason, "Error sending message");
                self.renderer.append(GENERIC_ADVISORY, Role::Assistant, true);
            }
        }

        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        self.state.pending_request = false;
    }

    /// Wait for the pending request and complete it. Returns `None` when
    /// nothing was in flight.
    pub async fn resolve(&mut self) -> Option<Outcome> {
        if !self.state.pending_request {
            return None;
        }
        let outcome = self.wait_reply().await;
        self.complete(outcome.clone(), Instant::now());
        Some(outcome)
    }
}

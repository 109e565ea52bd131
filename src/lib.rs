pub mod app;
pub mod client;
pub mod config;
pub mod contact;
pub mod controller;
pub mod format;
pub mod handler;
pub mod input;
pub mod message;
pub mod notice;
pub mod renderer;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use client::{ChatClient, ChatError, Outcome};
pub use config::{Config, ContactConfig};
pub use controller::{ConversationController, ConversationState, GENERIC_ADVISORY, RATE_LIMIT_ADVISORY};
pub use format::{format_message, LinkAction, Segment};
pub use message::{ClockStyle, Message, Role};
pub use renderer::MessageRenderer;

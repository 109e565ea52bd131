//! Conversation message types
//!
//! Messages are transient: they live only as long as the transcript that
//! displays them and are never written to disk.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Assistant",
        }
    }

    pub fn avatar(&self) -> &'static str {
        match self {
            Role::User => "👤",
            Role::Assistant => "🤖",
        }
    }
}

/// A single entry in the conversation, immutable once rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub sender: Role,
    pub timestamp: String,
    pub is_error: bool,
}

/// Hour:minute convention used for message timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockStyle {
    TwelveHour,
    TwentyFourHour,
}

impl ClockStyle {
    /// Pick the convention from the locale environment (LC_ALL, LC_TIME, LANG)
    pub fn from_locale() -> Self {
        let locale = ["LC_ALL", "LC_TIME", "LANG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.is_empty())
            .unwrap_or_default();
        Self::for_locale(&locale)
    }

    pub fn for_locale(locale: &str) -> Self {
        const TWELVE_HOUR_LOCALES: [&str; 5] = ["en_US", "en_CA", "en_AU", "en_PH", "en_IN"];

        let normalized = locale.replace('-', "_");
        if TWELVE_HOUR_LOCALES.iter().any(|l| normalized.starts_with(l)) {
            ClockStyle::TwelveHour
        } else {
            ClockStyle::TwentyFourHour
        }
    }

    pub fn format(&self, time: &DateTime<Local>) -> String {
        match self {
            ClockStyle::TwelveHour => time.format("%I:%M %p").to_string(),
            ClockStyle::TwentyFourHour => time.format("%H:%M").to_string(),
        }
    }
}

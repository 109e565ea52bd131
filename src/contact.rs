//! Contact actions: copying the handle and opening contact links
//!
//! Copying goes through an ordered list of strategies. The system clipboard
//! is tried first; when it is missing or refuses, an OSC 52 escape asks the
//! terminal itself to set the clipboard (this also works over SSH).

use std::io::{self, Write};
use std::time::Instant;

use anyhow::Result;
use base64::Engine;
use thiserror::Error;

use crate::config::ContactConfig;
use crate::format::LinkAction;
use crate::notice::{TimedNotice, COPIED_NOTICE_DURATION};

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("no clipboard strategy succeeded")]
    Unavailable,
}

/// One way of putting text on the clipboard
pub trait CopyStrategy: Send {
    fn name(&self) -> &'static str;
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// The OS clipboard via arboard
pub struct SystemClipboard;

impl CopyStrategy for SystemClipboard {
    fn name(&self) -> &'static str {
        "system clipboard"
    }

    fn copy(&mut self, text: &str) -> Result<()> {
        arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string()))?;
        Ok(())
    }
}

/// OSC 52 escape sequence written straight to the terminal
pub struct Osc52Clipboard<W: Write + Send> {
    out: W,
}

impl Osc52Clipboard<io::Stderr> {
    /// The UI draws on stderr, so the escape goes there too
    pub fn stderr() -> Self {
        Self { out: io::stderr() }
    }
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn osc52_sequence(text: &str) -> String {
    // ESC ] 52 ; c ; <base64> BEL
    let payload = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\u{1b}]52;c;{payload}\u{07}")
}

impl<W: Write + Send> CopyStrategy for Osc52Clipboard<W> {
    fn name(&self) -> &'static str {
        "OSC52"
    }

    fn copy(&mut self, text: &str) -> Result<()> {
        self.out.write_all(osc52_sequence(text).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

pub struct Clipboard {
    strategies: Vec<Box<dyn CopyStrategy>>,
}

impl Clipboard {
    pub fn system() -> Self {
        Self::with_strategies(vec![
            Box::new(SystemClipboard),
            Box::new(Osc52Clipboard::stderr()),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn CopyStrategy>>) -> Self {
        Self { strategies }
    }

    /// Try each strategy in order. Returns the name of the one that worked.
    pub fn copy(&mut self, text: &str) -> Result<&'static str, ClipboardError> {
        for strategy in self.strategies.iter_mut() {
            match strategy.copy(text) {
                Ok(()) => return Ok(strategy.name()),
                Err(e) => {
                    tracing::warn!(strategy = strategy.name(), error = %e, "Clipboard copy failed, trying next strategy");
                }
            }
        }
        Err(ClipboardError::Unavailable)
    }
}

/// Opens external links in a new browser context
pub trait UrlOpener: Send {
    fn open(&self, url: &str) -> Result<()>;
}

pub struct BrowserOpener;

impl UrlOpener for BrowserOpener {
    fn open(&self, url: &str) -> Result<()> {
        webbrowser::open(url)?;
        Ok(())
    }
}

pub struct Contacts {
    pub config: ContactConfig,
    clipboard: Clipboard,
    opener: Box<dyn UrlOpener>,
    pub copied: TimedNotice,
}

impl Contacts {
    pub fn new(config: ContactConfig) -> Self {
        Self::with_collaborators(config, Clipboard::system(), Box::new(BrowserOpener))
    }

    pub fn with_collaborators(
        config: ContactConfig,
        clipboard: Clipboard,
        opener: Box<dyn UrlOpener>,
    ) -> Self {
        Self {
            config,
            clipboard,
            opener,
            copied: TimedNotice::new(COPIED_NOTICE_DURATION),
        }
    }

    /// Copy the Discord handle and flash the confirmation
    pub fn copy_handle(&mut self, now: Instant) -> bool {
        match self.clipboard.copy(&self.config.discord_handle) {
            Ok(method) => {
                tracing::info!(method, "Copied contact handle");
                self.copied.show(now);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not copy contact handle");
                false
            }
        }
    }

    pub fn open_telegram(&self) -> bool {
        self.open(&self.config.telegram_url)
    }

    pub fn open_profile(&self) -> bool {
        self.open(&self.config.profile_url)
    }

    pub fn activate(&mut self, action: LinkAction, now: Instant) -> bool {
        match action {
            LinkAction::CopyHandle => self.copy_handle(now),
            LinkAction::OpenUrl => self.open_telegram(),
        }
    }

    fn open(&self, url: &str) -> bool {
        match self.opener.open(url) {
            Ok(()) => {
                tracing::info!(url, "Opened contact link");
                true
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Failed to open contact link");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::{Arc, Mutex};

    struct Recording {
        name: &'static str,
        fail: bool,
        copied: Arc<Mutex<Vec<String>>>,
    }

    impl CopyStrategy for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn copy(&mut self, text: &str) -> Result<()> {
            if self.fail {
                return Err(anyhow!("clipboard refused"));
            }
            self.copied.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingOpener {
        opened: Arc<Mutex<Vec<String>>>,
    }

    impl UrlOpener for RecordingOpener {
        fn open(&self, url: &str) -> Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn strategy(name: &'static str, fail: bool, log: &Arc<Mutex<Vec<String>>>) -> Box<dyn CopyStrategy> {
        Box::new(Recording { name, fail, copied: Arc::clone(log) })
    }

    #[test]
    fn test_primary_strategy_used_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut clipboard = Clipboard::with_strategies(vec![
            strategy("primary", false, &log),
            strategy("fallback", false, &log),
        ]);
        assert_eq!(clipboard.copy("handle").unwrap(), "primary");
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_falls_back_when_primary_fails() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut clipboard = Clipboard::with_strategies(vec![
            strategy("primary", true, &log),
            strategy("fallback", false, &log),
        ]);
        assert_eq!(clipboard.copy("handle").unwrap(), "fallback");
        assert_eq!(*log.lock().unwrap(), vec!["handle".to_string()]);
    }

    #[test]
    fn test_all_strategies_failing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut clipboard = Clipboard::with_strategies(vec![strategy("primary", true, &log)]);
        assert!(matches!(clipboard.copy("handle"), Err(ClipboardError::Unavailable)));
    }

    #[test]
    fn test_osc52_writes_escape() {
        let mut osc = Osc52Clipboard::new(Vec::new());
        osc.copy("hi").unwrap();
        let written = String::from_utf8(osc.into_inner()).unwrap();
        assert_eq!(written, "\u{1b}]52;c;aGk=\u{07}");
    }

    #[test]
    fn test_copy_handle_shows_tooltip() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let opener = RecordingOpener::default();
        let mut contacts = Contacts::with_collaborators(
            ContactConfig::default(),
            Clipboard::with_strategies(vec![strategy("primary", false, &log)]),
            Box::new(opener),
        );
        let now = Instant::now();
        assert!(contacts.activate(LinkAction::CopyHandle, now));
        assert!(contacts.copied.is_visible(now));
        assert_eq!(*log.lock().unwrap(), vec!["LiteEagle262".to_string()]);
    }

    #[test]
    fn test_failed_copy_leaves_tooltip_hidden() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut contacts = Contacts::with_collaborators(
            ContactConfig::default(),
            Clipboard::with_strategies(vec![strategy("primary", true, &log)]),
            Box::new(RecordingOpener::default()),
        );
        let now = Instant::now();
        assert!(!contacts.copy_handle(now));
        assert!(!contacts.copied.is_visible(now));
    }

    #[test]
    fn test_links_open_configured_urls() {
        let opener = RecordingOpener::default();
        let mut contacts = Contacts::with_collaborators(
            ContactConfig::default(),
            Clipboard::with_strategies(Vec::new()),
            Box::new(opener.clone()),
        );
        assert!(contacts.activate(LinkAction::OpenUrl, Instant::now()));
        assert!(contacts.open_profile());
        assert_eq!(
            *opener.opened.lock().unwrap(),
            vec![
                "http://t.me/LiteEagle262".to_string(),
                "https://oguser.com/sexyeagle".to_string(),
            ]
        );
    }
}

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick(Instant::now()),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any state
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => {
            if app.controller.renderer.has_selection() {
                app.controller.renderer.clear_selection();
            } else {
                app.should_quit = true;
            }
        }

        // Contact bar
        KeyCode::F(2) => {
            app.contacts.copy_handle(Instant::now());
        }
        KeyCode::F(3) => {
            app.contacts.open_telegram();
        }
        KeyCode::F(4) => {
            app.contacts.open_profile();
        }

        // Mention selection
        KeyCode::Tab => app.controller.renderer.cycle_link(true),
        KeyCode::BackTab => app.controller.renderer.cycle_link(false),

        // Transcript scrolling
        KeyCode::Up => app.controller.renderer.scroll_up(1),
        KeyCode::Down => app.controller.renderer.scroll_down(1),
        KeyCode::PageUp => {
            let page = app.scroll_page();
            app.controller.renderer.scroll_up(page);
        }
        KeyCode::PageDown => {
            let page = app.scroll_page();
            app.controller.renderer.scroll_down(page);
        }

        KeyCode::Enter => {
            if app.controller.renderer.has_selection() {
                app.activate_selected_link(Instant::now());
                app.controller.renderer.clear_selection();
            } else if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) {
                if app.controller.input_enabled() {
                    app.controller.input.insert_newline();
                }
            } else if app.controller.send_enabled() {
                app.controller.submit_input();
            }
        }

        _ => handle_input_key(app, key),
    }
}

/// Editing keys; ignored while a request is pending
fn handle_input_key(app: &mut App, key: KeyEvent) {
    if !app.controller.input_enabled() {
        return;
    }
    let input = &mut app.controller.input;

    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char(c) => input.insert(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.controller.renderer.scroll_down(3),
        MouseEventKind::ScrollUp => app.controller.renderer.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatClient;
    use crate::config::ContactConfig;
    use crate::contact::{Clipboard, Contacts, UrlOpener};
    use crate::controller::ConversationController;
    use crate::message::ClockStyle;
    use crate::renderer::MessageRenderer;
    use std::time::Duration;

    struct NoopOpener;

    impl UrlOpener for NoopOpener {
        fn open(&self, _url: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn app() -> App {
        let client = ChatClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let controller =
            ConversationController::new(client, MessageRenderer::new(ClockStyle::TwentyFourHour));
        let contacts = Contacts::with_collaborators(
            ContactConfig::default(),
            Clipboard::with_strategies(Vec::new()),
            Box::new(NoopOpener),
        );
        App::with_parts(controller, contacts)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_enter_on_blank_input_does_nothing() {
        let mut app = app();
        type_text(&mut app, "   ");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(app.controller.renderer.entries().is_empty());
        assert!(!app.controller.is_pending());
    }

    #[tokio::test]
    async fn test_typing_ignored_while_pending() {
        let mut app = app();
        type_text(&mut app, "hi");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(app.controller.is_pending());

        type_text(&mut app, "more");
        assert_eq!(app.controller.input.text(), "");
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut app = app();
        type_text(&mut app, "a");
        handle_event(&mut app, AppEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT))).unwrap();
        type_text(&mut app, "b");
        assert_eq!(app.controller.input.text(), "a\nb");
    }

    #[test]
    fn test_esc_clears_selection_before_quitting() {
        let mut app = app();
        app.controller.renderer.append("Find me on Telegram", crate::message::Role::Assistant, false);
        handle_event(&mut app, key(KeyCode::Tab)).unwrap();
        assert!(app.controller.renderer.has_selection());

        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(!app.controller.renderer.has_selection());
        assert!(!app.should_quit);

        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_resize_keeps_state() {
        let mut app = app();
        type_text(&mut app, "draft");
        handle_event(&mut app, AppEvent::Resize).unwrap();
        assert_eq!(app.controller.input.text(), "draft");
        assert!(!app.should_quit);
    }
}

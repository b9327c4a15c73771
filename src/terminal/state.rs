use ratatui::widgets::ListState;

use crate::domain::email::MessageId;
use crate::error::SessionError;
use crate::session::{Draft, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Message,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    EditDraft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

/// Shell-side view state wrapped around the session.
pub struct AppState {
    pub session: SessionState,
    pub list_state: ListState,
    pub focus: Focus,
    pub input: InputMode,

    /// Shown only for the message it was produced for.
    pub summary: Option<String>,
    pub draft: Option<Draft>,
    pub body_scroll: u16,

    pub status: Option<Status>,
}

impl AppState {
    pub fn new(session: SessionState) -> Self {
        let mut s = Self {
            session,
            list_state: ListState::default(),
            focus: Focus::List,
            input: InputMode::Normal,
            summary: None,
            draft: None,
            body_scroll: 0,
            status: None,
        };
        s.list_state.select(Some(0));
        s
    }

    pub fn move_selection(&mut self, delta: i32, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as i32;
        let next = (cur + delta).clamp(0, len as i32 - 1) as usize;
        self.list_state.select(Some(next));
    }

    /// Keep the cursor inside a list that may just have shrunk (search, refresh).
    pub fn clamp_cursor(&mut self, len: usize) {
        match (len, self.list_state.selected()) {
            (0, _) => self.list_state.select(None),
            (_, None) => self.list_state.select(Some(0)),
            (n, Some(i)) if i >= n => self.list_state.select(Some(n - 1)),
            _ => {}
        }
    }

    /// Place the cursor on `id` when it is among `visible`.
    pub fn cursor_to(&mut self, visible: &[MessageId], id: &MessageId) {
        if let Some(pos) = visible.iter().position(|v| v == id) {
            self.list_state.select(Some(pos));
        }
    }

    pub fn scroll_body(&mut self, delta: i32) {
        if delta < 0 {
            self.body_scroll = self.body_scroll.saturating_sub((-delta) as u16);
        } else {
            self.body_scroll = self.body_scroll.saturating_add(delta as u16);
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::List => Focus::Message,
            Focus::Message => Focus::List,
        };
    }

    /// A new message was opened: results produced for the previous one go away.
    pub fn on_opened(&mut self, next: SessionState) {
        self.session = next;
        self.summary = None;
        self.draft = None;
        self.body_scroll = 0;
        self.focus = Focus::Message;
        self.status = None;
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn fail(&mut self, action: &str, err: &SessionError) {
        log::warn!("{action} failed: {err}");
        let text = if err.is_not_found() {
            "Message unavailable (it may have been deleted)".to_string()
        } else {
            format!("{action} failed: {err}")
        };
        self.status = Some(Status {
            text,
            is_error: true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn cursor_is_clamped_to_the_list() {
        let mut app = AppState::new(SessionState::new());
        app.move_selection(5, 3);
        assert_eq!(app.list_state.selected(), Some(2));
        app.move_selection(-9, 3);
        assert_eq!(app.list_state.selected(), Some(0));

        app.list_state.select(Some(4));
        app.clamp_cursor(2);
        assert_eq!(app.list_state.selected(), Some(1));
        app.clamp_cursor(0);
        assert_eq!(app.list_state.selected(), None);
    }

    #[test]
    fn opening_a_message_drops_stale_results() {
        let mut app = AppState::new(SessionState::new());
        app.summary = Some("old".into());
        app.draft = Some(Draft::new("old"));
        app.on_opened(SessionState::new());
        assert!(app.summary.is_none());
        assert!(app.draft.is_none());
        assert_eq!(app.focus, Focus::Message);
    }

    #[test]
    fn not_found_is_reported_as_unavailable() {
        let mut app = AppState::new(SessionState::new());
        let err = SessionError::Provider(ProviderError::NotFound(MessageId::new("9")));
        app.fail("Open", &err);
        let status = app.status.unwrap();
        assert!(status.is_error);
        assert!(status.text.starts_with("Message unavailable"));
    }
}

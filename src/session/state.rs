use crate::domain::email::{MessageDetail, MessageId, MessageSummary};

/// Everything an action handler may read or change. Handlers take the current
/// state by reference and return the next one, so a failed action leaves the
/// caller's state untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub authenticated: bool,
    pub selected_id: Option<MessageId>,
    pub highlighted_id: Option<MessageId>,
    pub search_term: String,
    /// Detail fetched by the latest `select`.
    pub opened: Option<MessageDetail>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) -> Self {
        Self::default()
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected_id = None;
        self.highlighted_id = None;
        self.opened = None;
    }
}

/// An editable reply suggestion. Edits are never written anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
}

impl Draft {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn push(&mut self, ch: char) {
        self.text.push(ch);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }
}

/// Case-insensitive substring match on subject; an empty term matches everything.
pub fn matches_search(message: &MessageSummary, term: &str) -> bool {
    message
        .subject
        .to_lowercase()
        .contains(&term.to_lowercase())
}

use crate::ai::{ResponseSuggester, Summarizer, TextGenerator};
use crate::domain::email::{MessageId, MessageSummary};
use crate::error::SessionError;
use crate::mail::MailClient;
use crate::session::state::{Draft, SessionState, matches_search};

/// Reacts to user actions by calling the adapters and producing the next state.
pub struct SessionController<M, S, G>
where
    M: MailClient,
    S: Summarizer,
    G: TextGenerator,
{
    mail: M,
    summarizer: S,
    responder: ResponseSuggester<G>,
    max_results: u32,
    messages: Vec<MessageSummary>,
}

impl<M, S, G> SessionController<M, S, G>
where
    M: MailClient,
    S: Summarizer,
    G: TextGenerator,
{
    pub fn new(mail: M, summarizer: S, responder: ResponseSuggester<G>, max_results: u32) -> Self {
        Self {
            mail,
            summarizer,
            responder,
            max_results,
            messages: Vec::new(),
        }
    }

    /// Messages from the most recent list fetch, in provider order.
    pub fn messages(&self) -> &[MessageSummary] {
        &self.messages
    }

    pub fn mail(&self) -> &M {
        &self.mail
    }

    /// The one-way `Unauthenticated -> Authenticated` transition. Call once the
    /// credential is in hand and the mail client is built.
    pub fn authenticate(&self, state: &SessionState) -> Result<SessionState, SessionError> {
        if state.authenticated {
            return Err(SessionError::InvalidState("session is already authenticated"));
        }
        Ok(SessionState {
            authenticated: true,
            ..state.clone()
        })
    }

    /// Re-list the inbox. A selection that is no longer listed is dropped.
    pub fn refresh(&mut self, state: &SessionState) -> Result<SessionState, SessionError> {
        require_auth(state)?;
        let messages = self.mail.list_messages(self.max_results)?;

        let mut next = state.clone();
        let still_listed = next
            .selected_id
            .as_ref()
            .is_some_and(|id| messages.iter().any(|m| &m.id == id));
        if !still_listed && next.selected_id.is_some() {
            log::info!("selected message left the inbox listing; clearing selection");
            next.clear_selection();
        }

        self.messages = messages;
        Ok(next)
    }

    /// Record the search term. Filtering happens in `visible`; nothing is re-fetched.
    pub fn search(&self, state: &SessionState, term: &str) -> Result<SessionState, SessionError> {
        require_auth(state)?;
        Ok(SessionState {
            search_term: term.to_string(),
            ..state.clone()
        })
    }

    /// Messages of the last fetch matching the current search term.
    pub fn visible(&self, state: &SessionState) -> Vec<&MessageSummary> {
        self.messages
            .iter()
            .filter(|m| matches_search(m, &state.search_term))
            .collect()
    }

    /// Fetches the message every time, even when it is already open.
    pub fn select(&self, state: &SessionState, id: &MessageId) -> Result<SessionState, SessionError> {
        require_auth(state)?;
        if !self.messages.iter().any(|m| &m.id == id) {
            return Err(SessionError::InvalidState("message is not in the current listing"));
        }

        let detail = self.mail.get_message(id)?;
        Ok(SessionState {
            selected_id: Some(id.clone()),
            highlighted_id: Some(id.clone()),
            opened: Some(detail),
            ..state.clone()
        })
    }

    pub fn summarize(&self, state: &SessionState) -> Result<String, SessionError> {
        let body = opened_body(state)?;
        Ok(self.summarizer.summarize(body)?)
    }

    pub fn generate_response(&self, state: &SessionState) -> Result<Draft, SessionError> {
        let body = opened_body(state)?;
        Ok(Draft::new(self.responder.suggest_response(body)?))
    }

    pub fn logout(&mut self, state: &SessionState) -> SessionState {
        self.messages.clear();
        state.reset()
    }
}

fn require_auth(state: &SessionState) -> Result<(), SessionError> {
    if state.authenticated {
        Ok(())
    } else {
        Err(SessionError::InvalidState("session is not authenticated"))
    }
}

fn opened_body(state: &SessionState) -> Result<&str, SessionError> {
    require_auth(state)?;
    let selected = state
        .selected_id
        .as_ref()
        .ok_or(SessionError::InvalidState("no message is selected"))?;
    match &state.opened {
        Some(detail) if &detail.id == selected => Ok(detail.body.as_str()),
        _ => Err(SessionError::InvalidState("selected message has not been fetched")),
    }
}

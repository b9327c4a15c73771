use crossterm::event::{KeyCode, KeyEvent};

use crate::ai::{Summarizer, TextGenerator};
use crate::domain::email::MessageId;
use crate::mail::MailClient;
use crate::session::SessionController;
use crate::terminal::state::{AppState, Focus, InputMode};

/// Label to show while a blocking call for `key` is in flight.
pub fn busy_label(key: &KeyEvent, app: &AppState) -> Option<&'static str> {
    if app.input != InputMode::Normal {
        return None;
    }
    match key.code {
        KeyCode::Char('r') => Some("Refreshing inbox..."),
        KeyCode::Char('s') if app.session.selected_id.is_some() => Some("Summarizing..."),
        KeyCode::Char('g') if app.session.selected_id.is_some() => Some("Generating response..."),
        KeyCode::Enter if app.focus == Focus::List => Some("Opening message..."),
        _ => None,
    }
}

/// Returns true when the shell should exit.
pub fn handle_key<M, S, G>(key: KeyEvent, app: &mut AppState, ctl: &mut SessionController<M, S, G>) -> bool
where
    M: MailClient,
    S: Summarizer,
    G: TextGenerator,
{
    match app.input {
        InputMode::Search => {
            handle_search_keys(key, app, ctl);
            return false;
        }
        InputMode::EditDraft => {
            handle_draft_keys(key, app);
            return false;
        }
        InputMode::Normal => {}
    }

    match key.code {
        KeyCode::Char('q') => return true,

        KeyCode::Esc => {
            if app.focus == Focus::Message {
                app.focus = Focus::List;
                return false;
            }
            return true;
        }

        KeyCode::Tab => {
            app.toggle_focus();
            return false;
        }

        KeyCode::Char('/') => {
            app.input = InputMode::Search;
            app.focus = Focus::List;
            return false;
        }

        KeyCode::Char('r') => {
            refresh(app, ctl);
            return false;
        }

        KeyCode::Char('s') => {
            match ctl.summarize(&app.session) {
                Ok(summary) => {
                    app.summary = Some(summary);
                    app.status = None;
                }
                Err(e) => app.fail("Summarize", &e),
            }
            return false;
        }

        KeyCode::Char('g') => {
            match ctl.generate_response(&app.session) {
                Ok(draft) => {
                    app.draft = Some(draft);
                    app.info("Press e to edit the suggested response");
                }
                Err(e) => app.fail("Generate response", &e),
            }
            return false;
        }

        KeyCode::Char('e') => {
            if app.draft.is_some() {
                app.input = InputMode::EditDraft;
            }
            return false;
        }

        KeyCode::Char('L') => {
            app.session = ctl.logout(&app.session);
            return true;
        }

        _ => {}
    }

    match app.focus {
        Focus::List => handle_list_keys(key, app, ctl),
        Focus::Message => handle_message_keys(key, app),
    }
    false
}

fn visible_ids<M, S, G>(app: &AppState, ctl: &SessionController<M, S, G>) -> Vec<MessageId>
where
    M: MailClient,
    S: Summarizer,
    G: TextGenerator,
{
    ctl.visible(&app.session)
        .into_iter()
        .map(|m| m.id.clone())
        .collect()
}

/// Re-list the inbox, reporting failures in the status line.
pub fn refresh<M, S, G>(app: &mut AppState, ctl: &mut SessionController<M, S, G>)
where
    M: MailClient,
    S: Summarizer,
    G: TextGenerator,
{
    match ctl.refresh(&app.session) {
        Ok(next) => {
            if next.selected_id.is_none() {
                app.summary = None;
                app.draft = None;
            }
            app.session = next;
            let ids = visible_ids(app, ctl);
            app.clamp_cursor(ids.len());
            app.info(format!("Fetched {} messages", ctl.messages().len()));
        }
        Err(e) => app.fail("Refresh", &e),
    }
}

fn handle_list_keys<M, S, G>(key: KeyEvent, app: &mut AppState, ctl: &mut SessionController<M, S, G>)
where
    M: MailClient,
    S: Summarizer,
    G: TextGenerator,
{
    let ids = visible_ids(app, ctl);
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1, ids.len()),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1, ids.len()),
        KeyCode::Home => {
            if !ids.is_empty() {
                app.list_state.select(Some(0));
            }
        }
        KeyCode::End => app.move_selection(ids.len() as i32, ids.len()),
        KeyCode::Enter => {
            let Some(id) = app.list_state.selected().and_then(|i| ids.get(i)) else {
                app.status = None;
                return;
            };
            match ctl.select(&app.session, id) {
                Ok(next) => app.on_opened(next),
                Err(e) => app.fail("Open", &e),
            }
        }
        _ => {}
    }
}

fn handle_message_keys(key: KeyEvent, app: &mut AppState) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_body(1),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_body(-1),
        KeyCode::PageDown => app.scroll_body(10),
        KeyCode::PageUp => app.scroll_body(-10),
        KeyCode::Home => app.body_scroll = 0,
        _ => {}
    }
}

fn handle_search_keys<M, S, G>(key: KeyEvent, app: &mut AppState, ctl: &mut SessionController<M, S, G>)
where
    M: MailClient,
    S: Summarizer,
    G: TextGenerator,
{
    let mut term = app.session.search_term.clone();
    match key.code {
        KeyCode::Enter => {
            app.input = InputMode::Normal;
            return;
        }
        KeyCode::Esc => {
            app.input = InputMode::Normal;
            term.clear();
        }
        KeyCode::Backspace => {
            term.pop();
        }
        KeyCode::Char(c) => term.push(c),
        _ => return,
    }

    match ctl.search(&app.session, &term) {
        Ok(next) => {
            app.session = next;
            let ids = visible_ids(app, ctl);
            app.clamp_cursor(ids.len());
            if let Some(h) = app.session.highlighted_id.clone() {
                app.cursor_to(&ids, &h);
            }
        }
        Err(e) => app.fail("Search", &e),
    }
}

fn handle_draft_keys(key: KeyEvent, app: &mut AppState) {
    let Some(draft) = app.draft.as_mut() else {
        app.input = InputMode::Normal;
        return;
    };
    match key.code {
        KeyCode::Esc => app.input = InputMode::Normal,
        KeyCode::Enter => draft.push('\n'),
        KeyCode::Backspace => draft.backspace(),
        KeyCode::Char(c) => draft.push(c),
        _ => {}
    }
}

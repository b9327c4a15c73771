pub mod events;
pub mod state;
pub mod ui;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;

use crate::ai::{Summarizer, TextGenerator};
use crate::mail::MailClient;
use crate::session::{SessionController, SessionState};
use crate::terminal::state::AppState;

/// Run the inbox shell until the user quits; hands back the final session state.
/// The first listing is fetched inside the shell so a provider error is shown, not fatal.
pub fn run_tui<M, S, G>(ctl: &mut SessionController<M, S, G>, session: SessionState) -> Result<SessionState>
where
    M: MailClient,
    S: Summarizer,
    G: TextGenerator,
{
    let mut app = AppState::new(session);
    let terminal = ratatui::init();
    let result = run(terminal, &mut app, ctl);
    ratatui::restore();
    result.map(|()| app.session)
}

fn draw<M, S, G>(terminal: &mut DefaultTerminal, app: &mut AppState, ctl: &SessionController<M, S, G>) -> Result<()>
where
    M: MailClient,
    S: Summarizer,
    G: TextGenerator,
{
    let visible = ctl.visible(&app.session);
    terminal.draw(|f| ui::render(f, app, &visible))?;
    Ok(())
}

fn run<M, S, G>(mut terminal: DefaultTerminal, app: &mut AppState, ctl: &mut SessionController<M, S, G>) -> Result<()>
where
    M: MailClient,
    S: Summarizer,
    G: TextGenerator,
{
    app.info("Loading inbox...");
    draw(&mut terminal, app, ctl)?;
    events::refresh(app, ctl);

    loop {
        draw(&mut terminal, app, ctl)?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // calls block the loop; paint a notice first
        if let Some(label) = events::busy_label(&key, app) {
            app.info(label);
            draw(&mut terminal, app, ctl)?;
        }

        if events::handle_key(key, app, ctl) {
            return Ok(());
        }
    }
}

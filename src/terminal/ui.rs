use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::domain::email::MessageSummary;
use crate::terminal::state::{AppState, Focus, InputMode};

const SUBJECT_WIDTH: usize = 30;

/// "3. Quarterly planning for th... - Ann <ann@example.com>"
pub fn list_label(index: usize, m: &MessageSummary) -> String {
    let subject: String = m.subject.chars().take(SUBJECT_WIDTH).collect();
    format!("{}. {}... - {}", index + 1, subject, m.sender)
}

fn border(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

pub fn render(f: &mut Frame, app: &mut AppState, visible: &[&MessageSummary]) {
    let [main, status_area, footer] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
            .margin(1)
            .areas(main);

    render_sidebar(f, app, visible, left);
    render_message(f, app, right);

    if let Some(status) = &app.status {
        let style = if status.is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Cyan)
        };
        f.render_widget(Paragraph::new(status.text.as_str()).style(style), status_area);
    }

    f.render_widget(Paragraph::new(hint_line(app.input)), footer);
}

fn render_sidebar(f: &mut Frame, app: &mut AppState, visible: &[&MessageSummary], area: Rect) {
    let [search_area, list_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let searching = app.input == InputMode::Search;
    let mut search_text = app.session.search_term.clone();
    if searching {
        search_text.push('_');
    }
    let search = Paragraph::new(search_text).block(
        Block::default()
            .title(" Search Emails ")
            .borders(Borders::ALL)
            .border_style(border(searching)),
    );
    f.render_widget(search, search_area);

    let highlighted = app.session.highlighted_id.as_ref();
    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let mut style = Style::default();
            if Some(&m.id) == highlighted {
                style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
            }
            let label = Span::styled(list_label(i, m), style);
            let date = Span::styled(m.date.clone(), Style::default().fg(Color::Gray));
            ListItem::new(Text::from(vec![Line::from(label), Line::from(date)]))
        })
        .collect();

    let title = format!(" Emails ({}) ", visible.len());
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border(app.focus == Focus::List && !searching)),
        )
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    f.render_stateful_widget(list, list_area, &mut app.list_state);
}

fn render_message(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .title(" Smart Email Assistant ")
        .borders(Borders::ALL)
        .border_style(border(app.focus == Focus::Message));

    let Some(detail) = &app.session.opened else {
        let p = Paragraph::new(
            "Select an email on the left (Enter) to view, summarize (s)\nand generate a response (g).",
        )
        .block(block)
        .wrap(Wrap { trim: false });
        f.render_widget(p, area);
        return;
    };

    let mut constraints = vec![Constraint::Min(5)];
    if app.summary.is_some() {
        constraints.push(Constraint::Length(8));
    }
    if app.draft.is_some() {
        constraints.push(Constraint::Length(12));
    }
    let chunks = Layout::vertical(constraints).split(area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(format!("Email from {}:", detail.sender), bold)),
        Line::from(Span::styled(detail.subject.clone(), Style::default().fg(Color::Gray))),
        Line::from(""),
    ];
    lines.extend(detail.body.lines().map(|l| Line::from(l.to_string())));

    let body = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.body_scroll, 0));
    f.render_widget(body, chunks[0]);

    let mut next = 1;
    if let Some(summary) = &app.summary {
        let p = Paragraph::new(summary.as_str())
            .block(Block::default().title(" Summary ").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(p, chunks[next]);
        next += 1;
    }

    if let Some(draft) = &app.draft {
        let editing = app.input == InputMode::EditDraft;
        let title = if editing {
            " Edit your response before sending (Esc to stop editing) "
        } else {
            " Suggested Response (e to edit) "
        };
        let mut text = draft.text.clone();
        if editing {
            text.push('_');
        }
        let p = Paragraph::new(text)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(border(editing)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(p, chunks[next]);
    }
}

fn hint_line(mode: InputMode) -> Line<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().add_modifier(Modifier::BOLD));
    match mode {
        InputMode::Search => Line::from(vec![
            Span::raw("type to filter  "),
            key("Enter"),
            Span::raw(" done  "),
            key("Esc"),
            Span::raw(" clear"),
        ]),
        InputMode::EditDraft => Line::from(vec![
            Span::raw("editing response  "),
            key("Esc"),
            Span::raw(" done"),
        ]),
        InputMode::Normal => Line::from(vec![
            key("j/k"),
            Span::raw(" move  "),
            key("Enter"),
            Span::raw(" open  "),
            key("/"),
            Span::raw(" search  "),
            key("s"),
            Span::raw(" summarize  "),
            key("g"),
            Span::raw(" reply  "),
            key("r"),
            Span::raw(" refresh  "),
            key("Tab"),
            Span::raw(" focus  "),
            key("q"),
            Span::raw(" quit"),
        ]),
    }
}

//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use agenda_core::{ContactField, Mode};

use super::app::{App, InputMode};

/// Width of the label column in the detail pane and the form
const LABEL_WIDTH: usize = 18;

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    // Create vertical layout for status bar at the bottom
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(outer_chunks[0]);

    draw_list_pane(frame, app, pane_chunks[0]);
    draw_detail_pane(frame, app, pane_chunks[1]);

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, outer_chunks[1]),
        InputMode::Search => draw_search_input(frame, app, outer_chunks[1]),
    }

    // Overlays, at most one of which is active at a time
    if app.form_open() {
        draw_form(frame, app);
    } else if app.screen.view().opening_edit {
        draw_loading(frame);
    } else if app.pending_delete.is_some() {
        draw_delete_confirm(frame, app);
    }

    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Draw the contact list (left)
fn draw_list_pane(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.screen.view();
    let max_len = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = view
        .contacts
        .iter()
        .map(|contact| {
            let name = contact.full_name();
            let name = if name.is_empty() {
                format!("#{}", contact.id)
            } else {
                name
            };

            let secondary = [contact.tel.as_str(), contact.correo.as_str()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("  ");

            ListItem::new(vec![
                Line::from(Span::raw(clip(&name, max_len))),
                Line::from(Span::styled(
                    clip(&secondary, max_len.saturating_sub(2)),
                    Style::default().add_modifier(Modifier::DIM),
                )),
            ])
        })
        .collect();

    let title = if view.search_term.is_empty() {
        format!(" Contacts ({}) ", view.total)
    } else {
        format!(
            " Contacts ({}/{}) /{} ",
            view.contacts.len(),
            view.total,
            view.search_term
        )
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED),
    );

    let mut state = ListState::default();
    if !view.contacts.is_empty() {
        state.select(Some(app.selected));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the detail pane (right)
fn draw_detail_pane(frame: &mut Frame, app: &App, area: Rect) {
    let viewing = matches!(app.screen.mode(), Mode::Viewing(_));

    let border_style = if viewing {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let content = if let Some(contact) = app.detail_contact() {
        let mut lines = vec![Line::from(vec![
            Span::styled(
                format!("{:<LABEL_WIDTH$}", "ID"),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(contact.id.to_string()),
        ])];

        for field in ContactField::ALL {
            let value = contact.field(field);
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<LABEL_WIDTH$}", field.label()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(if value.is_empty() { "-" } else { value }),
            ]));
        }

        lines
    } else {
        vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "No contact selected",
                Style::default().add_modifier(Modifier::DIM),
            )]),
        ]
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Draw the edit/create form
fn draw_form(frame: &mut Frame, app: &App) {
    let title = match app.screen.mode() {
        Mode::Editing(session) => format!(" Edit contact #{} ", session.id()),
        _ => " New contact ".to_string(),
    };

    let height = ContactField::ALL.len() as u16 * 2 + 5;
    let popup_area = centered(frame.area(), 64, height);
    frame.render_widget(Clear, popup_area);

    let focused = app.focused_field();
    let mut lines = vec![Line::from("")];
    let mut cursor = None;

    for (row, field) in ContactField::ALL.into_iter().enumerate() {
        let value = app.form_value(field);
        let is_focused = field == focused;
        let label_style = if is_focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {:<LABEL_WIDTH$}", field.label()), label_style),
            Span::raw(value),
        ]));
        lines.push(Line::from(""));

        if is_focused {
            let x = popup_area.x + 2 + LABEL_WIDTH as u16 + value.chars().count() as u16;
            let y = popup_area.y + 2 + row as u16 * 2;
            cursor = Some((x.min(popup_area.right().saturating_sub(2)), y));
        }
    }

    let hint = if app.saving.is_some() {
        "Saving..."
    } else {
        "Tab/↑↓ move  Enter save  Esc cancel"
    };
    lines.push(Line::from(Span::styled(
        format!(" {}", hint),
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(Paragraph::new(lines).block(block), popup_area);

    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}

/// Draw the placeholder shown while a contact is fetched for editing
fn draw_loading(frame: &mut Frame) {
    let popup_area = centered(frame.area(), 30, 3);
    frame.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(Line::from(Span::styled(
        " Loading contact...",
        Style::default().add_modifier(Modifier::DIM),
    )))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, popup_area);
}

/// Draw the delete confirmation popup
fn draw_delete_confirm(frame: &mut Frame, app: &App) {
    let name = app
        .pending_delete_contact()
        .map(|c| c.full_name())
        .unwrap_or_default();

    let popup_area = centered(frame.area(), 50, 5);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(format!(" Delete '{}'?", name)),
        Line::from(""),
        Line::from(Span::styled(
            " y: delete   any other key: cancel",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (content, style) = if let Some(msg) = &app.status_message {
        let style = if app.status_is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        (msg.clone(), style)
    } else if app.is_busy() {
        (
            "Working...".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )
    } else {
        (
            "enter:view  e:edit  n:new  d:del  /:search  r:reload  ?:help  q:quit".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )
    };

    frame.render_widget(Paragraph::new(content).style(style), area);
}

/// Draw search input at the bottom
fn draw_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let prefix = "/";

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Cyan)),
        Span::raw(app.search_input.as_str()),
        Span::styled(
            format!("  ({} matches)", app.screen.contacts().len()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);

    // Position cursor
    let cursor_x = area.x + prefix.len() as u16 + app.search_cursor as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = centered(frame.area(), 50, 22);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("List:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  g/G         Jump to first/last"),
        Line::from("  Enter       View contact"),
        Line::from("  Esc         Close detail"),
        Line::from("  /           Search by name or surname"),
        Line::from("  r           Reload from service"),
        Line::from(""),
        Line::from("Contacts:"),
        Line::from("  n           New contact"),
        Line::from("  e           Edit contact"),
        Line::from("  d           Delete contact"),
        Line::from(""),
        Line::from("Form:"),
        Line::from("  Tab, ↑/↓    Move between fields"),
        Line::from("  Ctrl+U      Clear field"),
        Line::from("  Enter/Esc   Save/Cancel"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
}

/// Centered popup area, shrunk to fit small terminals
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Clip to `max` characters with a trailing ellipsis
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

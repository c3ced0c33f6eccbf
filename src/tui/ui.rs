use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, HighlightSpacing, List, ListItem, Paragraph, Scrollbar,
        ScrollbarOrientation, Wrap,
    },
};

use crate::tui::app::{
    App, AppMessageType, AttemptWidget, ChallengeListWidget, CurrentScreen, InputMode,
};

fn highlight_style() -> Style {
    Style::new().bg(Color::Blue).add_modifier(Modifier::BOLD)
}

fn vertical_scrollbar() -> Scrollbar<'static> {
    Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"))
}

fn help_bar(items: Vec<Span<'static>>) -> Paragraph<'static> {
    Paragraph::new(Line::from(items))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::NONE))
}

pub fn draw_challenge_list(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(100),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let items: Vec<ListItem> = app
        .visible
        .iter()
        .filter_map(|&i| app.catalog.get(i))
        .map(|c| {
            ListItem::new(Line::from(format!(
                "{:<10} {:<12} target: {}",
                c.name(),
                c.prompt().trim(),
                c.target_hex()
            )))
            .style(Style::new().fg(Color::Green))
        })
        .collect();

    let list_style = if *app.ui.selected_widgets.challenge_list_widget()
        == ChallengeListWidget::ChallengeList
    {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let list_widget = List::new(items)
        .highlight_style(highlight_style())
        .highlight_symbol(">> ")
        .highlight_spacing(HighlightSpacing::Always)
        .block(Block::bordered().title("Challenges").style(list_style));
    frame.render_stateful_widget(list_widget, chunks[0], &mut app.ui.list_states.challenges);
    frame.render_stateful_widget(
        vertical_scrollbar(),
        chunks[0],
        &mut app.ui.scroll_states.challenges_vertical,
    );

    let filter = Paragraph::new(app.ui.input_buffers.challenge_filter.as_str())
        .style(match app.ui.input_mode {
            InputMode::Normal => Style::default(),
            InputMode::Insert => Style::default().fg(Color::Yellow),
        })
        .block(Block::bordered().title("Filter"));
    frame.render_widget(filter, chunks[1]);

    if app.ui.input_mode == InputMode::Insert {
        frame.set_cursor_position(Position::new(
            chunks[1].x + app.ui.character_index as u16 + 1,
            chunks[1].y + 1,
        ));
    }

    frame.render_widget(
        help_bar(vec![
            Span::from("↑/k: Up  ").fg(Color::Green),
            Span::from("↓/j: Down  ").fg(Color::Green),
            Span::from("Tab: Filter/List  ").fg(Color::Green),
            Span::from("Enter: Select  ").fg(Color::Green),
            Span::from("q: Quit").fg(Color::Green),
        ]),
        chunks[2],
    );
}

fn get_active_widget_style(app: &App, widget: AttemptWidget) -> Style {
    if *app.ui.selected_widgets.attempt_widget() == widget {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn get_message_style(app: &App) -> Style {
    let style = match app.app_message.msg_type {
        AppMessageType::Info => Style::default(),
        AppMessageType::Error => Style::default().bg(Color::Red),
    };

    if *app.ui.selected_widgets.attempt_widget() == AttemptWidget::AppMessage {
        return style.fg(Color::Yellow);
    }
    style
}

pub fn draw_attempt_screen(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(4),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let (name, prompt) = app
        .selected_crackme()
        .map(|c| (c.name(), c.prompt().trim()))
        .unwrap_or(("?", ""));
    let mode = if app.hex_input { "hex" } else { "text" };

    let input = Paragraph::new(app.ui.input_buffers.candidate.as_str())
        .style(get_active_widget_style(app, AttemptWidget::CandidateInput))
        .block(Block::bordered().title(format!("{name} - {prompt} ({mode})")));
    frame.render_widget(input, chunks[0]);

    if app.ui.input_mode == InputMode::Insert {
        frame.set_cursor_position(Position::new(
            chunks[0].x + app.ui.character_index as u16 + 1,
            chunks[0].y + 1,
        ));
    }

    let items: Vec<ListItem> = app
        .attempts
        .iter()
        .map(|attempt| {
            let color = if attempt.verdict.accepted {
                Color::Green
            } else {
                Color::Red
            };
            ListItem::new(Line::from(format!(
                "{} | {}",
                attempt.display_candidate(),
                attempt.verdict
            )))
            .style(Style::new().fg(color))
        })
        .collect();

    let attempts = List::new(items)
        .highlight_style(highlight_style())
        .highlight_symbol(">> ")
        .highlight_spacing(HighlightSpacing::Always)
        .block(
            Block::bordered()
                .title("Attempts")
                .style(get_active_widget_style(app, AttemptWidget::Attempts)),
        );
    frame.render_stateful_widget(attempts, chunks[1], &mut app.ui.list_states.attempts);
    frame.render_stateful_widget(
        vertical_scrollbar(),
        chunks[1],
        &mut app.ui.scroll_states.attempts_vertical,
    );

    let msg_box = Paragraph::new(app.app_message.msg.as_str())
        .style(get_message_style(app))
        .wrap(Wrap { trim: true })
        .block(Block::bordered().title("App Message"));
    frame.render_widget(msg_box, chunks[2]);

    let mut help_items = vec![Span::from("Tab/Shift+Tab: Change Pane  ").fg(Color::Green)];
    match app.ui.input_mode {
        InputMode::Insert => help_items.extend(vec![
            Span::from("Enter: Try  ").fg(Color::Green),
            Span::from("Esc: Normal Mode  ").fg(Color::Green),
        ]),
        InputMode::Normal => help_items.extend(vec![
            Span::from("i: Edit  ").fg(Color::Green),
            Span::from("x: Text/Hex  ").fg(Color::Green),
            Span::from("s: Solve  ").fg(Color::Green),
            Span::from("c: Copy  ").fg(Color::Green),
            Span::from("d: Clear  ").fg(Color::Green),
            Span::from("Esc: Back  ").fg(Color::Green),
            Span::from("q: Quit").fg(Color::Green),
        ]),
    }
    frame.render_widget(help_bar(help_items), chunks[3]);
}

pub fn draw_exit_screen(frame: &mut Frame, _app: &mut App) {
    frame.render_widget(Clear, frame.area());

    let popup_block = Block::default()
        .title(" Exit ")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let exit_text = Text::from(vec![
        Line::from(""),
        Line::styled(
            "Would you like to exit? (Y/N)",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
    ]);

    let exit_paragraph = Paragraph::new(exit_text)
        .alignment(Alignment::Center)
        .block(popup_block)
        .wrap(Wrap { trim: false });

    let area = centered_rect(50, 30, frame.area());
    frame.render_widget(exit_paragraph, area);
}

pub fn draw_ui(frame: &mut Frame, app: &mut App) {
    match app.state.current_screen {
        CurrentScreen::ChallengeList => draw_challenge_list(frame, app),
        CurrentScreen::Attempt => draw_attempt_screen(frame, app),
        CurrentScreen::Exiting => draw_exit_screen(frame, app),
    }
}

/// Rect of `percent_x` by `percent_y` of `r`, centered in it.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

use crate::tui::app::{App, AppState};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};

pub fn draw(f: &mut Frame, app: &mut App) {
    match &app.state {
        AppState::Form => draw_form(f, app),
        AppState::Processing { video_id } => draw_processing(f, app, video_id),
        AppState::Results => draw_results(f, app),
    }
}

fn draw_form(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // URL input
            Constraint::Length(3), // Languages input
            Constraint::Length(4), // Toggles
            Constraint::Length(3), // Status
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    // Title
    let title = Paragraph::new("YouTube Notes")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    app.url_input.render(f, chunks[1]);
    app.languages_input.render(f, chunks[2]);

    // Toggles
    let options_block = Block::default().borders(Borders::ALL).title("Options");
    f.render_widget(options_block, chunks[3]);

    let option_area = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(chunks[3]);

    let keywords_style = if app.input_focus == 2 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let cloud_style = if app.input_focus == 3 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };

    let keywords_box = if app.extract_keywords { "☑" } else { "☐" };
    let cloud_box = if app.render_cloud { "☑" } else { "☐" };

    let keywords_text =
        Paragraph::new(format!("{keywords_box} Extract keywords")).style(keywords_style);
    f.render_widget(keywords_text, option_area[0]);

    let cloud_text =
        Paragraph::new(format!("{cloud_box} Save keyword cloud PNG")).style(cloud_style);
    f.render_widget(cloud_text, option_area[1]);

    // Status: warnings and errors from the last attempt
    let notice = app.form_notice.as_deref().unwrap_or("Ready");
    let notice_style = if app.form_notice.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };
    let status = Paragraph::new(notice)
        .style(notice_style)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, chunks[4]);

    // Help
    let help = Paragraph::new("[Enter] Generate  [Tab] Next  [Space] Toggle  [Esc] Quit")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[5]);
}

fn draw_processing(f: &mut Frame, app: &App, video_id: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(1),    // Progress area
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let title = Paragraph::new("Processing...")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    app.progress_bar.render(f, chunks[1], video_id);

    let help = Paragraph::new("[Esc] Cancel")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn draw_results(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Notes
            Constraint::Length(3), // Player and artifacts
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    if let Some(viewer) = &mut app.notes_viewer {
        app.viewer_height = chunks[0].height;
        viewer.render(f, chunks[0]);
    }

    let player_line = match (&app.notes, &app.cloud_note) {
        (Some(notes), Some(note)) => format!("{}  |  {}", notes.watch_url, note),
        (Some(notes), None) => notes.watch_url.clone(),
        _ => String::new(),
    };
    let player = Paragraph::new(player_line)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title("Player"));
    f.render_widget(player, chunks[1]);

    let help = Paragraph::new("[↑↓] Scroll  [PgUp/PgDn] Page  [Esc] New video  [q] Quit")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

const MAX_LOGS: usize = 10;

/// Progress gauge with a status line and a rolling, timestamped log panel.
pub struct ProgressBar {
    pub progress: f64,
    pub message: String,
    pub logs: Vec<String>,
    started: Option<DateTime<Local>>,
}

impl ProgressBar {
    pub fn new() -> Self {
        Self {
            progress: 0.0,
            message: String::new(),
            logs: Vec::new(),
            started: None,
        }
    }

    /// Clears previous state and stamps the start of a new run.
    pub fn start(&mut self, message: &str) {
        self.reset();
        self.message = message.to_string();
        self.started = Some(Local::now());
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = progress.clamp(0.0, 1.0);
    }

    pub fn set_message(&mut self, message: String) {
        self.message = message;
    }

    pub fn add_log(&mut self, log: String) {
        let timestamp = Local::now().format("%H:%M:%S");
        self.logs.push(format!("[{timestamp}] {log}"));

        if self.logs.len() > MAX_LOGS {
            self.logs.remove(0);
        }
    }

    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.message.clear();
        self.logs.clear();
        self.started = None;
    }

    pub fn render(&self, f: &mut Frame, area: Rect, video_id: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Video id
                Constraint::Length(3), // Gauge
                Constraint::Length(1), // Status
                Constraint::Min(1),    // Logs
            ])
            .split(area);

        let video = Paragraph::new(format!("Video: {video_id}"))
            .style(Style::default().fg(Color::White));
        f.render_widget(video, chunks[0]);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(Color::Green))
            .percent((self.progress * 100.0) as u16);
        f.render_widget(gauge, chunks[1]);

        let elapsed = self
            .started
            .map(|t| (Local::now() - t).num_seconds())
            .unwrap_or(0);
        let status = Paragraph::new(format!("{} ({elapsed}s)", self.message))
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(status, chunks[2]);

        let log_lines: Vec<Line> = self
            .logs
            .iter()
            .map(|log| Line::from(Span::raw(log)))
            .collect();
        let logs =
            Paragraph::new(log_lines).block(Block::default().borders(Borders::ALL).title("Log"));
        f.render_widget(logs, chunks[3]);
    }
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::cli::Commands;
use crate::config::Config;
use crate::core::{
    CloudRenderer, NotesPipeline, NotesRequest, VideoId, VideoNotes, extract_video_id, format_notes,
};
use crate::error::Result;
use crate::tui::components::{InputField, NotesViewer, ProgressBar};
use crate::tui::events::AppEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Form,
    Processing { video_id: String },
    Results,
}

/// Progress reports sent from the background pipeline task to the UI loop.
#[derive(Debug)]
pub enum ProcessingEvent {
    Progress(f64),
    Status(String),
    Log(String),
    Done(Box<VideoNotes>),
    Failed(String),
}

pub struct App {
    pub state: AppState,
    pub should_quit: bool,

    // Form screen
    pub url_input: InputField,
    pub languages_input: InputField,
    pub extract_keywords: bool,
    pub render_cloud: bool,
    pub input_focus: usize,
    pub form_notice: Option<String>,

    // Processing screen
    pub progress_bar: ProgressBar,

    // Results screen
    pub notes: Option<VideoNotes>,
    pub notes_viewer: Option<NotesViewer>,
    pub viewer_height: u16,
    pub cloud_note: Option<String>,

    // Services
    pub pipeline: NotesPipeline,
    pub config: Config,

    // Async communication
    pub processing_tx: Option<mpsc::UnboundedSender<ProcessingEvent>>,
    pub processing_rx: Option<mpsc::UnboundedReceiver<ProcessingEvent>>,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;
        let pipeline = NotesPipeline::from_config(&config)?;
        Ok(Self::with_services(config, pipeline))
    }

    pub fn with_services(config: Config, pipeline: NotesPipeline) -> Self {
        let mut url_input = InputField::new("Video URL", "https://www.youtube.com/watch?v=...");
        url_input.focused = true;
        let mut languages_input = InputField::new("Languages", "en,es");
        languages_input.set_value("en");

        Self {
            state: AppState::Form,
            should_quit: false,

            url_input,
            languages_input,
            extract_keywords: false,
            render_cloud: false,
            input_focus: 0,
            form_notice: None,

            progress_bar: ProgressBar::new(),

            notes: None,
            notes_viewer: None,
            viewer_height: 0,
            cloud_note: None,

            pipeline,
            config,

            processing_tx: None,
            processing_rx: None,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => self.handle_tick(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }
        match &self.state {
            AppState::Form => self.handle_form_key(key),
            AppState::Processing { .. } => self.handle_processing_key(key),
            AppState::Results => self.handle_results_key(key),
        }
        Ok(())
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.cycle_input_focus();
            }
            KeyCode::Enter => {
                if self.input_focus < 2 {
                    self.cycle_input_focus();
                } else {
                    self.start_processing();
                }
            }
            KeyCode::Char(' ') if self.input_focus == 2 => {
                self.extract_keywords = !self.extract_keywords;
            }
            KeyCode::Char(' ') if self.input_focus == 3 => {
                self.render_cloud = !self.render_cloud;
            }
            _ => {
                if self.input_focus == 0 {
                    self.url_input.handle_key(key);
                } else if self.input_focus == 1 {
                    self.languages_input.handle_key(key);
                }
            }
        }
    }

    fn handle_processing_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            // Abandon the run. Dropping the channel ends delivery; the
            // task's remaining sends fail silently.
            self.processing_tx = None;
            self.processing_rx = None;
            self.progress_bar.reset();
            self.state = AppState::Form;
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                // Fresh link field for the next video; language preferences
                // and toggles are kept.
                self.url_input.clear();
                self.input_focus = 0;
                self.url_input.focused = true;
                self.languages_input.focused = false;
                self.state = AppState::Form;
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            _ => {
                if let Some(viewer) = &mut self.notes_viewer {
                    viewer.handle_key(key, self.viewer_height);
                }
            }
        }
    }

    fn handle_tick(&mut self) -> Result<()> {
        let mut events = Vec::new();
        if let Some(rx) = &mut self.processing_rx {
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }

        for event in events {
            match event {
                ProcessingEvent::Progress(progress) => self.progress_bar.set_progress(progress),
                ProcessingEvent::Status(status) => self.progress_bar.set_message(status),
                ProcessingEvent::Log(line) => self.progress_bar.add_log(line),
                ProcessingEvent::Done(notes) => self.finish(*notes),
                ProcessingEvent::Failed(reason) => {
                    self.form_notice = Some(reason);
                    self.progress_bar.reset();
                    self.state = AppState::Form;
                }
            }
        }
        Ok(())
    }

    fn cycle_input_focus(&mut self) {
        self.url_input.focused = false;
        self.languages_input.focused = false;

        self.input_focus = (self.input_focus + 1) % 4;

        match self.input_focus {
            0 => self.url_input.focused = true,
            1 => self.languages_input.focused = true,
            _ => {}
        }
    }

    fn start_processing(&mut self) {
        if !self.url_input.is_valid() {
            self.form_notice = Some("Please enter a video link first".to_string());
            return;
        }
        let video_id = match extract_video_id(&self.url_input.value) {
            Ok(id) => id,
            Err(e) => {
                self.form_notice = Some(e.to_string());
                return;
            }
        };

        let mut request = NotesRequest::new(self.url_input.value.clone());
        let languages = Commands::parse_languages(&self.languages_input.value);
        if !languages.is_empty() {
            request.languages = languages;
        }
        request.extract_keywords = self.extract_keywords || self.render_cloud;

        self.form_notice = None;
        self.cloud_note = None;
        self.state = AppState::Processing {
            video_id: video_id.to_string(),
        };
        self.progress_bar.start("Starting...");

        // One channel per run. An earlier run's task holds a sender whose
        // receiver is gone, so its late events cannot reach this run.
        let (tx, rx) = mpsc::unbounded_channel();
        self.processing_tx = Some(tx.clone());
        self.processing_rx = Some(rx);
        self.start_background(video_id, request, tx);
    }

    fn start_background(
        &self,
        video_id: VideoId,
        request: NotesRequest,
        tx: mpsc::UnboundedSender<ProcessingEvent>,
    ) {
        let pipeline = self.pipeline.clone();

        tokio::spawn(async move {
            let _ = tx.send(ProcessingEvent::Status(
                "Downloading transcript...".to_string(),
            ));
            let _ = tx.send(ProcessingEvent::Progress(0.1));
            let _ = tx.send(ProcessingEvent::Log(format!(
                "Fetching transcript for {video_id}"
            )));

            let transcript = match pipeline.fetch_transcript(&video_id, &request).await {
                Ok(transcript) => transcript,
                Err(e) => {
                    let _ = tx.send(ProcessingEvent::Failed(e.to_string()));
                    return;
                }
            };
            let _ = tx.send(ProcessingEvent::Progress(0.4));
            let _ = tx.send(ProcessingEvent::Log(format!(
                "Fetched {} fragments ({})",
                transcript.fragments.len(),
                transcript.language
            )));
            let _ = tx.send(ProcessingEvent::Status(
                "Summarizing with Gemini...".to_string(),
            ));

            let summary = match pipeline.summarize(&transcript).await {
                Ok(summary) => summary,
                Err(e) => {
                    let _ = tx.send(ProcessingEvent::Failed(e.to_string()));
                    return;
                }
            };
            let _ = tx.send(ProcessingEvent::Progress(0.9));
            let _ = tx.send(ProcessingEvent::Log("Summary ready".to_string()));

            let notes = VideoNotes::assemble(video_id, &transcript, summary, &request);
            let _ = tx.send(ProcessingEvent::Progress(1.0));
            let _ = tx.send(ProcessingEvent::Status("Completed".to_string()));
            let _ = tx.send(ProcessingEvent::Done(Box::new(notes)));
        });
    }

    fn finish(&mut self, notes: VideoNotes) {
        self.progress_bar.reset();
        self.cloud_note = if self.render_cloud {
            Some(self.save_cloud(&notes))
        } else {
            None
        };
        let viewer = NotesViewer::new(
            &format_notes(&notes),
            format!("Notes for {}", notes.video_id),
        );
        self.notes_viewer = Some(viewer);
        self.notes = Some(notes);
        self.state = AppState::Results;
    }

    fn save_cloud(&self, notes: &VideoNotes) -> String {
        let tokens = notes.keyword_tokens();
        let path = PathBuf::from(format!("cloud_{}.png", file_stem(notes.video_id.as_str())));
        let result = CloudRenderer::new(self.config.font_path.as_deref())
            .and_then(|renderer| renderer.render_to_file(&tokens, &path));
        match result {
            Ok(()) => format!("Keyword cloud saved to {}", path.display()),
            Err(e) => format!("Keyword cloud failed: {e}"),
        }
    }
}

/// Ids come straight out of the user's URL and can carry path characters;
/// anything outside the id alphabet becomes `_` in the artifact name.
fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::core::{Summarizer, Transcript, TranscriptSource};
    use crate::error::Error;

    /// Never answers, so a run stays in flight for as long as a test needs.
    struct PendingTranscripts;

    #[async_trait]
    impl TranscriptSource for PendingTranscripts {
        async fn fetch_transcript(
            &self,
            _video_id: &VideoId,
            _languages: &[&str],
            _preserve_formatting: bool,
        ) -> Result<Transcript> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(Error::custom("transcript never arrives"))
        }
    }

    struct NoSummarizer;

    #[async_trait]
    impl Summarizer for NoSummarizer {
        async fn summarize(&self, _transcript_text: &str) -> Result<String> {
            Err(Error::Summary("not expected here".to_string()))
        }
    }

    fn test_app() -> App {
        let config = Config {
            api_key: "key".to_string(),
            model: "gemini-1.5-flash".to_string(),
            font_path: None,
        };
        let pipeline = NotesPipeline::new(Arc::new(PendingTranscripts), Arc::new(NoSummarizer));
        App::with_services(config, pipeline)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_event(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap();
    }

    fn submit(app: &mut App, url: &str) {
        app.url_input.set_value(url);
        app.start_processing();
    }

    #[tokio::test]
    async fn submission_is_ignored_while_a_run_is_active() {
        let mut app = test_app();
        submit(&mut app, "https://www.youtube.com/watch?v=first01");
        assert!(matches!(&app.state, AppState::Processing { video_id } if video_id == "first01"));

        app.url_input.set_value("https://www.youtube.com/watch?v=second2");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(&app.state, AppState::Processing { video_id } if video_id == "first01"));
    }

    #[tokio::test]
    async fn canceled_run_cannot_touch_a_later_one() {
        let mut app = test_app();
        submit(&mut app, "https://www.youtube.com/watch?v=old1111");
        // The sender a canceled run's task would still be holding.
        let stale_tx = app.processing_tx.clone().unwrap();

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Form);
        assert!(app.processing_rx.is_none());

        submit(&mut app, "https://www.youtube.com/watch?v=new2222");

        let stale = VideoNotes {
            video_id: VideoId::new("old1111"),
            watch_url: "https://www.youtube.com/watch?v=old1111".to_string(),
            language: "English".to_string(),
            fragment_count: 1,
            duration_secs: 1.0,
            summary: "stale".to_string(),
            keywords: None,
        };
        assert!(stale_tx.send(ProcessingEvent::Done(Box::new(stale))).is_err());

        app.handle_tick().unwrap();
        assert!(matches!(&app.state, AppState::Processing { video_id } if video_id == "new2222"));
        assert!(app.notes.is_none());
    }

    #[test]
    fn leaving_results_clears_the_link_field() {
        let mut app = test_app();
        app.url_input.set_value("https://www.youtube.com/watch?v=abc123");
        app.input_focus = 3;
        app.state = AppState::Results;

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Form);
        assert!(app.url_input.value.is_empty());
        assert_eq!(app.input_focus, 0);
        assert!(app.url_input.focused);
    }

    #[test]
    fn cloud_file_names_strip_path_characters() {
        assert_eq!(file_stem("a/b"), "a_b");
        assert_eq!(file_stem("dQw4w9WgXcQ&t"), "dQw4w9WgXcQ_t");
        assert_eq!(file_stem("abc-123_X"), "abc-123_X");
    }
}

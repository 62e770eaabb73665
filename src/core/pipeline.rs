use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::core::keywords::{self, DEFAULT_KEYWORD_COUNT, Keyword};
use crate::core::link::{self, VideoId};
use crate::core::summary::{Summarizer, SummaryService};
use crate::core::transcript::{Transcript, TranscriptService, TranscriptSource};
use crate::error::Result;

/// What to fetch and how much to derive from it.
#[derive(Debug, Clone)]
pub struct NotesRequest {
    pub video_url: String,
    pub languages: Vec<String>,
    pub preserve_formatting: bool,
    pub extract_keywords: bool,
    pub keyword_count: usize,
}

impl NotesRequest {
    pub fn new(video_url: impl Into<String>) -> Self {
        Self {
            video_url: video_url.into(),
            languages: vec!["en".to_string()],
            preserve_formatting: false,
            extract_keywords: false,
            keyword_count: DEFAULT_KEYWORD_COUNT,
        }
    }
}

/// Everything derived from one video link.
#[derive(Debug, Clone)]
pub struct VideoNotes {
    pub video_id: VideoId,
    pub watch_url: String,
    pub language: String,
    pub fragment_count: usize,
    pub duration_secs: f64,
    pub summary: String,
    pub keywords: Option<Vec<Keyword>>,
}

impl VideoNotes {
    /// Combines the stage outputs into the final result, extracting keywords
    /// from the summary when the request asked for them.
    pub fn assemble(
        video_id: VideoId,
        transcript: &Transcript,
        summary: String,
        request: &NotesRequest,
    ) -> Self {
        let keywords = request
            .extract_keywords
            .then(|| keywords::top_keywords(&summary, request.keyword_count));
        Self {
            watch_url: link::watch_url(&video_id),
            language: transcript.language.clone(),
            fragment_count: transcript.fragments.len(),
            duration_secs: transcript.approx_duration_secs(),
            summary,
            keywords,
            video_id,
        }
    }

    /// Keyword tokens in rank order, empty when extraction was not requested.
    pub fn keyword_tokens(&self) -> Vec<&str> {
        self.keywords
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|k| k.token.as_str())
            .collect()
    }
}

/// Runs link parsing, transcript download, summarization and keyword
/// extraction in order, stopping at the first failure.
#[derive(Clone)]
pub struct NotesPipeline {
    transcripts: Arc<dyn TranscriptSource>,
    summarizer: Arc<dyn Summarizer>,
}

impl NotesPipeline {
    pub fn new(transcripts: Arc<dyn TranscriptSource>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            transcripts,
            summarizer,
        }
    }

    /// Wires up the real YouTube and Gemini backed services.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transcripts = TranscriptService::new()?;
        let summarizer = SummaryService::new(config)?;
        Ok(Self::new(Arc::new(transcripts), Arc::new(summarizer)))
    }

    pub async fn fetch_transcript(
        &self,
        video_id: &VideoId,
        request: &NotesRequest,
    ) -> Result<Transcript> {
        let languages: Vec<&str> = request.languages.iter().map(String::as_str).collect();
        self.transcripts
            .fetch_transcript(video_id, &languages, request.preserve_formatting)
            .await
    }

    pub async fn summarize(&self, transcript: &Transcript) -> Result<String> {
        self.summarizer.summarize(&transcript.text()).await
    }

    pub async fn run(&self, request: &NotesRequest) -> Result<VideoNotes> {
        let video_id = link::extract_video_id(&request.video_url)?;
        info!(video_id = %video_id, "building notes");

        let transcript = self.fetch_transcript(&video_id, request).await?;
        let summary = self.summarize(&transcript).await?;
        info!(video_id = %video_id, "notes ready");

        Ok(VideoNotes::assemble(video_id, &transcript, summary, request))
    }
}

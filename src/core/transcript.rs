use crate::core::link::VideoId;
use crate::error::{Error, Result};
use async_trait::async_trait;
use yt_transcript_rs::{FetchedTranscript, api::YouTubeTranscriptApi};

/// One caption record as returned by the transcript service. Only `text`
/// feeds the summary; `start`/`duration` drive the duration readout.
#[derive(Debug, Clone)]
pub struct TranscriptFragment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Full caption text of a video, kept in caption order.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub video_id: VideoId,
    pub language: String,
    pub fragments: Vec<TranscriptFragment>,
}

impl Transcript {
    /// Concatenate the fragments into one blob, each prefixed with a single
    /// space. Order-preserving: the result for fragments "a", "b" is " a b".
    pub fn text(&self) -> String {
        let mut text = String::new();
        for fragment in &self.fragments {
            text.push(' ');
            text.push_str(&fragment.text);
        }
        text
    }

    /// Approximate video duration, taken from the end of the last caption.
    pub fn approx_duration_secs(&self) -> f64 {
        self.fragments
            .last()
            .map(|f| f.start + f.duration)
            .unwrap_or(0.0)
    }

    fn from_fetched(video_id: VideoId, fetched: FetchedTranscript) -> Self {
        let fragments = fetched
            .snippets
            .into_iter()
            .map(|snippet| TranscriptFragment {
                // Caption tracks arrive HTML-entity escaped.
                text: html_escape::decode_html_entities(&snippet.text).into_owned(),
                start: snippet.start,
                duration: snippet.duration,
            })
            .collect();

        Self {
            video_id,
            language: fetched.language,
            fragments,
        }
    }
}

/// Seam over the external transcript service so the pipeline can be driven
/// by a stub in tests.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch_transcript(
        &self,
        video_id: &VideoId,
        languages: &[&str],
        preserve_formatting: bool,
    ) -> Result<Transcript>;
}

/// Production fetcher backed by YouTube's caption endpoints.
#[derive(Clone)]
pub struct TranscriptService {
    api: YouTubeTranscriptApi,
}

impl TranscriptService {
    pub fn new() -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| Error::custom(format!("failed to set up transcript client: {e}")))?;
        Ok(Self { api })
    }
}

#[async_trait]
impl TranscriptSource for TranscriptService {
    async fn fetch_transcript(
        &self,
        video_id: &VideoId,
        languages: &[&str],
        preserve_formatting: bool,
    ) -> Result<Transcript> {
        tracing::info!(video_id = %video_id, ?languages, "fetching transcript");

        match self
            .api
            .fetch_transcript(video_id.as_str(), languages, preserve_formatting)
            .await
        {
            Ok(fetched) => {
                tracing::debug!(fragments = fetched.snippets.len(), "transcript fetched");
                Ok(Transcript::from_fetched(video_id.clone(), fetched))
            }
            Err(e) => Err(Error::TranscriptUnavailable {
                video_id: video_id.as_str().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Transcript, TranscriptFragment};
    use crate::core::link::VideoId;
    use yt_transcript_rs::{FetchedTranscript, FetchedTranscriptSnippet as Snippet};

    fn transcript(texts: &[&str]) -> Transcript {
        Transcript {
            video_id: VideoId::new("test"),
            language: "English".to_string(),
            fragments: texts
                .iter()
                .enumerate()
                .map(|(i, text)| TranscriptFragment {
                    text: text.to_string(),
                    start: i as f64,
                    duration: 1.0,
                })
                .collect(),
        }
    }

    #[test]
    fn concatenation_preserves_order_with_leading_spaces() {
        assert_eq!(transcript(&["a", "b"]).text(), " a b");
    }

    #[test]
    fn empty_transcript_concatenates_to_empty() {
        assert_eq!(transcript(&[]).text(), "");
        assert_eq!(transcript(&[]).approx_duration_secs(), 0.0);
    }

    #[test]
    fn duration_comes_from_last_fragment() {
        let t = Transcript {
            video_id: VideoId::new("test"),
            language: "English".to_string(),
            fragments: vec![
                TranscriptFragment {
                    text: "intro".into(),
                    start: 0.0,
                    duration: 4.0,
                },
                TranscriptFragment {
                    text: "outro".into(),
                    start: 90.0,
                    duration: 2.5,
                },
            ],
        };
        assert_eq!(t.approx_duration_secs(), 92.5);
    }

    #[test]
    fn fetched_snippets_are_entity_decoded() {
        let fetched = FetchedTranscript {
            video_id: "abc".to_string(),
            language: "English".to_string(),
            language_code: "en".to_string(),
            is_generated: true,
            snippets: vec![Snippet {
                text: "it&#39;s &amp; that".to_string(),
                start: 0.0,
                duration: 1.0,
            }],
        };

        let t = Transcript::from_fetched(VideoId::new("abc"), fetched);
        assert_eq!(t.fragments[0].text, "it's & that");
    }
}

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Fixed instructional prefix prepended to the transcript. The full request
/// text is exactly this prefix followed by the transcript, nothing else.
pub const NOTES_PROMPT: &str = "You are a YouTube video summarizer. You will be taking the \
transcript text and summarizing the entire video and providing the important summary in \
points within 250 words. Please provide the summary of the text given here: ";

pub fn build_prompt(transcript_text: &str) -> String {
    format!("{NOTES_PROMPT}{transcript_text}")
}

/// Seam over the generative-text service so the pipeline can be driven by a
/// stub in tests.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript_text: &str) -> Result<String>;
}

/// Summarizer backed by the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct SummaryService {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl SummaryService {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::custom(format!("failed to set up HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn model_path(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }
}

#[async_trait]
impl Summarizer for SummaryService {
    async fn summarize(&self, transcript_text: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(transcript_text),
                }],
            }],
        };

        tracing::info!(model = %self.model, "requesting summary");

        let response = self
            .client
            .post(format!(
                "{GOOGLE_API_BASE}/{}:generateContent",
                self.model_path()
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Summary(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Error bodies carry a structured message; fall back to raw text.
            let message = serde_json::from_str::<GenerateContentResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(Error::Summary(format!("service returned {status}: {message}")));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Summary(format!("unreadable response: {e}")))?;

        let summary = extract_text(parsed)?;
        tracing::debug!(chars = summary.len(), "summary generated");
        Ok(summary)
    }
}

/// Pull the generated text out of a decoded response, surfacing service-side
/// rejections (blocked prompt, empty candidate list) as explicit errors.
fn extract_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(error) = response.error {
        return Err(Error::Summary(error.message));
    }

    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(Error::Summary(format!("prompt blocked: {reason}")));
    }

    let candidates = response.candidates.unwrap_or_default();
    let Some(candidate) = candidates.into_iter().next() else {
        return Err(Error::Summary("no candidates returned".to_string()));
    };

    let mut text = String::new();
    for part in candidate.content.parts {
        if let Some(part_text) = part.text {
            text.push_str(&part_text);
        }
    }

    if text.is_empty() {
        return Err(Error::Summary("candidate contained no text".to_string()));
    }

    Ok(text)
}

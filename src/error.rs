use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, Error>;

/// Crate-wide error type. Every pipeline stage failure is terminal for the
/// current request; the presentation layer renders `Display` to the user.
#[derive(Debug, Display, From)]
pub enum Error {
    /// The link had no `=`-delimited video id segment.
    #[display("invalid YouTube video URL: expected a link like https://www.youtube.com/watch?v=<id>")]
    InvalidLink,

    /// The transcript service failed for any reason (no captions, video not
    /// found, network error). Causes are deliberately not distinguished.
    #[display("no transcript available for video '{video_id}': {reason}")]
    TranscriptUnavailable { video_id: String, reason: String },

    #[display("summarization failed: {_0}")]
    Summary(String),

    #[display("{env_var} is not set in the environment")]
    MissingApiKey { env_var: &'static str },

    #[display("word cloud: {_0}")]
    WordCloud(String),

    #[display("{_0}")]
    Custom(String),

    #[display("{_0}")]
    #[from]
    Io(std::io::Error),
}

impl Error {
    pub fn custom(val: impl std::fmt::Display) -> Self {
        Self::Custom(val.to_string())
    }
}

impl std::error::Error for Error {}

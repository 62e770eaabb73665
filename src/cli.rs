use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::keywords::DEFAULT_KEYWORD_COUNT;

#[derive(Parser)]
#[command(name = "ytnotes")]
#[command(about = "YouTube video notes with Gemini summaries and keyword clouds")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a video transcript into markdown notes
    Notes {
        /// YouTube video URL
        url: String,

        /// Preferred transcript languages (comma-separated)
        #[arg(short, long, default_value = "en")]
        languages: String,

        /// Preserve formatting in the transcript text
        #[arg(long)]
        preserve_formatting: bool,

        /// Extract the most frequent keywords from the notes
        #[arg(short, long)]
        keywords: bool,

        /// How many keywords to keep
        #[arg(short = 'n', long, default_value_t = DEFAULT_KEYWORD_COUNT)]
        top_n: usize,

        /// Write a keyword cloud PNG to this path (implies --keywords)
        #[arg(short, long)]
        cloud: Option<PathBuf>,
    },

    /// Open TUI interface
    Tui,
}

impl Commands {
    /// Split a comma-separated language list into trimmed entries.
    pub fn parse_languages(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

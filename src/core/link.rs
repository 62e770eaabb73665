use crate::error::{Error, Result};
use derive_more::Display;

/// Identifier YouTube uses to address a video, as embedded in its watch URL.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Extract the video id from a watch URL.
///
/// The id is the second `=`-delimited segment of the link
/// (`https://www.youtube.com/watch?v=<id>`). A link with no `=`, or with
/// nothing between the first `=` and the end of the segment, is rejected.
/// The id itself is not validated further.
pub fn extract_video_id(link: &str) -> Result<VideoId> {
    link.trim()
        .split('=')
        .nth(1)
        .filter(|id| !id.is_empty())
        .map(|id| VideoId(id.to_string()))
        .ok_or(Error::InvalidLink)
}

/// Canonical watch URL for a video, used as the embedded-player target.
pub fn watch_url(id: &VideoId) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}

#[cfg(test)]
mod tests {
    use super::{extract_video_id, watch_url};

    #[test]
    fn extracts_id_from_watch_link() {
        let id = extract_video_id("https://www.youtube.com/watch?v=abc123").expect("valid link");
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn rejects_link_without_equals() {
        assert!(extract_video_id("https://youtu.be/abc123").is_err());
    }

    #[test]
    fn rejects_link_with_nothing_after_equals() {
        assert!(extract_video_id("https://www.youtube.com/watch?v=").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(extract_video_id("").is_err());
    }

    #[test]
    fn second_segment_stops_at_next_equals() {
        let id = extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120")
            .expect("valid link");
        assert_eq!(id.as_str(), "dQw4w9WgXcQ&t");
    }

    #[test]
    fn ignores_surrounding_whitespace() {
        let id = extract_video_id("  https://www.youtube.com/watch?v=xyz  ").expect("valid link");
        assert_eq!(id.as_str(), "xyz");
    }

    #[test]
    fn watch_url_round_trips_the_id() {
        let id = extract_video_id("https://www.youtube.com/watch?v=abc123").unwrap();
        assert_eq!(watch_url(&id), "https://www.youtube.com/watch?v=abc123");
    }
}

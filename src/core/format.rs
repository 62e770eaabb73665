use crate::core::pipeline::VideoNotes;

/// Format seconds as MM:SS
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{mins:02}:{secs:02}")
}

/// Render finished notes as a markdown document.
pub fn format_notes(notes: &VideoNotes) -> String {
    let mut output = String::new();

    // Title and video line
    output.push_str(&format!("# Notes for {}\n\n", notes.video_id));
    output.push_str(&format!(
        "**Video:** {} | **Language:** {} | **Length:** {} ({} fragments)\n\n",
        notes.watch_url,
        notes.language,
        format_timestamp(notes.duration_secs),
        notes.fragment_count,
    ));

    // Summary
    output.push_str("## Detailed Notes\n\n");
    output.push_str(notes.summary.trim());
    output.push('\n');

    // Keywords, in rank order
    if let Some(keywords) = &notes.keywords {
        output.push_str("\n## Keywords\n\n");
        for keyword in keywords {
            output.push_str(&format!("- {} ({})\n", keyword.token, keyword.count));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keywords::Keyword;
    use crate::core::link::{VideoId, watch_url};

    fn sample_notes(keywords: Option<Vec<Keyword>>) -> VideoNotes {
        let video_id = VideoId::new("abc123");
        VideoNotes {
            watch_url: watch_url(&video_id),
            video_id,
            language: "English".to_string(),
            fragment_count: 3,
            duration_secs: 92.5,
            summary: "Summary text".to_string(),
            keywords,
        }
    }

    #[test]
    fn timestamps_render_as_minutes_and_seconds() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(92.5), "01:32");
        assert_eq!(format_timestamp(3700.0), "61:40");
    }

    #[test]
    fn notes_include_heading_link_and_summary() {
        let rendered = format_notes(&sample_notes(None));
        assert!(rendered.contains("# Notes for abc123"));
        assert!(rendered.contains("https://www.youtube.com/watch?v=abc123"));
        assert!(rendered.contains("## Detailed Notes\n\nSummary text\n"));
        assert!(!rendered.contains("## Keywords"));
    }

    #[test]
    fn keywords_render_in_rank_order() {
        let keywords = vec![
            Keyword {
                token: "rust".to_string(),
                count: 4,
            },
            Keyword {
                token: "tokio".to_string(),
                count: 2,
            },
        ];
        let rendered = format_notes(&sample_notes(Some(keywords)));
        let rust_at = rendered.find("- rust (4)").unwrap();
        let tokio_at = rendered.find("- tokio (2)").unwrap();
        assert!(rust_at < tokio_at);
        assert!(rendered.contains("## Keywords"));
    }
}

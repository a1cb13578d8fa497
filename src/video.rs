use once_cell::sync::Lazy;
use regex::Regex;

pub const WATCH_BASE: &str = "https://www.youtube.com/watch?v=";
pub const THUMBNAIL_BASE: &str = "https://img.youtube.com/vi/";

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:v=|embed/|vi/|youtu\.be/)([A-Za-z0-9_-]{6,})").expect("video id pattern")
});

/// Pulls a YouTube video id out of the URL shapes the feed uses
/// (`watch?v=`, `embed/`, `vi/`, `youtu.be/`).
pub fn extract_video_id(src: &str) -> Option<&str> {
    VIDEO_ID
        .captures(src)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str())
}

pub fn watch_url(src: &str) -> String {
    if src.is_empty() || src.contains("youtube.com/watch") {
        return src.to_string();
    }
    match extract_video_id(src) {
        Some(id) => format!("{WATCH_BASE}{id}"),
        None => src.to_string(),
    }
}

pub fn thumbnail_from_url(src: &str) -> Option<String> {
    extract_video_id(src).map(|id| format!("{THUMBNAIL_BASE}{id}/hqdefault.jpg"))
}

pub fn resolve_thumbnail(explicit: Option<&str>, src: &str) -> String {
    explicit
        .filter(|thumb| !thumb.trim().is_empty())
        .map(str::to_string)
        .or_else(|| thumbnail_from_url(src))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_url_normalizes_to_watch_page() {
        let src = "https://www.youtube.com/embed/dQw4w9WgXcQ";
        assert_eq!(watch_url(src), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(
            thumbnail_from_url(src).as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
    }

    #[test]
    fn recognizes_every_url_shape() {
        for src in [
            "https://youtu.be/abc_DEF-123",
            "https://img.youtube.com/vi/abc_DEF-123/0.jpg",
            "https://www.youtube.com/embed/abc_DEF-123?rel=0",
            "https://m.youtube.com/watch?feature=share&v=abc_DEF-123",
        ] {
            assert_eq!(extract_video_id(src), Some("abc_DEF-123"), "{src}");
        }
    }

    #[test]
    fn short_ids_are_ignored() {
        assert_eq!(extract_video_id("https://youtu.be/abc"), None);
    }

    #[test]
    fn existing_watch_urls_pass_through() {
        let src = "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=30";
        assert_eq!(watch_url(src), src);
    }

    #[test]
    fn unrecognized_sources_fall_back_to_src() {
        let src = "https://apod.nasa.gov/apod/image/2401/clip.mp4";
        assert_eq!(watch_url(src), src);
        assert_eq!(thumbnail_from_url(src), None);
        assert_eq!(resolve_thumbnail(None, src), "");
        assert_eq!(watch_url(""), "");
    }

    #[test]
    fn explicit_thumbnail_wins() {
        let src = "https://www.youtube.com/embed/dQw4w9WgXcQ";
        assert_eq!(resolve_thumbnail(Some("thumb.jpg"), src), "thumb.jpg");
        assert_eq!(
            resolve_thumbnail(Some(" "), src),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg"
        );
    }
}

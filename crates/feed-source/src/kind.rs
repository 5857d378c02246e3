use serde::Serialize;

/// Path fragment served by the camera backend's multipart JPEG endpoint.
const STREAM_IMAGE_MARKER: &str = "/api/video/";
const EMBED_HOST_MARKERS: [&str; 3] = ["youtube.com/embed", "youtube-nocookie.com/embed", "youtu.be"];

/// Delivery mechanism behind a feed URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedKind {
    /// Continuously replaced still image (multipart JPEG).
    StreamImage,
    /// Plain media file played by a media element.
    File,
    /// Third-party embedded player.
    EmbeddedPlayer,
}

impl FeedKind {
    pub fn from_url(url: &str) -> Self {
        if url.contains(STREAM_IMAGE_MARKER) {
            FeedKind::StreamImage
        } else if EMBED_HOST_MARKERS.iter().any(|marker| url.contains(marker)) {
            FeedKind::EmbeddedPlayer
        } else {
            FeedKind::File
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedKind::StreamImage => "stream-image",
            FeedKind::File => "file",
            FeedKind::EmbeddedPlayer => "embedded-player",
        }
    }
}

/// Video id of an embedded-player URL: the segment after `embed/`, the `v=`
/// query value, or the first path segment of a `youtu.be` short link.
pub fn embedded_video_id(url: &str) -> Option<&str> {
    let start = if let Some(idx) = url.find("embed/") {
        idx + "embed/".len()
    } else if let Some(idx) = url.find("v=") {
        idx + "v=".len()
    } else if let Some(idx) = url.find("youtu.be/") {
        idx + "youtu.be/".len()
    } else {
        return None;
    };

    let rest = &url[start..];
    let end = rest.find(['?', '&', '/', '#']).unwrap_or(rest.len());
    let id = &rest[..end];
    if id.is_empty() { None } else { Some(id) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_url_convention() {
        assert_eq!(
            FeedKind::from_url("http://localhost:8080/api/video/cam1"),
            FeedKind::StreamImage
        );
        assert_eq!(
            FeedKind::from_url("https://www.youtube.com/embed/abc123"),
            FeedKind::EmbeddedPlayer
        );
        assert_eq!(
            FeedKind::from_url("https://www.youtube-nocookie.com/embed/abc123?mute=1"),
            FeedKind::EmbeddedPlayer
        );
        assert_eq!(FeedKind::from_url("https://youtu.be/abc123"), FeedKind::EmbeddedPlayer);
        assert_eq!(FeedKind::from_url("https://cdn.example.com/clip.mp4"), FeedKind::File);
        assert_eq!(FeedKind::from_url(""), FeedKind::File);
    }

    #[test]
    fn stream_image_wins_over_embed_markers() {
        assert_eq!(
            FeedKind::from_url("http://proxy/api/video/youtube.com/embed/x"),
            FeedKind::StreamImage
        );
    }

    #[test]
    fn extracts_video_ids() {
        assert_eq!(
            embedded_video_id("https://www.youtube.com/embed/G8PIodyHClU?autoplay=1&loop=1"),
            Some("G8PIodyHClU")
        );
        assert_eq!(
            embedded_video_id("https://www.youtube.com/watch?v=abc123&t=4"),
            Some("abc123")
        );
        assert_eq!(embedded_video_id("https://youtu.be/xyz789"), Some("xyz789"));
        assert_eq!(embedded_video_id("https://www.youtube.com/embed/"), None);
        assert_eq!(embedded_video_id("https://cdn.example.com/clip.mp4"), None);
    }
}

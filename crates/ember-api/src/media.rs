//! Helpers for processed-video URLs served by the media CDN.

const UPLOAD_SEGMENT: &str = "/upload/";
const ATTACHMENT_SEGMENT: &str = "/upload/fl_attachment/";

/// URL that makes the CDN serve the file as a download.
pub fn download_url(url: &str) -> String {
    if url.contains(ATTACHMENT_SEGMENT) {
        return url.to_string();
    }
    url.replacen(UPLOAD_SEGMENT, ATTACHMENT_SEGMENT, 1)
}

/// URL for inline playback, undoing [`download_url`].
pub fn inline_url(url: &str) -> String {
    url.replacen(ATTACHMENT_SEGMENT, UPLOAD_SEGMENT, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://res.cloudinary.com/demo/video/upload/v1/processed/abc.mp4";

    #[test]
    fn test_download_url() {
        assert_eq!(
            download_url(URL),
            "https://res.cloudinary.com/demo/video/upload/fl_attachment/v1/processed/abc.mp4"
        );
        // Idempotent
        assert_eq!(download_url(&download_url(URL)), download_url(URL));
        assert_eq!(download_url("https://other/x.mp4"), "https://other/x.mp4");
    }

    #[test]
    fn test_inline_url_reverses() {
        assert_eq!(inline_url(&download_url(URL)), URL);
        assert_eq!(inline_url(URL), URL);
    }
}

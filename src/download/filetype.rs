//! File type detection from URL and content type

use serde::Serialize;

/// Broad file category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Document,
    Image,
    Video,
    Audio,
    Text,
    Archive,
    Unknown,
}

impl FileCategory {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Document => "document",
            FileCategory::Image => "image",
            FileCategory::Video => "video",
            FileCategory::Audio => "audio",
            FileCategory::Text => "text",
            FileCategory::Archive => "archive",
            FileCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detected type of a downloaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileType {
    /// Lowercase extension without the dot, empty if none
    pub extension: String,
    /// Content type reported by the server
    pub mime_type: String,
    pub category: FileCategory,
}

impl FileType {
    /// Detect the type from the request URL and the response content type
    pub fn detect(url: &str, content_type: &str) -> Self {
        Self {
            extension: extension_of(url),
            mime_type: content_type.to_string(),
            category: category_of(content_type),
        }
    }
}

fn extension_of(url: &str) -> String {
    // Only look at the path, not the query or fragment.
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    let name = path.rsplit('/').next().unwrap_or_default();
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

fn category_of(content_type: &str) -> FileCategory {
    if content_type.contains("pdf") {
        FileCategory::Document
    } else if content_type.contains("image") {
        FileCategory::Image
    } else if content_type.contains("video") {
        FileCategory::Video
    } else if content_type.contains("audio") {
        FileCategory::Audio
    } else if content_type.contains("text") {
        FileCategory::Text
    } else if content_type.contains("application/zip")
        || content_type.contains("application/x-rar-compressed")
        || content_type.contains("application/x-7z-compressed")
    {
        FileCategory::Archive
    } else {
        FileCategory::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pdf() {
        let ft = FileType::detect("https://example.com/docs/Report.PDF", "application/pdf");
        assert_eq!(ft.extension, "pdf");
        assert_eq!(ft.mime_type, "application/pdf");
        assert_eq!(ft.category, FileCategory::Document);
    }

    #[test]
    fn test_detect_ignores_query() {
        let ft = FileType::detect(
            "https://example.com/a/archive.tar.gz?token=x.y",
            "application/octet-stream",
        );
        assert_eq!(ft.extension, "gz");
        assert_eq!(ft.category, FileCategory::Unknown);
    }

    #[test]
    fn test_detect_no_extension() {
        let ft = FileType::detect("https://example.com/download", "text/plain");
        assert_eq!(ft.extension, "");
        assert_eq!(ft.category, FileCategory::Text);
    }

    #[test]
    fn test_categories() {
        assert_eq!(category_of("image/png"), FileCategory::Image);
        assert_eq!(category_of("video/mp4"), FileCategory::Video);
        assert_eq!(category_of("audio/mpeg"), FileCategory::Audio);
        assert_eq!(category_of("application/zip"), FileCategory::Archive);
        assert_eq!(category_of("application/x-7z-compressed"), FileCategory::Archive);
        assert_eq!(category_of("application/json"), FileCategory::Unknown);
        assert_eq!(category_of(""), FileCategory::Unknown);
    }

    #[test]
    fn test_pdf_wins_over_text() {
        // pdf is checked before the generic text match
        assert_eq!(category_of("text/pdf"), FileCategory::Document);
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&FileCategory::Archive).unwrap();
        assert_eq!(json, "\"archive\"");
    }
}

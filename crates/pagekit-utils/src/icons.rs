//! File-extension to icon-name lookup

/// Icon name for a filename, by its lowercased trailing extension
///
/// Unknown extensions and extensionless names fall back to the generic
/// `file` icon.
pub fn file_icon(filename: &str) -> &'static str {
    let ext = filename
        .rsplit('.')
        .next()
        .unwrap_or(filename)
        .to_ascii_lowercase();

    match ext.as_str() {
        "pdf" | "doc" | "docx" | "txt" | "md" => "file-text",
        "jpg" | "jpeg" | "png" | "gif" => "image",
        "zip" | "rar" | "7z" => "archive",
        "mp4" | "avi" | "mov" => "video",
        "mp3" | "wav" | "ogg" => "music",
        _ => "file",
    }
}

// ==================== Tests ====================

//! HTTP clients for external vendors.

pub mod openai;
pub mod speechmatics;
pub mod whisper;

/// MIME type for an audio upload, keyed on the filename extension.
pub(crate) fn content_type_for(filename: &str) -> &'static str {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "m4a" => "audio/mp4",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "opus" => "audio/opus",
        _ => "audio/mpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_their_mime_types() {
        assert_eq!(content_type_for("meeting1.wav"), "audio/wav");
        assert_eq!(content_type_for("Call Notes.M4A"), "audio/mp4");
        assert_eq!(content_type_for("x.flac"), "audio/flac");
    }

    #[test]
    fn unknown_extensions_fall_back_to_mpeg() {
        assert_eq!(content_type_for("audio.xyz"), "audio/mpeg");
        assert_eq!(content_type_for("no-extension"), "audio/mpeg");
    }
}

use thiserror::Error;

/// Top-level error type for the MedIQ system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for MediqError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MediqError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Answer error: {0}")]
    Answer(String),

    #[error("Highlight error: {0}")]
    Highlight(String),

    #[error("Translation error: {0}")]
    Translate(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Extraction error: {0}")]
    Extract(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MediqError {
    fn from(err: toml::de::Error) -> Self {
        MediqError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MediqError {
    fn from(err: toml::ser::Error) -> Self {
        MediqError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MediqError {
    fn from(err: serde_json::Error) -> Self {
        MediqError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for MedIQ operations.
pub type Result<T> = std::result::Result<T, MediqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MediqError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let mediq_err: MediqError = io_err.into();
        assert!(matches!(mediq_err, MediqError::Io(_)));
        assert!(mediq_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(MediqError, &str)> = vec![
            (
                MediqError::Answer("model unavailable".to_string()),
                "Answer error: model unavailable",
            ),
            (
                MediqError::Highlight("tagger timeout".to_string()),
                "Highlight error: tagger timeout",
            ),
            (
                MediqError::Translate("no model".to_string()),
                "Translation error: no model",
            ),
            (
                MediqError::Transcription("bad audio".to_string()),
                "Transcription error: bad audio",
            ),
            (
                MediqError::Synthesis("voice missing".to_string()),
                "Synthesis error: voice missing",
            ),
            (
                MediqError::Extract("empty pdf".to_string()),
                "Extraction error: empty pdf",
            ),
            (
                MediqError::Api("unauthorized".to_string()),
                "API error: unauthorized",
            ),
            (
                MediqError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let err: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(err.is_err());
        let mediq_err: MediqError = err.unwrap_err().into();
        assert!(matches!(mediq_err, MediqError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(err.is_err());
        let mediq_err: MediqError = err.unwrap_err().into();
        assert!(matches!(mediq_err, MediqError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_error_debug_impl() {
        let err = MediqError::Answer("test debug".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Answer"));
        assert!(debug_str.contains("test debug"));
    }
}

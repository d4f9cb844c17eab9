use thiserror::Error;

/// Errors returned by training, decoding and model persistence.
#[derive(Debug, Error)]
pub enum Error {
    /// A training sentence whose word and tag sequences are not aligned.
    #[error("invalid input: {words} words but {tags} tags")]
    InvalidInput { words: usize, tags: usize },

    /// A training tag collides with the synthetic start tag.
    #[error("invalid input: tag \"#\" is reserved for the start state")]
    ReservedTag,

    /// No tag can be reached at `position`, so no complete path exists.
    #[error("decode failure: no viable tag at position {position}")]
    DecodeFailure { position: usize },

    /// A loaded model whose tables don't match its tag and word lists.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = Error::InvalidInput { words: 3, tags: 2 };
        assert_eq!(err.to_string(), "invalid input: 3 words but 2 tags");

        let err = Error::DecodeFailure { position: 4 };
        assert!(err.to_string().contains("position 4"));

        assert!(Error::ReservedTag.to_string().contains("\"#\""));

        let err = Error::InvalidModel("start tag has emissions".into());
        assert_eq!(err.to_string(), "invalid model: start tag has emissions");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}

use thiserror::Error;

/// Violations found while decoding a variable-byte posting block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("block ends in the middle of a value ({pending} dangling groups)")]
    Truncated { pending: usize },

    #[error("value at byte {position} does not fit in 32 bits")]
    Overflow { position: usize },

    #[error("block holds {count} values, expected an even docId/frequency split")]
    UnevenBlock { count: usize },
}

/// Main error type for index construction and query serving.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Incompatible index: format version {found}, expected {expected}")]
    IncompatibleIndex { found: u32, expected: u32 },

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IndexError::IncompatibleIndex { found: 2, expected: 1 };
        assert_eq!(err.to_string(), "Incompatible index: format version 2, expected 1");
        let err: IndexError = CodecError::Truncated { pending: 2 }.into();
        assert!(err.to_string().starts_with("Codec error: block ends"));
    }
}

//! Common error types shared across crates.

use thiserror::Error;

/// Top-level error type for sealing and opening records.
///
/// Variants map to process exit codes (sysexits) returned by the CLI:
/// - [`SealError::Format`] → 65
/// - [`SealError::Auth`] → 77
/// - [`SealError::Config`] → 78
/// - [`SealError::Io`] → 74
#[derive(Debug, Error)]
pub enum SealError {
    /// The stored record is malformed: bad base64 or a truncated payload.
    #[error("malformed record: {0}")]
    Format(String),

    /// Tag verification failed: tampering, corruption, or the wrong secret/nonce.
    #[error("record authentication failed")]
    Auth,

    /// The caller's sealing configuration is missing or unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading or writing the record file failed.
    #[error("record i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl SealError {
    /// Returns the process exit code that should be used for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SealError::Format(_) => 65,
            SealError::Auth => 77,
            SealError::Config(_) => 78,
            SealError::Io(_) => 74,
        }
    }

    /// `true` when the record exists but could not be turned back into plaintext.
    pub fn is_unreadable_record(&self) -> bool {
        matches!(self, SealError::Format(_) | SealError::Auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(SealError::Format("x".into()).exit_code(), 65);
        assert_eq!(SealError::Auth.exit_code(), 77);
        assert_eq!(SealError::Config("x".into()).exit_code(), 78);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(SealError::from(io).exit_code(), 74);
    }

    #[test]
    fn display_includes_message() {
        let e = SealError::Config("secret must be at least 16 characters".into());
        assert!(e.to_string().contains("at least 16 characters"));
    }

    #[test]
    fn unreadable_covers_format_and_auth_only() {
        assert!(SealError::Auth.is_unreadable_record());
        assert!(SealError::Format("short".into()).is_unreadable_record());
        assert!(!SealError::Config("x".into()).is_unreadable_record());
    }
}

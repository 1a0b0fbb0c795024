use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// In particular this means that use of Internal is never a guarantee
    /// the error is not, for example, due to a user error - merely that it
    /// cannot be confidently determined by the code.
    Internal,

    /// The user provided invalid input or performed an action that is
    /// unsupported or impossible to complete.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A password was required for encryption but none (or a blank one)
    /// was supplied.
    EmptyPassword,
    /// Input ended before a complete container header could be read.
    TooSmall,
    /// The first four bytes do not match the container magic constant.
    BadMagic,
    /// Input claims to be a container but uses a future/unsupported version.
    UnsupportedVersion,
    /// Authentication failed due to an incorrect password or tampering
    /// or corruption. The two causes are indistinguishable by design.
    InvalidPasswordOrCorrupt,
    /// Authentication succeeded but the recovered payload failed to
    /// decompress or decode; indicates bit-rot or a bug, not a bad password.
    CorruptData,
    /// The file appears to need a password but none was given.
    PasswordRequired,
    /// AES-GCM failed to seal data. Decryption failures are reported as
    /// `InvalidPasswordOrCorrupt` instead.
    CipherFailure,
    /// Serializing or deserializing the project document failed.
    Serialization,
    /// Password could not be obtained from the configured reader.
    PasswordUnavailable,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

impl ErrorKind {
    /// True for the error family `decode` is allowed to produce. Used by
    /// password verification to decide which failures mean "wrong password
    /// or not a usable container" rather than an unexpected defect.
    pub fn is_decode_failure(self) -> bool {
        matches!(
            self,
            ErrorKind::EmptyPassword
                | ErrorKind::TooSmall
                | ErrorKind::BadMagic
                | ErrorKind::UnsupportedVersion
                | ErrorKind::InvalidPasswordOrCorrupt
                | ErrorKind::CorruptData
        )
    }
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct BookvaultError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl BookvaultError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that retains the originating source error.
    pub fn with_source(
        category: ErrorCategory,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: None,
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BookvaultError>;

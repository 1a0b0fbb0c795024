//! Vault workflows: open, save, password rotation and verification
//!
//! This is the layer callers (the editor UI, the CLI) actually invoke. It
//! holds no state: every operation takes caller-supplied bytes or a path
//! plus explicit passwords, runs to completion on the caller's thread, and
//! returns a self-contained result. Concurrent writers to the same path are
//! the caller's hazard.
//!
//! Dual-format policy: project files saved with a password carry the
//! container header and ciphertext; files saved without one are the bare
//! serialized document. The two are distinguished on open solely by the
//! first four bytes against the container magic.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::book::Book;
use crate::container;
use crate::error::{BookvaultError, ErrorCategory, ErrorKind, Result};

/// Decode project bytes into a `Book`.
///
/// With a password, the bytes must be a valid container; codec errors
/// propagate verbatim, and a payload that authenticates but does not parse
/// as a project document is reported as `CorruptData`. Without a password,
/// the bytes are parsed as a bare serialized document; any failure is
/// reported as `PasswordRequired`, since an encrypted file is the most
/// likely reason plain parsing fails.
pub fn open_bytes(file_bytes: &[u8], password: Option<&str>) -> Result<Book> {
    match password {
        Some(password) => {
            let plaintext = container::decode(file_bytes, password)?;
            let text = String::from_utf8(plaintext).map_err(|e| {
                BookvaultError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::CorruptData,
                    "decrypted payload is not valid UTF-8",
                    e,
                )
            })?;
            Book::from_json(&text).map_err(|e| {
                BookvaultError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::CorruptData,
                    "decrypted payload is not a valid project document",
                    e,
                )
            })
        }
        None => {
            if file_bytes.starts_with(container::MAGIC) {
                return Err(BookvaultError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::PasswordRequired,
                    "file is encrypted; a password is required",
                ));
            }
            let text = std::str::from_utf8(file_bytes).map_err(|e| {
                BookvaultError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::PasswordRequired,
                    "file appears to be encrypted but no password was given",
                    e,
                )
            })?;
            Book::from_json(text).map_err(|e| {
                BookvaultError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::PasswordRequired,
                    "file appears to be encrypted but no password was given",
                    e,
                )
            })
        }
    }
}

/// Read and decode a project file.
pub fn open_project(path: &Path, password: Option<&str>) -> Result<Book> {
    let file_bytes = fs::read(path).map_err(|e| read_error(path, e))?;
    open_bytes(&file_bytes, password)
}

/// Encode a book to its on-disk byte form: a container when a password is
/// given, the bare serialized document otherwise.
pub fn save_bytes(book: &Book, password: Option<&str>) -> Result<Vec<u8>> {
    let text = book.to_json()?;
    match password {
        Some(password) => container::encode(text.as_bytes(), password),
        None => Ok(text.into_bytes()),
    }
}

/// Encode and write a project file, replacing any existing file atomically
/// (tempfile in the target directory, flush, fsync, rename). The file is
/// created with mode 0o600 on Unix.
pub fn save_project(book: &Book, path: &Path, password: Option<&str>) -> Result<()> {
    let file_bytes = save_bytes(book, password)?;
    write_file_atomic(path, &file_bytes)
}

/// Re-encrypt container bytes under a new password.
///
/// The old password must decrypt the input (`InvalidPasswordOrCorrupt`
/// otherwise) and the new password must be non-empty, checked before any
/// cryptographic work. The output carries entirely fresh salt and nonce;
/// the old header is never reused.
pub fn rotate_password(file_bytes: &[u8], old_password: &str, new_password: &str) -> Result<Vec<u8>> {
    if new_password.is_empty() {
        return Err(BookvaultError::with_kind(
            ErrorCategory::User,
            ErrorKind::EmptyPassword,
            "new password must not be empty",
        ));
    }

    let plaintext = container::decode(file_bytes, old_password)?;
    container::encode(&plaintext, new_password)
}

/// Rotate the password of an encrypted project file in place, atomically.
/// Either the old file or the fully rotated file exists on disk, never a
/// partial write.
pub fn rotate_password_file(path: &Path, old_password: &str, new_password: &str) -> Result<()> {
    let file_bytes = fs::read(path).map_err(|e| read_error(path, e))?;
    let rotated = rotate_password(&file_bytes, old_password, new_password)?;
    write_file_atomic(path, &rotated)
}

/// Check whether a password opens the given container bytes.
///
/// Returns false only for the decode-error family (wrong password, not a
/// container, unsupported version, corrupt payload). Anything else is a
/// defect and propagates.
pub fn verify_password(file_bytes: &[u8], password: &str) -> Result<bool> {
    match container::decode(file_bytes, password) {
        Ok(_) => Ok(true),
        Err(e) if e.kind.is_some_and(ErrorKind::is_decode_failure) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Write file contents atomically with secure permissions (0o600 on Unix)
fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        BookvaultError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to create tempfile",
            e,
        )
    })?;

    temp_file.write_all(contents).map_err(|e| {
        BookvaultError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file.flush().map_err(|e| {
        BookvaultError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to flush tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        BookvaultError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = temp_file
            .as_file()
            .metadata()
            .map_err(|e| {
                BookvaultError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to get tempfile metadata",
                    e,
                )
            })?
            .permissions();
        perms.set_mode(0o600);
        temp_file.as_file().set_permissions(perms).map_err(|e| {
            BookvaultError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to set tempfile permissions",
                e,
            )
        })?;
    }

    temp_file.persist(path).map_err(|e| {
        BookvaultError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn read_error(path: &Path, err: std::io::Error) -> BookvaultError {
    let category = if err.kind() == std::io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    BookvaultError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}

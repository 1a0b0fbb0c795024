//! Encrypted container codec
//!
//! Implements the versioned binary file format for password-protected
//! project files:
//! - PBKDF2-HMAC-SHA256 for key derivation from the password (see `kdf`)
//! - AES-256-GCM for authenticated encryption
//! - zlib compression of the plaintext before encryption
//!
//! The binary format is:
//! - magic: 4 bytes, ASCII "BOOK"
//! - version: 4 bytes (little-endian u32, currently 1)
//! - salt: 16 bytes
//! - nonce: 12 bytes
//! - ciphertext: variable length (includes 16-byte GCM tag)

use std::io::{Read, Write};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{BookvaultError, ErrorCategory, ErrorKind, Result};
use crate::kdf::{self, SALT_LEN};

/// Magic constant identifying an encrypted project container
pub const MAGIC: &[u8; 4] = b"BOOK";

/// Container format version written and accepted by this codec
pub const VERSION: u32 = 1;

/// Length of nonce in bytes (96-bit, per GCM)
pub const NONCE_LEN: usize = 12;

/// Total header length before the ciphertext begins
pub const HEADER_LEN: usize = 4 + 4 + SALT_LEN + NONCE_LEN;

/// Minimum input size considered at all; anything shorter cannot carry
/// even a magic, version and salt.
const MIN_LEN: usize = 32;

/// Encrypt plaintext with a password using fresh random salt and nonce
///
/// Returns the binary format: magic(4) + version(4) + salt(16) + nonce(12)
/// + ciphertext(variable). Salt and nonce are drawn from the OS CSPRNG on
/// every call; a repeated nonce under the same key would break
/// confidentiality, so there is no way to supply them externally outside
/// of tests.
pub fn encode(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
    if password.is_empty() {
        return Err(BookvaultError::with_kind(
            ErrorCategory::User,
            ErrorKind::EmptyPassword,
            "password must not be empty",
        ));
    }

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    encode_with_params(plaintext, password, &salt, &nonce)
}

/// Encrypt plaintext with a password using provided salt and nonce
///
/// This function is ONLY for testing purposes to generate deterministic
/// output. NEVER use this in production - always use `encode()` which
/// generates random salt/nonce.
pub fn encode_with_params(
    plaintext: &[u8],
    password: &str,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    if password.is_empty() {
        return Err(BookvaultError::with_kind(
            ErrorCategory::User,
            ErrorKind::EmptyPassword,
            "password must not be empty",
        ));
    }

    let key = kdf::derive_key(password, salt);

    let compressed = compress(plaintext)?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&*key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(nonce), compressed.as_slice())
        .map_err(|_| {
            BookvaultError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CipherFailure,
                "encryption failed",
            )
        })?;

    let mut output = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    output.extend_from_slice(MAGIC);
    output.extend_from_slice(&VERSION.to_le_bytes());
    output.extend_from_slice(salt);
    output.extend_from_slice(nonce);
    output.extend_from_slice(&ciphertext);

    Ok(output)
}

/// Decrypt container bytes with a password, returning the plaintext
///
/// Structural errors (`TooSmall`, `BadMagic`, `UnsupportedVersion`) are
/// detected before any cryptographic work. An authentication failure is
/// reported as `InvalidPasswordOrCorrupt`; the tag does not reveal whether
/// the password was wrong or the bytes were tampered with, and the caller
/// must not try to disambiguate. Decompression failure after successful
/// authentication is `CorruptData`.
pub fn decode(file_bytes: &[u8], password: &str) -> Result<Vec<u8>> {
    if file_bytes.len() < MIN_LEN {
        return Err(BookvaultError::with_kind(
            ErrorCategory::User,
            ErrorKind::TooSmall,
            "input too small to be an encrypted project file",
        ));
    }

    if &file_bytes[..4] != MAGIC {
        return Err(BookvaultError::with_kind(
            ErrorCategory::User,
            ErrorKind::BadMagic,
            "input unrecognized as an encrypted project file",
        ));
    }

    let version_bytes: [u8; 4] = file_bytes[4..8].try_into().map_err(|_| {
        BookvaultError::new(ErrorCategory::Internal, "failed to read version field")
    })?;
    let version = u32::from_le_bytes(version_bytes);
    if version != VERSION {
        return Err(BookvaultError::with_kind(
            ErrorCategory::User,
            ErrorKind::UnsupportedVersion,
            format!("unsupported container version {version}"),
        ));
    }

    if file_bytes.len() < HEADER_LEN {
        return Err(BookvaultError::with_kind(
            ErrorCategory::User,
            ErrorKind::TooSmall,
            "input truncated while reading nonce",
        ));
    }

    let salt: [u8; SALT_LEN] = file_bytes[8..8 + SALT_LEN]
        .try_into()
        .map_err(|_| BookvaultError::new(ErrorCategory::Internal, "failed to read salt"))?;
    let nonce: [u8; NONCE_LEN] = file_bytes[8 + SALT_LEN..HEADER_LEN]
        .try_into()
        .map_err(|_| BookvaultError::new(ErrorCategory::Internal, "failed to read nonce"))?;
    let ciphertext = &file_bytes[HEADER_LEN..];

    let key = kdf::derive_key(password, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&*key));
    let compressed = cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext)
        .map_err(|_| {
            BookvaultError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidPasswordOrCorrupt,
                "invalid password, or corrupt or tampered-with file",
            )
        })?;

    decompress(&compressed)
}

fn compress(plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(plaintext).map_err(|e| {
        BookvaultError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "compression failed",
            e,
        )
    })?;
    encoder.finish().map_err(|e| {
        BookvaultError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "compression failed",
            e,
        )
    })
}

fn decompress(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut plaintext = Vec::new();
    decoder.read_to_end(&mut plaintext).map_err(|e| {
        BookvaultError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::CorruptData,
            "authenticated payload failed to decompress; file is damaged",
            e,
        )
    })?;
    Ok(plaintext)
}

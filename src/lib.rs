//! bookvault - encrypted single-file container and vault for writing projects
//!
//! A project (book, chapters, characters, world-building, notes) serializes
//! to a canonical JSON document and persists either as that bare document or
//! as a password-protected container: PBKDF2-HMAC-SHA256 key derivation,
//! zlib compression, AES-256-GCM authenticated encryption, all behind a
//! 36-byte versioned header. The two on-disk forms are distinguished solely
//! by the leading magic bytes.

pub mod book;
pub mod commands;
pub mod container;
pub mod error;
pub mod kdf;
pub mod password;
pub mod vault;

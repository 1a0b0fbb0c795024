//! High-level CLI operations over project files
//!
//! Each command reads whole files, works on in-memory buffers through the
//! vault layer, and writes results back through the vault's atomic path.
//! Passwords come from a `PasswordReader` so commands stay testable and
//! the terminal/stdin choice lives in the binary.

use std::fs;
use std::path::Path;

use crate::book::Book;
use crate::container;
use crate::error::{BookvaultError, ErrorCategory, ErrorKind, Result};
use crate::password::PasswordReader;
use crate::vault;

/// Create a new project file, optionally encrypted.
pub fn create(
    output: &Path,
    title: &str,
    author: &str,
    genre: &str,
    encrypt: bool,
    reader: &mut dyn PasswordReader,
) -> Result<()> {
    let book = Book::new(title, author, genre);
    let password = if encrypt {
        Some(reader.read_password("Password: ")?)
    } else {
        None
    };
    vault::save_project(&book, output, password.as_deref().map(String::as_str))
}

/// Open a project, prompting for a password only when the file is an
/// encrypted container.
pub fn open(input: &Path, reader: &mut dyn PasswordReader) -> Result<Book> {
    let file_bytes = fs::read(input).map_err(|e| {
        BookvaultError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to read from {}", input.display()),
            e,
        )
    })?;
    if file_bytes.starts_with(container::MAGIC) {
        let password = reader.read_password("Password: ")?;
        vault::open_bytes(&file_bytes, Some(&password))
    } else {
        vault::open_bytes(&file_bytes, None)
    }
}

/// Print a short summary of a project to stdout.
pub fn info(input: &Path, reader: &mut dyn PasswordReader) -> Result<()> {
    let book = open(input, reader)?;
    println!("Title:      {}", book.title);
    println!("Author:     {}", book.author);
    println!("Genre:      {}", book.genre);
    println!("Chapters:   {}", book.chapters.len());
    println!("Characters: {}", book.characters.len());
    println!("Words:      {}", book.total_word_count());
    Ok(())
}

/// Export a project as a markdown manuscript.
pub fn export(input: &Path, output: &Path, reader: &mut dyn PasswordReader) -> Result<()> {
    let book = open(input, reader)?;
    fs::write(output, book.to_markdown()).map_err(|e| {
        BookvaultError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to write to {}", output.display()),
            e,
        )
    })
}

/// Encrypt a plain project file into a password-protected container.
pub fn encrypt(input: &Path, output: &Path, reader: &mut dyn PasswordReader) -> Result<()> {
    let book = vault::open_project(input, None)?;
    let password = reader.read_password("Password: ")?;
    vault::save_project(&book, output, Some(&password))
}

/// Decrypt a container into a plain project file.
pub fn decrypt(input: &Path, output: &Path, reader: &mut dyn PasswordReader) -> Result<()> {
    let password = reader.read_password("Password: ")?;
    let book = vault::open_project(input, Some(&password))?;
    vault::save_project(&book, output, None)
}

/// Rotate the password of an encrypted project file in place.
pub fn change_password(file: &Path, reader: &mut dyn PasswordReader) -> Result<()> {
    let old_password = reader.read_password("Old password: ")?;
    let new_password = reader.read_password("New password: ")?;
    vault::rotate_password_file(file, &old_password, &new_password)
}

/// Check whether a password opens an encrypted project file.
pub fn verify(input: &Path, reader: &mut dyn PasswordReader) -> Result<bool> {
    let file_bytes = fs::read(input).map_err(|e| {
        BookvaultError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to read from {}", input.display()),
            e,
        )
    })?;
    let password = reader.read_password("Password: ")?;
    vault::verify_password(&file_bytes, &password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::ConstantPasswordReader;
    use tempfile::TempDir;

    #[test]
    fn test_create_encrypted_and_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("novel.book");

        let mut reader = ConstantPasswordReader::new("pw");
        create(&path, "Novel", "Author", "Fiction", true, &mut reader).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(container::MAGIC));

        let mut reader = ConstantPasswordReader::new("pw");
        let book = open(&path, &mut reader).unwrap();
        assert_eq!(book.title, "Novel");
        assert_eq!(book.author, "Author");
    }

    #[test]
    fn test_create_plain_opens_without_password() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("novel.book");

        let mut reader = ConstantPasswordReader::new("never asked");
        create(&path, "Novel", "Author", "Fiction", false, &mut reader).unwrap();

        let book = vault::open_project(&path, None).unwrap();
        assert_eq!(book.title, "Novel");
    }

    #[test]
    fn test_encrypt_then_decrypt() {
        let temp_dir = TempDir::new().unwrap();
        let plain = temp_dir.path().join("plain.book");
        let crypt = temp_dir.path().join("crypt.book");
        let back = temp_dir.path().join("back.book");

        let mut book = Book::new("Round", "Trip", "Test");
        book.add_chapter("One", "content");
        vault::save_project(&book, &plain, None).unwrap();

        let mut reader = ConstantPasswordReader::new("pw");
        encrypt(&plain, &crypt, &mut reader).unwrap();

        let mut reader = ConstantPasswordReader::new("pw");
        decrypt(&crypt, &back, &mut reader).unwrap();

        let reopened = vault::open_project(&back, None).unwrap();
        assert_eq!(book, reopened);
    }

    #[test]
    fn test_change_password_and_verify() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("novel.book");

        let mut reader = ConstantPasswordReader::new("old");
        create(&path, "Novel", "", "", true, &mut reader).unwrap();

        // Line reader hands out old then new.
        let lines = b"old\nnew\n";
        let mut reader = crate::password::LinePasswordReader::new(&lines[..]);
        change_password(&path, &mut reader).unwrap();

        let mut reader = ConstantPasswordReader::new("new");
        assert!(verify(&path, &mut reader).unwrap());
        let mut reader = ConstantPasswordReader::new("old");
        assert!(!verify(&path, &mut reader).unwrap());
    }

    #[test]
    fn test_export_writes_markdown() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("novel.book");
        let md_path = temp_dir.path().join("novel.md");

        let mut book = Book::new("Exported", "Someone", "Genre");
        book.add_chapter("Opening", "It begins.");
        vault::save_project(&book, &path, None).unwrap();

        let mut reader = ConstantPasswordReader::new("");
        export(&path, &md_path, &mut reader).unwrap();

        let md = fs::read_to_string(&md_path).unwrap();
        assert!(md.contains("# Exported"));
        assert!(md.contains("It begins."));
    }
}

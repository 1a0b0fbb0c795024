//! Password acquisition for the CLI

use std::io::{self, BufRead, IsTerminal, Write};

use zeroize::Zeroizing;

use crate::error::{BookvaultError, ErrorCategory, ErrorKind, Result};

/// Trait for reading passwords from various sources
///
/// A single reader may be asked for several passwords in one invocation
/// (e.g. the old and the new password during rotation); `prompt` tells an
/// interactive source what to ask for. Returned passwords are wrapped in
/// `Zeroizing` so they are wiped from memory when dropped.
pub trait PasswordReader {
    fn read_password(&mut self, prompt: &str) -> Result<Zeroizing<String>>;
}

/// Returns a fixed password (for testing)
pub struct ConstantPasswordReader {
    password: Zeroizing<String>,
}

impl ConstantPasswordReader {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: Zeroizing::new(password.into()),
        }
    }
}

impl PasswordReader for ConstantPasswordReader {
    fn read_password(&mut self, _prompt: &str) -> Result<Zeroizing<String>> {
        Ok(Zeroizing::new((*self.password).clone()))
    }
}

/// Reads one line per password from any `BufRead` source
///
/// Used for `--password-stdin`: each required password is one line, in
/// prompt order, with the trailing newline stripped.
pub struct LinePasswordReader<R: BufRead> {
    reader: R,
}

impl<R: BufRead> LinePasswordReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> PasswordReader for LinePasswordReader<R> {
    fn read_password(&mut self, _prompt: &str) -> Result<Zeroizing<String>> {
        let mut line = Zeroizing::new(String::new());
        self.reader.read_line(&mut line).map_err(|e| {
            BookvaultError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PasswordUnavailable,
                format!("error reading password: {e}"),
                e,
            )
        })?;
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }
}

/// Reads passwords from the terminal with no echo
pub struct TerminalPasswordReader;

impl TerminalPasswordReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalPasswordReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordReader for TerminalPasswordReader {
    fn read_password(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        if !io::stdin().is_terminal() {
            return Err(BookvaultError::with_kind(
                ErrorCategory::User,
                ErrorKind::PasswordUnavailable,
                "cannot read password from terminal - stdin is not a terminal",
            ));
        }

        io::stderr()
            .write_all(prompt.as_bytes())
            .and_then(|_| io::stderr().flush())
            .map_err(|e| {
                BookvaultError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    format!("failed to write prompt: {e}"),
                    e,
                )
            })?;

        // Read password *without echo*
        let password = rpassword::read_password().map_err(|e| {
            BookvaultError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PasswordUnavailable,
                format!("failure reading password: {e}"),
                e,
            )
        })?;

        Ok(Zeroizing::new(password))
    }
}

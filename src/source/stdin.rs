//! Stdin-based transaction source for piped input.

use crate::model::error::InputError;
use std::io::{IsTerminal, Read};

/// Stdin source for a piped transaction document, e.g.
/// `cat tx.json | txdisplay`.
///
/// Detects TTY vs piped input at construction so the CLI never blocks waiting
/// for someone to type a transaction.
pub struct StdinSource<R: Read> {
    reader: R,
}

impl StdinSource<std::io::Stdin> {
    /// Create a new StdinSource from stdin.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NoInput` if stdin is a TTY (interactive terminal).
    pub fn new() -> Result<Self, InputError> {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(InputError::NoInput);
        }
        Ok(Self { reader: stdin })
    }
}

impl<R: Read> StdinSource<R> {
    /// Create StdinSource from any reader, bypassing the TTY check.
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the whole document until EOF.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NoInput` if nothing was piped and `InputError::Io`
    /// for read failures.
    pub fn read_all(mut self) -> Result<Vec<u8>, InputError> {
        let mut bytes = Vec::new();
        self.reader.read_to_end(&mut bytes)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(InputError::NoInput);
        }
        Ok(bytes)
    }
}

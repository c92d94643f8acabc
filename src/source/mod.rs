//! Transaction input sources.
//!
//! The document comes from a file when a path is given, otherwise from piped
//! stdin.

use crate::model::error::InputError;
use std::path::PathBuf;
use tracing::debug;

pub mod file;
pub mod stdin;

pub use file::read_file;
pub use stdin::StdinSource;

/// Reads the transaction document.
///
/// # Logic:
/// 1. If a file path is provided: read the file
/// 2. Else if stdin is piped: read stdin to EOF
/// 3. Else: `InputError::NoInput`
///
/// # Errors
///
/// Returns `InputError::NoInput` if no file is provided and stdin is not piped.
/// Returns `InputError::FileNotFound` if the file does not exist.
/// Returns `InputError::Io` for I/O errors.
pub fn read_input(file: Option<PathBuf>) -> Result<Vec<u8>, InputError> {
    let bytes = match file {
        Some(path) => read_file(path)?,
        None => StdinSource::new()?.read_all()?,
    };
    debug!(bytes = bytes.len(), "Transaction input read");
    Ok(bytes)
}

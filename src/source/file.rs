//! File-based transaction source.

use crate::model::error::InputError;
use std::path::Path;

/// Reads a transaction document from `path`.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the file does not exist and
/// `InputError::Io` for other I/O errors.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>, InputError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(InputError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    Ok(std::fs::read(path)?)
}

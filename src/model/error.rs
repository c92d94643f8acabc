//! Error types for txdisplay.
//!
//! This module defines a hierarchical error taxonomy using `thiserror` for structured error
//! handling. Errors compose cleanly via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned by the binary
//!   - [`InputError`] - Transaction file/stdin reading failures
//!   - [`ParserError`] - Token tree and display-indexing failures
//!   - [`ConfigError`](crate::config::ConfigError) - Config file failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Log file setup failures
//!
//! # Recovery Strategy
//!
//! Only two [`ParserError`] conditions are recoverable inside the display subsystem: a
//! root field that is absent, and an item iteration that has run out. Both are modelled
//! as `Ok(None)` at the lookup that may miss, and are matched at exactly the scan or
//! loop that expects them. Everything else aborts the review: the device must never sign
//! a transaction it could not fully render.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::display::decrypt::InvalidDecryptionKey;
use crate::logging::LoggingError;
use crate::parser::TxMode;

/// Top-level error encompassing all failure modes of the binary.
///
/// A fatal review error is reported distinctly from a completed review, so a driver
/// can never mistake "could not render" for "operator rejected".
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read the transaction document from file or stdin.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// The transaction could not be parsed or fully rendered.
    #[error("Failed to review transaction: {0}")]
    Parse(#[from] ParserError),

    /// The configuration file exists but could not be used.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Log file setup failed.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// The transaction decryption key given on the command line is not valid hex.
    #[error("Invalid decryption key: {0}")]
    InvalidDecryptionKey(#[from] InvalidDecryptionKey),

    /// Writing the review listing failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors encountered when reading the transaction document.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified transaction file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use txdisplay::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.json")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.json"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was attempted.
        path: PathBuf,
    },

    /// No input source was provided and stdin is an interactive terminal.
    #[error("No input source: provide a file path or pipe data to stdin")]
    NoInput,

    /// Generic I/O error reading from the input source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while tokenizing a transaction or indexing it for display.
///
/// The first four variants are the display-subsystem taxonomy; the remaining ones are
/// lower-layer failures from the token tree and its fixed-capacity buffers. All of them
/// are fatal when they escape to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    /// A requested field or item is absent.
    ///
    /// Returned by `query()` when a resolved field has no start token, and by
    /// `make_friendly()` when there is no previous query to rewrite.
    #[error("No data")]
    NoData,

    /// An item iteration ran out before reaching the requested item.
    #[error("Query returned no results")]
    QueryExhausted,

    /// The caller asked for a display page beyond the last one.
    #[error("Display index {index} out of range ({num_items} pages)")]
    DisplayIdxOutOfRange {
        /// The requested zero-based page index.
        index: usize,
        /// Number of pages of the current transaction.
        num_items: usize,
    },

    /// The caller asked for a value sub-page beyond the last one.
    #[error("Display page {page} out of range ({page_count} pages)")]
    DisplayPageOutOfRange {
        /// The requested zero-based value page.
        page: usize,
        /// Number of pages the value renders to.
        page_count: usize,
    },

    /// The document does not match the expected schema, or a value is too large to be
    /// compared exactly.
    ///
    /// # Examples
    ///
    /// ```
    /// use txdisplay::model::error::ParserError;
    ///
    /// let err = ParserError::UnexpectedType { context: "message type reference" };
    /// assert!(err.to_string().contains("message type reference"));
    /// ```
    #[error("Unexpected type in {context}")]
    UnexpectedType {
        /// Where the violation was detected.
        context: &'static str,
    },

    /// The input is not valid JSON.
    #[error("Malformed JSON: {message}")]
    MalformedJson {
        /// Parser message from `serde_json`.
        message: String,
    },

    /// An object names the same member twice. Only one of the two values
    /// could be shown, so the document is rejected.
    #[error("Duplicate key {key:?} in transaction document")]
    DuplicateKey {
        /// The repeated member name.
        key: String,
    },

    /// The document root is not a JSON object.
    #[error("Unexpected root: transaction document must be a JSON object")]
    UnexpectedRoot,

    /// A fixed-capacity buffer would overflow.
    ///
    /// Buffers never truncate; exceeding one is always an error.
    #[error("Buffer overflow in {what}: capacity {capacity}, needed {needed}")]
    BufferOverflow {
        /// Which buffer overflowed.
        what: &'static str,
        /// Its fixed capacity.
        capacity: usize,
        /// The size that was required.
        needed: usize,
    },

    /// The requested transaction mode is not supported.
    #[error("Unsupported transaction mode: {mode}")]
    UnsupportedMode {
        /// The rejected mode.
        mode: TxMode,
    },

    /// A token handle does not belong to the current token tree.
    #[error("Token index {0} out of range")]
    TokenOutOfRange(usize),

    /// An encrypted message payload could not be decrypted.
    #[error("Failed to decrypt payload of message {index}: {reason}")]
    DecryptionFailed {
        /// Zero-based index of the message in `msgs`.
        index: usize,
        /// Reason reported by the decryptor.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn input_error_file_not_found_display() {
        let err = InputError::FileNotFound {
            path: PathBuf::from("/tmp/missing.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("File not found"));
        assert!(msg.contains("/tmp/missing.json"));
    }

    #[test]
    fn input_error_no_input_display() {
        let msg = InputError::NoInput.to_string();
        assert!(msg.contains("No input source"));
        assert!(msg.contains("file path or pipe data to stdin"));
    }

    #[test]
    fn input_error_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let input_err: InputError = io_err.into();
        let msg = input_err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn parser_error_out_of_range_display() {
        let err = ParserError::DisplayIdxOutOfRange {
            index: 7,
            num_items: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("Display index 7"));
        assert!(msg.contains("7 pages"));
    }

    #[test]
    fn parser_error_buffer_overflow_display() {
        let err = ParserError::BufferOverflow {
            what: "chain id",
            capacity: 20,
            needed: 33,
        };
        let msg = err.to_string();
        assert!(msg.contains("chain id"));
        assert!(msg.contains("capacity 20"));
        assert!(msg.contains("needed 33"));
    }

    #[test]
    fn parser_error_duplicate_key_display() {
        let err = ParserError::DuplicateKey {
            key: "memo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate key \"memo\" in transaction document"
        );
    }

    #[test]
    fn parser_error_unsupported_mode_display() {
        let err = ParserError::UnsupportedMode {
            mode: TxMode::Textual,
        };
        assert!(err.to_string().contains("textual"));
    }

    #[test]
    fn app_error_from_parser_error() {
        let app_err: AppError = ParserError::UnexpectedRoot.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Failed to review transaction"));
        assert!(msg.contains("must be a JSON object"));
    }

    #[test]
    fn app_error_nested_io_through_input_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let input_err: InputError = io_err.into();
        let app_err: AppError = input_err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Failed to read input"));
        assert!(msg.contains("IO error"));
        assert!(msg.contains("file not found"));
    }
}

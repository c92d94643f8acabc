//! Transaction document parser.
//!
//! This module turns raw transaction bytes into a [`Transaction`]: a flat token tree
//! that the display subsystem queries by key, by element index and by traversal
//! order. Only the JSON sign-document format is supported.

use std::fmt;

use tracing::debug;

use crate::model::ParserError;

mod document;
pub mod tokens;
pub mod traverse;

pub use tokens::{TokenIdx, TokenKind, TokenTree, MAX_TOKENS, ROOT_TOKEN};
pub use traverse::{traverse_find, KeyBuf, QueryContext, KEY_CAPACITY, MAX_RECURSION_DEPTH};

/// Encoding of the incoming transaction document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Amino JSON sign document.
    Json,
    /// Textual sign mode. Not supported by this reviewer.
    Textual,
}

impl fmt::Display for TxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxMode::Json => f.write_str("json"),
            TxMode::Textual => f.write_str("textual"),
        }
    }
}

/// A parsed transaction, immutable once built.
#[derive(Debug, Clone)]
pub struct Transaction {
    tree: TokenTree,
}

impl Transaction {
    /// The token tree of the document.
    pub fn tree(&self) -> &TokenTree {
        &self.tree
    }
}

/// Parse transaction bytes into a [`Transaction`].
///
/// # Errors
///
/// Returns `ParserError` if:
/// - the mode is not [`TxMode::Json`]
/// - the bytes are not valid JSON
/// - the document root is not an object
/// - an object names the same member twice
/// - the document has more than [`MAX_TOKENS`] tokens
///
/// # Examples
///
/// ```
/// use txdisplay::parser::{read_tx, TxMode};
///
/// let tx = read_tx(br#"{"chain_id":"secret-4"}"#, TxMode::Json).unwrap();
/// assert_eq!(tx.tree().len(), 2);
/// assert!(read_tx(b"[1,2]", TxMode::Json).is_err());
/// ```
pub fn read_tx(bytes: &[u8], mode: TxMode) -> Result<Transaction, ParserError> {
    if mode != TxMode::Json {
        return Err(ParserError::UnsupportedMode { mode });
    }

    let tree = TokenTree::parse(bytes)?;
    debug!(tokens = tree.len(), "Transaction tokenized");

    Ok(Transaction { tree })
}

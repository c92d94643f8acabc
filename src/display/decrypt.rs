//! Encrypted contract message verification.
//!
//! Contract messages carry an encrypted `msgs[i].value.msg` payload. When the
//! host supplies the transaction encryption key and a decryptor is attached,
//! every such payload must decrypt before the transaction may be reviewed.
//! Decryption itself is an external collaborator behind [`PayloadDecryptor`].

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::model::ParserError;
use crate::parser::{TokenIdx, TokenKind, TokenTree};

/// Length in bytes of a transaction encryption key.
pub const DECRYPTION_KEY_LEN: usize = 32;

/// Transaction encryption key shared by the host.
#[derive(Clone, PartialEq, Eq)]
pub struct DecryptionKey([u8; DECRYPTION_KEY_LEN]);

impl DecryptionKey {
    /// Wraps raw key bytes.
    pub fn new(bytes: [u8; DECRYPTION_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a key from 64 hex characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use txdisplay::display::decrypt::DecryptionKey;
    ///
    /// assert!(DecryptionKey::from_hex(&"ab".repeat(32)).is_ok());
    /// assert!(DecryptionKey::from_hex("abcd").is_err());
    /// ```
    pub fn from_hex(raw: &str) -> Result<Self, InvalidDecryptionKey> {
        let mut bytes = [0u8; DECRYPTION_KEY_LEN];
        hex::decode_to_slice(raw.trim(), &mut bytes)
            .map_err(|e| InvalidDecryptionKey(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Raw key bytes, for a decryptor.
    pub fn as_bytes(&self) -> &[u8; DECRYPTION_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DecryptionKey(..)")
    }
}

/// A decryption key that is not 32 hex-encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decryption key must be {len} hex-encoded bytes: {0}", len = DECRYPTION_KEY_LEN)]
pub struct InvalidDecryptionKey(String);

/// Failure reported by a [`PayloadDecryptor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct DecryptError {
    /// Why the payload was rejected.
    pub reason: String,
}

/// Decrypts encrypted contract message payloads.
pub trait PayloadDecryptor {
    /// Decrypts `ciphertext` (the payload string as it appears in the document).
    fn decrypt(&self, key: &DecryptionKey, ciphertext: &[u8]) -> Result<Vec<u8>, DecryptError>;
}

/// Checks that every encrypted payload below `msgs` decrypts.
///
/// Elements that are not objects, have no `value` object, or whose
/// `value.msg` is not a string carry no payload and are skipped.
///
/// # Errors
///
/// Returns `ParserError::DecryptionFailed` naming the first message whose
/// payload the decryptor rejects.
pub fn verify_encrypted_msgs(
    tree: &TokenTree,
    msgs: TokenIdx,
    key: &DecryptionKey,
    decryptor: &dyn PayloadDecryptor,
) -> Result<(), ParserError> {
    if tree.kind(msgs)? != TokenKind::Array {
        return Ok(());
    }

    for index in 0..tree.array_element_count(msgs)? {
        let Some(element) = tree.array_nth_element(msgs, index)? else {
            break;
        };
        if let Some(payload) = encrypted_payload(tree, element)? {
            decryptor
                .decrypt(key, payload.as_bytes())
                .map_err(|e| ParserError::DecryptionFailed {
                    index,
                    reason: e.reason,
                })?;
            debug!(index, "Encrypted payload verified");
        }
    }
    Ok(())
}

fn encrypted_payload(tree: &TokenTree, element: TokenIdx) -> Result<Option<&str>, ParserError> {
    if tree.kind(element)? != TokenKind::Object {
        return Ok(None);
    }
    let Some(value) = tree.object_get_value(element, "value")? else {
        return Ok(None);
    };
    if tree.kind(value)? != TokenKind::Object {
        return Ok(None);
    }
    let Some(msg) = tree.object_get_value(value, "msg")? else {
        return Ok(None);
    };
    if tree.kind(msg)? != TokenKind::String {
        return Ok(None);
    }
    Ok(Some(tree.text(msg)?))
}

//! Review session - owner of the current transaction and its display cache.
//!
//! One session exists per review flow. Loading a transaction invalidates the
//! cache; the first display call rebuilds it. All operations take the session
//! by reference, so a build can never be re-entered from within itself.

use tracing::{debug, warn};

use crate::display::cache::{BuildOptions, DisplayCache, DEFAULT_CHAIN_ID};
use crate::display::decrypt::{DecryptionKey, PayloadDecryptor};
use crate::display::labels;
use crate::model::ParserError;
use crate::parser::{self, KeyBuf, TokenIdx, Transaction, TxMode};

/// Columns of one value page.
pub const DEFAULT_PAGE_WIDTH: usize = 40;

/// Settings owned by the driver. The session only reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Operator preference for expert mode.
    pub expert_preference: bool,
    /// Chain id of the expected network.
    pub default_chain_id: String,
    /// Address of the signing device.
    pub own_address: Option<String>,
    /// Columns per value page.
    pub page_width: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            expert_preference: false,
            default_chain_id: DEFAULT_CHAIN_ID.to_string(),
            own_address: None,
            page_width: DEFAULT_PAGE_WIDTH,
        }
    }
}

/// Result of a display query: the item key and its value token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    /// Slash-separated key path, e.g. `msgs/value/amount`.
    pub key: KeyBuf,
    /// Value token, rendered with [`ReviewSession::render_value`].
    pub value: TokenIdx,
}

/// State of one review flow.
pub struct ReviewSession {
    settings: SessionSettings,
    tx: Option<Transaction>,
    cache: Option<DisplayCache>,
    decryption_key: Option<DecryptionKey>,
    decryptor: Option<Box<dyn PayloadDecryptor>>,
    last_query: Option<DisplayItem>,
}

impl ReviewSession {
    /// A session with no transaction loaded.
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            tx: None,
            cache: None,
            decryption_key: None,
            decryptor: None,
            last_query: None,
        }
    }

    /// Attaches the decryptor used to verify encrypted contract payloads.
    pub fn with_payload_decryptor(mut self, decryptor: Box<dyn PayloadDecryptor>) -> Self {
        self.decryptor = Some(decryptor);
        self.cache = None;
        self
    }

    /// Updates the expert-mode preference. Counts follow on the next call.
    pub fn set_expert_preference(&mut self, expert: bool) {
        self.settings.expert_preference = expert;
    }

    /// Sets or clears the transaction decryption key.
    pub fn set_decryption_key(&mut self, key: Option<DecryptionKey>) {
        self.decryption_key = key;
        self.cache = None;
    }

    /// True if a transaction decryption key is set.
    pub fn has_decryption_key(&self) -> bool {
        self.decryption_key.is_some()
    }

    /// Parses `bytes` as the transaction under review.
    ///
    /// The previous transaction and its cache are discarded first, so a failed
    /// parse leaves the session without a transaction.
    pub fn read_tx(&mut self, bytes: &[u8], mode: TxMode) -> Result<(), ParserError> {
        self.reset();
        match parser::read_tx(bytes, mode) {
            Ok(tx) => {
                debug!(bytes = bytes.len(), %mode, "Transaction loaded");
                self.tx = Some(tx);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Transaction rejected");
                Err(err)
            }
        }
    }

    /// Drops the transaction, its cache and the last query.
    pub fn reset(&mut self) {
        self.tx = None;
        self.cache = None;
        self.last_query = None;
    }

    /// Ensures the cache reflects the current transaction.
    ///
    /// A valid cache is returned as is. A failed build leaves the cache
    /// invalid, so the next call tries again from scratch.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::NoData` if no transaction is loaded, and any
    /// error of [`DisplayCache::build`].
    pub fn index_root_fields(&mut self) -> Result<&DisplayCache, ParserError> {
        Ok(self.indexed()?.1)
    }

    fn indexed(&mut self) -> Result<(&Transaction, &DisplayCache), ParserError> {
        let tx = self.tx.as_ref().ok_or(ParserError::NoData)?;
        if self.cache.is_none() {
            let decryption = match (&self.decryption_key, &self.decryptor) {
                (Some(key), Some(decryptor)) => Some((key, &**decryptor)),
                _ => None,
            };
            let options = BuildOptions {
                default_chain_id: &self.settings.default_chain_id,
                own_address: self.settings.own_address.as_deref(),
                decryption,
            };
            self.cache = Some(DisplayCache::build(tx.tree(), &options)?);
        }
        let cache = self.cache.as_ref().ok_or(ParserError::NoData)?;
        Ok((tx, cache))
    }

    /// Whether the review runs in expert mode: the operator asked for it, or the
    /// chain id is not the expected one.
    pub fn is_expert_mode(&mut self) -> Result<bool, ParserError> {
        let preference = self.settings.expert_preference;
        let cache = self.index_root_fields()?;
        Ok(preference || !cache.is_default_chain())
    }

    /// Total number of display pages.
    pub fn num_items(&mut self) -> Result<usize, ParserError> {
        let expert = self.is_expert_mode()?;
        Ok(self.index_root_fields()?.page_index(expert).total())
    }

    /// Resolves display page `display_index` to its item.
    ///
    /// The result is also kept as the last query for [`ReviewSession::make_friendly`].
    ///
    /// # Errors
    ///
    /// Returns `ParserError::DisplayIdxOutOfRange` unless
    /// `display_index < num_items()`.
    pub fn query(&mut self, display_index: usize) -> Result<DisplayItem, ParserError> {
        let expert = self.is_expert_mode()?;
        let (tx, cache) = self.indexed()?;

        let index = cache.page_index(expert);
        let num_items = index.total();
        if display_index >= num_items {
            return Err(ParserError::DisplayIdxOutOfRange {
                index: display_index,
                num_items,
            });
        }

        let (field, subitem) = index.resolve(display_index)?;
        let (key, value) = cache.locate_item(tx.tree(), field, subitem, expert)?;
        debug!(display_index, field = %field, subitem, key = %key, "Display item resolved");

        let item = DisplayItem { key, value };
        self.last_query = Some(item.clone());
        Ok(item)
    }

    /// The item of the last successful query, with its key as rewritten by
    /// [`ReviewSession::make_friendly`] if that was called.
    pub fn last_query(&self) -> Option<&DisplayItem> {
        self.last_query.as_ref()
    }

    /// Rewrites the key of the last query into its operator-facing label.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::NoData` if nothing was queried since the
    /// transaction was loaded.
    pub fn make_friendly(&mut self) -> Result<&str, ParserError> {
        self.index_root_fields()?;
        let has_decryption_key = self.has_decryption_key();
        let item = self.last_query.as_mut().ok_or(ParserError::NoData)?;
        if let Some(label) = labels::substitution(item.key.as_str(), has_decryption_key) {
            item.key.set(label, "item key")?;
        }
        Ok(item.key.as_str())
    }

    /// Renders page `page` of a value token at the configured width.
    ///
    /// Returns the page text and the number of pages of the value.
    pub fn render_value(&self, value: TokenIdx, page: usize) -> Result<(String, usize), ParserError> {
        let tx = self.tx.as_ref().ok_or(ParserError::NoData)?;
        tx.tree().render_page(value, self.settings.page_width, page)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

//! Display cache - derived per-transaction counts
//!
//! Built in one pass over the token tree:
//! 1. Locate each root field under the document root (absent fields are skipped)
//! 2. Count the items of each located field, feeding `msgs` items to the
//!    grouping axes and remembering how many fee items are amounts
//! 3. Classify the chain id against the expected default
//! 4. Optionally verify encrypted contract payloads
//!
//! Visible counts are not stored. They are derived on demand from the raw
//! counts and the expert-mode flag, so a change of preference never requires a
//! rebuild and can never be observed half-applied.

use tracing::{debug, info};

use crate::display::decrypt::{verify_encrypted_msgs, DecryptionKey, PayloadDecryptor};
use crate::display::grouping::GroupingState;
use crate::display::page_index::PageIndex;
use crate::model::{BoundedString, ParserError, RootField};
use crate::parser::{traverse_find, KeyBuf, QueryContext, TokenIdx, TokenTree, ROOT_TOKEN};

/// Chain id the application expects.
pub const DEFAULT_CHAIN_ID: &str = "secret-4";

/// Byte capacity of the chain id comparison buffer.
pub const CHAIN_ID_CAPACITY: usize = 20;

/// Item key of the fee amount, the only fee item shown outside expert mode.
pub const FEE_AMOUNT_KEY: &str = "fee/amount";

/// Buffer the rendered chain id is copied into before comparison.
pub type ChainIdBuf = BoundedString<CHAIN_ID_CAPACITY>;

/// Inputs of a cache build that do not come from the transaction.
#[derive(Clone, Copy)]
pub struct BuildOptions<'a> {
    /// Chain id that counts as the expected network.
    pub default_chain_id: &'a str,
    /// Address of the signing device, for own-sender hiding.
    pub own_address: Option<&'a str>,
    /// Payload verification, when both a key and a decryptor are available.
    pub decryption: Option<(&'a DecryptionKey, &'a dyn PayloadDecryptor)>,
}

impl Default for BuildOptions<'_> {
    fn default() -> Self {
        Self {
            default_chain_id: DEFAULT_CHAIN_ID,
            own_address: None,
            decryption: None,
        }
    }
}

/// What the build learned about one root field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldEntry {
    /// Value token of the field; `None` when absent from the document.
    pub start: Option<TokenIdx>,
    /// Items before any gating or grouping.
    pub raw_count: usize,
    /// Items keyed `fee/amount` (fee field only).
    pub fee_amount_count: usize,
}

/// Derived state of one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayCache {
    fields: [FieldEntry; RootField::COUNT],
    total_raw: usize,
    is_default_chain: bool,
    grouping: GroupingState,
    hide_all_senders: bool,
}

impl DisplayCache {
    /// Builds the cache for `tree`.
    ///
    /// # Errors
    ///
    /// Any token-tree error, a grouping reference overflow, a chain id longer
    /// than [`CHAIN_ID_CAPACITY`], or a rejected encrypted payload aborts the
    /// build. No partially built cache is ever returned.
    pub fn build(tree: &TokenTree, options: &BuildOptions<'_>) -> Result<Self, ParserError> {
        let mut cache = DisplayCache::default();

        for field in RootField::ALL {
            let Some(start) = tree.object_get_value(ROOT_TOKEN, field.key())? else {
                debug!(field = %field, "Root field absent");
                continue;
            };
            let entry = count_items(tree, field, start, &mut cache.grouping)?;
            debug!(
                field = %field,
                raw_count = entry.raw_count,
                token = %start,
                "Root field indexed"
            );
            cache.total_raw += entry.raw_count;
            cache.fields[field.position()] = entry;
        }

        cache.is_default_chain = classify_chain(
            tree,
            cache.fields[RootField::ChainId.position()].start,
            options.default_chain_id,
        )?;

        if let (Some((key, decryptor)), Some(msgs)) =
            (options.decryption, cache.fields[RootField::Msgs.position()].start)
        {
            verify_encrypted_msgs(tree, msgs, key, decryptor)?;
        }

        cache.hide_all_senders = match (options.own_address, cache.grouping.msg_sender.reference()) {
            (Some(own), Some(sender)) => own == sender,
            _ => false,
        };

        info!(
            total_raw = cache.total_raw,
            is_default_chain = cache.is_default_chain,
            type_grouping = cache.grouping.msg_type.collapses(),
            sender_grouping = cache.grouping.msg_sender.collapses(),
            hide_all_senders = cache.hide_all_senders,
            "Display cache built"
        );
        Ok(cache)
    }

    /// What the build learned about `field`.
    pub fn field(&self, field: RootField) -> &FieldEntry {
        &self.fields[field.position()]
    }

    /// Items across all fields before gating or grouping.
    pub fn total_raw(&self) -> usize {
        self.total_raw
    }

    /// True if the chain id equals the configured default.
    pub fn is_default_chain(&self) -> bool {
        self.is_default_chain
    }

    /// Grouping axes as left by the build.
    pub fn grouping(&self) -> &GroupingState {
        &self.grouping
    }

    /// True if the grouped sender is the device's own address.
    pub fn hide_all_senders(&self) -> bool {
        self.hide_all_senders
    }

    /// Pages `field` contributes under the given expert-mode flag.
    pub fn visible_count(&self, field: RootField, expert: bool) -> usize {
        if self.total_raw == 0 {
            return 0;
        }
        let entry = self.field(field);
        match field {
            RootField::ChainId | RootField::AccountNumber | RootField::Sequence => {
                if expert {
                    entry.raw_count
                } else {
                    0
                }
            }
            RootField::Fee => {
                if expert {
                    entry.raw_count
                } else {
                    entry.fee_amount_count
                }
            }
            RootField::Msgs => entry.raw_count.saturating_sub(
                self.grouping.hidden_count(!expert, self.hide_all_senders),
            ),
            RootField::Memo | RootField::Tip => entry.raw_count,
        }
    }

    /// Whether raw item `raw_index` of `field`, keyed `key`, is left out of the
    /// review. Agrees with [`DisplayCache::visible_count`].
    pub fn is_hidden(&self, field: RootField, raw_index: usize, key: &str, expert: bool) -> bool {
        if self.total_raw == 0 {
            return true;
        }
        match field {
            RootField::ChainId | RootField::AccountNumber | RootField::Sequence => !expert,
            RootField::Fee => !expert && key != FEE_AMOUNT_KEY,
            RootField::Msgs => self
                .grouping
                .hides(raw_index, key, !expert, self.hide_all_senders),
            RootField::Memo | RootField::Tip => false,
        }
    }

    /// Page index over the visible counts.
    pub fn page_index(&self, expert: bool) -> PageIndex {
        PageIndex::from_counts(RootField::ALL.map(|field| self.visible_count(field, expert)))
    }

    /// Finds visible item `visible_index` of `field`.
    ///
    /// Hidden items are skipped, so the n-th visible item is the n-th raw item
    /// for which [`DisplayCache::is_hidden`] is false.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::NoData` if the field is absent and
    /// `ParserError::QueryExhausted` if it has fewer visible items.
    pub fn locate_item(
        &self,
        tree: &TokenTree,
        field: RootField,
        visible_index: usize,
        expert: bool,
    ) -> Result<(KeyBuf, TokenIdx), ParserError> {
        let entry = self.field(field);
        let start = entry.start.ok_or(ParserError::NoData)?;

        let mut visible = 0;
        for raw_index in 0..entry.raw_count {
            let mut ctx = QueryContext::new(field.key(), raw_index, field.max_level())?;
            let value = traverse_find(tree, start, &mut ctx)?.ok_or(ParserError::QueryExhausted)?;
            if self.is_hidden(field, raw_index, ctx.key(), expert) {
                continue;
            }
            if visible == visible_index {
                return Ok((ctx.into_key(), value));
            }
            visible += 1;
        }
        Err(ParserError::QueryExhausted)
    }
}

/// Counts the items of one root field.
fn count_items(
    tree: &TokenTree,
    field: RootField,
    start: TokenIdx,
    grouping: &mut GroupingState,
) -> Result<FieldEntry, ParserError> {
    let mut entry = FieldEntry {
        start: Some(start),
        ..FieldEntry::default()
    };

    for item_index in 0.. {
        let mut ctx = QueryContext::new(field.key(), item_index, field.max_level())?;
        let Some(value) = traverse_find(tree, start, &mut ctx)? else {
            break;
        };
        let rendered = tree.render(value)?;

        match field {
            // An empty memo is no memo.
            RootField::Memo if rendered.is_empty() => break,
            RootField::Msgs => grouping.observe(item_index, ctx.key(), &rendered)?,
            RootField::Fee if ctx.key() == FEE_AMOUNT_KEY => entry.fee_amount_count += 1,
            _ => {}
        }
        entry.raw_count += 1;
    }

    Ok(entry)
}

/// Compares the rendered chain id against `default_chain_id`. An absent chain
/// id is never the default. The whole token is rendered, so a chain id wrapped
/// in an array or object never matches.
fn classify_chain(
    tree: &TokenTree,
    chain_id: Option<TokenIdx>,
    default_chain_id: &str,
) -> Result<bool, ParserError> {
    let Some(token) = chain_id else {
        debug!("No chain id, treating as non-default chain");
        return Ok(false);
    };
    let rendered = tree.render(token)?;
    let chain = ChainIdBuf::try_from_str(&rendered, "chain id")?;
    let is_default = chain.as_str() == default_chain_id;
    debug!(chain_id = %chain, is_default, "Chain classified");
    Ok(is_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(json: &str) -> TokenTree {
        TokenTree::parse(json.as_bytes()).expect("valid test document")
    }

    fn build(json: &str) -> DisplayCache {
        DisplayCache::build(&tree(json), &BuildOptions::default()).unwrap()
    }

    #[test]
    fn absent_fields_have_no_start() {
        let cache = build(r#"{"memo":"hello"}"#);
        assert_eq!(cache.field(RootField::Memo).raw_count, 1);
        assert_eq!(cache.field(RootField::Tip), &FieldEntry::default());
        assert_eq!(cache.total_raw(), 1);
    }

    #[test]
    fn empty_memo_counts_as_absent() {
        let cache = build(r#"{"memo":"","sequence":"3"}"#);
        assert!(cache.field(RootField::Memo).start.is_some());
        assert_eq!(cache.field(RootField::Memo).raw_count, 0);
        assert_eq!(cache.visible_count(RootField::Memo, true), 0);
    }

    #[test]
    fn fee_outside_expert_mode_shows_amount_only() {
        let cache = build(
            r#"{"chain_id":"secret-4","fee":{"amount":[{"amount":"5","denom":"uscrt"}],"gas":"1"}}"#,
        );
        assert_eq!(cache.field(RootField::Fee).raw_count, 2);
        assert_eq!(cache.visible_count(RootField::Fee, false), 1);
        assert_eq!(cache.visible_count(RootField::Fee, true), 2);
    }

    #[test]
    fn fee_without_amount_has_no_pages_outside_expert_mode() {
        let cache = build(r#"{"chain_id":"secret-4","fee":{"gas":"1"}}"#);
        assert_eq!(cache.visible_count(RootField::Fee, false), 0);
    }

    #[test]
    fn technical_fields_need_expert_mode() {
        let cache = build(r#"{"chain_id":"secret-4","account_number":"7","sequence":"1"}"#);
        for field in [RootField::ChainId, RootField::AccountNumber, RootField::Sequence] {
            assert_eq!(cache.visible_count(field, false), 0);
            assert_eq!(cache.visible_count(field, true), 1);
        }
    }

    #[test]
    fn chain_classification() {
        assert!(build(r#"{"chain_id":"secret-4"}"#).is_default_chain());
        assert!(!build(r#"{"chain_id":"pulsar-3"}"#).is_default_chain());
        assert!(!build(r#"{"memo":"m"}"#).is_default_chain());
    }

    #[test]
    fn wrapped_chain_id_is_not_the_default() {
        assert!(!build(r#"{"chain_id":["secret-4"]}"#).is_default_chain());
        assert!(!build(r#"{"chain_id":{"id":"secret-4"}}"#).is_default_chain());
    }

    #[test]
    fn configured_default_chain_is_used() {
        let options = BuildOptions {
            default_chain_id: "pulsar-3",
            ..BuildOptions::default()
        };
        let cache = DisplayCache::build(&tree(r#"{"chain_id":"pulsar-3"}"#), &options).unwrap();
        assert!(cache.is_default_chain());
    }

    #[test]
    fn oversized_chain_id_is_fatal() {
        let json = format!(r#"{{"chain_id":"{}"}}"#, "c".repeat(CHAIN_ID_CAPACITY + 1));
        let err = DisplayCache::build(&tree(&json), &BuildOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ParserError::BufferOverflow {
                what: "chain id",
                ..
            }
        ));
    }

    #[test]
    fn empty_transaction_has_no_pages_even_in_expert_mode() {
        let cache = build(r#"{"memo":"","msgs":[]}"#);
        assert_eq!(cache.total_raw(), 0);
        for field in RootField::ALL {
            assert_eq!(cache.visible_count(field, true), 0);
        }
        assert_eq!(cache.page_index(true).total(), 0);
    }

    #[test]
    fn own_sender_hides_every_sender_page() {
        let json = r#"{"chain_id":"secret-4","msgs":[
            {"type":"send","value":{"from_address":"me"}},
            {"type":"send","value":{"from_address":"me"}}
        ]}"#;
        let options = BuildOptions {
            own_address: Some("me"),
            ..BuildOptions::default()
        };
        let cache = DisplayCache::build(&tree(json), &options).unwrap();
        assert!(cache.hide_all_senders());
        // one type page left, no sender pages
        assert_eq!(cache.visible_count(RootField::Msgs, false), 1);
        // expert mode turns sender grouping off
        assert_eq!(cache.visible_count(RootField::Msgs, true), 3);
    }

    #[test]
    fn locate_item_skips_hidden_items() {
        let t = tree(
            r#"{"chain_id":"secret-4","msgs":[
                {"type":"send","value":{"amount":"1"}},
                {"type":"send","value":{"amount":"2"}}
            ]}"#,
        );
        let cache = DisplayCache::build(&t, &BuildOptions::default()).unwrap();
        assert_eq!(cache.visible_count(RootField::Msgs, false), 3);

        let (key, value) = cache.locate_item(&t, RootField::Msgs, 2, false).unwrap();
        assert_eq!(key.as_str(), "msgs/value/amount");
        assert_eq!(t.text(value).unwrap(), "2");
        assert_eq!(
            cache.locate_item(&t, RootField::Msgs, 3, false).unwrap_err(),
            ParserError::QueryExhausted
        );
    }

    #[test]
    fn locate_item_on_absent_field_is_no_data() {
        let t = tree(r#"{"memo":"m"}"#);
        let cache = DisplayCache::build(&t, &BuildOptions::default()).unwrap();
        assert_eq!(
            cache.locate_item(&t, RootField::Tip, 0, true).unwrap_err(),
            ParserError::NoData
        );
    }
}

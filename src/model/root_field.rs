//! The fixed set of top-level transaction sections that are reviewed.

use std::fmt;

/// One of the required top-level fields of a transaction document.
///
/// The declaration order is the page order: every page of a field is shown
/// before any page of the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RootField {
    /// `chain_id`: network the transaction is meant for.
    ChainId,
    /// `account_number`
    AccountNumber,
    /// `sequence`: replay counter of the signer.
    Sequence,
    /// `fee`: amount and gas.
    Fee,
    /// `memo`
    Memo,
    /// `msgs`: the messages being signed.
    Msgs,
    /// `tip`
    Tip,
}

impl RootField {
    /// Number of root fields.
    pub const COUNT: usize = 7;

    /// All root fields in page order.
    pub const ALL: [RootField; RootField::COUNT] = [
        RootField::ChainId,
        RootField::AccountNumber,
        RootField::Sequence,
        RootField::Fee,
        RootField::Memo,
        RootField::Msgs,
        RootField::Tip,
    ];

    /// The JSON key of this field under the document root.
    pub fn key(self) -> &'static str {
        match self {
            RootField::ChainId => "chain_id",
            RootField::AccountNumber => "account_number",
            RootField::Sequence => "sequence",
            RootField::Fee => "fee",
            RootField::Memo => "memo",
            RootField::Msgs => "msgs",
            RootField::Tip => "tip",
        }
    }

    /// How many object levels are expanded into separate items.
    ///
    /// Anything nested deeper is rendered as a single value.
    pub fn max_level(self) -> u8 {
        match self {
            RootField::Fee | RootField::Tip => 1,
            RootField::ChainId
            | RootField::AccountNumber
            | RootField::Sequence
            | RootField::Memo
            | RootField::Msgs => 2,
        }
    }

    /// Zero-based position in page order.
    pub fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RootField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_position_order() {
        for (i, field) in RootField::ALL.iter().enumerate() {
            assert_eq!(field.position(), i);
        }
    }

    #[test]
    fn keys_match_document_schema() {
        let keys: Vec<_> = RootField::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(
            keys,
            vec!["chain_id", "account_number", "sequence", "fee", "memo", "msgs", "tip"]
        );
    }

    #[test]
    fn fee_and_tip_expand_one_level() {
        assert_eq!(RootField::Fee.max_level(), 1);
        assert_eq!(RootField::Tip.max_level(), 1);
        assert_eq!(RootField::Msgs.max_level(), 2);
    }
}

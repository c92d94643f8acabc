//! Operator-facing labels for item keys.
//!
//! The table is scanned in order and the first exact match wins. Some keys
//! appear more than once; their order decides the label shown, so entries must
//! not be reordered.

/// Item key of an encrypted contract message.
pub const ENCRYPTED_PAYLOAD_KEY: &str = "msgs/value/msg";

/// Label of [`ENCRYPTED_PAYLOAD_KEY`] when the transaction can be decrypted.
pub const DECRYPTED_MSG_LABEL: &str = "Decrypted Msg";

/// Ordered (item key, label) substitutions.
pub static KEY_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("chain_id", "Chain ID"),
    ("account_number", "Account"),
    ("sequence", "Sequence"),
    ("memo", "Memo"),
    ("fee/amount", "Fee"),
    ("fee/gas", "Gas"),
    ("fee/granter", "Granter"),
    ("fee/payer", "Payer"),
    ("msgs/type", "Type"),
    ("tip/amount", "Tip"),
    ("tip/tipper", "Tipper"),
    ("msgs/inputs/address", "Source Address"),
    ("msgs/inputs/coins", "Source Coins"),
    ("msgs/outputs/address", "Dest Address"),
    ("msgs/outputs/coins", "Dest Coins"),
    ("msgs/value/from_address", "From"),
    ("msgs/value/to_address", "To"),
    ("msgs/value/amount", "Amount"),
    ("msgs/value/delegator_address", "Delegator"),
    ("msgs/value/validator_address", "Validator"),
    // Contract execution
    ("msgs/value/contract", "Contract"),
    ("msgs/value/msg", "Message"),
    ("msgs/value/sender", "Sender"),
    ("msgs/value/sent_funds", "Sent Funds"),
    // Query permits
    ("msgs/value/permit_name", "Permit Name"),
    ("msgs/value/allowed_tokens", "Allowed Tokens"),
    ("msgs/value/permissions", "Permissions"),
    // IBC transfer
    ("msgs/value/receiver", "Receiver"),
    ("msgs/value/token", "Token"),
    ("msgs/value/source_port", "Source Port"),
    ("msgs/value/source_channel", "Source Channel"),
    ("msgs/value/timeout_height", "Timeout Height"),
    ("msgs/value/timeout_timestamp", "Timeout Timestamp"),
    // Authz
    ("msgs/value/grant", "Grant"),
    ("msgs/value/grantee", "Grantee"),
    ("msgs/value/granter", "Granter"),
    // Arbitrary data signing
    ("msgs/value/data", "Data"),
    ("msgs/value/signer", "Signer"),
    // Redelegation
    ("msgs/value/validator_src_address", "Validator Source"),
    ("msgs/value/validator_dst_address", "Validator Dest"),
    ("msgs/value/description", "Description"),
    // Governance
    ("msgs/value/initial_deposit/amount", "Deposit Amount"),
    ("msgs/value/initial_deposit/denom", "Deposit Denom"),
    ("msgs/value/proposal_type", "Proposal"),
    ("msgs/value/proposer", "Proposer"),
    ("msgs/value/title", "Title"),
    ("msgs/value/depositer", "Sender"),
    ("msgs/value/proposal_id", "Proposal ID"),
    ("msgs/value/amount", "Amount"),
    ("msgs/value/voter", "Description"),
    ("msgs/value/option", "Option"),
];

/// Returns the operator-facing label for `key`.
///
/// With a decryption key available the encrypted payload is labelled
/// [`DECRYPTED_MSG_LABEL`], ahead of the table. Unknown keys are returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use txdisplay::display::labels::friendly_label;
///
/// assert_eq!(friendly_label("msgs/value/amount", false), "Amount");
/// assert_eq!(friendly_label("msgs/value/msg", true), "Decrypted Msg");
/// assert_eq!(friendly_label("msgs/value/msg", false), "Message");
/// assert_eq!(friendly_label("msgs/value/unknown", false), "msgs/value/unknown");
/// ```
pub fn friendly_label(key: &str, has_decryption_key: bool) -> &str {
    substitution(key, has_decryption_key).unwrap_or(key)
}

/// The label replacing `key`, or `None` when the key is shown as is.
pub fn substitution(key: &str, has_decryption_key: bool) -> Option<&'static str> {
    if has_decryption_key && key == ENCRYPTED_PAYLOAD_KEY {
        return Some(DECRYPTED_MSG_LABEL);
    }
    KEY_SUBSTITUTIONS
        .iter()
        .find(|(raw, _)| *raw == key)
        .map(|(_, label)| *label)
}

//! Message grouping.
//!
//! When every message of a transaction shares the same type (or the same
//! sender), showing that value once is enough. Each grouping axis remembers the
//! first value it sees and the item index where it was seen; the first
//! differing value disables the axis for the rest of the build and every
//! occurrence becomes visible again.

use tracing::debug;

use crate::model::{BoundedString, ParserError};

/// Byte capacity of a grouping reference value. A value of exactly this many
/// bytes fits; there is no terminator to reserve room for.
pub const GROUPING_REF_CAPACITY: usize = 64;

/// Item key of a message type.
pub const MSG_TYPE_KEY: &str = "msgs/type";

/// Item keys that carry a message sender.
pub const MSG_SENDER_KEYS: [&str; 2] = ["msgs/value/from_address", "msgs/value/sender"];

/// True if `key` is the type of a message.
pub fn is_msg_type_field(key: &str) -> bool {
    key == MSG_TYPE_KEY
}

/// True if `key` names the sender of a message.
pub fn is_msg_sender_field(key: &str) -> bool {
    MSG_SENDER_KEYS.contains(&key)
}

/// Identifies a grouping axis in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    /// Groups on `msgs/type`.
    MsgType,
    /// Groups on the message sender.
    MsgSender,
}

/// State of one grouping axis during and after a cache build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingAxis {
    kind: AxisKind,
    enabled: bool,
    reference: Option<BoundedString<GROUPING_REF_CAPACITY>>,
    match_count: usize,
    representative: Option<usize>,
}

impl GroupingAxis {
    /// An enabled axis that has seen nothing yet.
    pub fn new(kind: AxisKind) -> Self {
        Self {
            kind,
            enabled: true,
            reference: None,
            match_count: 0,
            representative: None,
        }
    }

    /// Records an occurrence of this axis at raw item `item_index`.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::BufferOverflow` if the first value does not fit the
    /// reference buffer. Callers decide how that maps to their axis.
    pub fn observe(&mut self, item_index: usize, value: &str) -> Result<(), ParserError> {
        if !self.enabled {
            return Ok(());
        }

        match &self.reference {
            None => {
                self.reference = Some(BoundedString::try_from_str(value, "grouping reference")?);
                self.representative = Some(item_index);
                self.match_count = 1;
            }
            Some(reference) if reference.as_str() == value => {
                self.match_count += 1;
            }
            Some(_) => {
                debug!(axis = ?self.kind, item_index, "Grouping disabled by mismatched value");
                self.enabled = false;
                self.match_count = 0;
            }
        }
        Ok(())
    }

    /// True while every occurrence seen so far shares the reference value.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True if the axis would collapse its occurrences.
    pub fn collapses(&self) -> bool {
        self.enabled && self.match_count > 0
    }

    /// Occurrences matching the reference; 0 once the axis is disabled.
    pub fn match_count(&self) -> usize {
        self.match_count
    }

    /// Raw item index of the occurrence kept visible.
    pub fn representative(&self) -> Option<usize> {
        self.representative
    }

    /// First value seen on this axis.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_ref().map(|r| r.as_str())
    }
}

/// Grouping axes of one cache build. Never reused across transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingState {
    /// Message type axis.
    pub msg_type: GroupingAxis,
    /// Message sender axis.
    pub msg_sender: GroupingAxis,
}

impl Default for GroupingState {
    fn default() -> Self {
        Self {
            msg_type: GroupingAxis::new(AxisKind::MsgType),
            msg_sender: GroupingAxis::new(AxisKind::MsgSender),
        }
    }
}

impl GroupingState {
    /// Feeds one `msgs` item to whichever axis its key belongs to.
    ///
    /// # Errors
    ///
    /// A type reference that overflows its buffer is `ParserError::UnexpectedType`:
    /// types cannot be grouped without an exact comparison. A sender reference
    /// overflow is reported as the buffer overflow it is.
    pub fn observe(&mut self, item_index: usize, key: &str, value: &str) -> Result<(), ParserError> {
        if is_msg_type_field(key) {
            self.msg_type
                .observe(item_index, value)
                .map_err(|err| match err {
                    ParserError::BufferOverflow { .. } => ParserError::UnexpectedType {
                        context: "message type reference",
                    },
                    other => other,
                })?;
        }
        if is_msg_sender_field(key) {
            self.msg_sender.observe(item_index, value)?;
        }
        Ok(())
    }

    /// Whether raw `msgs` item `item_index` with key `key` is folded away.
    ///
    /// `sender_active` says whether sender grouping applies at all (it is off in
    /// expert mode); `hide_all_senders` hides the representative too.
    pub fn hides(
        &self,
        item_index: usize,
        key: &str,
        sender_active: bool,
        hide_all_senders: bool,
    ) -> bool {
        if is_msg_type_field(key) && self.msg_type.collapses() {
            return self.msg_type.representative() != Some(item_index);
        }
        if is_msg_sender_field(key) && sender_active && self.msg_sender.collapses() {
            return hide_all_senders || self.msg_sender.representative() != Some(item_index);
        }
        false
    }

    /// Number of `msgs` items folded away; agrees with [`GroupingState::hides`].
    pub fn hidden_count(&self, sender_active: bool, hide_all_senders: bool) -> usize {
        let mut hidden = 0;
        if self.msg_type.collapses() {
            hidden += self.msg_type.match_count() - 1;
        }
        if sender_active && self.msg_sender.collapses() {
            hidden += if hide_all_senders {
                self.msg_sender.match_count()
            } else {
                self.msg_sender.match_count() - 1
            };
        }
        hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_becomes_representative() {
        let mut axis = GroupingAxis::new(AxisKind::MsgType);
        axis.observe(3, "cosmos-sdk/MsgSend").unwrap();
        assert_eq!(axis.representative(), Some(3));
        assert_eq!(axis.reference(), Some("cosmos-sdk/MsgSend"));
        assert_eq!(axis.match_count(), 1);
        assert!(axis.collapses());
    }

    #[test]
    fn matching_occurrences_increment_counter() {
        let mut axis = GroupingAxis::new(AxisKind::MsgType);
        for i in 0..4 {
            axis.observe(i * 3, "send").unwrap();
        }
        assert_eq!(axis.match_count(), 4);
        assert_eq!(axis.representative(), Some(0));
    }

    #[test]
    fn mismatch_disables_axis_permanently() {
        let mut axis = GroupingAxis::new(AxisKind::MsgSender);
        axis.observe(0, "alice").unwrap();
        axis.observe(4, "bob").unwrap();
        assert!(!axis.is_enabled());
        assert_eq!(axis.match_count(), 0);

        axis.observe(8, "alice").unwrap();
        assert!(!axis.is_enabled());
        assert!(!axis.collapses());
    }

    #[test]
    fn oversized_type_reference_is_unexpected_type() {
        let mut state = GroupingState::default();
        let long = "t".repeat(GROUPING_REF_CAPACITY + 1);
        assert_eq!(
            state.observe(0, MSG_TYPE_KEY, &long).unwrap_err(),
            ParserError::UnexpectedType {
                context: "message type reference"
            }
        );
    }

    #[test]
    fn type_reference_at_capacity_still_groups() {
        let mut state = GroupingState::default();
        let exact = "t".repeat(GROUPING_REF_CAPACITY);
        state.observe(0, MSG_TYPE_KEY, &exact).unwrap();
        state.observe(2, MSG_TYPE_KEY, &exact).unwrap();

        assert_eq!(state.msg_type.reference(), Some(exact.as_str()));
        assert!(state.msg_type.collapses());
        assert_eq!(state.hidden_count(true, false), 1);
    }

    #[test]
    fn oversized_sender_reference_is_buffer_overflow() {
        let mut state = GroupingState::default();
        let long = "s".repeat(GROUPING_REF_CAPACITY + 1);
        assert!(matches!(
            state.observe(1, "msgs/value/sender", &long),
            Err(ParserError::BufferOverflow { .. })
        ));
    }

    #[test]
    fn hides_all_but_representative() {
        let mut state = GroupingState::default();
        state.observe(0, MSG_TYPE_KEY, "send").unwrap();
        state.observe(2, MSG_TYPE_KEY, "send").unwrap();
        state.observe(4, MSG_TYPE_KEY, "send").unwrap();

        assert!(!state.hides(0, MSG_TYPE_KEY, true, false));
        assert!(state.hides(2, MSG_TYPE_KEY, true, false));
        assert!(state.hides(4, MSG_TYPE_KEY, true, false));
        assert!(!state.hides(1, "msgs/value/amount", true, false));
        assert_eq!(state.hidden_count(true, false), 2);
    }

    #[test]
    fn inactive_sender_axis_hides_nothing() {
        let mut state = GroupingState::default();
        state.observe(1, "msgs/value/from_address", "me").unwrap();
        state.observe(3, "msgs/value/from_address", "me").unwrap();

        assert!(!state.hides(3, "msgs/value/from_address", false, false));
        assert_eq!(state.hidden_count(false, false), 0);
        assert!(state.hides(3, "msgs/value/from_address", true, false));
        assert_eq!(state.hidden_count(true, false), 1);
    }

    #[test]
    fn hide_all_senders_includes_representative() {
        let mut state = GroupingState::default();
        state.observe(1, "msgs/value/from_address", "me").unwrap();
        state.observe(3, "msgs/value/from_address", "me").unwrap();

        assert!(state.hides(1, "msgs/value/from_address", true, true));
        assert!(state.hides(3, "msgs/value/from_address", true, true));
        assert_eq!(state.hidden_count(true, true), 2);
    }
}

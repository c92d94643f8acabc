//! Property-based tests for display indexing invariants.
//!
//! Tests validate:
//! 1. Visible counts sum to the page count, with or without expert mode
//! 2. Every page below the count resolves; the count itself is out of range
//! 3. Type grouping shows one type page iff every message shares its type
//! 4. Repeated queries return the same items

use proptest::prelude::*;
use serde_json::json;
use txdisplay::display::{ReviewSession, SessionSettings};
use txdisplay::model::{ParserError, RootField};
use txdisplay::parser::TxMode;

#[derive(Debug, Clone)]
struct Msg {
    ty: &'static str,
    sender: &'static str,
    amount: u32,
}

fn msg_strategy() -> impl Strategy<Value = Msg> {
    (
        prop::sample::select(vec!["send", "delegate"]),
        prop::sample::select(vec!["secret1alice", "secret1bob"]),
        0u32..1_000,
    )
        .prop_map(|(ty, sender, amount)| Msg { ty, sender, amount })
}

fn tx_strategy() -> impl Strategy<Value = (String, Vec<Msg>)> {
    (
        prop::sample::select(vec!["secret-4", "pulsar-3"]),
        prop::sample::select(vec!["", "memo"]),
        prop::collection::vec(msg_strategy(), 0..6),
        any::<bool>(),
    )
        .prop_map(|(chain_id, memo, msgs, with_gas)| {
            let mut fee = json!({"amount": [{"amount": "5000", "denom": "uscrt"}]});
            if with_gas {
                fee["gas"] = json!("200000");
            }
            let doc = json!({
                "account_number": "1",
                "chain_id": chain_id,
                "fee": fee,
                "memo": memo,
                "msgs": msgs.iter().map(|m| json!({
                    "type": m.ty,
                    "value": {"from_address": m.sender, "amount": m.amount.to_string()}
                })).collect::<Vec<_>>(),
                "sequence": "7",
            });
            (doc.to_string(), msgs)
        })
}

fn load(json: &str, expert: bool) -> ReviewSession {
    let mut session = ReviewSession::new(SessionSettings {
        expert_preference: expert,
        own_address: Some("secret1alice".to_string()),
        ..SessionSettings::default()
    });
    session.read_tx(json.as_bytes(), TxMode::Json).unwrap();
    session
}

proptest! {
    #[test]
    fn visible_counts_sum_to_num_items((json, _msgs) in tx_strategy(), expert in any::<bool>()) {
        let mut session = load(&json, expert);
        let n = session.num_items().unwrap();
        let effective = session.is_expert_mode().unwrap();
        let cache = session.index_root_fields().unwrap();
        let sum: usize = RootField::ALL.iter().map(|&f| cache.visible_count(f, effective)).sum();
        prop_assert_eq!(sum, n);
    }

    #[test]
    fn every_page_resolves_and_count_is_out_of_range((json, _msgs) in tx_strategy(), expert in any::<bool>()) {
        let mut session = load(&json, expert);
        let n = session.num_items().unwrap();
        for i in 0..n {
            prop_assert!(session.query(i).is_ok(), "page {} of {} failed", i, n);
        }
        prop_assert_eq!(
            session.query(n).unwrap_err(),
            ParserError::DisplayIdxOutOfRange { index: n, num_items: n }
        );
    }

    #[test]
    fn type_grouping_collapses_only_uniform_types((json, msgs) in tx_strategy(), expert in any::<bool>()) {
        let mut session = load(&json, expert);
        let n = session.num_items().unwrap();
        let mut type_pages = 0;
        for i in 0..n {
            if session.query(i).unwrap().key.as_str() == "msgs/type" {
                type_pages += 1;
            }
        }

        let uniform = msgs.windows(2).all(|w| w[0].ty == w[1].ty);
        let expected = if msgs.is_empty() {
            0
        } else if uniform {
            1
        } else {
            msgs.len()
        };
        prop_assert_eq!(type_pages, expected);
    }

    #[test]
    fn queries_are_repeatable((json, _msgs) in tx_strategy()) {
        let mut session = load(&json, false);
        let n = session.num_items().unwrap();
        let first: Vec<_> = (0..n).map(|i| session.query(i).unwrap()).collect();
        let second: Vec<_> = (0..n).map(|i| session.query(i).unwrap()).collect();
        prop_assert_eq!(first, second);
        prop_assert_eq!(session.num_items().unwrap(), n);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut session = ReviewSession::new(SessionSettings::default());
        if session.read_tx(&bytes, TxMode::Json).is_ok() {
            let _ = session.num_items();
        }
    }
}

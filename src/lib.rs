//! Transaction review display indexing (txdisplay)
//!
//! Turns a JSON sign document into the bounded sequence of key/value pages a
//! hardware signing device shows before it signs.
//!
//! The library follows a Pure Core / Impure Shell split: `model`, `parser`
//! and `display` never touch the filesystem or the terminal; `config`,
//! `logging` and `source` are the shell used by the binary.
//!
//! ```
//! use txdisplay::display::{ReviewSession, SessionSettings};
//! use txdisplay::parser::TxMode;
//!
//! let mut session = ReviewSession::new(SessionSettings::default());
//! session
//!     .read_tx(br#"{"chain_id":"secret-4","memo":"gm"}"#, TxMode::Json)
//!     .unwrap();
//! assert_eq!(session.num_items().unwrap(), 1);
//! assert_eq!(session.query(0).unwrap().key.as_str(), "memo");
//! assert_eq!(session.make_friendly().unwrap(), "Memo");
//! ```

pub mod config;
pub mod display;
pub mod logging;
pub mod model;
pub mod parser;
pub mod source;

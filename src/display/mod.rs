//! Display indexing.
//!
//! Turns a parsed transaction into a bounded sequence of review pages: which
//! root fields are present, how many pages each contributes once expert-mode
//! gating and message grouping apply, which item a page shows, and how its key
//! reads to the operator.

pub mod cache;
pub mod decrypt;
pub mod grouping;
pub mod labels;
pub mod listing;
pub mod page_index;
pub mod session;

pub use cache::{BuildOptions, DisplayCache, DEFAULT_CHAIN_ID};
pub use decrypt::{DecryptError, DecryptionKey, PayloadDecryptor};
pub use labels::friendly_label;
pub use listing::render_review;
pub use session::{DisplayItem, ReviewSession, SessionSettings, DEFAULT_PAGE_WIDTH};

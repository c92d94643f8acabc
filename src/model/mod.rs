//! Domain model types (pure).
//!
//! Fixed-capacity buffers, the root field schema and the error taxonomy.

pub mod bounded;
pub mod error;
pub mod root_field;

// Re-export for convenience
pub use bounded::BoundedString;
pub use error::{AppError, InputError, ParserError};
pub use root_field::RootField;

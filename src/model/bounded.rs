//! Fixed-capacity string buffers.
//!
//! Working buffers of the display subsystem (item keys, grouping references, the
//! chain identifier) have a fixed byte capacity. Writes that would exceed it fail
//! with [`ParserError::BufferOverflow`] instead of truncating, because several of
//! these buffers feed byte-exact security comparisons.

use std::fmt;
use std::ops::Deref;

use crate::model::error::ParserError;

/// A UTF-8 string holding at most `CAP` bytes.
///
/// The `what` argument of the fallible methods names the buffer in the overflow
/// error so that callers can tell which limit was hit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundedString<const CAP: usize>(String);

impl<const CAP: usize> BoundedString<CAP> {
    /// Byte capacity of this buffer type.
    pub const CAPACITY: usize = CAP;

    /// Creates an empty buffer with its full capacity reserved.
    pub fn new() -> Self {
        Self(String::with_capacity(CAP))
    }

    /// Copies `value` into a new buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use txdisplay::model::BoundedString;
    ///
    /// let ok = BoundedString::<8>::try_from_str("secret-4", "chain id");
    /// assert!(ok.is_ok());
    /// let too_long = BoundedString::<8>::try_from_str("secret-42", "chain id");
    /// assert!(too_long.is_err());
    /// ```
    pub fn try_from_str(value: &str, what: &'static str) -> Result<Self, ParserError> {
        let mut buf = Self::new();
        buf.push_str(value, what)?;
        Ok(buf)
    }

    /// Appends `value`, failing if the result would exceed the capacity.
    pub fn push_str(&mut self, value: &str, what: &'static str) -> Result<(), ParserError> {
        let needed = self.0.len() + value.len();
        if needed > CAP {
            return Err(ParserError::BufferOverflow {
                what,
                capacity: CAP,
                needed,
            });
        }
        self.0.push_str(value);
        Ok(())
    }

    /// Replaces the contents with `value`.
    ///
    /// On overflow the previous contents are kept.
    pub fn set(&mut self, value: &str, what: &'static str) -> Result<(), ParserError> {
        if value.len() > CAP {
            return Err(ParserError::BufferOverflow {
                what,
                capacity: CAP,
                needed: value.len(),
            });
        }
        self.0.clear();
        self.0.push_str(value);
        Ok(())
    }

    /// Shortens the contents to `len` bytes. `len` must be a char boundary.
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// The contents as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const CAP: usize> Default for BoundedString<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> Deref for BoundedString<CAP> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl<const CAP: usize> PartialEq<str> for BoundedString<CAP> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl<const CAP: usize> PartialEq<&str> for BoundedString<CAP> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<const CAP: usize> fmt::Display for BoundedString<CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_past_capacity_fails_and_keeps_contents() {
        let mut buf = BoundedString::<8>::new();
        buf.push_str("msgs", "key").unwrap();
        assert!(buf.push_str("/type", "key").is_err());
        assert_eq!(buf, "msgs");
    }

    #[test]
    fn push_exactly_capacity_succeeds() {
        let mut buf = BoundedString::<9>::new();
        buf.push_str("msgs", "key").unwrap();
        buf.push_str("/type", "key").unwrap();
        assert_eq!(buf.as_str(), "msgs/type");
    }

    #[test]
    fn overflow_reports_capacity_and_need() {
        let err = BoundedString::<4>::try_from_str("abcdef", "grouping reference").unwrap_err();
        assert_eq!(
            err,
            ParserError::BufferOverflow {
                what: "grouping reference",
                capacity: 4,
                needed: 6,
            }
        );
    }

    #[test]
    fn set_keeps_previous_contents_on_overflow() {
        let mut buf = BoundedString::<4>::try_from_str("Fee", "key").unwrap();
        assert!(buf.set("Decrypted Msg", "key").is_err());
        assert_eq!(buf, "Fee");
        buf.set("Gas", "key").unwrap();
        assert_eq!(buf, "Gas");
    }

    #[test]
    fn truncate_restores_prefix() {
        let mut buf = BoundedString::<32>::try_from_str("msgs", "key").unwrap();
        let len = buf.len();
        buf.push_str("/value", "key").unwrap();
        buf.truncate(len);
        assert_eq!(buf, "msgs");
    }
}

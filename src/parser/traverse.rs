//! Item traversal below a root field.
//!
//! A root field is expanded into a flat sequence of items. Scalars are leaves.
//! Object members extend the item key with `/member` and spend one level; array
//! elements are flattened without adding a key segment. Once the level budget
//! (or the recursion budget) is spent the current token is a leaf, whatever its
//! shape, and is rendered whole.

use crate::model::{BoundedString, ParserError};
use crate::parser::tokens::{TokenIdx, TokenKind, TokenTree};

/// Maximum nesting the traversal descends into.
pub const MAX_RECURSION_DEPTH: u8 = 6;

/// Byte capacity of an item key such as `msgs/value/from_address`.
pub const KEY_CAPACITY: usize = 70;

/// Item key buffer.
pub type KeyBuf = BoundedString<KEY_CAPACITY>;

/// Single-use cursor for locating one item of a root field.
#[derive(Debug, Clone)]
pub struct QueryContext {
    out_key: KeyBuf,
    item_index: usize,
    current: usize,
    max_level: u8,
    max_depth: u8,
}

impl QueryContext {
    /// Prepares a lookup of item `item_index` below the root field `root_key`.
    pub fn new(root_key: &str, item_index: usize, max_level: u8) -> Result<Self, ParserError> {
        Ok(Self {
            out_key: KeyBuf::try_from_str(root_key, "item key")?,
            item_index,
            current: 0,
            max_level,
            max_depth: MAX_RECURSION_DEPTH,
        })
    }

    /// Key of the item found by the last traversal.
    pub fn key(&self) -> &str {
        self.out_key.as_str()
    }

    /// Consumes the context, keeping only the key of the found item.
    pub fn into_key(self) -> KeyBuf {
        self.out_key
    }
}

/// Finds the item `ctx` was prepared for below `start`.
///
/// Returns the value token of the item, with `ctx.key()` set to its key path, or
/// `Ok(None)` when `start` holds fewer items.
///
/// # Errors
///
/// Returns `ParserError::BufferOverflow` if the key path does not fit
/// [`KEY_CAPACITY`], and token-tree errors for dangling handles.
pub fn traverse_find(
    tree: &TokenTree,
    start: TokenIdx,
    ctx: &mut QueryContext,
) -> Result<Option<TokenIdx>, ParserError> {
    let (level, depth) = (ctx.max_level, ctx.max_depth);
    find(tree, start, ctx, level, depth)
}

fn find(
    tree: &TokenTree,
    token: TokenIdx,
    ctx: &mut QueryContext,
    level: u8,
    depth: u8,
) -> Result<Option<TokenIdx>, ParserError> {
    let kind = tree.kind(token)?;

    if level == 0 || depth == 0 || kind.is_scalar() {
        if ctx.current == ctx.item_index {
            return Ok(Some(token));
        }
        ctx.current += 1;
        return Ok(None);
    }

    match kind {
        TokenKind::Object => {
            let key_len = ctx.out_key.len();
            for member in tree.children(token)? {
                let name = tree.key(member)?.unwrap_or_default();
                ctx.out_key.push_str("/", "item key")?;
                ctx.out_key.push_str(name, "item key")?;
                if let Some(found) = find(tree, member, ctx, level - 1, depth - 1)? {
                    return Ok(Some(found));
                }
                ctx.out_key.truncate(key_len);
            }
        }
        TokenKind::Array => {
            for element in tree.children(token)? {
                if let Some(found) = find(tree, element, ctx, level, depth - 1)? {
                    return Ok(Some(found));
                }
            }
        }
        TokenKind::String | TokenKind::Primitive => {}
    }

    Ok(None)
}

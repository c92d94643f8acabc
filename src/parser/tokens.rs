//! Flat token tree over a parsed JSON document.
//!
//! Tokens are stored in pre-order. Every token records the index one past its
//! last descendant, so the children of a container are found by hopping from
//! `idx + 1` to each child's `end` until the container's own `end`.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use unicode_width::UnicodeWidthChar;

use crate::model::ParserError;
use crate::parser::document::Node;

/// Maximum number of tokens in one transaction document.
pub const MAX_TOKENS: usize = 768;

/// Handle of the document root.
pub const ROOT_TOKEN: TokenIdx = TokenIdx(0);

/// Handle to a token inside a [`TokenTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenIdx(usize);

impl fmt::Display for TokenIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// JSON shape of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// JSON object; its children are member values.
    Object,
    /// JSON array.
    Array,
    /// String, stored unescaped.
    String,
    /// Number, boolean or null.
    Primitive,
}

impl TokenKind {
    /// True for tokens without children.
    pub fn is_scalar(self) -> bool {
        matches!(self, TokenKind::String | TokenKind::Primitive)
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    /// Member name when the token is the value of an object member.
    key: Option<String>,
    /// Unescaped string contents, or the JSON spelling of a primitive.
    text: String,
    /// Number of direct children.
    size: usize,
    /// One past the last descendant.
    end: usize,
}

/// Token arena for one transaction document.
#[derive(Debug, Clone)]
pub struct TokenTree {
    tokens: Vec<Token>,
}

impl TokenTree {
    /// Parses and flattens a JSON document. The root must be an object.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::MalformedJson` for invalid JSON,
    /// `ParserError::UnexpectedRoot` if the root is not an object,
    /// `ParserError::DuplicateKey` if any object repeats a member name and
    /// `ParserError::BufferOverflow` past [`MAX_TOKENS`] tokens.
    ///
    /// # Examples
    ///
    /// ```
    /// use txdisplay::model::ParserError;
    /// use txdisplay::parser::{TokenTree, ROOT_TOKEN};
    ///
    /// let tree = TokenTree::parse(br#"{"memo":"gm"}"#).unwrap();
    /// assert!(tree.object_get_value(ROOT_TOKEN, "memo").unwrap().is_some());
    ///
    /// let err = TokenTree::parse(br#"{"memo":"a","memo":"b"}"#).unwrap_err();
    /// assert_eq!(err, ParserError::DuplicateKey { key: "memo".to_string() });
    /// ```
    pub fn parse(bytes: &[u8]) -> Result<Self, ParserError> {
        let document: Node =
            serde_json::from_slice(bytes).map_err(|e| ParserError::MalformedJson {
                message: e.to_string(),
            })?;
        if !matches!(document, Node::Object(_)) {
            return Err(ParserError::UnexpectedRoot);
        }
        let mut tree = TokenTree { tokens: Vec::new() };
        tree.push_node(&document, None)?;
        Ok(tree)
    }

    fn push_node(&mut self, node: &Node, key: Option<&str>) -> Result<(), ParserError> {
        let idx = self.tokens.len();
        if idx >= MAX_TOKENS {
            return Err(ParserError::BufferOverflow {
                what: "token tree",
                capacity: MAX_TOKENS,
                needed: idx + 1,
            });
        }

        let (kind, text, size) = match node {
            Node::Object(members) => (TokenKind::Object, String::new(), members.len()),
            Node::Array(items) => (TokenKind::Array, String::new(), items.len()),
            Node::String(s) => (TokenKind::String, s.clone(), 0),
            Node::Primitive(p) => (TokenKind::Primitive, p.clone(), 0),
        };
        self.tokens.push(Token {
            kind,
            key: key.map(str::to_owned),
            text,
            size,
            end: idx + 1,
        });

        match node {
            Node::Object(members) => {
                let mut seen = HashSet::with_capacity(members.len());
                for (member, child) in members {
                    if !seen.insert(member.as_str()) {
                        return Err(ParserError::DuplicateKey {
                            key: member.clone(),
                        });
                    }
                    self.push_node(child, Some(member))?;
                }
            }
            Node::Array(items) => {
                for child in items {
                    self.push_node(child, None)?;
                }
            }
            Node::String(_) | Node::Primitive(_) => {}
        }

        self.tokens[idx].end = self.tokens.len();
        Ok(())
    }

    /// Number of tokens in the tree.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if the tree holds no tokens. A parsed tree always has its root.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn token(&self, idx: TokenIdx) -> Result<&Token, ParserError> {
        self.tokens
            .get(idx.0)
            .ok_or(ParserError::TokenOutOfRange(idx.0))
    }

    /// JSON shape of `idx`.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::TokenOutOfRange` for a handle of another tree.
    pub fn kind(&self, idx: TokenIdx) -> Result<TokenKind, ParserError> {
        Ok(self.token(idx)?.kind)
    }

    /// Member name of `idx` if it is the value of an object member.
    pub fn key(&self, idx: TokenIdx) -> Result<Option<&str>, ParserError> {
        Ok(self.token(idx)?.key.as_deref())
    }

    /// Direct children of a container, in document order.
    pub fn children(&self, idx: TokenIdx) -> Result<Children<'_>, ParserError> {
        let token = self.token(idx)?;
        Ok(Children {
            tree: self,
            next: idx.0 + 1,
            end: token.end,
        })
    }

    /// Looks up the value of member `key` of object `parent`.
    ///
    /// Returns `Ok(None)` when the object has no such member.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedType` if `parent` is not an object.
    pub fn object_get_value(
        &self,
        parent: TokenIdx,
        key: &str,
    ) -> Result<Option<TokenIdx>, ParserError> {
        if self.kind(parent)? != TokenKind::Object {
            return Err(ParserError::UnexpectedType {
                context: "object lookup",
            });
        }
        for child in self.children(parent)? {
            if self.key(child)? == Some(key) {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Number of elements of array `idx`.
    pub fn array_element_count(&self, idx: TokenIdx) -> Result<usize, ParserError> {
        let token = self.token(idx)?;
        if token.kind != TokenKind::Array {
            return Err(ParserError::UnexpectedType {
                context: "array element count",
            });
        }
        Ok(token.size)
    }

    /// The `n`th element of array `idx`, or `None` past the end.
    pub fn array_nth_element(
        &self,
        idx: TokenIdx,
        n: usize,
    ) -> Result<Option<TokenIdx>, ParserError> {
        if self.kind(idx)? != TokenKind::Array {
            return Err(ParserError::UnexpectedType {
                context: "array element lookup",
            });
        }
        Ok(self.children(idx)?.nth(n))
    }

    /// Scalar text of `idx`: unescaped string contents or the primitive spelling.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::UnexpectedType` for containers.
    pub fn text(&self, idx: TokenIdx) -> Result<&str, ParserError> {
        let token = self.token(idx)?;
        if !token.kind.is_scalar() {
            return Err(ParserError::UnexpectedType {
                context: "scalar text",
            });
        }
        Ok(&token.text)
    }

    /// Renders a token for display.
    ///
    /// Scalars render as their text; containers render as compact JSON.
    pub fn render(&self, idx: TokenIdx) -> Result<Cow<'_, str>, ParserError> {
        let token = self.token(idx)?;
        if token.kind.is_scalar() {
            return Ok(Cow::Borrowed(&token.text));
        }
        let mut out = String::new();
        self.write_json(idx, &mut out)?;
        Ok(Cow::Owned(out))
    }

    fn write_json(&self, idx: TokenIdx, out: &mut String) -> Result<(), ParserError> {
        let token = self.token(idx)?;
        match token.kind {
            TokenKind::String => out.push_str(&quote(&token.text)),
            TokenKind::Primitive => out.push_str(&token.text),
            TokenKind::Object => {
                out.push('{');
                for (i, child) in self.children(idx)?.enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&quote(self.key(child)?.unwrap_or_default()));
                    out.push(':');
                    self.write_json(child, out)?;
                }
                out.push('}');
            }
            TokenKind::Array => {
                out.push('[');
                for (i, child) in self.children(idx)?.enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write_json(child, out)?;
                }
                out.push(']');
            }
        }
        Ok(())
    }

    /// Renders page `page` of a token split into chunks of at most `width` columns.
    ///
    /// Returns the page text and the total number of pages. An empty value has a
    /// single empty page. Splits fall on character boundaries; a character wider
    /// than `width` gets a page of its own.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::DisplayPageOutOfRange` if `page` is not below the
    /// page count.
    pub fn render_page(
        &self,
        idx: TokenIdx,
        width: usize,
        page: usize,
    ) -> Result<(String, usize), ParserError> {
        let rendered = self.render(idx)?;
        let pages = paginate(&rendered, width.max(1));
        let page_count = pages.len();
        let text = pages
            .get(page)
            .map(|p| (*p).to_string())
            .ok_or(ParserError::DisplayPageOutOfRange { page, page_count })?;
        Ok((text, page_count))
    }
}

/// Iterator over the direct children of a container token.
pub struct Children<'a> {
    tree: &'a TokenTree,
    next: usize,
    end: usize,
}

impl Iterator for Children<'_> {
    type Item = TokenIdx;

    fn next(&mut self) -> Option<TokenIdx> {
        if self.next >= self.end {
            return None;
        }
        let current = self.next;
        self.next = self.tree.tokens.get(current)?.end;
        Some(TokenIdx(current))
    }
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

fn paginate(text: &str, width: usize) -> Vec<&str> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut columns = 0;
    for (offset, c) in text.char_indices() {
        let w = c.width().unwrap_or(0);
        if columns > 0 && columns + w > width {
            pages.push(&text[start..offset]);
            start = offset;
            columns = 0;
        }
        columns += w;
    }
    if start < text.len() || pages.is_empty() {
        pages.push(&text[start..]);
    }
    pages
}

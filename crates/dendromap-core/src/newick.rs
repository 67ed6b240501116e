//! Newick tree parser.
//!
//! The grammar is the minimal one produced by clustering services: nested parentheses, commas
//! between siblings, an optional `:length` after any node, an optional label after any node and a
//! terminating `;`. Quoted labels, comments and NHX annotations are not recognized.

use crate::{Error, ParseOptions, Result};
use serde::{Deserialize, Serialize};

/// A parsed Newick node.
///
/// A node is a leaf iff `branchset` is empty. Internal nodes usually have an empty `name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branchset: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.branchset.is_empty()
    }

    /// Edge length to the parent, with an absent length counted as zero.
    pub fn length_or_zero(&self) -> f64 {
        self.length.unwrap_or(0.0)
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.branchset.iter().map(TreeNode::leaf_count).sum()
    }

    /// Leaf names in left-to-right (post-order) order.
    pub fn leaf_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                out.push(node.name.clone());
                continue;
            }
            for child in node.branchset.iter().rev() {
                stack.push(child);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Open,
    Close,
    Comma,
    Colon,
    Semicolon,
    Text,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
    offset: usize,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn delimiter(ch: char) -> Option<TokenKind> {
        match ch {
            '(' => Some(TokenKind::Open),
            ')' => Some(TokenKind::Close),
            ',' => Some(TokenKind::Comma),
            ':' => Some(TokenKind::Colon),
            ';' => Some(TokenKind::Semicolon),
            _ => None,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.rest();
            let ch = rest.chars().next()?;
            let offset = self.pos;

            if let Some(kind) = Self::delimiter(ch) {
                self.pos += ch.len_utf8();
                return Some(Token {
                    kind,
                    text: &rest[..ch.len_utf8()],
                    offset,
                });
            }

            let end = rest
                .char_indices()
                .find(|(_, c)| Self::delimiter(*c).is_some())
                .map(|(idx, _)| idx)
                .unwrap_or(rest.len());
            self.pos += end;

            let raw = &rest[..end];
            let text = raw.trim();
            if text.is_empty() {
                continue;
            }
            let lead = raw.len() - raw.trim_start().len();
            return Some(Token {
                kind: TokenKind::Text,
                text,
                offset: offset + lead,
            });
        }
    }
}

/// Parses a Newick string into a nested [`TreeNode`].
///
/// Strict parsing rejects unbalanced parentheses, non-numeric branch lengths and trailing tokens
/// after `;`. Lenient parsing keeps whatever structure was built so far: stray closers and commas
/// at the root level are ignored, unclosed groups are closed at end of input and unparseable
/// lengths are dropped.
pub fn parse_newick(text: &str, options: ParseOptions) -> Result<TreeNode> {
    let strict = !options.lenient;
    let mut ancestors: Vec<TreeNode> = Vec::new();
    let mut current = TreeNode::default();
    let mut prev: Option<TokenKind> = None;
    let mut seen_any = false;
    let mut terminated_at: Option<usize> = None;

    for token in Lexer::new(text) {
        if let Some(at) = terminated_at {
            if strict {
                return Err(Error::newick(
                    token.offset,
                    format!("unexpected {:?} after terminating ';' at byte {at}", token.text),
                ));
            }
            tracing::warn!(offset = token.offset, "ignoring Newick token after ';'");
            continue;
        }
        seen_any = true;

        match token.kind {
            TokenKind::Open => {
                ancestors.push(std::mem::take(&mut current));
            }
            TokenKind::Comma => {
                let Some(parent) = ancestors.last_mut() else {
                    if strict {
                        return Err(Error::newick(token.offset, "',' outside of any group"));
                    }
                    tracing::warn!(offset = token.offset, "ignoring ',' outside of any group");
                    prev = Some(token.kind);
                    continue;
                };
                parent.branchset.push(std::mem::take(&mut current));
            }
            TokenKind::Close => {
                let Some(mut parent) = ancestors.pop() else {
                    if strict {
                        return Err(Error::newick(token.offset, "unbalanced ')'"));
                    }
                    tracing::warn!(offset = token.offset, "ignoring unbalanced ')'");
                    prev = Some(token.kind);
                    continue;
                };
                parent.branchset.push(std::mem::take(&mut current));
                current = parent;
            }
            TokenKind::Colon => {
                if strict && current.length.is_some() {
                    return Err(Error::newick(token.offset, "duplicate branch length"));
                }
            }
            TokenKind::Semicolon => {
                terminated_at = Some(token.offset);
            }
            TokenKind::Text => match prev {
                Some(TokenKind::Colon) => match token.text.parse::<f64>() {
                    Ok(length) if length.is_finite() => current.length = Some(length),
                    _ if strict => {
                        return Err(Error::newick(
                            token.offset,
                            format!("invalid branch length {:?}", token.text),
                        ));
                    }
                    _ => {
                        tracing::warn!(
                            offset = token.offset,
                            text = token.text,
                            "dropping invalid branch length"
                        );
                    }
                },
                None | Some(TokenKind::Open | TokenKind::Close | TokenKind::Comma) => {
                    current.name = token.text.to_string();
                }
                Some(TokenKind::Semicolon | TokenKind::Text) => {}
            },
        }

        if strict && prev == Some(TokenKind::Colon) && token.kind != TokenKind::Text {
            return Err(Error::newick(token.offset, "expected a branch length after ':'"));
        }
        prev = Some(token.kind);
    }

    if !seen_any {
        if strict {
            return Err(Error::newick(0, "empty Newick input"));
        }
        return Ok(current);
    }

    if !ancestors.is_empty() {
        if strict {
            return Err(Error::newick(
                text.len(),
                format!("{} unclosed '('", ancestors.len()),
            ));
        }
        tracing::warn!(open = ancestors.len(), "closing unbalanced '(' at end of input");
        while let Some(mut parent) = ancestors.pop() {
            parent.branchset.push(current);
            current = parent;
        }
    }

    Ok(current)
}

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    cst::{node::Node, tree::{ItemExtent, SyntaxTree}},
    errors::errors::Error,
    lexer::{
        lexer::Lexer,
        tokens::{Token, TokenKind},
    },
    parser::parser::{parse_tokens, parse_with_options},
    check_source_len,
};

/// One text edit: `removed_len` bytes at `start` replaced by `inserted_len` bytes.
///
/// Offsets refer to the text as it is after all earlier edits of the same batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub start: usize,
    pub removed_len: usize,
    pub inserted_len: usize,
}

impl Edit {
    pub fn new(start: usize, removed_len: usize, inserted_len: usize) -> Self {
        Edit {
            start,
            removed_len,
            inserted_len,
        }
    }
}

/// The single region a batch of edits touched.
///
/// `old[start..old_end]` was replaced by `new[start..new_end]`; everything
/// before `start` and after the ends is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangedRange {
    pub start: usize,
    pub old_end: usize,
    pub new_end: usize,
}

impl ChangedRange {
    /// Merges `edits` applied in sequence to a text of `old_len` bytes.
    /// Returns `None` when an edit reaches past the text it applies to.
    pub fn from_edits(old_len: usize, edits: &[Edit]) -> Option<Self> {
        let mut range: Option<ChangedRange> = None;
        let mut len = old_len;

        for edit in edits {
            let edit_end = edit.start.checked_add(edit.removed_len)?;
            if edit_end > len {
                return None;
            }
            len = len - edit.removed_len + edit.inserted_len;

            range = Some(match range {
                None => ChangedRange {
                    start: edit.start,
                    old_end: edit_end,
                    new_end: edit.start + edit.inserted_len,
                },
                Some(range) => ChangedRange {
                    start: range.start.min(edit.start),
                    old_end: range.old_end + edit_end.saturating_sub(range.new_end),
                    new_end: range.new_end.max(edit_end) - edit.removed_len + edit.inserted_len,
                },
            });
        }

        Some(range.unwrap_or(ChangedRange {
            start: old_len,
            old_end: old_len,
            new_end: old_len,
        }))
    }

    /// Byte difference between the new and the old text.
    pub fn delta(&self) -> i64 {
        self.new_end as i64 - self.old_end as i64
    }

    /// Whether `old` and `new` really only differ inside this range.
    pub fn agrees_with(&self, old: &str, new: &str) -> bool {
        if self.start > self.old_end
            || self.start > self.new_end
            || self.old_end > old.len()
            || self.new_end > new.len()
            || old.len() - self.old_end != new.len() - self.new_end
        {
            return false;
        }

        old.as_bytes()[..self.start] == new.as_bytes()[..self.start]
            && old.as_bytes()[self.old_end..] == new.as_bytes()[self.new_end..]
    }

    /// Maps an offset of the new text back to the old text. Offsets inside
    /// the changed region have no counterpart.
    fn to_old(&self, offset: usize) -> Option<usize> {
        if offset < self.start {
            Some(offset)
        } else if offset >= self.new_end {
            Some((offset as i64 - self.delta()) as usize)
        } else {
            None
        }
    }
}

fn shifted_token(token: &Token, delta: i64) -> Token {
    Token {
        span: token.span.shifted(delta),
        ..token.clone()
    }
}

/// Lexes `source` reusing the tokens of the previous version where the
/// lexer provably produces the same result.
///
/// Old tokens whose lexing never looked at the changed region are kept.
/// Lexing restarts after them and stops as soon as it reaches the start of
/// an old token beyond the change, from where the old tail is shifted in.
pub fn relex(source: &str, old_tokens: &[Token], range: &ChangedRange) -> Vec<Token> {
    let delta = range.delta();

    let mut tokens: Vec<Token> = old_tokens
        .iter()
        .take_while(|token| {
            token.kind != TokenKind::EOF && (token.lookahead_end() as usize) < range.start
        })
        .cloned()
        .collect();
    let kept = tokens.len();
    let restart = tokens.last().map(|token| token.span.end as usize).unwrap_or(0);

    let mut relexed = 0;
    let mut reused = 0;

    for token in Lexer::starting_at(source, restart).filter(|token| !token.kind.is_extra()) {
        let start = token.span.start as usize;
        if start >= range.new_end {
            let old_start = (start as i64 - delta) as u32;
            if let Ok(index) = old_tokens.binary_search_by_key(&old_start, |old| old.span.start) {
                let tail = &old_tokens[index..];
                reused = tail.len();
                tokens.extend(tail.iter().map(|old| shifted_token(old, delta)));
                break;
            }
        }

        relexed += 1;
        tokens.push(token);
    }

    debug!(kept, relexed, reused, "relexed after edit");

    tokens
}

/// Counters for one incremental parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReuseStats {
    /// Items copied over from the previous tree.
    pub reused: usize,
    /// Item positions where nothing could be reused.
    pub reparsed: usize,
}

/// Offers items of the previous tree to the parser at item boundaries.
pub struct ReuseCursor<'old> {
    old: &'old SyntaxTree,
    range: ChangedRange,
    next_item: usize,
    stats: ReuseStats,
}

impl<'old> ReuseCursor<'old> {
    pub fn new(old: &'old SyntaxTree, range: ChangedRange) -> Self {
        ReuseCursor {
            old,
            range,
            next_item: 0,
            stats: ReuseStats::default(),
        }
    }

    pub fn stats(&self) -> ReuseStats {
        self.stats
    }

    /// Returns the old item that started at the position of `tokens[at]`,
    /// shifted into place, if every token it examined is unchanged.
    pub fn take(&mut self, tokens: &[Token], at: usize) -> Option<(Node, ItemExtent)> {
        let found = self.find(tokens, at);
        match found {
            Some(_) => self.stats.reused += 1,
            None => self.stats.reparsed += 1,
        }
        found
    }

    fn find(&mut self, tokens: &[Token], at: usize) -> Option<(Node, ItemExtent)> {
        let position = tokens.get(at)?.span.start as usize;
        let old_position = self.range.to_old(position)?;

        // Items are in source order, and so are the positions we are asked about
        let old_tokens = self.old.tokens();
        let old_items = self.old.items();
        let item_start = |extent: &ItemExtent| {
            old_tokens
                .get(extent.first_token)
                .map(|token| token.span.start as usize)
        };

        while let Some(extent) = old_items.get(self.next_item) {
            if item_start(extent)? >= old_position {
                break;
            }
            self.next_item += 1;
        }

        let extent = *old_items.get(self.next_item)?;
        if item_start(&extent)? != old_position {
            return None;
        }

        let shift = if old_position < self.range.start {
            0
        } else {
            self.range.delta()
        };

        for index in extent.first_token..=extent.lookahead {
            let old_token = old_tokens.get(index)?;
            let new_token = tokens.get(at + (index - extent.first_token))?;

            // Every examined token must sit on the same side of the change as the item
            let unchanged = if shift == 0 {
                old_token.span.end as usize <= self.range.start
            } else {
                old_token.span.start as usize >= self.range.old_end
            };

            if !unchanged
                || new_token.kind != old_token.kind
                || new_token.span != old_token.span.shifted(shift)
            {
                return None;
            }
        }

        let mut node = self.old.root().children.get(self.next_item)?.node.clone();
        node.shift(shift);
        self.next_item += 1;

        Some((
            node,
            ItemExtent {
                first_token: at,
                end_token: at + (extent.end_token - extent.first_token),
                lookahead: at + (extent.lookahead - extent.first_token),
            },
        ))
    }
}

/// Re-parses `source`, the result of applying `edits` to the source of
/// `previous`, reusing the unchanged tokens and items of `previous`.
///
/// The result is identical to `parse_with_options(source, previous.options())`.
/// When the edits do not describe how `source` differs from the previous
/// source, this falls back to a full parse.
pub fn parse_incremental(
    source: &str,
    previous: &SyntaxTree,
    edits: &[Edit],
) -> Result<SyntaxTree, Error> {
    let options = previous.options();
    check_source_len(source.len())?;

    let range = ChangedRange::from_edits(previous.source().len(), edits)
        .filter(|range| range.agrees_with(previous.source(), source));
    let Some(range) = range else {
        warn!("edits do not match the new source, parsing from scratch");
        return parse_with_options(source, options);
    };

    let tokens = relex(source, previous.tokens(), &range);
    let mut cursor = ReuseCursor::new(previous, range);
    let tree = parse_tokens(source, tokens, options, Some(&mut cursor))?;

    let stats = cursor.stats();
    debug!(
        reused = stats.reused,
        reparsed = stats.reparsed,
        "incremental parse finished"
    );

    Ok(tree)
}

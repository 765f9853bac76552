//! Incremental re-parsing.
//!
//! After an edit only the affected part of the source is lexed and parsed
//! again:
//!
//! 1. **Change range** - the batch of edits is merged into one changed region
//! 2. **Re-lex** - tokens before the region are kept, lexing restarts after
//!    them and resynchronises with the old tokens past the region
//! 3. **Item reuse** - at each top-level item boundary the old item is copied
//!    over (spans shifted) when none of the tokens it looked at changed
//!
//! The result is always identical to a full parse of the new source.

pub mod incremental;

#[cfg(test)]
mod tests;

//! Shared cursor-pagination helper for listable tables.
//!
//! All listable tables index `(created_at DESC, id DESC)` per spec.md §6;
//! this module builds the `WHERE` clause a cursor implies so each DAO
//! doesn't reimplement the comparison.

use vs_core::cursor::{self, CursorPayload, Page};

/// Decode an optional cursor string into the `(created_at, id)` tuple used
/// to seek the next page, or `None` for the first page.
pub fn decode_cursor(
    cursor: Option<&str>,
    secret: &str,
) -> Result<Option<CursorPayload>, cursor::CursorError> {
    cursor.map(|c| cursor::decode(c, secret)).transpose()
}

/// Build a `Page<T>` from a fetch that intentionally over-fetched by one row
/// (`limit + 1`) to determine `has_more` without a second query.
pub fn build_page<T, F>(mut rows: Vec<T>, limit: usize, secret: &str, cursor_of: F) -> Page<T>
where
    F: Fn(&T) -> CursorPayload,
{
    let has_more = rows.len() > limit;
    if has_more {
        rows.truncate(limit);
    }
    let next_cursor = if has_more {
        rows.last().map(|item| cursor::encode(&cursor_of(item), secret))
    } else {
        None
    };
    Page {
        items: rows,
        next_cursor,
        has_more,
    }
}

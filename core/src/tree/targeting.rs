//! Path resolver: locate a caller path in a snapshot matrix.
//!
//! A single forward pass over the rows. Segment `k` of the path must match
//! a row at column `k`; each accepted row moves the row cursor past itself
//! and the column cursor one level deeper. A row whose column drops below
//! the expected one means the search has left the accepted ancestor's
//! subtree and the path does not exist.
//!
//! - Non-terminal segments take the first matching row.
//! - The last segment takes the `index`-th matching row (1-based).
//! - When the toolkit lets callers omit the root, a root label that does not
//!   match the first segment is put in front of the path.

use tracing::debug;

use crate::tree::snapshot::Matrix;
use crate::tree::tokenize::PathTokens;
use crate::types::node::{MatchMode, NodeInfo};


/// Compare one path segment with a node label.
///
/// An empty segment never matches.
pub fn cell_matches(cell: &str, token: &str, mode: MatchMode) -> bool {
    if token.is_empty() {
        return false;
    }
    match mode {
        MatchMode::Exact => cell == token,
        MatchMode::Partial => cell.to_lowercase().contains(&token.to_lowercase()),
    }
}


/// Resolve `tokens` against `matrix`.
///
/// # Returns
///
/// The located node with the labels actually matched, or `None` when no row
/// qualifies within the legal range.
pub fn resolve(
    matrix: &Matrix,
    tokens: &PathTokens,
    mode: MatchMode,
    auto_prefix_root: bool,
    delimiter: &str,
) -> Option<NodeInfo> {
    if tokens.segments.is_empty() || matrix.is_empty() {
        return None;
    }

    // Rows accepted so far, one per column.
    let mut matched: Vec<usize> = Vec::with_capacity(tokens.segments.len() + 1);
    if auto_prefix_root {
        if let Some(root) = matrix.root_label() {
            if !cell_matches(root, &tokens.segments[0], mode) {
                debug!(root, "path omits the root, prefixing it");
                matched.push(0);
            }
        }
    }

    let last = tokens.segments.len() - 1;
    for (i, token) in tokens.segments.iter().enumerate() {
        let col = matched.len();
        let search_from = matched.last().map(|r| r + 1).unwrap_or(0);
        let wanted = if i == last { tokens.index.max(1) } else { 1 };
        match scan(matrix, search_from, col, token, mode, wanted) {
            Some(row) => {
                debug!(token = %token, row, col, "segment matched");
                matched.push(row);
            }
            None => {
                debug!(token = %token, col, occurrence = wanted, "segment not found");
                return None;
            }
        }
    }

    let segments: Vec<String> = matched
        .iter()
        .filter_map(|&r| matrix.row(r).map(|row| row.label.clone()))
        .collect();
    let row = *matched.last()?;
    Some(NodeInfo {
        row,
        col: matched.len() - 1,
        canonical_path: segments.join(delimiter),
        segments,
    })
}


/// Find the `wanted`-th row at `col` matching `token`, starting at `from`
/// and stopping at the first row shallower than `col`.
fn scan(
    matrix: &Matrix,
    from: usize,
    col: usize,
    token: &str,
    mode: MatchMode,
    wanted: usize,
) -> Option<usize> {
    let mut hits = 0;
    for (offset, row) in matrix.rows().iter().skip(from).enumerate() {
        if row.col < col {
            return None;
        }
        if row.col == col && cell_matches(&row.label, token, mode) {
            hits += 1;
            if hits == wanted {
                return Some(from + offset);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

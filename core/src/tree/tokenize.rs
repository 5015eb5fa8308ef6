//! Path tokenizer: split a caller path into segments and read the
//! optional `INDEX=n` disambiguation modifier.
//!
//! Segments are split on the literal delimiter and trimmed. Empty segments
//! are kept: `"A->->B"` has three segments, the middle one empty, and an
//! empty segment never matches a node.

use tracing::debug;


/// Delimiter and modifier prefix used to read caller paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSyntax {
    pub delimiter: String,
    pub index_prefix: String,
}


impl Default for PathSyntax {
    fn default() -> Self {
        PathSyntax {
            delimiter: "->".into(),
            index_prefix: "INDEX=".into(),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTokens {
    pub segments: Vec<String>,
    /// 1-based occurrence of the last segment to select.
    pub index: usize,
}


pub fn tokenize(path: &str, syntax: &PathSyntax, index_modifier: Option<&str>) -> PathTokens {
    let segments = path
        .split(syntax.delimiter.as_str())
        .map(|s| s.trim().to_string())
        .collect();
    let index = index_modifier
        .map(|m| parse_index(m, &syntax.index_prefix))
        .unwrap_or(1);
    PathTokens { segments, index }
}


/// Read `INDEX=n` (prefix case-insensitive). Anything unreadable is 1.
pub fn parse_index(modifier: &str, prefix: &str) -> usize {
    let trimmed = modifier.trim();
    let Some(value) = strip_prefix_ignore_case(trimmed, prefix) else {
        debug!(modifier, "index modifier lacks '{}' prefix, using 1", prefix);
        return 1;
    };
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            debug!(modifier, "unreadable index modifier, using 1");
            1
        }
    }
}


fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let n = prefix.len();
    if s.len() >= n && s.is_char_boundary(n) && s[..n].eq_ignore_ascii_case(prefix) {
        Some(&s[n..])
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

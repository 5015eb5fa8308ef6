use serde::{Deserialize, Serialize};


/// How a path segment is compared with a node label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Literal equality.
    #[default]
    Exact,
    /// Case-insensitive substring containment.
    Partial,
}


impl MatchMode {
    pub fn from_partial(partial: bool) -> MatchMode {
        if partial {
            MatchMode::Partial
        } else {
            MatchMode::Exact
        }
    }
}


/// A node located in a snapshot matrix.
///
/// `segments` are the labels actually matched, root first, and
/// `canonical_path` is those labels joined by the path delimiter.
///
/// `segments` always holds `col + 1` labels. A label that itself contains
/// the delimiter (reachable through partial matching) makes
/// `canonical_path` split into more pieces than that, so callers needing
/// the labels use `segments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub row: usize,
    pub col: usize,
    pub canonical_path: String,
    pub segments: Vec<String>,
}

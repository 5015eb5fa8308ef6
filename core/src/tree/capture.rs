//! Subtree capture: slice a resolved node's subtree into indented lines.
//!
//! Pairs the extractor with the snapshot facts needed to report what was
//! captured. Writing the lines out is left to `data::export`.

use serde::Serialize;
use tracing::debug;

use crate::tree::dispatch;
use crate::tree::snapshot::{Matrix, TreeSnapshot};
use crate::types::node::NodeInfo;


/// Lines captured from one tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureResult {
    pub tree: String,
    /// Reported path of the branch, `None` for a whole-tree capture.
    pub branch: Option<String>,
    pub lines: Vec<String>,
}


/// Extract the subtree of `anchor` as indented lines.
///
/// The anchor's own label comes first, un-indented. Each descendant is
/// prefixed by `indent_mark` once per level below the anchor. The scan stops
/// at the first row at or above the anchor's column, or at the matrix end.
///
/// Without an anchor every row is emitted, indented by its raw column.
pub fn extract(matrix: &Matrix, anchor: Option<&NodeInfo>, indent_mark: &str) -> Vec<String> {
    let Some(anchor) = anchor else {
        return matrix
            .rows()
            .iter()
            .map(|r| format!("{}{}", indent_mark.repeat(r.col), r.label))
            .collect();
    };
    let Some(head) = matrix.row(anchor.row) else {
        return Vec::new();
    };

    let mut lines = vec![head.label.clone()];
    for row in &matrix.rows()[anchor.row + 1..] {
        if row.col <= head.col {
            break;
        }
        lines.push(format!("{}{}", indent_mark.repeat(row.col - head.col), row.label));
    }
    lines
}


/// Capture a branch (or the whole tree) from a snapshot.
pub fn capture(
    snapshot: &TreeSnapshot,
    anchor: Option<&NodeInfo>,
    indent_mark: &str,
    delimiter: &str,
) -> CaptureResult {
    let lines = extract(&snapshot.matrix, anchor, indent_mark);
    let branch = anchor.map(|a| dispatch::reported_path(snapshot, a, delimiter));
    debug!(tree = %snapshot.tree, branch = ?branch, lines = lines.len(), "captured tree lines");
    CaptureResult {
        tree: snapshot.tree.clone(),
        branch,
        lines,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Domain;
    use crate::tree::snapshot::Row;

    fn hidden_root_snapshot() -> TreeSnapshot {
        let rows = [(0, "Root"), (1, "Folder"), (2, "Doc1"), (2, "Doc2")];
        TreeSnapshot {
            tree: "docs".into(),
            domain: Domain::Java,
            root_hidden: true,
            matrix: Matrix::from_rows(
                rows.iter()
                    .map(|(col, label)| Row { col: *col, label: label.to_string() })
                    .collect(),
            ),
        }
    }

    fn folder() -> NodeInfo {
        NodeInfo {
            row: 1,
            col: 1,
            canonical_path: "Root->Folder".into(),
            segments: vec!["Root".into(), "Folder".into()],
        }
    }

    #[test]
    fn branch_capture_stops_at_matrix_end() {
        let snap = hidden_root_snapshot();
        let lines = extract(&snap.matrix, Some(&folder()), "\t");
        assert_eq!(lines, vec!["Folder", "\tDoc1", "\tDoc2"]);
    }

    #[test]
    fn branch_capture_stops_at_sibling() {
        let matrix = Matrix::from_rows(vec![
            Row { col: 0, label: "A".into() },
            Row { col: 1, label: "a1".into() },
            Row { col: 2, label: "a11".into() },
            Row { col: 0, label: "B".into() },
            Row { col: 1, label: "b1".into() },
        ]);
        let anchor = NodeInfo { row: 0, col: 0, canonical_path: "A".into(), segments: vec!["A".into()] };
        assert_eq!(extract(&matrix, Some(&anchor), "  "), vec!["A", "  a1", "    a11"]);
    }

    #[test]
    fn whole_tree_uses_raw_columns() {
        let snap = hidden_root_snapshot();
        let lines = extract(&snap.matrix, None, "-");
        assert_eq!(lines, vec!["Root", "-Folder", "--Doc1", "--Doc2"]);
    }

    #[test]
    fn leaf_anchor_is_single_line() {
        let snap = hidden_root_snapshot();
        let anchor = NodeInfo {
            row: 3,
            col: 2,
            canonical_path: "Root->Folder->Doc2".into(),
            segments: vec!["Root".into(), "Folder".into(), "Doc2".into()],
        };
        assert_eq!(extract(&snap.matrix, Some(&anchor), "\t"), vec!["Doc2"]);
    }

    #[test]
    fn capture_reports_stripped_branch() {
        let snap = hidden_root_snapshot();
        let result = capture(&snap, Some(&folder()), "\t", "->");
        assert_eq!(result.branch.as_deref(), Some("Folder"));
        assert_eq!(result.lines.len(), 3);
        assert!(capture(&snap, None, "\t", "->").branch.is_none());
    }
}

//! Action dispatch: resolved node to native selector, then to the engine.
//!
//! The engine addresses nodes the way the user sees them, so a hidden root
//! the snapshot inserted is stripped again before the selector is built.
//! Every engine fault is retried after the engine drops its handle cache;
//! only the fault of the last attempt is surfaced.

use tracing::{debug, warn};

use crate::engine::{EngineFault, NativeOp, NativeSelector, TreeEngine};
use crate::error::TreeError;
use crate::tree::snapshot::{Matrix, TreeSnapshot};
use crate::tree::tokenize::PathTokens;
use crate::types::node::NodeInfo;


/// Matched labels as the user sees them.
///
/// Drops the leading root when the snapshot inserted it as a hidden row. A
/// path made of the root alone cannot be stripped and is kept whole.
pub fn visible_segments<'a>(snapshot: &TreeSnapshot, node: &'a NodeInfo) -> &'a [String] {
    if !snapshot.root_hidden {
        return &node.segments;
    }
    match node.segments.len() {
        0 => &node.segments,
        1 => {
            warn!(
                tree = %snapshot.tree,
                path = %node.canonical_path,
                "path is the hidden root itself, reporting it unstripped"
            );
            &node.segments
        }
        _ => &node.segments[1..],
    }
}


/// Path text to show the caller for a resolved node.
pub fn reported_path(snapshot: &TreeSnapshot, node: &NodeInfo, delimiter: &str) -> String {
    visible_segments(snapshot, node).join(delimiter)
}


/// Position of `row` among its siblings carrying the identical label.
///
/// # Returns
///
/// `(ordinal, total)`, the ordinal 1-based.
pub fn leaf_occurrence(matrix: &Matrix, row: usize) -> (usize, usize) {
    let Some(target) = matrix.row(row) else {
        return (1, 1);
    };
    let (start, end) = match matrix.parent(row) {
        Some(parent) => (parent + 1, matrix.subtree_end(parent)),
        None => (0, matrix.len()),
    };
    let mut ordinal = 0;
    let mut total = 0;
    for (i, r) in matrix.rows()[start..end].iter().enumerate() {
        if r.col == target.col && r.label == target.label {
            total += 1;
            if start + i <= row {
                ordinal = total;
            }
        }
    }
    (ordinal.max(1), total.max(1))
}


/// Build the native selector for a resolved node.
///
/// The leaf index is only set when the leaf label is shared by siblings.
pub fn selector(snapshot: &TreeSnapshot, node: &NodeInfo) -> NativeSelector {
    let (ordinal, total) = leaf_occurrence(&snapshot.matrix, node.row);
    NativeSelector {
        segments: visible_segments(snapshot, node).to_vec(),
        leaf_index: (total > 1).then_some(ordinal),
    }
}


/// Run `call`, retrying any fault after clearing the engine's cache.
///
/// At most `retries` extra attempts are made; the last fault is returned.
pub fn with_retry<E, T, F>(engine: &mut E, retries: u32, what: &str, mut call: F) -> Result<T, EngineFault>
where
    E: TreeEngine + ?Sized,
    F: FnMut(&mut E) -> Result<T, EngineFault>,
{
    let mut attempt = 0;
    loop {
        match call(engine) {
            Ok(value) => return Ok(value),
            Err(fault) if attempt < retries => {
                attempt += 1;
                warn!(what, %fault, attempt, "engine fault, clearing cache and retrying");
                engine.clear_cache();
            }
            Err(fault) => return Err(fault),
        }
    }
}


/// Perform `op` on the node addressed by `selector`.
pub fn perform<E>(
    engine: &mut E,
    widget: &str,
    op: NativeOp,
    selector: &NativeSelector,
    retries: u32,
) -> Result<(), EngineFault>
where
    E: TreeEngine + ?Sized,
{
    debug!(widget, op = op.name(), selector = %selector, "dispatching");
    with_retry(engine, retries, op.name(), |e| e.perform(widget, op, selector))
}


/// Perform `op` straight from the caller's segments, without a snapshot.
///
/// The caller may have spelled out a root the engine does not address, so a
/// multi-segment path still rejected after the retry is tried once more
/// without its first segment.
///
/// # Returns
///
/// The selector the engine accepted.
pub fn perform_unverified<E>(
    engine: &mut E,
    widget: &str,
    op: NativeOp,
    tokens: &PathTokens,
    retries: u32,
    delimiter: &str,
) -> Result<NativeSelector, TreeError>
where
    E: TreeEngine + ?Sized,
{
    let leaf_index = (tokens.index > 1).then_some(tokens.index);
    let full = NativeSelector {
        segments: tokens.segments.clone(),
        leaf_index,
    };
    let not_found = || TreeError::NotFound {
        path: tokens.segments.join(delimiter),
        index: tokens.index,
    };

    match perform(engine, widget, op, &full, retries) {
        Ok(()) => return Ok(full),
        Err(EngineFault::SubitemNotFound(_)) if full.segments.len() > 1 => {}
        Err(EngineFault::SubitemNotFound(_)) => return Err(not_found()),
        Err(fault) => return Err(fault.into()),
    }

    let trimmed = NativeSelector {
        segments: full.segments[1..].to_vec(),
        leaf_index,
    };
    debug!(widget, selector = %trimmed, "retrying without the first segment");
    match perform(engine, widget, op, &trimmed, retries) {
        Ok(()) => Ok(trimmed),
        Err(EngineFault::SubitemNotFound(_)) => Err(not_found()),
        Err(fault) => Err(fault.into()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixture::FixtureEngine;
    use crate::engine::Domain;
    use crate::tree::snapshot::Row;
    use crate::tree::tokenize::{tokenize, PathSyntax};

    fn snapshot(rows: &[(usize, &str)], root_hidden: bool) -> TreeSnapshot {
        TreeSnapshot {
            tree: "t".into(),
            domain: Domain::Java,
            root_hidden,
            matrix: Matrix::from_rows(
                rows.iter()
                    .map(|(col, label)| Row { col: *col, label: label.to_string() })
                    .collect(),
            ),
        }
    }

    fn node(row: usize, segments: &[&str]) -> NodeInfo {
        NodeInfo {
            row,
            col: segments.len() - 1,
            canonical_path: segments.join("->"),
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }

    const DOCS: &str = r#"
docs:
  domain: java
  root: Root
  root_visible: false
  nodes:
    - label: Folder
      children: [Doc1, Doc2, Doc2]
"#;

    #[test]
    fn hidden_root_is_stripped_from_report() {
        let snap = snapshot(&[(0, "Root"), (1, "Folder"), (2, "Doc2")], true);
        let n = node(2, &["Root", "Folder", "Doc2"]);
        assert_eq!(reported_path(&snap, &n, "->"), "Folder->Doc2");
    }

    #[test]
    fn root_only_path_is_kept_unstripped() {
        let snap = snapshot(&[(0, "Root"), (1, "Folder")], true);
        assert_eq!(reported_path(&snap, &node(0, &["Root"]), "->"), "Root");
    }

    #[test]
    fn visible_root_is_reported_whole() {
        let snap = snapshot(&[(0, "Root"), (1, "Folder")], false);
        assert_eq!(reported_path(&snap, &node(1, &["Root", "Folder"]), "->"), "Root->Folder");
    }

    #[test]
    fn leaf_index_only_for_shared_labels() {
        let snap = snapshot(&[(0, "R"), (1, "X"), (1, "Y"), (1, "X"), (2, "X")], false);
        let sel = selector(&snap, &node(3, &["R", "X"]));
        assert_eq!(sel.leaf_index, Some(2));
        let sel = selector(&snap, &node(1, &["R", "X"]));
        assert_eq!(sel.leaf_index, Some(1));
        let sel = selector(&snap, &node(2, &["R", "Y"]));
        assert_eq!(sel.leaf_index, None);
        // The nested X is alone under its own parent.
        let sel = selector(&snap, &node(4, &["R", "X", "X"]));
        assert_eq!(sel.leaf_index, None);
    }

    #[test]
    fn top_level_siblings_are_counted() {
        let matrix = Matrix::from_rows(vec![
            Row { col: 0, label: "A".into() },
            Row { col: 1, label: "c".into() },
            Row { col: 0, label: "A".into() },
        ]);
        assert_eq!(leaf_occurrence(&matrix, 2), (2, 2));
    }

    #[test]
    fn transient_fault_is_retried_once() {
        let mut engine = FixtureEngine::from_yaml(DOCS).unwrap();
        engine.fail_next(1);
        let sel = NativeSelector { segments: vec!["Folder".into(), "Doc1".into()], leaf_index: None };
        perform(&mut engine, "docs", NativeOp::Click, &sel, 1).unwrap();
        assert_eq!(engine.cache_clears(), 1);
        assert_eq!(engine.performed().len(), 1);
    }

    #[test]
    fn second_fault_is_surfaced() {
        let mut engine = FixtureEngine::from_yaml(DOCS).unwrap();
        engine.fail_next(2);
        let sel = NativeSelector { segments: vec!["Folder".into()], leaf_index: None };
        let err = perform(&mut engine, "docs", NativeOp::Expand, &sel, 1).unwrap_err();
        assert!(matches!(err, EngineFault::TargetGone(_)));
        assert_eq!(engine.cache_clears(), 1);
    }

    #[test]
    fn missing_node_is_retried_once() {
        let mut engine = FixtureEngine::from_yaml(DOCS).unwrap();
        let sel = NativeSelector { segments: vec!["Nope".into()], leaf_index: None };
        let err = perform(&mut engine, "docs", NativeOp::Click, &sel, 1).unwrap_err();
        assert!(matches!(err, EngineFault::SubitemNotFound(_)));
        assert_eq!(engine.cache_clears(), 1);
        assert_eq!(engine.attempts(), 2);
    }

    #[test]
    fn zero_retries_surfaces_first_fault() {
        let mut engine = FixtureEngine::from_yaml(DOCS).unwrap();
        engine.fail_next(1);
        let sel = NativeSelector { segments: vec!["Folder".into()], leaf_index: None };
        assert!(perform(&mut engine, "docs", NativeOp::Expand, &sel, 0).is_err());
        assert_eq!(engine.cache_clears(), 0);
    }

    #[test]
    fn unverified_drops_spelled_out_root() {
        let mut engine = FixtureEngine::from_yaml(DOCS).unwrap();
        let tokens = tokenize("Root->Folder->Doc2", &PathSyntax::default(), Some("INDEX=2"));
        let sel = perform_unverified(&mut engine, "docs", NativeOp::Click, &tokens, 1, "->").unwrap();
        assert_eq!(sel.segments, vec!["Folder", "Doc2"]);
        assert_eq!(sel.leaf_index, Some(2));
        // Full path: first try plus one retry, then the trimmed path.
        assert_eq!(engine.attempts(), 3);
        assert_eq!(engine.cache_clears(), 1);
    }

    #[test]
    fn unverified_missing_node_is_not_found() {
        let mut engine = FixtureEngine::from_yaml(DOCS).unwrap();
        let tokens = tokenize("Folder->Doc9", &PathSyntax::default(), None);
        let err = perform_unverified(&mut engine, "docs", NativeOp::Click, &tokens, 1, "->").unwrap_err();
        assert_eq!(err.to_string(), "No matching node found for 'Folder->Doc9'");
    }
}

//! Tree snapshot: flatten a live tree widget into a row matrix.
//!
//! Each node becomes one `Row` whose `col` is the node's depth. Rows appear
//! in pre-order, so a node's subtree is the contiguous run of rows after it
//! whose `col` is greater than its own. When the toolkit hides the model
//! root, a synthetic root row is placed first so paths can still be
//! resolved from the root.

use serde::Serialize;
use tracing::debug;

use crate::engine::{Domain, EngineFault, TreeEngine};


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub col: usize,
    pub label: String,
}


/// Flattened, read-only capture of a tree at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Matrix {
    rows: Vec<Row>,
}


impl Matrix {
    pub fn from_rows(rows: Vec<Row>) -> Matrix {
        Matrix { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Label of the first row, the root by construction.
    pub fn root_label(&self) -> Option<&str> {
        self.rows.first().map(|r| r.label.as_str())
    }

    /// One past the last row belonging to the subtree rooted at `index`.
    pub fn subtree_end(&self, index: usize) -> usize {
        let Some(anchor) = self.rows.get(index) else {
            return self.rows.len();
        };
        self.rows[index + 1..]
            .iter()
            .position(|r| r.col <= anchor.col)
            .map(|offset| index + 1 + offset)
            .unwrap_or(self.rows.len())
    }

    /// Row of the nearest ancestor, `None` for top-level rows.
    pub fn parent(&self, index: usize) -> Option<usize> {
        let col = self.rows.get(index)?.col;
        self.rows[..index].iter().rposition(|r| r.col < col)
    }
}


/// A matrix plus the facts about the widget it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub tree: String,
    pub domain: Domain,
    /// True when row 0 is a synthetic row for a root hidden from the UI.
    pub root_hidden: bool,
    pub matrix: Matrix,
}


/// Read the whole widget into a snapshot.
///
/// Returns `Ok(None)` when the widget reports no root nodes. Traversal uses
/// an explicit stack, children pushed in reverse so they are visited in
/// native order.
///
/// Engines that only materialize expanded or on-screen nodes yield a matrix
/// without the descendants they did not report.
pub fn build<E>(engine: &E, widget: &str) -> Result<Option<TreeSnapshot>, EngineFault>
where
    E: TreeEngine + ?Sized,
{
    let domain = engine.domain(widget)?;
    let roots = engine.root_nodes(widget)?;
    if roots.is_empty() {
        debug!(widget, "widget reported no root nodes");
        return Ok(None);
    }

    let root_hidden = domain.is_root_hidden(engine, widget)?;
    let mut rows = Vec::new();
    let mut base = 0;
    if root_hidden {
        let label = domain.root_label(engine.root_value(widget)?);
        debug!(widget, root = %label, "adding hidden root row");
        rows.push(Row { col: 0, label });
        base = 1;
    }

    let mut stack: Vec<(E::Node, usize)> = roots.into_iter().rev().map(|n| (n, base)).collect();
    while let Some((node, depth)) = stack.pop() {
        let label = domain.extract_label(engine.node_value(&node)?);
        let children = engine.children(&node)?;
        rows.push(Row { col: depth, label });
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }

    debug!(widget, domain = %domain, rows = rows.len(), root_hidden, "snapshot built");
    Ok(Some(TreeSnapshot {
        tree: widget.to_string(),
        domain,
        root_hidden,
        matrix: Matrix::from_rows(rows),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

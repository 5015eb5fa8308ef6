//! Engine boundary: what the tree core needs from a GUI automation engine.
//!
//! The automation engine owns the live widget. The tree core only reads from
//! it (root nodes, children, node values, root visibility) and hands it native
//! operations addressed by a [`NativeSelector`]. Toolkit differences are
//! confined to [`Domain`], which is consulted instead of scattering
//! per-toolkit checks through the resolver and the extractor.

use std::fmt;

use serde::{Deserialize, Serialize};


/// Faults raised by the automation engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineFault {
    #[error("unknown tree widget '{0}'")]
    UnknownWidget(String),

    #[error("no tree node matches '{0}'")]
    SubitemNotFound(String),

    #[error("target '{0}' is gone")]
    TargetGone(String),

    #[error("'{op}' is not supported by this {domain} tree")]
    Unsupported { op: String, domain: String },

    #[error("engine fault: {0}")]
    Remote(String),
}


/// Toolkit family a tree widget belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Java,
    Flex,
    Swt,
    Net,
    Html,
    Win,
}


impl Domain {
    pub fn name(self) -> &'static str {
        match self {
            Domain::Java => "java",
            Domain::Flex => "flex",
            Domain::Swt => "swt",
            Domain::Net => "net",
            Domain::Html => "html",
            Domain::Win => "win",
        }
    }

    /// Whether the widget keeps its root out of the visible UI.
    ///
    /// Only Swing trees can hide the model root; their engine omits it from
    /// the root node list. Flex trees always report their root as a node, and
    /// every other toolkit shows all of its roots.
    pub fn is_root_hidden<E>(self, engine: &E, widget: &str) -> Result<bool, EngineFault>
    where
        E: TreeEngine + ?Sized,
    {
        match self {
            Domain::Java => Ok(!engine.root_visible(widget)?),
            _ => Ok(false),
        }
    }

    /// Whether a caller may omit the root segment from a path.
    pub fn auto_prefixes_root(self) -> bool {
        matches!(self, Domain::Java | Domain::Flex)
    }

    /// Normalize a node value into its display label.
    pub fn extract_label(self, value: NodeValue) -> String {
        value.into_label()
    }

    /// Label of the model root. Swing reports it with trailing blanks the
    /// engine cannot address, so they are dropped.
    pub fn root_label(self, value: NodeValue) -> String {
        match self {
            Domain::Java => value.into_label().trim().to_string(),
            _ => value.into_label(),
        }
    }
}


impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


/// Value carried by a native tree node.
///
/// Engines wrap node data differently: plain text, a reference into the
/// application's object space, or some other object that only offers a
/// string conversion. All three collapse to a label at snapshot time.
pub enum NodeValue {
    Text(String),
    Reference {
        /// The engine's own description of the reference.
        handle: String,
        /// String form of the referenced object, if it is still reachable.
        referent: Option<String>,
    },
    Raw(Box<dyn fmt::Display + Send + Sync>),
}


impl NodeValue {
    pub fn into_label(self) -> String {
        match self {
            NodeValue::Text(text) => text,
            NodeValue::Reference { referent: Some(referent), .. } => referent,
            NodeValue::Reference { handle, referent: None } => handle,
            NodeValue::Raw(value) => value.to_string(),
        }
    }
}


impl fmt::Debug for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            NodeValue::Reference { handle, referent } => f
                .debug_struct("Reference")
                .field("handle", handle)
                .field("referent", referent)
                .finish(),
            NodeValue::Raw(value) => f.debug_tuple("Raw").field(&value.to_string()).finish(),
        }
    }
}


/// Native operations the engine performs on an addressed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeOp {
    Click,
    DoubleClick,
    RightClick,
    CtrlClick,
    ShiftClick,
    Expand,
    Collapse,
}


impl NativeOp {
    pub fn name(self) -> &'static str {
        match self {
            NativeOp::Click => "click",
            NativeOp::DoubleClick => "double_click",
            NativeOp::RightClick => "right_click",
            NativeOp::CtrlClick => "ctrl_click",
            NativeOp::ShiftClick => "shift_click",
            NativeOp::Expand => "expand",
            NativeOp::Collapse => "collapse",
        }
    }
}


/// Address of a node in the engine's own path convention.
///
/// `leaf_index` is the 1-based ordinal of the leaf among siblings that carry
/// the same label; `None` means the first such sibling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeSelector {
    pub segments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_index: Option<usize>,
}


impl fmt::Display for NativeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("->"))?;
        if let Some(index) = self.leaf_index {
            write!(f, " [{}]", index)?;
        }
        Ok(())
    }
}


/// A GUI automation engine able to read and drive tree widgets.
///
/// Every call may cross a process boundary and block. Widgets are addressed
/// by name; nodes by the engine's own handle type.
pub trait TreeEngine {
    type Node;

    fn domain(&self, widget: &str) -> Result<Domain, EngineFault>;

    /// Top-level nodes in native order. Empty when the widget holds no data.
    fn root_nodes(&self, widget: &str) -> Result<Vec<Self::Node>, EngineFault>;

    fn children(&self, node: &Self::Node) -> Result<Vec<Self::Node>, EngineFault>;

    fn node_value(&self, node: &Self::Node) -> Result<NodeValue, EngineFault>;

    /// Value of the model root, used when the root is hidden from the UI.
    fn root_value(&self, widget: &str) -> Result<NodeValue, EngineFault>;

    fn root_visible(&self, widget: &str) -> Result<bool, EngineFault>;

    fn perform(
        &mut self,
        widget: &str,
        op: NativeOp,
        selector: &NativeSelector,
    ) -> Result<(), EngineFault>;

    /// Currently selected paths, each in the same convention as selectors.
    fn selected_paths(&mut self, widget: &str) -> Result<Vec<Vec<String>>, EngineFault>;

    /// Drop any cached widget handles so the next call looks them up afresh.
    fn clear_cache(&mut self);
}

//! Fixture engine: an in-memory `TreeEngine` described by YAML.
//!
//! Format: a map from widget name to widget description.
//!
//! ```yaml
//! docs:
//!   domain: java          # java | flex | swt | net | html | win
//!   root: Root            # model root label, shown only when hidden
//!   root_visible: false
//!   selected: ["Folder->Doc1"]
//!   unsupported: [double_click]
//!   nodes:
//!     - label: Folder
//!       children:
//!         - Doc1                              # plain text
//!         - { reference: "ref#7", target: Doc2 }
//!         - { raw: 42 }
//! ```
//!
//! Operations update the selection the way a list-style tree does: a click
//! replaces it, ctrl- and shift-click add to it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::engine::{Domain, EngineFault, NativeOp, NativeSelector, NodeValue, TreeEngine};
use crate::error::TreeError;


// ---------------------------------------------------------------------------
// YAML shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WidgetSpec {
    #[serde(default = "default_domain")]
    domain: Domain,
    #[serde(default = "default_root")]
    root: String,
    #[serde(default = "default_root_visible")]
    root_visible: bool,
    #[serde(default)]
    nodes: Vec<NodeSpec>,
    #[serde(default)]
    selected: Vec<String>,
    #[serde(default)]
    unsupported: Vec<NativeOp>,
}

fn default_domain() -> Domain {
    Domain::Java
}

fn default_root() -> String {
    "root".into()
}

fn default_root_visible() -> bool {
    true
}


#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeSpec {
    Leaf(String),
    Text {
        label: String,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    Reference {
        reference: String,
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    Raw {
        raw: serde_yaml::Value,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
}


// ---------------------------------------------------------------------------
// In-memory widgets
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum FixtureValue {
    Text(String),
    Reference { handle: String, target: Option<String> },
    Raw(RawValue),
}


/// Arbitrary YAML scalar or structure standing in for an opaque node object.
#[derive(Debug, Clone)]
struct RawValue(serde_yaml::Value);


impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_yaml::Value::String(s) => f.write_str(s),
            serde_yaml::Value::Number(n) => write!(f, "{}", n),
            serde_yaml::Value::Bool(b) => write!(f, "{}", b),
            serde_yaml::Value::Null => f.write_str("null"),
            other => {
                let text = serde_yaml::to_string(other).map_err(|_| fmt::Error)?;
                f.write_str(text.trim_end())
            }
        }
    }
}


#[derive(Debug)]
pub struct FixtureNode {
    value: FixtureValue,
    children: Vec<Arc<FixtureNode>>,
}


impl FixtureNode {
    fn from_spec(spec: NodeSpec) -> Arc<FixtureNode> {
        let (value, children) = match spec {
            NodeSpec::Leaf(label) => (FixtureValue::Text(label), Vec::new()),
            NodeSpec::Text { label, children } => (FixtureValue::Text(label), children),
            NodeSpec::Reference { reference, target, children } => (
                FixtureValue::Reference { handle: reference, target },
                children,
            ),
            NodeSpec::Raw { raw, children } => (FixtureValue::Raw(RawValue(raw)), children),
        };
        Arc::new(FixtureNode {
            value,
            children: children.into_iter().map(FixtureNode::from_spec).collect(),
        })
    }

    fn value(&self) -> NodeValue {
        match &self.value {
            FixtureValue::Text(text) => NodeValue::Text(text.clone()),
            FixtureValue::Reference { handle, target } => NodeValue::Reference {
                handle: handle.clone(),
                referent: target.clone(),
            },
            FixtureValue::Raw(raw) => NodeValue::Raw(Box::new(raw.clone())),
        }
    }

    pub fn label(&self) -> String {
        self.value().into_label()
    }
}


#[derive(Debug)]
struct Widget {
    domain: Domain,
    root: String,
    root_visible: bool,
    nodes: Vec<Arc<FixtureNode>>,
    selection: Vec<Vec<String>>,
    unsupported: Vec<NativeOp>,
}


/// One operation the engine carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformedOp {
    pub widget: String,
    pub op: NativeOp,
    pub selector: NativeSelector,
}


#[derive(Debug, Default)]
pub struct FixtureEngine {
    widgets: BTreeMap<String, Widget>,
    pending_faults: usize,
    performed: Vec<PerformedOp>,
    attempts: usize,
    cache_clears: usize,
}


impl FixtureEngine {
    pub fn from_yaml(text: &str) -> Result<FixtureEngine, TreeError> {
        FixtureEngine::parse(text, "<fixture>")
    }

    pub fn from_file(path: &Path) -> Result<FixtureEngine, TreeError> {
        let text = std::fs::read_to_string(path).map_err(|e| TreeError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        FixtureEngine::parse(&text, &path.display().to_string())
    }

    fn parse(text: &str, origin: &str) -> Result<FixtureEngine, TreeError> {
        let specs: BTreeMap<String, WidgetSpec> =
            serde_yaml::from_str(text).map_err(|e| TreeError::Config {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
        let widgets = specs
            .into_iter()
            .map(|(name, spec)| {
                let widget = Widget {
                    domain: spec.domain,
                    root: spec.root,
                    root_visible: spec.root_visible,
                    nodes: spec.nodes.into_iter().map(FixtureNode::from_spec).collect(),
                    selection: spec.selected.iter().map(|p| split_path(p)).collect(),
                    unsupported: spec.unsupported,
                };
                (name, widget)
            })
            .collect();
        Ok(FixtureEngine { widgets, ..FixtureEngine::default() })
    }

    /// Make the next `count` perform / selection reads fail as if the
    /// widget handle had gone stale.
    pub fn fail_next(&mut self, count: usize) {
        self.pending_faults = count;
    }

    pub fn performed(&self) -> &[PerformedOp] {
        &self.performed
    }

    /// Native operations requested, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn cache_clears(&self) -> usize {
        self.cache_clears
    }

    pub fn selection(&self, widget: &str) -> Option<&[Vec<String>]> {
        self.widgets.get(widget).map(|w| w.selection.as_slice())
    }

    fn widget(&self, name: &str) -> Result<&Widget, EngineFault> {
        self.widgets
            .get(name)
            .ok_or_else(|| EngineFault::UnknownWidget(name.to_string()))
    }

    fn take_fault(&mut self, widget: &str) -> Result<(), EngineFault> {
        if self.pending_faults > 0 {
            self.pending_faults -= 1;
            return Err(EngineFault::TargetGone(widget.to_string()));
        }
        Ok(())
    }
}


fn split_path(path: &str) -> Vec<String> {
    path.split("->").map(|s| s.trim().to_string()).collect()
}


/// Walk `selector` down from `nodes`: first exact label at each level, the
/// `leaf_index`-th exact label at the leaf.
fn locate(nodes: &[Arc<FixtureNode>], selector: &NativeSelector) -> bool {
    let Some((leaf, path)) = selector.segments.split_last() else {
        return false;
    };
    let mut level = nodes;
    for segment in path {
        match level.iter().find(|n| n.label() == *segment) {
            Some(node) => level = &node.children,
            None => return false,
        }
    }
    let wanted = selector.leaf_index.unwrap_or(1).max(1);
    level.iter().filter(|n| n.label() == *leaf).nth(wanted - 1).is_some()
}


impl TreeEngine for FixtureEngine {
    type Node = Arc<FixtureNode>;

    fn domain(&self, widget: &str) -> Result<Domain, EngineFault> {
        Ok(self.widget(widget)?.domain)
    }

    fn root_nodes(&self, widget: &str) -> Result<Vec<Self::Node>, EngineFault> {
        Ok(self.widget(widget)?.nodes.clone())
    }

    fn children(&self, node: &Self::Node) -> Result<Vec<Self::Node>, EngineFault> {
        Ok(node.children.clone())
    }

    fn node_value(&self, node: &Self::Node) -> Result<NodeValue, EngineFault> {
        Ok(node.value())
    }

    fn root_value(&self, widget: &str) -> Result<NodeValue, EngineFault> {
        Ok(NodeValue::Text(self.widget(widget)?.root.clone()))
    }

    fn root_visible(&self, widget: &str) -> Result<bool, EngineFault> {
        Ok(self.widget(widget)?.root_visible)
    }

    fn perform(
        &mut self,
        widget: &str,
        op: NativeOp,
        selector: &NativeSelector,
    ) -> Result<(), EngineFault> {
        self.attempts += 1;
        self.take_fault(widget)?;
        let target = self
            .widgets
            .get_mut(widget)
            .ok_or_else(|| EngineFault::UnknownWidget(widget.to_string()))?;
        if target.unsupported.contains(&op) {
            return Err(EngineFault::Unsupported {
                op: op.name().to_string(),
                domain: target.domain.name().to_string(),
            });
        }
        if !locate(&target.nodes, selector) {
            return Err(EngineFault::SubitemNotFound(selector.to_string()));
        }

        let path = selector.segments.clone();
        match op {
            NativeOp::Click | NativeOp::DoubleClick | NativeOp::RightClick => {
                target.selection = vec![path];
            }
            NativeOp::CtrlClick | NativeOp::ShiftClick => {
                if !target.selection.contains(&path) {
                    target.selection.push(path);
                }
            }
            NativeOp::Expand | NativeOp::Collapse => {}
        }
        debug!(widget, op = op.name(), selector = %selector, "fixture performed");
        self.performed.push(PerformedOp {
            widget: widget.to_string(),
            op,
            selector: selector.clone(),
        });
        Ok(())
    }

    fn selected_paths(&mut self, widget: &str) -> Result<Vec<Vec<String>>, EngineFault> {
        self.take_fault(widget)?;
        Ok(self.widget(widget)?.selection.clone())
    }

    fn clear_cache(&mut self) {
        self.cache_clears += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

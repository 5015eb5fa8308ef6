//! Command: the typed interface for all tree operations.
//!
//! Keyword lines are turned into commands by `keyword::parse_keyword`; a
//! dispatcher that speaks JSON may send the same commands directly.

use serde::{Deserialize, Serialize};

use crate::engine::NativeOp;


fn is_false(value: &bool) -> bool {
    !*value
}


/// A node action a command can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeAction {
    Click,
    DoubleClick,
    /// Double click under the name some toolkits use for it.
    Activate,
    RightClick,
    Select,
    SelectAnother,
    CtrlClick,
    ShiftClick,
    Expand,
    Collapse,
}


impl NodeAction {
    pub fn name(self) -> &'static str {
        match self {
            NodeAction::Click => "Click",
            NodeAction::DoubleClick => "DoubleClick",
            NodeAction::Activate => "Activate",
            NodeAction::RightClick => "RightClick",
            NodeAction::Select => "Select",
            NodeAction::SelectAnother => "SelectAnother",
            NodeAction::CtrlClick => "CtrlClick",
            NodeAction::ShiftClick => "ShiftClick",
            NodeAction::Expand => "Expand",
            NodeAction::Collapse => "Collapse",
        }
    }

    pub fn native_op(self) -> NativeOp {
        match self {
            NodeAction::Click | NodeAction::Select => NativeOp::Click,
            NodeAction::DoubleClick | NodeAction::Activate => NativeOp::DoubleClick,
            NodeAction::RightClick => NativeOp::RightClick,
            NodeAction::SelectAnother | NodeAction::CtrlClick => NativeOp::CtrlClick,
            NodeAction::ShiftClick => NativeOp::ShiftClick,
            NodeAction::Expand => NativeOp::Expand,
            NodeAction::Collapse => NativeOp::Collapse,
        }
    }

    pub fn unverified_keyword(self) -> String {
        format!("{}UnverifiedTextNode", self.name())
    }
}


/// Tree, path and match options shared by the node commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTarget {
    pub tree: String,
    pub path: String,
    /// Raw `INDEX=n` modifier, if given.
    pub index: Option<String>,
    pub partial: bool,
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command")]
pub enum Command {
    // -----------------------------------------------------------------
    // Node actions
    // -----------------------------------------------------------------

    #[serde(rename = "tree.click")]
    Click {
        tree: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        partial: bool,
    },

    #[serde(rename = "tree.double_click")]
    DoubleClick {
        tree: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        partial: bool,
    },

    #[serde(rename = "tree.right_click")]
    RightClick {
        tree: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        partial: bool,
    },

    #[serde(rename = "tree.select")]
    Select {
        tree: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        partial: bool,
    },

    #[serde(rename = "tree.select_another")]
    SelectAnother {
        tree: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        partial: bool,
    },

    #[serde(rename = "tree.expand")]
    Expand {
        tree: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        partial: bool,
    },

    #[serde(rename = "tree.collapse")]
    Collapse {
        tree: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        partial: bool,
    },

    /// Act on the caller's path as given, without reading the tree first.
    #[serde(rename = "tree.unverified")]
    Unverified {
        tree: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        action: NodeAction,
    },

    // -----------------------------------------------------------------
    // Verification
    // -----------------------------------------------------------------

    #[serde(rename = "tree.verify_selected")]
    VerifySelected {
        tree: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        partial: bool,
    },

    #[serde(rename = "tree.verify_unselected")]
    VerifyUnselected {
        tree: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        partial: bool,
    },

    #[serde(rename = "tree.verify_contains")]
    VerifyContains {
        tree: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        partial: bool,
    },

    /// Store `TRUE` or `FALSE` in `variable`; a missing node is not a failure.
    #[serde(rename = "tree.set_contains")]
    SetContains {
        tree: String,
        path: String,
        variable: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        partial: bool,
    },

    // -----------------------------------------------------------------
    // Capture / Help
    // -----------------------------------------------------------------

    #[serde(rename = "tree.capture")]
    Capture {
        tree: String,
        file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        indent: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        encoding: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        partial: bool,
    },

    #[serde(rename = "help")]
    Help {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },
}


impl Command {
    /// Command performing `action` on `target` after resolving the path.
    ///
    /// Actions with no resolved form (activate, ctrl- and shift-click) map
    /// to their unverified command, which ignores `partial`.
    pub fn action(action: NodeAction, target: NodeTarget) -> Command {
        let NodeTarget { tree, path, index, partial } = target;
        match action {
            NodeAction::Click => Command::Click { tree, path, index, partial },
            NodeAction::DoubleClick => Command::DoubleClick { tree, path, index, partial },
            NodeAction::RightClick => Command::RightClick { tree, path, index, partial },
            NodeAction::Select => Command::Select { tree, path, index, partial },
            NodeAction::SelectAnother => Command::SelectAnother { tree, path, index, partial },
            NodeAction::Expand => Command::Expand { tree, path, index, partial },
            NodeAction::Collapse => Command::Collapse { tree, path, index, partial },
            NodeAction::Activate | NodeAction::CtrlClick | NodeAction::ShiftClick => {
                Command::Unverified { tree, path, index, action }
            }
        }
    }

    /// Canonical keyword name, as used in result messages.
    pub fn keyword(&self) -> String {
        let pick = |partial: bool, exact: &str, fuzzy: &str| {
            if partial { fuzzy.to_string() } else { exact.to_string() }
        };
        match self {
            Command::Click { partial, .. } => pick(*partial, "Click", "ClickPartial"),
            Command::DoubleClick { partial, .. } => pick(*partial, "DoubleClick", "DoubleClickPartial"),
            Command::RightClick { partial, .. } => pick(*partial, "RightClick", "RightClickPartial"),
            Command::Select { partial, .. } => pick(*partial, "Select", "SelectPartial"),
            Command::SelectAnother { partial, .. } => {
                pick(*partial, "SelectAnother", "SelectAnotherPartial")
            }
            Command::Expand { partial, .. } => pick(*partial, "Expand", "ExpandPartial"),
            Command::Collapse { partial, .. } => pick(*partial, "Collapse", "CollapsePartial"),
            Command::Unverified { action, .. } => action.unverified_keyword(),
            Command::VerifySelected { .. } => "VerifySelectedNode".into(),
            Command::VerifyUnselected { .. } => "VerifyNodeUnselected".into(),
            Command::VerifyContains { partial, .. } => {
                pick(*partial, "VerifyTreeContainsNode", "VerifyTreeContainsPartialMatch")
            }
            Command::SetContains { partial, .. } => {
                pick(*partial, "SetTreeContainsNode", "SetTreeContainsPartialMatch")
            }
            Command::Capture { partial, .. } => {
                pick(*partial, "CaptureTreeDataToFile", "PartialMatchTreeDataToFile")
            }
            Command::Help { .. } => "Help".into(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_round_trip() {
        let cmd = Command::Click {
            tree: "tree1".into(),
            path: "Composers->Bach".into(),
            index: Some("INDEX=2".into()),
            partial: false,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"command\":\"tree.click\""));
        assert!(!json.contains("partial"));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn expand_partial_round_trip() {
        let cmd = Command::Expand {
            tree: "tree1".into(),
            path: "comp".into(),
            index: None,
            partial: true,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"command\":\"tree.expand\""));
        assert!(json.contains("\"partial\":true"));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn unverified_round_trip() {
        let cmd = Command::Unverified {
            tree: "tree1".into(),
            path: "A->B".into(),
            index: None,
            action: NodeAction::ShiftClick,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"action\":\"shift_click\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn capture_round_trip() {
        let cmd = Command::Capture {
            tree: "tree1".into(),
            file: "out.txt".into(),
            branch: Some("Composers".into()),
            indent: None,
            encoding: Some("UTF-16LE".into()),
            partial: false,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"command\":\"tree.capture\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn missing_optionals_default() {
        let cmd: Command =
            serde_json::from_str(r#"{"command":"tree.verify_contains","tree":"t","path":"A"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::VerifyContains { tree: "t".into(), path: "A".into(), index: None, partial: false }
        );
    }

    #[test]
    fn help_round_trip() {
        let cmd = Command::Help { topic: None };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"command":"help"}"#);
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn activate_has_only_unverified_form() {
        let target = NodeTarget { tree: "t".into(), path: "A".into(), index: None, partial: true };
        let cmd = Command::action(NodeAction::Activate, target);
        assert!(matches!(cmd, Command::Unverified { action: NodeAction::Activate, .. }));
        assert_eq!(cmd.keyword(), "ActivateUnverifiedTextNode");
        assert_eq!(NodeAction::Activate.native_op(), NativeOp::DoubleClick);
    }

    #[test]
    fn keyword_reflects_partial() {
        let target = NodeTarget { tree: "t".into(), path: "A".into(), index: None, partial: true };
        assert_eq!(Command::action(NodeAction::Select, target).keyword(), "SelectPartial");
    }
}

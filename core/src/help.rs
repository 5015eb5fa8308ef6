//! Help system for tree keywords.

pub fn help_text(topic: Option<&str>) -> String {
    match topic {
        None => overview(),
        Some(t) => {
            let key = t.trim().to_ascii_lowercase();
            if let Some(text) = command_help(&key) {
                return text;
            }
            if let Some(text) = group_help(&key) {
                return text;
            }
            format!("Unknown help topic: '{}'. Run 'treenav help' for a list of keywords.", t)
        }
    }
}


fn overview() -> String {
    "\
treenav — drive tree widgets by path

Usage: treenav [--config <file>] [--json] <fixture.yaml> <tree> <keyword> [params...]
       treenav help [topic]

Paths are node labels joined by '->', e.g. Composers->Bach->Brandenburg.
An optional INDEX=n picks the n-th node with the same last label.

Node actions (add Partial for case-insensitive substring matching):
  Click, DoubleClick, RightClick <path> [INDEX=n]
  Select, SelectAnother <path> [INDEX=n]
  Expand, Collapse <path> [INDEX=n]

Unverified actions:
  ClickUnverifiedTextNode <path> [INDEX=n]   and the like

Verification:
  VerifySelectedNode, VerifyNodeUnselected <path> [INDEX=n]
  VerifyTreeContainsNode <path> [INDEX=n]
  SetTreeContainsNode <path> <variable> [INDEX=n]

Capture:
  CaptureTreeDataToFile <file> [branch] [indent] [encoding]

Run 'treenav help <keyword>' or 'treenav help <group>' for details.
Groups: actions, unverified, verify, capture, paths."
        .into()
}


fn group_help(group: &str) -> Option<String> {
    let text = match group {
        "actions" => "\
Node actions — resolve the path in a fresh snapshot, then act on the node

  Click | ClickTextNode <path> [INDEX=n]
  DoubleClick | DoubleClickTextNode <path> [INDEX=n]
  RightClick | RightClickTextNode <path> [INDEX=n]
  Select | SelectTextNode | MakeSelection <path> [INDEX=n]
  SelectAnother | SelectAnotherTextNode <path> [INDEX=n]
    Adds the node to the current selection.
  Expand | ExpandTextNode <path> [INDEX=n]
  Collapse | CollapseTextNode <path> [INDEX=n]

Each has a Partial form (ClickPartial, SelectPartial, ExpandPartial,
...) matching every segment as a case-insensitive substring.",

        "unverified" => "\
Unverified actions — hand the path to the engine without reading the tree

  ClickUnverifiedTextNode, DoubleClickUnverifiedTextNode,
  ActivateUnverifiedTextNode, RightClickUnverifiedTextNode,
  SelectUnverifiedTextNode, SelectAnotherUnverifiedTextNode,
  CtrlClickUnverifiedTextNode, ShiftClickUnverifiedTextNode,
  ExpandUnverifiedTextNode, CollapseUnverifiedTextNode  <path> [INDEX=n]

If the engine rejects the path it is tried once more without its first
segment, for callers that spelled out a hidden root.",

        "verify" => "\
Verification keywords

  VerifySelectedNode <path> [INDEX=n]
    Fails unless the node is currently selected.

  VerifyNodeUnselected <path> [INDEX=n]
    Fails if the node is currently selected.

  VerifyTreeContainsNode | VerifyTreeContainsPartialMatch <path> [INDEX=n]
    Fails unless the node exists.

  SetTreeContainsNode | SetTreeContainsPartialMatch <path> <variable> [INDEX=n]
    Stores TRUE or FALSE in <variable>. A missing node is not a failure.",

        "capture" => "\
Capture keywords — write a tree or branch to a text file

  CaptureTreeDataToFile <file> [branch] [indent] [encoding]
  PartialMatchTreeDataToFile <file> [branch] [indent] [encoding]

One node per line, indented by <indent> (default tab) per level below the
branch, each followed by a blank line. Encodings: UTF-8 (default), UTF-16,
UTF-16LE, UTF-16BE, ISO-8859-1, US-ASCII.",

        "paths" => "\
Paths

  Segments are split on '->' and trimmed. Empty segments never match.
  Every segment but the last takes the first matching node at its depth.
  INDEX=n picks the n-th node matching the last segment; bad values mean 1.
  Trees that hide their root accept paths without it.",

        _ => return None,
    };
    Some(text.into())
}


fn command_help(keyword: &str) -> Option<String> {
    let text = match keyword {
        "click" | "clicktextnode" => "Click — click a node\n\nUsage: <tree> Click <path> [INDEX=n]",
        "doubleclick" | "doubleclicktextnode" => {
            "DoubleClick — double click a node\n\nUsage: <tree> DoubleClick <path> [INDEX=n]"
        }
        "rightclick" | "rightclicktextnode" => {
            "RightClick — right click a node\n\nUsage: <tree> RightClick <path> [INDEX=n]"
        }
        "select" | "selecttextnode" | "makeselection" => {
            "Select — make the node the selection\n\nUsage: <tree> Select <path> [INDEX=n]"
        }
        "selectanother" | "selectanothertextnode" => {
            "SelectAnother — add the node to the selection\n\nUsage: <tree> SelectAnother <path> [INDEX=n]"
        }
        "expand" | "expandtextnode" => "Expand — expand a node\n\nUsage: <tree> Expand <path> [INDEX=n]",
        "collapse" | "collapsetextnode" => "Collapse — collapse a node\n\nUsage: <tree> Collapse <path> [INDEX=n]",
        "verifyselectednode" => {
            "VerifySelectedNode — fail unless the node is selected\n\nUsage: <tree> VerifySelectedNode <path> [INDEX=n]"
        }
        "verifynodeunselected" => {
            "VerifyNodeUnselected — fail if the node is selected\n\nUsage: <tree> VerifyNodeUnselected <path> [INDEX=n]"
        }
        "verifytreecontainsnode" => {
            "VerifyTreeContainsNode — fail unless the node exists\n\nUsage: <tree> VerifyTreeContainsNode <path> [INDEX=n]"
        }
        "settreecontainsnode" => {
            "SetTreeContainsNode — store TRUE or FALSE in a variable\n\nUsage: <tree> SetTreeContainsNode <path> <variable> [INDEX=n]"
        }
        "capturetreedatatofile" => {
            "CaptureTreeDataToFile — write the tree to a file\n\nUsage: <tree> CaptureTreeDataToFile <file> [branch] [indent] [encoding]"
        }
        "help" => "help — show help\n\nUsage: treenav help [topic]",
        _ => return None,
    };
    Some(text.into())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_lists_groups() {
        let text = help_text(None);
        assert!(text.contains("Node actions"));
        assert!(text.contains("Capture:"));
    }

    #[test]
    fn group_help_verify() {
        let text = help_text(Some("verify"));
        assert!(text.contains("VerifySelectedNode"));
        assert!(text.contains("SetTreeContainsNode"));
    }

    #[test]
    fn command_help_is_case_insensitive() {
        let text = help_text(Some("CaptureTreeDataToFile"));
        assert!(text.contains("Usage:"));
        assert!(text.contains("[encoding]"));
    }

    #[test]
    fn unknown_topic() {
        let text = help_text(Some("bogus"));
        assert!(text.contains("Unknown help topic"));
    }
}

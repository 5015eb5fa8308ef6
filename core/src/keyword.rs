//! Keyword lines: turn `<tree> <Keyword> <params...>` into a `Command`.
//!
//! Keyword names are matched case-insensitively and several aliases share
//! one command. Parameters are positional:
//!
//!   - node actions and verifications: `path [INDEX=n]`
//!   - set verbs: `path variable [INDEX=n]`
//!   - capture verbs: `file [branch] [indent] [encoding]`
//!
//! Blank optional parameters count as not given.

use crate::command::{Command, NodeAction, NodeTarget};
use crate::error::TreeError;


enum Shape {
    Action { action: NodeAction, partial: bool },
    Unverified(NodeAction),
    Selected { expected: bool },
    Contains { set: bool, partial: bool },
    Capture { partial: bool },
}


fn lookup(keyword: &str) -> Option<Shape> {
    use NodeAction::*;
    let act = |action, partial| Some(Shape::Action { action, partial });
    match keyword.to_ascii_lowercase().as_str() {
        "click" | "clicktextnode" => act(Click, false),
        "clickpartial" | "clickpartialtextnode" => act(Click, true),
        "doubleclick" | "doubleclicktextnode" => act(DoubleClick, false),
        "doubleclickpartial" | "doubleclickpartialtextnode" => act(DoubleClick, true),
        "rightclick" | "rightclicktextnode" => act(RightClick, false),
        "rightclickpartial" | "rightclickpartialtextnode" => act(RightClick, true),
        "select" | "selecttextnode" | "makeselection" => act(Select, false),
        "selectpartial" | "selectpartialtextnode" => act(Select, true),
        "selectanother" | "selectanothertextnode" => act(SelectAnother, false),
        "selectanotherpartial" | "selectanotherpartialtextnode" => act(SelectAnother, true),
        "expand" | "expandtextnode" => act(Expand, false),
        "expandpartial" | "expandpartialtextnode" => act(Expand, true),
        "collapse" | "collapsetextnode" => act(Collapse, false),
        "collapsepartial" | "collapsepartialtextnode" => act(Collapse, true),

        "clickunverifiedtextnode" => Some(Shape::Unverified(Click)),
        "doubleclickunverifiedtextnode" => Some(Shape::Unverified(DoubleClick)),
        "activateunverifiedtextnode" => Some(Shape::Unverified(Activate)),
        "rightclickunverifiedtextnode" => Some(Shape::Unverified(RightClick)),
        "selectunverifiedtextnode" => Some(Shape::Unverified(Select)),
        "selectanotherunverifiedtextnode" => Some(Shape::Unverified(SelectAnother)),
        "ctrlclickunverifiedtextnode" => Some(Shape::Unverified(CtrlClick)),
        "shiftclickunverifiedtextnode" => Some(Shape::Unverified(ShiftClick)),
        "expandunverifiedtextnode" => Some(Shape::Unverified(Expand)),
        "collapseunverifiedtextnode" => Some(Shape::Unverified(Collapse)),

        "verifyselectednode" => Some(Shape::Selected { expected: true }),
        "verifynodeunselected" => Some(Shape::Selected { expected: false }),
        "verifytreecontainsnode" => Some(Shape::Contains { set: false, partial: false }),
        "verifytreecontainspartialmatch" => Some(Shape::Contains { set: false, partial: true }),
        "settreecontainsnode" => Some(Shape::Contains { set: true, partial: false }),
        "settreecontainspartialmatch" => Some(Shape::Contains { set: true, partial: true }),

        "capturetreedatatofile" => Some(Shape::Capture { partial: false }),
        "partialmatchtreedatatofile" => Some(Shape::Capture { partial: true }),
        _ => None,
    }
}


/// Build the command for one keyword line against `tree`.
pub fn parse_keyword(tree: &str, keyword: &str, params: &[String]) -> Result<Command, TreeError> {
    let keyword = keyword.trim();
    if keyword.eq_ignore_ascii_case("help") {
        return Ok(Command::Help { topic: optional(params, 0) });
    }
    let shape = lookup(keyword)
        .ok_or_else(|| TreeError::Parameter(format!("unknown tree keyword '{}'", keyword)))?;
    let tree = tree.trim().to_string();
    if tree.is_empty() {
        return Err(TreeError::Parameter(format!("{}: tree name is required", keyword)));
    }

    let command = match shape {
        Shape::Action { action, partial } => Command::action(
            action,
            NodeTarget {
                tree,
                path: required(params, 0, keyword, "path")?,
                index: optional(params, 1),
                partial,
            },
        ),
        Shape::Unverified(action) => Command::Unverified {
            tree,
            path: required(params, 0, keyword, "path")?,
            index: optional(params, 1),
            action,
        },
        Shape::Selected { expected } => {
            let path = required(params, 0, keyword, "path")?;
            let index = optional(params, 1);
            if expected {
                Command::VerifySelected { tree, path, index, partial: false }
            } else {
                Command::VerifyUnselected { tree, path, index, partial: false }
            }
        }
        Shape::Contains { set: false, partial } => Command::VerifyContains {
            tree,
            path: required(params, 0, keyword, "path")?,
            index: optional(params, 1),
            partial,
        },
        Shape::Contains { set: true, partial } => Command::SetContains {
            tree,
            path: required(params, 0, keyword, "path")?,
            variable: required(params, 1, keyword, "variable")?,
            index: optional(params, 2),
            partial,
        },
        Shape::Capture { partial } => Command::Capture {
            tree,
            file: required(params, 0, keyword, "file")?,
            branch: optional(params, 1),
            indent: optional_raw(params, 2),
            encoding: optional(params, 3),
            partial,
        },
    };
    Ok(command)
}


fn required(params: &[String], at: usize, keyword: &str, name: &str) -> Result<String, TreeError> {
    optional(params, at).ok_or_else(|| {
        TreeError::Parameter(format!("{}: missing required parameter '{}'", keyword, name))
    })
}


fn optional(params: &[String], at: usize) -> Option<String> {
    params
        .get(at)
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}


/// Like `optional` but keeps surrounding blanks, which may be the marker.
fn optional_raw(params: &[String], at: usize) -> Option<String> {
    params.get(at).filter(|p| !p.is_empty()).cloned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn params(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn alias_and_case_insensitive() {
        let a = parse_keyword("t", "ClickTextNode", &params(&["A->B"])).unwrap();
        let b = parse_keyword("t", "CLICK", &params(&["A->B"])).unwrap();
        assert_eq!(a, b);
        assert!(matches!(a, Command::Click { partial: false, .. }));
    }

    #[test]
    fn make_selection_is_select() {
        let cmd = parse_keyword("t", "MakeSelection", &params(&["A", "INDEX=2"])).unwrap();
        assert_eq!(
            cmd,
            Command::Select { tree: "t".into(), path: "A".into(), index: Some("INDEX=2".into()), partial: false }
        );
    }

    #[test]
    fn partial_variants() {
        let cmd = parse_keyword("t", "SelectPartialTextNode", &params(&["a"])).unwrap();
        assert!(matches!(cmd, Command::Select { partial: true, .. }));
        let cmd = parse_keyword("t", "VerifyTreeContainsPartialMatch", &params(&["a"])).unwrap();
        assert!(matches!(cmd, Command::VerifyContains { partial: true, .. }));
    }

    #[test]
    fn unverified_keywords() {
        let cmd = parse_keyword("t", "CtrlClickUnverifiedTextNode", &params(&["A", ""])).unwrap();
        assert_eq!(
            cmd,
            Command::Unverified { tree: "t".into(), path: "A".into(), index: None, action: NodeAction::CtrlClick }
        );
    }

    #[test]
    fn set_requires_variable() {
        let err = parse_keyword("t", "SetTreeContainsNode", &params(&["A"])).unwrap_err();
        assert_eq!(err.to_string(), "SetTreeContainsNode: missing required parameter 'variable'");
        let cmd = parse_keyword("t", "SetTreeContainsNode", &params(&["A", "found"])).unwrap();
        assert!(matches!(cmd, Command::SetContains { ref variable, .. } if variable == "found"));
    }

    #[test]
    fn blank_path_is_parameter_error() {
        let err = parse_keyword("t", "Expand", &params(&["   "])).unwrap_err();
        assert!(matches!(err, TreeError::Parameter(_)));
        assert!(parse_keyword("t", "Expand", &[]).is_err());
    }

    #[test]
    fn capture_keeps_blank_indent_marker() {
        let cmd = parse_keyword("t", "CaptureTreeDataToFile", &params(&["out.txt", "", "  ", "UTF-8"])).unwrap();
        assert_eq!(
            cmd,
            Command::Capture {
                tree: "t".into(),
                file: "out.txt".into(),
                branch: None,
                indent: Some("  ".into()),
                encoding: Some("UTF-8".into()),
                partial: false,
            }
        );
    }

    #[test]
    fn unknown_keyword() {
        let err = parse_keyword("t", "Frobnicate", &[]).unwrap_err();
        assert_eq!(err.to_string(), "unknown tree keyword 'Frobnicate'");
    }

    #[test]
    fn help_takes_optional_topic() {
        let cmd = parse_keyword("", "help", &params(&["capture"])).unwrap();
        assert_eq!(cmd, Command::Help { topic: Some("capture".into()) });
    }
}

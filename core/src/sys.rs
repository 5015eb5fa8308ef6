use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::command::{Command, NodeAction, NodeTarget};
use crate::data::export;
use crate::engine::TreeEngine;
use crate::error::TreeError;
use crate::response::Response;
use crate::tree::snapshot::{self, TreeSnapshot};
use crate::tree::tokenize::tokenize;
use crate::tree::{capture, dispatch, targeting};
use crate::types::config::TreeSettings;
use crate::types::node::{MatchMode, NodeInfo};


/// Central runtime. Executes tree commands against one automation engine.
pub struct Sys<E: TreeEngine> {
    engine: E,
    settings: TreeSettings,
    variables: BTreeMap<String, String>,
}


impl<E: TreeEngine> Sys<E> {
    pub fn new(engine: E) -> Sys<E> {
        Sys::with_settings(engine, TreeSettings::default())
    }

    pub fn with_settings(engine: E, settings: TreeSettings) -> Sys<E> {
        Sys {
            engine,
            settings,
            variables: BTreeMap::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Value stored by a set verb.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// All stored variables, ordered by name.
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// The single dispatch method.
    pub fn execute(&mut self, cmd: Command) -> Response {
        let keyword = cmd.keyword();
        let result = match cmd {
            Command::Click { tree, path, index, partial } => {
                self.cmd_action(&keyword, NodeAction::Click, NodeTarget { tree, path, index, partial })
            }
            Command::DoubleClick { tree, path, index, partial } => {
                self.cmd_action(&keyword, NodeAction::DoubleClick, NodeTarget { tree, path, index, partial })
            }
            Command::RightClick { tree, path, index, partial } => {
                self.cmd_action(&keyword, NodeAction::RightClick, NodeTarget { tree, path, index, partial })
            }
            Command::Select { tree, path, index, partial } => {
                self.cmd_action(&keyword, NodeAction::Select, NodeTarget { tree, path, index, partial })
            }
            Command::SelectAnother { tree, path, index, partial } => {
                self.cmd_action(&keyword, NodeAction::SelectAnother, NodeTarget { tree, path, index, partial })
            }
            Command::Expand { tree, path, index, partial } => {
                self.cmd_action(&keyword, NodeAction::Expand, NodeTarget { tree, path, index, partial })
            }
            Command::Collapse { tree, path, index, partial } => {
                self.cmd_action(&keyword, NodeAction::Collapse, NodeTarget { tree, path, index, partial })
            }
            Command::Unverified { tree, path, index, action } => {
                self.cmd_unverified(&keyword, action, NodeTarget { tree, path, index, partial: false })
            }
            Command::VerifySelected { tree, path, index, partial } => {
                self.cmd_verify_selection(&keyword, NodeTarget { tree, path, index, partial }, true)
            }
            Command::VerifyUnselected { tree, path, index, partial } => {
                self.cmd_verify_selection(&keyword, NodeTarget { tree, path, index, partial }, false)
            }
            Command::VerifyContains { tree, path, index, partial } => {
                self.cmd_verify_contains(&keyword, NodeTarget { tree, path, index, partial })
            }
            Command::SetContains { tree, path, variable, index, partial } => {
                self.cmd_set_contains(&keyword, NodeTarget { tree, path, index, partial }, variable)
            }
            Command::Capture { tree, file, branch, indent, encoding, partial } => {
                self.cmd_capture(&keyword, tree, file, branch, indent, encoding, partial)
            }
            Command::Help { topic } => Ok(crate::help::help_text(topic.as_deref())),
        };
        match result {
            Ok(output) => {
                info!(keyword = %keyword, "{}", output);
                Response::Ok { output }
            }
            Err(e) => {
                warn!(keyword = %keyword, error = %e, "command failed");
                Response::Error { message: e.to_string() }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Node actions
    // -----------------------------------------------------------------------

    fn cmd_action(&mut self, keyword: &str, action: NodeAction, target: NodeTarget) -> Result<String, TreeError> {
        require(keyword, "path", &target.path)?;
        let (snap, node) = self.locate(&target)?;
        let selector = dispatch::selector(&snap, &node);
        dispatch::perform(
            &mut self.engine,
            &target.tree,
            action.native_op(),
            &selector,
            self.settings.engine_retries,
        )?;
        Ok(format!(
            "{} performed on '{}' in {}.",
            keyword,
            dispatch::reported_path(&snap, &node, &self.settings.delimiter),
            target.tree
        ))
    }

    fn cmd_unverified(&mut self, keyword: &str, action: NodeAction, target: NodeTarget) -> Result<String, TreeError> {
        require(keyword, "path", &target.path)?;
        let tokens = tokenize(&target.path, &self.settings.syntax(), target.index.as_deref());
        let selector = dispatch::perform_unverified(
            &mut self.engine,
            &target.tree,
            action.native_op(),
            &tokens,
            self.settings.engine_retries,
            &self.settings.delimiter,
        )?;
        Ok(format!(
            "{} performed on '{}' in {}.",
            keyword,
            selector.segments.join(&self.settings.delimiter),
            target.tree
        ))
    }

    // -----------------------------------------------------------------------
    // Verification
    // -----------------------------------------------------------------------

    fn cmd_verify_selection(&mut self, keyword: &str, target: NodeTarget, expected: bool) -> Result<String, TreeError> {
        require(keyword, "path", &target.path)?;
        let (snap, node) = self.locate(&target)?;
        let selector = dispatch::selector(&snap, &node);
        let tree = target.tree.as_str();
        let selected = dispatch::with_retry(
            &mut self.engine,
            self.settings.engine_retries,
            "selection",
            |e| e.selected_paths(tree),
        )?;
        let is_selected = selected.iter().any(|p| *p == selector.segments);
        let path = selector.segments.join(&self.settings.delimiter);
        match (expected, is_selected) {
            (true, true) => Ok(format!("{} verified '{}' is selected in {}.", keyword, path, tree)),
            (false, false) => Ok(format!("{} verified '{}' is not selected in {}.", keyword, path, tree)),
            (true, false) => Err(TreeError::Mismatch(format!(
                "{}: node '{}' is not selected in {}.",
                keyword, path, tree
            ))),
            (false, true) => Err(TreeError::Mismatch(format!(
                "{}: node '{}' is selected in {}.",
                keyword, path, tree
            ))),
        }
    }

    fn cmd_verify_contains(&mut self, keyword: &str, target: NodeTarget) -> Result<String, TreeError> {
        require(keyword, "path", &target.path)?;
        let (snap, node) = self.locate(&target)?;
        Ok(format!(
            "{} found node '{}' in {}.",
            keyword,
            dispatch::reported_path(&snap, &node, &self.settings.delimiter),
            target.tree
        ))
    }

    fn cmd_set_contains(&mut self, keyword: &str, target: NodeTarget, variable: String) -> Result<String, TreeError> {
        require(keyword, "path", &target.path)?;
        require(keyword, "variable", &variable)?;
        let variable = variable.trim().to_string();
        match self.locate(&target) {
            Ok((snap, node)) => {
                self.variables.insert(variable.clone(), "TRUE".into());
                Ok(format!(
                    "{} found node '{}' in {}. Value 'TRUE' was assigned to variable '{}'.",
                    keyword,
                    dispatch::reported_path(&snap, &node, &self.settings.delimiter),
                    target.tree,
                    variable
                ))
            }
            Err(TreeError::NotFound { .. }) => {
                self.variables.insert(variable.clone(), "FALSE".into());
                Ok(format!(
                    "{} did not find node '{}' in {}. Value 'FALSE' was assigned to variable '{}'.",
                    keyword, target.path, target.tree, variable
                ))
            }
            Err(e) => Err(e),
        }
    }

    // -----------------------------------------------------------------------
    // Capture
    // -----------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn cmd_capture(
        &mut self,
        keyword: &str,
        tree: String,
        file: String,
        branch: Option<String>,
        indent: Option<String>,
        encoding: Option<String>,
        partial: bool,
    ) -> Result<String, TreeError> {
        require(keyword, "file", &file)?;
        let file = file.trim().to_string();
        let file_path = PathBuf::from(&file);
        let encoding = export::resolve_encoding(
            encoding.as_deref(),
            self.settings.encoding.as_deref(),
            &file_path,
        )?;
        let indent = indent
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| self.settings.indent_mark.clone());

        let snap = self.snapshot(&tree)?;
        let anchor = match branch.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            Some(path) => Some(self.resolve(&snap, path, None, partial)?),
            None => None,
        };
        let result = capture::capture(&snap, anchor.as_ref(), &indent, &self.settings.delimiter);
        export::write_lines(&file_path, &result.lines, encoding, self.settings.separator_lines)?;

        Ok(match result.branch {
            Some(branch) => format!(
                "{} performed on '{}' in {}; output file '{}'.",
                keyword, branch, tree, file
            ),
            None => format!("{} performed on {}; output file '{}'.", keyword, tree, file),
        })
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Read a fresh snapshot of `tree`.
    fn snapshot(&mut self, tree: &str) -> Result<TreeSnapshot, TreeError> {
        let snap = dispatch::with_retry(
            &mut self.engine,
            self.settings.engine_retries,
            "snapshot",
            |e| snapshot::build(&*e, tree),
        )?;
        snap.ok_or_else(|| TreeError::NoData { tree: tree.to_string() })
    }

    fn resolve(
        &self,
        snap: &TreeSnapshot,
        path: &str,
        index: Option<&str>,
        partial: bool,
    ) -> Result<NodeInfo, TreeError> {
        let tokens = tokenize(path, &self.settings.syntax(), index);
        targeting::resolve(
            &snap.matrix,
            &tokens,
            MatchMode::from_partial(partial),
            snap.domain.auto_prefixes_root(),
            &self.settings.delimiter,
        )
        .ok_or_else(|| TreeError::NotFound {
            path: path.to_string(),
            index: tokens.index,
        })
    }

    fn locate(&mut self, target: &NodeTarget) -> Result<(TreeSnapshot, NodeInfo), TreeError> {
        let snap = self.snapshot(&target.tree)?;
        let node = self.resolve(&snap, &target.path, target.index.as_deref(), target.partial)?;
        Ok((snap, node))
    }
}


fn require(keyword: &str, name: &str, value: &str) -> Result<(), TreeError> {
    if value.trim().is_empty() {
        return Err(TreeError::Parameter(format!(
            "{}: missing required parameter '{}'",
            keyword, name
        )));
    }
    Ok(())
}

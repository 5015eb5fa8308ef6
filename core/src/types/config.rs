use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::tree::tokenize::PathSyntax;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSettings {
    /// Path segment delimiter. Default: `->`.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Prefix of the disambiguation modifier. Default: `INDEX=`.
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,
    /// Indent marker used by capture when the caller gives none. Default: tab.
    #[serde(default = "default_indent_mark")]
    pub indent_mark: String,
    /// Write a blank line after every exported node. Default: true.
    #[serde(default = "default_separator_lines")]
    pub separator_lines: bool,
    /// Retries of a faulted native operation. Default: 1.
    #[serde(default = "default_engine_retries")]
    pub engine_retries: u32,
    /// Export encoding used when the caller gives none. UTF-8 when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

fn default_delimiter() -> String {
    "->".into()
}

fn default_index_prefix() -> String {
    "INDEX=".into()
}

fn default_indent_mark() -> String {
    "\t".into()
}

fn default_separator_lines() -> bool {
    true
}

fn default_engine_retries() -> u32 {
    1
}

impl Default for TreeSettings {
    fn default() -> Self {
        TreeSettings {
            delimiter: default_delimiter(),
            index_prefix: default_index_prefix(),
            indent_mark: default_indent_mark(),
            separator_lines: default_separator_lines(),
            engine_retries: default_engine_retries(),
            encoding: None,
        }
    }
}

impl TreeSettings {
    /// Parse settings from YAML text. `origin` names the source in errors.
    pub fn from_yaml(text: &str, origin: &str) -> Result<TreeSettings, TreeError> {
        let settings: TreeSettings = if text.trim().is_empty() {
            TreeSettings::default()
        } else {
            serde_yaml::from_str(text).map_err(|e| TreeError::Config {
                path: origin.to_string(),
                message: e.to_string(),
            })?
        };
        settings.validate(origin)?;
        Ok(settings)
    }

    /// Load settings from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<TreeSettings, TreeError> {
        match std::fs::read_to_string(path) {
            Ok(text) => TreeSettings::from_yaml(&text, &path.display().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Ok(TreeSettings::default())
            }
            Err(e) => Err(TreeError::Config {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    pub fn syntax(&self) -> PathSyntax {
        PathSyntax {
            delimiter: self.delimiter.clone(),
            index_prefix: self.index_prefix.clone(),
        }
    }

    fn validate(&self, origin: &str) -> Result<(), TreeError> {
        if self.delimiter.is_empty() {
            return Err(TreeError::Config {
                path: origin.to_string(),
                message: "delimiter must not be empty".into(),
            });
        }
        Ok(())
    }
}

//! Error taxonomy for tree operations.
//!
//! Every variant ends up as a failure `Response` in `Sys::execute`; none of
//! them crosses the runtime boundary as a panic.

use crate::engine::EngineFault;


#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A required keyword parameter is missing or blank.
    #[error("{0}")]
    Parameter(String),

    #[error("No matching node found for '{path}'{}", occurrence_suffix(.index))]
    NotFound { path: String, index: usize },

    /// The widget returned no root nodes at all.
    #[error("no tree data could be read from '{tree}'")]
    NoData { tree: String },

    /// A verification ran and observed the opposite of what was asked.
    #[error("{0}")]
    Mismatch(String),

    #[error("file can't be written: {file}, msg: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file can't be written: {file}, msg: text cannot be encoded as '{encoding}'")]
    Encoding { file: String, encoding: String },

    #[error(transparent)]
    Engine(#[from] EngineFault),

    #[error("invalid settings in {path}: {message}")]
    Config { path: String, message: String },
}


fn occurrence_suffix(index: &usize) -> String {
    if *index > 1 {
        format!(" (occurrence {})", index)
    } else {
        String::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_mentions_occurrence_only_past_first() {
        let err = TreeError::NotFound { path: "Root->X".into(), index: 1 };
        assert_eq!(err.to_string(), "No matching node found for 'Root->X'");
        let err = TreeError::NotFound { path: "Root->X".into(), index: 4 };
        assert_eq!(err.to_string(), "No matching node found for 'Root->X' (occurrence 4)");
    }

    #[test]
    fn engine_fault_is_transparent() {
        let err: TreeError = EngineFault::TargetGone("tree1".into()).into();
        assert_eq!(err.to_string(), "target 'tree1' is gone");
    }
}

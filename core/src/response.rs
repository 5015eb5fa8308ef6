//! Response: pass/fail status returned for every executed command.

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok { output: String },
    Error { message: String },
}


impl Response {
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }

    /// The human-readable text, whichever the status.
    pub fn text(&self) -> &str {
        match self {
            Response::Ok { output } => output,
            Response::Error { message } => message,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_status_tag() {
        let resp = Response::Error { message: "nope".into() };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"status":"error","message":"nope"}"#);
        assert!(!resp.is_ok());
        assert_eq!(resp.text(), "nope");
    }
}

//! treenav CLI: run one tree keyword against a YAML widget fixture.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;
use treenav_core::command::Command;
use treenav_core::data::fixture::FixtureEngine;
use treenav_core::keyword::parse_keyword;
use treenav_core::response::Response;
use treenav_core::sys::Sys;
use treenav_core::types::config::TreeSettings;


const USAGE: &str = "Usage: treenav [--config <file>] [--json] <fixture.yaml> <tree> <keyword> [params...]";


/// One parsed command line.
#[derive(Debug, PartialEq)]
struct Invocation {
    config: Option<PathBuf>,
    json: bool,
    /// `None` for commands that need no widgets, such as help.
    fixture: Option<PathBuf>,
    command: Command,
}


fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let arg_refs: Vec<&str> = args[1..].iter().map(|s| s.as_str()).collect();

    let inv = match parse_args(&arg_refs) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("treenav: {}", e);
            process::exit(1);
        }
    };

    let config_path = inv
        .config
        .clone()
        .unwrap_or_else(|| resolve_config_dir().join("settings.yaml"));
    let settings = match TreeSettings::load(&config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("treenav: {}", e);
            process::exit(1);
        }
    };

    let engine = match &inv.fixture {
        Some(path) => match FixtureEngine::from_file(path) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("treenav: {}", e);
                process::exit(1);
            }
        },
        None => FixtureEngine::default(),
    };

    let mut sys = Sys::with_settings(engine, settings);
    let response = sys.execute(inv.command);

    if inv.json {
        match serde_json::to_string(&response) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("treenav: {}", e);
                process::exit(1);
            }
        }
        if !response.is_ok() {
            process::exit(1);
        }
        return;
    }

    match response {
        Response::Ok { output } => {
            if !output.is_empty() {
                println!("{}", output);
            }
            for line in variable_lines(sys.variables()) {
                println!("{}", line);
            }
        }
        Response::Error { message } => {
            eprintln!("treenav error: {}", message);
            process::exit(1);
        }
    }
}


/// Log to stderr, filtered by `TREENAV_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("TREENAV_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}


fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TREENAV_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("treenav")
}


fn parse_args(args: &[&str]) -> Result<Invocation, String> {
    let config = find_flag(args, "--config").map(PathBuf::from);
    let json = args.contains(&"--json");

    let mut positional = Vec::new();
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
        } else if *arg == "--config" {
            skip = true;
        } else if *arg != "--json" {
            positional.push(*arg);
        }
    }

    if positional.is_empty() {
        return Err(format!("No command specified.\n{}", USAGE));
    }
    if positional[0] == "help" {
        return Ok(Invocation {
            config,
            json,
            fixture: None,
            command: Command::Help {
                topic: positional.get(1).map(|s| s.to_string()),
            },
        });
    }
    if positional.len() < 3 {
        return Err(USAGE.into());
    }

    let params: Vec<String> = positional[3..].iter().map(|s| s.to_string()).collect();
    let command = parse_keyword(positional[1], positional[2], &params).map_err(|e| e.to_string())?;
    Ok(Invocation {
        config,
        json,
        fixture: Some(PathBuf::from(positional[0])),
        command,
    })
}


/// `name=value` lines for variables assigned by set verbs.
fn variable_lines(vars: &BTreeMap<String, String>) -> Vec<String> {
    vars.iter().map(|(name, value)| format!("{}={}", name, value)).collect()
}


fn find_flag(args: &[&str], flag: &str) -> Option<String> {
    for (i, arg) in args.iter().enumerate() {
        if *arg == flag {
            return args.get(i + 1).map(|s| s.to_string());
        }
    }
    None
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_line_with_flags() {
        let inv = parse_args(&["--json", "tree.yaml", "docs", "Click", "Folder->Doc1", "INDEX=2"]).unwrap();
        assert!(inv.json);
        assert_eq!(inv.fixture, Some(PathBuf::from("tree.yaml")));
        assert_eq!(
            inv.command,
            Command::Click {
                tree: "docs".into(),
                path: "Folder->Doc1".into(),
                index: Some("INDEX=2".into()),
                partial: false,
            }
        );
    }

    #[test]
    fn config_flag_value_is_not_positional() {
        let inv = parse_args(&["--config", "s.yaml", "help", "capture"]).unwrap();
        assert_eq!(inv.config, Some(PathBuf::from("s.yaml")));
        assert_eq!(inv.command, Command::Help { topic: Some("capture".into()) });
        assert!(inv.fixture.is_none());
    }

    #[test]
    fn too_few_arguments() {
        assert!(parse_args(&["tree.yaml", "docs"]).is_err());
        assert!(parse_args(&[]).is_err());
    }

    #[test]
    fn variables_print_in_name_order() {
        let mut vars = BTreeMap::new();
        vars.insert("seen".to_string(), "TRUE".to_string());
        vars.insert("gone".to_string(), "FALSE".to_string());
        assert_eq!(variable_lines(&vars), vec!["gone=FALSE", "seen=TRUE"]);
    }

    #[test]
    fn unknown_keyword_is_reported() {
        let err = parse_args(&["tree.yaml", "docs", "Frob"]).unwrap_err();
        assert!(err.contains("Frob"));
    }
}

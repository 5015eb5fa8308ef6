//! Data: capture export and the YAML fixture engine.
//!
//! The `export` module renders captured lines and writes them in the
//! requested text encoding. The `fixture` module is an in-memory
//! `TreeEngine` described by YAML, used by the CLI and the tests.

pub mod export;
pub mod fixture;

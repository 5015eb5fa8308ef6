//! treenav core: resolve `A->B->C` paths against GUI tree widgets, act on
//! the nodes they name, and export trees to text files.

pub mod command;
pub mod data;
pub mod engine;
pub mod error;
pub mod help;
pub mod keyword;
pub mod response;
pub mod sys;
pub mod tree;
pub mod types;

pub use command::Command;
pub use error::TreeError;
pub use response::Response;
pub use sys::Sys;

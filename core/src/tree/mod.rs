//! Tree navigation: snapshot, path resolution, subtree capture, dispatch.
//!
//! The `snapshot` module flattens a live widget into a row matrix. The
//! `tokenize` module splits caller paths into segments plus an occurrence
//! index. The `targeting` module resolves those segments against the matrix.
//! The `capture` module slices a resolved subtree into indented lines, and
//! the `dispatch` module turns a resolved node into a native selector and
//! drives the engine with a single retry on faults.

pub mod capture;
pub mod dispatch;
pub mod snapshot;
pub mod targeting;
pub mod tokenize;

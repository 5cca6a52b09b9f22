//! CLI command implementations.

pub mod ast;
pub mod check;
pub mod common;
pub mod eval;
pub mod fmt;
pub mod gates;
pub mod version;

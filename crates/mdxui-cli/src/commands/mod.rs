//! Command implementations for the mdxui CLI.
//!
//! Each command reads its input, runs the check, prints a report in the
//! requested format and returns the exit code. A failed check is a normal
//! outcome: it is printed and mapped to an exit code, not returned as an
//! error. Errors are reserved for input that could not be read at all.

pub mod common;
pub mod completions;
pub mod config;
pub mod connection;
pub mod tool;

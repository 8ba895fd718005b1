//! Command line companion for personal projects: track tasks, log invested
//! and spent time, run focus sessions, keep reading/leisure/memo journals,
//! and review the week from a terminal. Everything lives in plain JSON files,
//! no runtime or service required.
//!

pub mod aggregate;
pub mod cli;
pub mod storage;
pub mod utils;

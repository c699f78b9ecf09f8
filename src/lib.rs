//! Runs an untrusted compiled program as an isolated child process,
//! capturing stdout and stderr under a wall-clock timeout and a captured
//! output cap.

pub mod command;
pub mod config;
pub mod domain;
pub mod escape;
pub mod report;
pub mod runner;

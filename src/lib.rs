// Library root — exposes internals for integration tests.
// The binary entry point is src/main.rs.

pub mod agents;
pub mod cli;
pub mod config;
pub mod console;
pub mod credential;
pub mod error;
pub mod export;
pub mod llm;
pub mod logger;
pub mod prompt;
pub mod session;

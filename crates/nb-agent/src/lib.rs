//! netbot agent: library crate for the chat-driven device router.
//!
//! Re-exports all modules so external crates (e.g. `nb-e2e-tests`) can
//! drive `CommandDispatcher` and the poll loop directly.

pub mod config;
pub mod dispatcher;
pub mod parser;
pub mod poll_loop;
pub mod session;

//! Database layer
//!
//! SQLite-backed persistence for all resource stores. The pool is created
//! from configuration and schema migrations are embedded in the binary.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};

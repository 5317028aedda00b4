//! Test utilities shared by unit and HTTP tests.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - `TestStores`, which wires the real use cases over an in-memory store

mod factories;
mod stores;

pub use factories::*;
pub use stores::*;

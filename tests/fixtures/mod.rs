//! Test fixtures for courier-sync.
//!
//! Provides:
//! - An in-memory courier backend that records every call
//! - Builders for solver request/solution documents
#![allow(dead_code)]

pub mod documents;
pub mod mock_backend;

pub use documents::*;
pub use mock_backend::*;

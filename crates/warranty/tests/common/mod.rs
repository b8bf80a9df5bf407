//! Shared test utilities for warranty integration tests.
//!
//! This module provides:
//! - `TestHarness` with a temp upload directory, an in-memory claim store
//!   and a scripted OCR service
//! - Builders for claims and config JSON

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{FlakyStore, Script, ScriptedOcr, TestHarness};

//! Shared test utilities for churnlens integration tests.
//!
//! This module provides:
//! - `TestHarness` for fixture files in an isolated temp directory
//! - `MockApi`, a recording in-memory `ChurnApi`

pub mod harness;
pub mod mock_api;

pub use harness::{parse_uploaded_csv, TestHarness, EMPLOYEE_HEADERS};
pub use mock_api::MockApi;

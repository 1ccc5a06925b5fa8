//! Shared test utilities for stackvars
//!
//! This module provides common helpers for integration tests:
//! - Deterministic event ids and timestamps
//! - Stack trace and capture fixtures

pub mod fixtures;

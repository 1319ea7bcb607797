//! Integration tests module
//!
//! This module organizes all integration tests for the r-chatplay crate.

pub mod config_test;
pub mod host_test;
pub mod media_test;

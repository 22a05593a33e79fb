//! Unit tests for stackctl CLI
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod architecture;
mod env_assembly;
mod helpers;
mod mocks;
mod property_tests;
mod status_service;

//! Shared fixtures for integration tests
#![allow(dead_code)]

pub mod fake_api;
pub mod mock_server;

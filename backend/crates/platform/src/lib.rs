//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Hosted backend configuration (environment driven)
//! - HTTP client for the backend's auth and REST endpoints
//! - Local persistence of small JSON documents (the session slot)

pub mod config;
pub mod http;
pub mod storage;

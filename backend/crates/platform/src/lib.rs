//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, configurable work factor)
//! - A swappable clock, so time-based logic can be tested deterministically
//! - Client identity resolution for per-client throttling
//! - Sliding-window rate limiting storage

pub mod client;
pub mod clock;
pub mod password;
pub mod rate_limit;

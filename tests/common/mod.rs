//! Common test utilities for assetkit scenario tests.
//!
//! This module provides:
//! - `TestEnv`: isolated bucket, cache and work directories
//! - `CountingDriver`: a storage driver that records downloads
//! - Fixtures: reusable asset contents

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;

//! Common test utilities for all integration tests.
//!
//! Provides manifest fixtures and test doubles for the provider and the rule
//! reconciler.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

pub mod doubles;
pub mod fixtures;

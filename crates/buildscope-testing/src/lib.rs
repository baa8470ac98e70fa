//! Testing infrastructure for buildscope tests.
//!
//! This crate provides utilities for writing readable tests:
//! - `EventStreamBuilder`: Fluent construction of decoder record streams
//! - `assertions`: Structural checks on reconstructed trees
//! - `fixtures`: Writing record streams to disk and isolated CLI environments

pub mod assertions;
pub mod builder;
pub mod fixtures;

pub use builder::EventStreamBuilder;
pub use fixtures::TestWorld;

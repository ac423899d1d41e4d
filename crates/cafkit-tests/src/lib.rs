//! cafkit End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the container codec:
//!
//! - Round-trip: write a stream, reopen it, compare format and frame count
//! - Scenarios: hand-built files with known field values
//! - **Malformed input**: truncated, reordered and contradictory headers
//! - File-backed sessions: append mode, logical end, finalize on drop
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cafkit-tests
//!
//! # Property tests only
//! cargo test -p cafkit-tests --test proptest_descriptor
//! ```

pub mod fixtures;

//! cafkit CLI library.
//!
//! This crate provides the command implementations behind the `cafkit`
//! binary: inspecting the header and chunk layout of CAF files and creating
//! silent files in any supported format.

pub mod commands;

//! funcpack core library
//!
//! Packages an executable (plus optional static files) into the zip layout
//! AWS Lambda loads as a custom runtime, and pushes archives to running
//! functions through the management API.

pub mod api;
pub mod archive;
pub mod compile;
pub mod config;
pub mod deploy;

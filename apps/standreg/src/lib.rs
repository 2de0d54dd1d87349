//! # Standreg Application Library
//!
//! The HTTP API and CLI of the standreg binary, exposed as a library so
//! integration tests can drive the router in-process.

pub mod api;
pub mod cli;

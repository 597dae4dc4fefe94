//! Utility functions

pub mod redact;

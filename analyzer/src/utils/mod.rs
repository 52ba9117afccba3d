//! Utility functions

pub mod json;
pub mod time;

//! Utilities shared by the butai packages.

pub mod logger;
pub mod time;

//! Utilities shared by the Deai packages: logging setup and clock abstraction.

pub mod logger;
pub mod time;

//! kitlog Core - Shared types, configuration, and error handling

pub mod config;
pub mod constants;
pub mod entry;
pub mod error;
pub mod size;

pub use config::*;
pub use constants::*;
pub use entry::{Entry, Level};
pub use error::{Error, FileOp, Result};
pub use size::ByteSize;

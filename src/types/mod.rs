//! Core types used throughout the library.

pub mod config;
pub mod message;
pub mod outcome;
pub mod provider_id;
pub mod streaming;

// Re-export commonly used types
pub use config::*;
pub use message::*;
pub use outcome::*;
pub use provider_id::*;
pub use streaming::*;

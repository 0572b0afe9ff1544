//! Domain errors and result types for Ruanon.
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, RuanonError>`]:
//!
//! ```rust
//! use ruanon::domain::{Result, RuanonError};
//!
//! fn check_length(text: &str, limit: usize) -> Result<()> {
//!     if text.chars().count() > limit {
//!         return Err(RuanonError::InvalidInput(format!(
//!             "text exceeds {limit} characters"
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_length("Иван", 10).is_ok());
//! ```
//!
//! Binaries and command handlers wrap these in `anyhow::Result` at the edge.

pub mod errors;
pub mod result;

pub use errors::RuanonError;
pub use result::Result;

//! Result type alias for Ruanon

use super::errors::RuanonError;

/// Result type alias for Ruanon operations
///
/// # Examples
///
/// ```
/// use ruanon::domain::result::Result;
/// use ruanon::domain::errors::RuanonError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(RuanonError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, RuanonError>;

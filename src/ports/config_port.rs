//! Configuration access port trait.

use crate::domain::error::TechindError;

/// Typed lookups into `[section] key` settings.
///
/// An absent key is `Ok(None)`; a present value that does not parse is
/// `TechindError::ConfigInvalid` so callers never fall back silently.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, TechindError>;
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, TechindError>;
}

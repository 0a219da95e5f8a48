//! Username token used by the core tracker.
//!
//! A username is the stable identity of a session's owner. On the wire it
//! travels as one whitespace-free token inside space-separated command lines,
//! so the parser enforces that shape here, once, instead of in every handler.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validated username token.
///
/// ```rust
/// use bittrickle_primitives::username::Username;
///
/// let username = "alice".parse::<Username>().unwrap();
///
/// assert_eq!(username.as_str(), "alice");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Username(String);

impl Username {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Error returned when a string does not contain a valid username token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseUsernameError {
    #[error("username is empty")]
    Empty,
    #[error("username contains whitespace: {value}")]
    ContainsWhitespace { value: String },
}

impl FromStr for Username {
    type Err = ParseUsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseUsernameError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(ParseUsernameError::ContainsWhitespace { value: s.to_owned() });
        }
        Ok(Username(s.to_owned()))
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

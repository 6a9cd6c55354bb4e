//! Identifier types used throughout the Chirp core.
//!
//! Identifiers are integer keys assigned by the content store. They sort
//! numerically and render as a plain decimal string, which is the exact
//! form stored in the search index.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Unique identifier for a content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(i64);

impl ContentId {
    /// Creates a content ID from a raw store key.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw store key.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Parses a content ID from its string form.
    pub fn parse(s: &str) -> Result<Self, ParseIntError> {
        s.parse()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<i64> for ContentId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Unique identifier for a user (author, follower or followee).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a user ID from a raw store key.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw store key.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Parses a user ID from its string form.
    pub fn parse(s: &str) -> Result<Self, ParseIntError> {
        s.parse()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<i64> for UserId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

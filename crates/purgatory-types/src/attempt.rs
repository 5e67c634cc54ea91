//! Attempt records and the ordered history they accumulate into.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, case-sensitive identifier naming one session.
///
/// Only ever used as a store key; the core never inspects its structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One submitted criteria/password pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// Milliseconds since the Unix epoch, assigned when the attempt was accepted.
    pub timestamp: i64,
    #[serde(default)]
    pub criteria: String,
    #[serde(default)]
    pub password: String,
}

impl Attempt {
    pub fn new(timestamp: i64, criteria: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            timestamp,
            criteria: criteria.into(),
            password: password.into(),
        }
    }
}

/// Attempts for one session in append order. Serialized as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<Attempt>);

impl History {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// A history holding only its first attempt.
    pub fn starting_with(first: Attempt) -> Self {
        Self(vec![first])
    }

    /// Append an attempt. Earlier entries are never touched.
    pub fn push(&mut self, attempt: Attempt) {
        self.0.push(attempt);
    }

    /// The first attempt; its timestamp anchors the retention window.
    pub fn anchor(&self) -> Option<&Attempt> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Attempt> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attempt> {
        self.0.iter()
    }
}

impl From<Vec<Attempt>> for History {
    fn from(attempts: Vec<Attempt>) -> Self {
        Self(attempts)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Attempt;
    type IntoIter = std::slice::Iter<'a, Attempt>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

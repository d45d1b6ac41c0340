//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of the two integer identifiers the
//! bot deals with: the sequence number of an inbound update and the chat a
//! message belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequence number of an inbound update.
///
/// Update IDs increase monotonically on the remote side. The smallest ID not
/// yet consumed is the polling offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateId(pub i64);

impl UpdateId {
    /// Returns the ID immediately after this one.
    pub fn next(self) -> Self {
        UpdateId(self.0.saturating_add(1))
    }

    /// Returns true for the zero offset, which is omitted from poll requests.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for UpdateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UpdateId {
    fn from(n: i64) -> Self {
        UpdateId(n)
    }
}

/// A chat (conversation) identifier.
///
/// Group chats have negative IDs, so this is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(n: i64) -> Self {
        ChatId(n)
    }
}

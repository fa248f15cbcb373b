//! Queue domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use super::job::BuildNumber;

/// Identifier of a queue item, as returned in the `Location` header of a
/// schedule request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueId(pub u32);

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for QueueId {
    fn from(id: u32) -> Self {
        QueueId(id)
    }
}

/// Locator of a build that left the queue
///
/// Carries the number the server assigned and the URL of the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub number: BuildNumber,
    pub url: String,
}

impl QueueItem {
    pub fn new(number: BuildNumber, url: impl Into<String>) -> Self {
        Self {
            number,
            url: url.into(),
        }
    }
}

/// Snapshot of the server's build queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub length: u32,
    pub task_names: Vec<String>,
}

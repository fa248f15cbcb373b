//! Queue DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::BuildNumber;
use crate::domain::queue::{QueueItem, QueueStats};

/// Response of `queue/item/<id>/api/json`
///
/// `executable` is absent (or null) until the server starts a build for the item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueItemResponse {
    #[serde(default)]
    pub executable: Option<Executable>,
}

/// Build record attached to a queue item once it starts executing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Executable {
    #[serde(default)]
    pub number: BuildNumber,
    #[serde(default)]
    pub url: String,
}

impl QueueItemResponse {
    /// The build locator, if the server has assigned a build number
    pub fn assigned_build(&self) -> Option<QueueItem> {
        self.executable
            .as_ref()
            .filter(|e| e.number.is_assigned())
            .map(|e| QueueItem::new(e.number, e.url.clone()))
    }
}

/// Response of `queue/api/json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueResponse {
    #[serde(default)]
    pub items: Vec<QueueEntry>,
}

/// One entry of the build queue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueEntry {
    #[serde(default)]
    pub task: Task,
}

/// The job a queue entry belongs to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub name: String,
}

/// Queue length saturated at `u32::MAX`
fn queue_length(items: usize) -> u32 {
    u32::try_from(items).unwrap_or(u32::MAX)
}

impl From<QueueResponse> for QueueStats {
    fn from(response: QueueResponse) -> Self {
        QueueStats {
            length: queue_length(response.items.len()),
            task_names: response.items.into_iter().map(|i| i.task.name).collect(),
        }
    }
}
